//! SAT backends behind the proxies, reached through rustsat

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::time::Duration;

use rustsat::solvers::{Interrupt, InterruptSolver, Solve, SolveIncremental, SolverResult};
use rustsat::types::{Clause, Lit, TernaryVal};
use rustsat_kissat::Kissat;
use rustsat_minisat::core::Minisat;
use tracing::debug;

use super::timeout::TimeoutHelper;
use super::{write_cnf, ClauseDatabase, SolverError, Value};
use crate::Literal;

/// Answer of a backend
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Outcome {
    Sat,
    Unsat,
    Unknown,
}

/// A SAT engine that clauses are handed to
pub(crate) trait SatBackend {
    /// Name used in logs and errors
    fn name(&self) -> &'static str;

    /// Returns true if clauses can be added between solves and assumptions are supported
    fn is_incremental(&self) -> bool;

    /// Add a clause to the instance
    fn add_clause(&mut self, clause: &[Literal]) -> Result<(), SolverError>;

    /// Solve the instance under assumptions
    fn solve(
        &mut self,
        assumptions: &[Literal],
        timeout: Option<Duration>,
    ) -> Result<Outcome, SolverError>;

    /// Values of the variables `0..nb_vars` after a satisfiable answer
    fn model(&mut self, nb_vars: usize) -> Vec<Value>;
}

fn to_lit(l: Literal) -> Lit {
    Lit::new(l.var(), l.is_negated())
}

fn to_clause(clause: &[Literal]) -> Clause {
    clause.iter().map(|l| to_lit(*l)).collect()
}

fn to_value(v: TernaryVal) -> Value {
    match v {
        TernaryVal::True => Value::Positive,
        TernaryVal::False => Value::Negative,
        TernaryVal::DontCare => Value::DontCare,
    }
}

/// Run a solve call, interrupting it from a helper thread after the timeout
///
/// The helper may fire just after the call returned, leaving a stale interrupt on the idle
/// solver. An interrupted answer with no timeout during the call is such a leftover, and the call
/// is retried once.
fn interruptible<S, F>(
    solver: &mut S,
    name: &'static str,
    timeout: Option<Duration>,
    mut solve: F,
) -> Result<Outcome, SolverError>
where
    S: Interrupt,
    F: FnMut(&mut S) -> Result<SolverResult, String>,
{
    let mut retried = false;
    loop {
        let helper = timeout.map(|limit| {
            let interrupter = solver.interrupter();
            TimeoutHelper::start(limit, move || interrupter.interrupt())
        });
        let res = solve(solver);
        let fired = helper.map(|h| h.stop()).unwrap_or(false);
        if fired {
            debug!(backend = name, "solve interrupted by timeout");
        }
        let res = res.map_err(|message| SolverError::Backend {
            backend: name,
            message,
        })?;
        match res {
            SolverResult::Sat => return Ok(Outcome::Sat),
            SolverResult::Unsat => return Ok(Outcome::Unsat),
            SolverResult::Interrupted if fired || retried => return Ok(Outcome::Unknown),
            SolverResult::Interrupted => {
                debug!(backend = name, "stale interrupt, solving again");
                retried = true;
            }
        }
    }
}

/// Incremental backend based on Minisat
#[derive(Default)]
pub(crate) struct MinisatBackend {
    solver: Minisat,
}

impl SatBackend for MinisatBackend {
    fn name(&self) -> &'static str {
        "minisat"
    }

    fn is_incremental(&self) -> bool {
        true
    }

    fn add_clause(&mut self, clause: &[Literal]) -> Result<(), SolverError> {
        self.solver
            .add_clause(to_clause(clause))
            .map_err(|e| SolverError::Backend {
                backend: "minisat",
                message: e.to_string(),
            })
    }

    fn solve(
        &mut self,
        assumptions: &[Literal],
        timeout: Option<Duration>,
    ) -> Result<Outcome, SolverError> {
        let assumps: Vec<Lit> = assumptions.iter().map(|l| to_lit(*l)).collect();
        interruptible(&mut self.solver, "minisat", timeout, |s| {
            s.solve_assumps(&assumps).map_err(|e| e.to_string())
        })
    }

    fn model(&mut self, nb_vars: usize) -> Vec<Value> {
        (0..nb_vars)
            .map(|v| {
                // Variables the solver never saw are unconstrained
                self.solver
                    .lit_val(Lit::positive(v as u32))
                    .map(to_value)
                    .unwrap_or(Value::DontCare)
            })
            .collect()
    }
}

/// Single-shot backend based on Kissat
///
/// Kissat cannot be reused after solving: clauses are kept here and a fresh solver is built for
/// the solve call.
#[derive(Default)]
pub(crate) struct KissatBackend {
    clauses: ClauseDatabase<Literal>,
    nb_vars: usize,
    model: Vec<Value>,
}

impl SatBackend for KissatBackend {
    fn name(&self) -> &'static str {
        "kissat"
    }

    fn is_incremental(&self) -> bool {
        false
    }

    fn add_clause(&mut self, clause: &[Literal]) -> Result<(), SolverError> {
        for l in clause {
            self.nb_vars = self.nb_vars.max(l.var() as usize + 1);
        }
        self.clauses.push(clause);
        Ok(())
    }

    fn solve(
        &mut self,
        assumptions: &[Literal],
        timeout: Option<Duration>,
    ) -> Result<Outcome, SolverError> {
        assert!(
            assumptions.is_empty(),
            "Assumptions are not supported by the kissat backend"
        );
        let backend_error = |e: String| SolverError::Backend {
            backend: "kissat",
            message: e,
        };
        let mut solver = Kissat::default();
        for clause in self.clauses.iter() {
            solver
                .add_clause(to_clause(clause))
                .map_err(|e| backend_error(e.to_string()))?;
        }
        let outcome = interruptible(&mut solver, "kissat", timeout, |s| {
            s.solve().map_err(|e| e.to_string())
        })?;
        self.model.clear();
        if outcome == Outcome::Sat {
            for v in 0..self.nb_vars {
                let val = solver
                    .lit_val(Lit::positive(v as u32))
                    .map(to_value)
                    .unwrap_or(Value::DontCare);
                self.model.push(val);
            }
        }
        Ok(outcome)
    }

    fn model(&mut self, nb_vars: usize) -> Vec<Value> {
        let mut ret = self.model.clone();
        ret.resize(nb_vars, Value::DontCare);
        ret
    }
}

/// Backend that writes the instance to a DIMACS file instead of solving it
pub(crate) struct DimacsBackend {
    path: PathBuf,
    clauses: ClauseDatabase<Literal>,
    nb_vars: usize,
}

impl DimacsBackend {
    pub fn new(path: PathBuf) -> Self {
        DimacsBackend {
            path,
            clauses: ClauseDatabase::new(),
            nb_vars: 0,
        }
    }
}

impl SatBackend for DimacsBackend {
    fn name(&self) -> &'static str {
        "dimacs"
    }

    fn is_incremental(&self) -> bool {
        false
    }

    fn add_clause(&mut self, clause: &[Literal]) -> Result<(), SolverError> {
        for l in clause {
            self.nb_vars = self.nb_vars.max(l.var() as usize + 1);
        }
        self.clauses.push(clause);
        Ok(())
    }

    fn solve(
        &mut self,
        assumptions: &[Literal],
        _timeout: Option<Duration>,
    ) -> Result<Outcome, SolverError> {
        assert!(
            assumptions.is_empty(),
            "Assumptions are not supported by the dimacs export"
        );
        let io_error = |source: std::io::Error| SolverError::Io {
            path: self.path.clone(),
            source,
        };
        let f = File::create(&self.path).map_err(io_error)?;
        let mut w = BufWriter::new(f);
        write_cnf(&mut w, self.nb_vars, &self.clauses, &[]).map_err(io_error)?;
        w.flush().map_err(io_error)?;
        debug!(path = %self.path.display(), clauses = self.clauses.len(), "wrote DIMACS instance");
        Ok(Outcome::Unknown)
    }

    fn model(&mut self, nb_vars: usize) -> Vec<Value> {
        vec![Value::DontCare; nb_vars]
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    use super::*;

    /// Solver stand-in that answers interrupted while its flag is raised
    struct Flagged {
        flag: Arc<AtomicBool>,
        calls: usize,
    }

    struct FlagInterrupter(Arc<AtomicBool>);

    impl InterruptSolver for FlagInterrupter {
        fn interrupt(&self) {
            self.0.store(true, Ordering::SeqCst);
        }
    }

    impl Interrupt for Flagged {
        type Interrupter = FlagInterrupter;
        fn interrupter(&mut self) -> FlagInterrupter {
            FlagInterrupter(self.flag.clone())
        }
    }

    fn flagged_solve(s: &mut Flagged) -> Result<SolverResult, String> {
        s.calls += 1;
        if s.flag.swap(false, Ordering::SeqCst) {
            Ok(SolverResult::Interrupted)
        } else {
            Ok(SolverResult::Sat)
        }
    }

    fn check_backend(backend: &mut dyn SatBackend) {
        let a = Literal::from_var(1);
        let b = Literal::from_var(2);
        backend.add_clause(&[Literal::one()]).unwrap();
        backend.add_clause(&[a, b]).unwrap();
        backend.add_clause(&[!a]).unwrap();
        assert_eq!(backend.solve(&[], None).unwrap(), Outcome::Sat);
        let model = backend.model(3);
        assert_eq!(model[0], Value::Positive);
        assert_eq!(model[1], Value::Negative);
        assert_eq!(model[2], Value::Positive);
    }

    #[test]
    fn test_minisat() {
        let mut backend = MinisatBackend::default();
        check_backend(&mut backend);
        let b = Literal::from_var(2);
        assert_eq!(backend.solve(&[!b], None).unwrap(), Outcome::Unsat);
        assert_eq!(backend.solve(&[], None).unwrap(), Outcome::Sat);
    }

    #[test]
    fn test_kissat() {
        let mut backend = KissatBackend::default();
        check_backend(&mut backend);
        backend.add_clause(&[!Literal::from_var(2)]).unwrap();
        assert_eq!(backend.solve(&[], None).unwrap(), Outcome::Unsat);
    }

    #[test]
    fn test_stale_interrupt() {
        let mut solver = Flagged {
            flag: Arc::new(AtomicBool::new(true)),
            calls: 0,
        };
        let timeout = Some(Duration::from_secs(60));
        let res = interruptible(&mut solver, "flagged", timeout, flagged_solve).unwrap();
        assert_eq!(res, Outcome::Sat);
        assert_eq!(solver.calls, 2);
    }

    #[test]
    fn test_persistent_interrupt() {
        let mut solver = Flagged {
            flag: Arc::new(AtomicBool::new(true)),
            calls: 0,
        };
        let res = interruptible(&mut solver, "flagged", None, |s| {
            s.calls += 1;
            s.flag.store(true, Ordering::SeqCst);
            Ok(SolverResult::Interrupted)
        })
        .unwrap();
        assert_eq!(res, Outcome::Unknown);
        assert_eq!(solver.calls, 2);
    }

    #[test]
    fn test_timeout_fired() {
        let mut solver = Flagged {
            flag: Arc::new(AtomicBool::new(false)),
            calls: 0,
        };
        let res = interruptible(&mut solver, "flagged", Some(Duration::from_millis(10)), |s| {
            s.calls += 1;
            while !s.flag.load(Ordering::SeqCst) {
                std::thread::sleep(Duration::from_millis(1));
            }
            Ok(SolverResult::Interrupted)
        })
        .unwrap();
        assert_eq!(res, Outcome::Unknown);
        assert_eq!(solver.calls, 1);
    }
}
