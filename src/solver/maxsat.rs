use std::fs::File;
use std::io::{self, BufWriter, Write};

use tracing::{debug, error, warn};

use super::{
    write_wcnf, SatResult, SatSolver, SatSolverProxy, SolverError, SolverKind, SolverProxy,
    SolverSettings, SolverStatistics, Value,
};
use crate::Literal;

/// Proxy for weighted partial MaxSAT
///
/// Hard clauses use the usual clause API; soft clauses are committed with
/// [`commit_soft_clause`](Self::commit_soft_clause). Each soft clause `C` is stored as the hard
/// clause `C ∨ r` with a fresh relaxation literal `r` of the clause's weight.
///
/// The optimum is found by a linear SAT-UNSAT search: each model of cost `k` is followed by a solve
/// where the relaxation literals are bounded by `Σ w·r ≤ k - 1`, until the bound is unsatisfiable.
/// The bound is a sequential weight counter whose clauses are enabled by an assumption.
pub struct MaxSatSolverProxy {
    sat: SatSolverProxy,
    soft: Vec<(Vec<Literal>, u64)>,
    relaxation: Vec<(Literal, u64)>,
    best: Vec<Value>,
    last_cost: u64,
    last_result: SatResult,
}

impl MaxSatSolverProxy {
    /// Create a proxy with default settings
    pub fn new(solver: SatSolver) -> MaxSatSolverProxy {
        MaxSatSolverProxy::with_settings(solver, SolverSettings::default())
    }

    /// Create a proxy
    ///
    /// Optimisation requires an incremental backend; the DIMACS export writes a WCNF file instead.
    pub fn with_settings(solver: SatSolver, settings: SolverSettings) -> MaxSatSolverProxy {
        assert!(
            !matches!(solver, SatSolver::Kissat),
            "MaxSAT requires an incremental backend or the DIMACS export"
        );
        MaxSatSolverProxy {
            sat: SatSolverProxy::with_settings(solver, settings),
            soft: Vec::new(),
            relaxation: Vec::new(),
            best: Vec::new(),
            last_cost: 0,
            last_result: SatResult::Unknown,
        }
    }

    /// Underlying SAT proxy, holding the hard clauses
    pub fn sat(&self) -> &SatSolverProxy {
        &self.sat
    }

    /// Mutable access to the underlying SAT proxy, for assumptions and settings
    pub fn sat_mut(&mut self) -> &mut SatSolverProxy {
        &mut self.sat
    }

    /// Close the open clause as a soft clause
    pub fn commit_soft_clause(&mut self, weight: u64) {
        assert!(weight > 0, "Soft clauses need a positive weight");
        let relax = self.sat.new_literal();
        self.sat.add_literal(relax);
        self.sat.commit_clause();
        let clauses = self.sat.clauses();
        let mut lits = clauses[clauses.len() - 1].to_vec();
        lits.pop();
        self.soft.push((lits, weight));
        self.relaxation.push((relax, weight));
    }

    /// Commit a soft clause in one call
    pub fn commit_soft(&mut self, lits: &[Literal], weight: u64) {
        self.sat.new_clause();
        for l in lits {
            self.sat.add_literal(*l);
        }
        self.commit_soft_clause(weight);
    }

    /// Number of soft clauses
    pub fn nb_soft_clauses(&self) -> usize {
        self.soft.len()
    }

    /// Same as [`max_solve`](Self::max_solve)
    pub fn solve(&mut self) -> SatResult {
        self.max_solve()
    }

    /// Find a model of the hard clauses minimizing the weight of the falsified soft clauses
    ///
    /// Returns [`SatResult::Unknown`] if the search was stopped before optimality was proven; the
    /// best model found so far remains readable.
    pub fn max_solve(&mut self) -> SatResult {
        self.best.clear();
        self.last_cost = 0;
        if let SatSolver::DimacsExport(path) = self.sat.solver().clone() {
            if let Err(e) = self.export(&path) {
                error!("{e}");
            }
            self.last_result = SatResult::Unknown;
            return SatResult::Unknown;
        }

        let user = self.sat.take_assumptions();
        let res = self.sat.solve_with(&user);
        if res != SatResult::Sat {
            self.last_result = res;
            return res;
        }
        self.record_model();

        let res = loop {
            if self.last_cost == 0 {
                break SatResult::Sat;
            }
            let act = self.encode_bound(self.last_cost - 1);
            let mut assumptions = user.clone();
            assumptions.push(act);
            match self.sat.solve_with(&assumptions) {
                SatResult::Sat => {
                    self.record_model();
                    self.sat.commit(&[!act]);
                }
                SatResult::Unsat => {
                    self.sat.commit(&[!act]);
                    break SatResult::Sat;
                }
                SatResult::Unknown => {
                    warn!(cost = self.last_cost, "MaxSAT search stopped before optimality");
                    break SatResult::Unknown;
                }
            }
        };
        if !self.sat.settings().silent {
            debug!(cost = self.last_cost, soft = self.soft.len(), result = %res, "MaxSAT solve");
        }
        self.last_result = res;
        res
    }

    /// Cost of the best model of the last solve
    pub fn last_cost(&self) -> u64 {
        self.last_cost
    }

    /// Result of the last solve
    pub fn last_result(&self) -> SatResult {
        self.last_result
    }

    /// Write the instance in WCNF format
    ///
    /// Relaxed clauses are hard, and each relaxation literal `r` becomes a soft unit clause `¬r`.
    pub fn write_wcnf<W: Write>(&self, w: &mut W) -> io::Result<()> {
        let soft: Vec<(Vec<Literal>, u64)> = self
            .relaxation
            .iter()
            .map(|(r, weight)| (vec![!*r], *weight))
            .collect();
        write_wcnf(
            w,
            self.sat.nb_variables(),
            self.sat.clauses(),
            &soft,
            &[format!("{} soft clauses", self.soft.len())],
        )
    }

    fn export(&self, path: &std::path::Path) -> Result<(), SolverError> {
        let io_error = |source: io::Error| SolverError::Io {
            path: path.to_path_buf(),
            source,
        };
        let f = File::create(path).map_err(io_error)?;
        let mut w = BufWriter::new(f);
        self.write_wcnf(&mut w).map_err(io_error)?;
        w.flush().map_err(io_error)
    }

    fn value_in(model: &[Value], lit: Literal) -> Value {
        if lit.is_constant() {
            return Value::from_constant(lit);
        }
        model
            .get(lit.var() as usize)
            .map(|v| v.of_literal(lit))
            .unwrap_or(Value::Invalid)
    }

    /// Keep the current model and compute its cost from the falsified soft clauses
    fn record_model(&mut self) {
        self.best = self.sat.model().to_vec();
        self.last_cost = self
            .soft
            .iter()
            .filter(|(lits, _)| {
                lits.iter()
                    .all(|l| Self::value_in(&self.best, *l) != Value::Positive)
            })
            .map(|(_, weight)| weight)
            .sum();
    }

    /// Encode `Σ w·r ≤ bound` with a sequential weight counter, enabled by the returned literal
    fn encode_bound(&mut self, bound: u64) -> Literal {
        let act = self.sat.new_literal();
        let saved = self.sat.automatic_literal();
        self.sat.set_automatic_literal(!act);

        let k = bound as usize;
        let mut prev: Vec<Literal> = Vec::new();
        let relaxation = self.relaxation.clone();
        for (i, (x, weight)) in relaxation.iter().enumerate() {
            let w = *weight as usize;
            if w > k {
                self.sat.commit(&[!*x]);
            } else if i > 0 {
                self.sat.commit(&[!*x, !prev[k - w]]);
            }
            if i + 1 == relaxation.len() {
                break;
            }
            // s[j] is true when the partial sum is at least j + 1
            let s: Vec<Literal> = (0..k).map(|_| self.sat.new_literal()).collect();
            for sj in s.iter().take(w.min(k)) {
                self.sat.commit(&[!*x, *sj]);
            }
            if i > 0 {
                for j in 0..k {
                    self.sat.commit(&[!prev[j], s[j]]);
                }
                for j in 0..k.saturating_sub(w) {
                    self.sat.commit(&[!*x, !prev[j], s[j + w]]);
                }
            }
            prev = s;
        }

        match saved {
            Some(l) => self.sat.set_automatic_literal(l),
            None => self.sat.clear_automatic_literal(),
        }
        act
    }
}

impl SolverProxy for MaxSatSolverProxy {
    fn kind(&self) -> SolverKind {
        SolverKind::MaxSat
    }

    fn new_literal(&mut self) -> Literal {
        self.sat.new_literal()
    }

    fn new_clause(&mut self) {
        self.sat.new_clause();
    }

    fn add_literal(&mut self, lit: Literal) {
        self.sat.add_literal(lit);
    }

    fn commit_clause(&mut self) {
        self.sat.commit_clause();
    }

    fn literal_value(&self, lit: Literal) -> Value {
        assert!(lit.is_set(), "Querying invalid unset literal");
        if lit.is_constant() {
            return Value::from_constant(lit);
        }
        if self.best.is_empty() {
            return Value::Invalid;
        }
        Self::value_in(&self.best, lit)
    }

    fn reset(&mut self) {
        self.sat.reset();
        self.soft.clear();
        self.relaxation.clear();
        self.best.clear();
        self.last_cost = 0;
        self.last_result = SatResult::Unknown;
    }

    fn statistics(&self) -> &SolverStatistics {
        self.sat.statistics()
    }
}
