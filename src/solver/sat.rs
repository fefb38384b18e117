use std::fmt;
use std::io::{self, Write};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Instant;

use tracing::{debug, error};

use super::backend::{DimacsBackend, KissatBackend, MinisatBackend, Outcome, SatBackend};
use super::clause_db::PendingClause;
use super::{
    trace_clause, write_cnf, ClauseDatabase, SolverError, SolverKind, SolverProxy,
    SolverSettings, SolverStatistics, Value,
};
use crate::Literal;

/// SAT backend selection
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SatSolver {
    /// Minisat, incremental
    Minisat,
    /// Kissat, single-shot: each solve rebuilds the instance
    Kissat,
    /// Write the instance to a DIMACS file; solving answers [`SatResult::Unknown`]
    DimacsExport(PathBuf),
}

impl SatSolver {
    /// Returns true if the backend supports assumptions and incremental clauses
    pub fn is_incremental(&self) -> bool {
        matches!(self, SatSolver::Minisat)
    }

    /// Name of the backend
    pub fn name(&self) -> &'static str {
        match self {
            SatSolver::Minisat => "minisat",
            SatSolver::Kissat => "kissat",
            SatSolver::DimacsExport(_) => "dimacs",
        }
    }

    pub(crate) fn create(&self) -> Box<dyn SatBackend> {
        match self {
            SatSolver::Minisat => Box::<MinisatBackend>::default(),
            SatSolver::Kissat => Box::<KissatBackend>::default(),
            SatSolver::DimacsExport(path) => Box::new(DimacsBackend::new(path.clone())),
        }
    }
}

impl FromStr for SatSolver {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "minisat" => Ok(SatSolver::Minisat),
            "kissat" => Ok(SatSolver::Kissat),
            _ => Err(format!("Unknown SAT solver {s}, expected minisat or kissat")),
        }
    }
}

/// Result of a SAT solve
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SatResult {
    /// A solution was found
    Sat,
    /// There is no solution
    Unsat,
    /// No answer: timeout, interruption, export-only backend or backend failure
    Unknown,
}

impl fmt::Display for SatResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SatResult::Sat => "SAT",
            SatResult::Unsat => "UNSAT",
            SatResult::Unknown => "UNKNOWN",
        };
        write!(f, "{s}")
    }
}

/// Proxy for plain and incremental SAT solving
///
/// Committed clauses are stored in a clause database and handed to the backend when solving.
/// With an incremental backend, only clauses committed since the previous solve are added.
///
/// ```
/// use tpgenc::solver::{SatResult, SatSolver, SatSolverProxy, SolverProxy, Value};
///
/// let mut solver = SatSolverProxy::new(SatSolver::Minisat);
/// let a = solver.new_literal();
/// let b = solver.new_literal();
/// solver.commit(&[a, b]);
/// solver.commit(&[!a]);
/// assert_eq!(solver.solve(), SatResult::Sat);
/// assert_eq!(solver.literal_value(b), Value::Positive);
/// ```
pub struct SatSolverProxy {
    solver: SatSolver,
    settings: SolverSettings,
    backend: Box<dyn SatBackend>,
    clauses: ClauseDatabase<Literal>,
    synced: usize,
    pending: PendingClause<Literal>,
    automatic: Option<Literal>,
    assumptions: Vec<Literal>,
    nb_vars: u32,
    model: Vec<Value>,
    last_result: SatResult,
    last_error: Option<SolverError>,
    solves_since_reset: usize,
    stats: SolverStatistics,
}

impl SatSolverProxy {
    /// Create a proxy with default settings
    pub fn new(solver: SatSolver) -> SatSolverProxy {
        SatSolverProxy::with_settings(solver, SolverSettings::default())
    }

    /// Create a proxy
    pub fn with_settings(solver: SatSolver, settings: SolverSettings) -> SatSolverProxy {
        let backend = solver.create();
        let mut ret = SatSolverProxy {
            solver,
            settings,
            backend,
            clauses: ClauseDatabase::new(),
            synced: 0,
            pending: PendingClause::default(),
            automatic: None,
            assumptions: Vec::new(),
            nb_vars: 0,
            model: Vec::new(),
            last_result: SatResult::Unknown,
            last_error: None,
            solves_since_reset: 0,
            stats: SolverStatistics::default(),
        };
        ret.reset();
        ret
    }

    /// Backend used
    pub fn solver(&self) -> &SatSolver {
        &self.solver
    }

    /// Settings
    pub fn settings(&self) -> &SolverSettings {
        &self.settings
    }

    /// Mutable settings
    pub fn settings_mut(&mut self) -> &mut SolverSettings {
        &mut self.settings
    }

    /// Returns true if assumptions can be used
    pub fn is_incremental_supported(&self) -> bool {
        self.solver.is_incremental()
    }

    /// Add an assumption for the next solve
    ///
    /// Assumptions only hold for one solve: they are consumed by [`solve`](Self::solve).
    pub fn add_assumption(&mut self, lit: Literal) {
        assert!(
            self.is_incremental_supported(),
            "The {} backend does not support assumptions",
            self.solver.name()
        );
        self.check_literal(lit);
        self.assumptions.push(lit);
    }

    /// Drop the pending assumptions
    pub fn clear_assumptions(&mut self) {
        self.assumptions.clear();
    }

    /// Pending assumptions
    pub fn assumptions(&self) -> &[Literal] {
        &self.assumptions
    }

    /// Prepend a literal to every clause opened from now on
    ///
    /// This is used to make a group of clauses conditional: with an automatic literal `a`, each
    /// clause `C` is stored as `a ∨ C`, and assuming `¬a` activates them.
    pub fn set_automatic_literal(&mut self, lit: Literal) {
        self.check_literal(lit);
        self.automatic = Some(lit);
    }

    /// Stop prepending the automatic literal
    pub fn clear_automatic_literal(&mut self) {
        self.automatic = None;
    }

    /// Literal prepended to new clauses, if any
    pub fn automatic_literal(&self) -> Option<Literal> {
        self.automatic
    }

    /// Number of variables, including the constant
    pub fn nb_variables(&self) -> usize {
        self.nb_vars as usize
    }

    /// Committed clauses
    pub fn clauses(&self) -> &ClauseDatabase<Literal> {
        &self.clauses
    }

    /// Result of the last solve
    pub fn last_result(&self) -> SatResult {
        self.last_result
    }

    /// Backend failure of the last solve, if any
    pub fn last_error(&self) -> Option<&SolverError> {
        self.last_error.as_ref()
    }

    /// Solve the committed clauses under the pending assumptions
    pub fn solve(&mut self) -> SatResult {
        let assumptions = std::mem::take(&mut self.assumptions);
        self.solve_with(&assumptions)
    }

    /// Write the committed clauses in DIMACS format
    pub fn write_dimacs<W: Write>(&self, w: &mut W) -> io::Result<()> {
        let comments = vec![format!(
            "{} variables, {} clauses",
            self.nb_vars,
            self.clauses.len()
        )];
        write_cnf(w, self.nb_vars as usize, &self.clauses, &comments)
    }

    pub(crate) fn take_assumptions(&mut self) -> Vec<Literal> {
        std::mem::take(&mut self.assumptions)
    }

    pub(crate) fn model(&self) -> &[Value] {
        &self.model
    }

    pub(crate) fn solve_with(&mut self, assumptions: &[Literal]) -> SatResult {
        assert!(
            !self.pending.is_open(),
            "Solving while a clause is still open"
        );
        self.model.clear();
        self.last_error = None;
        self.stats.solves += 1;
        self.solves_since_reset += 1;
        let res = match self.run_backend(assumptions) {
            Ok(Outcome::Sat) => {
                self.model = self.backend.model(self.nb_vars as usize);
                SatResult::Sat
            }
            Ok(Outcome::Unsat) => SatResult::Unsat,
            Ok(Outcome::Unknown) => SatResult::Unknown,
            Err(e) => {
                error!(backend = self.solver.name(), "{e}");
                self.last_error = Some(e);
                SatResult::Unknown
            }
        };
        match res {
            SatResult::Sat => self.stats.sat += 1,
            SatResult::Unsat => self.stats.unsat += 1,
            SatResult::Unknown => self.stats.unknown += 1,
        }
        if !self.settings.silent {
            debug!(
                backend = self.solver.name(),
                variables = self.nb_vars,
                clauses = self.clauses.len(),
                assumptions = assumptions.len(),
                result = %res,
                "SAT solve"
            );
        }
        self.last_result = res;
        res
    }

    fn run_backend(&mut self, assumptions: &[Literal]) -> Result<Outcome, SolverError> {
        if !self.backend.is_incremental() {
            self.backend = self.solver.create();
            self.synced = 0;
            self.stats.instances += 1;
        } else if self.solves_since_reset == 1 {
            self.stats.instances += 1;
        }
        while self.synced < self.clauses.len() {
            self.backend.add_clause(&self.clauses[self.synced])?;
            self.synced += 1;
        }
        let start = Instant::now();
        let outcome = self.backend.solve(assumptions, self.settings.timeout);
        self.stats.solve_time += start.elapsed();
        outcome
    }

    fn check_literal(&self, lit: Literal) {
        assert!(lit.is_set(), "Adding invalid unset literal");
        assert!(
            lit.var() < self.nb_vars,
            "Literal {lit} was not allocated by this solver"
        );
    }
}

impl SolverProxy for SatSolverProxy {
    fn kind(&self) -> SolverKind {
        SolverKind::Sat
    }

    fn new_literal(&mut self) -> Literal {
        let l = Literal::from_var(self.nb_vars);
        self.nb_vars += 1;
        self.stats.variables += 1;
        l
    }

    fn new_clause(&mut self) {
        self.pending.begin();
        if let Some(a) = self.automatic {
            self.pending.push(a);
        }
    }

    fn add_literal(&mut self, lit: Literal) {
        self.check_literal(lit);
        self.pending.push(lit);
    }

    fn commit_clause(&mut self) {
        let clause = self.pending.take();
        trace_clause(&self.settings, "clause", &clause);
        self.clauses.push(&clause);
        self.stats.clauses += 1;
    }

    fn literal_value(&self, lit: Literal) -> Value {
        assert!(lit.is_set(), "Querying invalid unset literal");
        if lit.is_constant() {
            return Value::from_constant(lit);
        }
        if self.last_result != SatResult::Sat {
            return Value::Invalid;
        }
        self.model
            .get(lit.var() as usize)
            .map(|v| v.of_literal(lit))
            .unwrap_or(Value::Invalid)
    }

    fn reset(&mut self) {
        self.backend = self.solver.create();
        self.synced = 0;
        self.clauses.clear();
        self.pending.discard();
        self.automatic = None;
        self.assumptions.clear();
        self.nb_vars = 0;
        self.model.clear();
        self.last_result = SatResult::Unknown;
        self.last_error = None;
        self.solves_since_reset = 0;
        self.stats = SolverStatistics {
            instances: self.stats.instances,
            ..Default::default()
        };

        let constant = self.new_literal();
        debug_assert_eq!(constant, Literal::one());
        self.commit(&[constant]);
    }

    fn statistics(&self) -> &SolverStatistics {
        &self.stats
    }
}
