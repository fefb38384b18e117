//! Solver proxies: clause sinks between the logic encoder and the SAT/BMC engines
//!
//! A proxy receives clauses one literal at a time ([`SolverProxy::new_clause`],
//! [`SolverProxy::add_literal`], [`SolverProxy::commit_clause`]), keeps them in a clause
//! database and hands them to a backend when solving. Three families are available:
//! * [`SatSolverProxy`], for plain and incremental SAT problems;
//! * [`MaxSatSolverProxy`], which adds weighted soft clauses;
//! * [`BmcSolverProxy`], which partitions clauses into initial, transition and target
//!   constraints and unrolls them for bounded model checking.

mod backend;
mod bmc;
mod clause_db;
mod dimacs;
mod maxsat;
mod sat;
mod timeout;

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::Literal;

pub use bmc::{BmcProxy, BmcResult, BmcSettings, BmcSolverProxy, ClauseType, VariableType};
pub use clause_db::ClauseDatabase;
pub use dimacs::{write_cnf, write_wcnf};
pub use maxsat::MaxSatSolverProxy;
pub use sat::{SatResult, SatSolver, SatSolverProxy};

/// Value of a literal in the last solution
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Value {
    /// The literal is true
    Positive,
    /// The literal is false
    Negative,
    /// The literal may take any value
    DontCare,
    /// No solution is available
    Invalid,
}

impl Value {
    /// Value of the complement literal
    pub fn negate(self) -> Value {
        match self {
            Value::Positive => Value::Negative,
            Value::Negative => Value::Positive,
            v => v,
        }
    }

    /// Value of one of the two constant literals
    pub fn from_constant(lit: Literal) -> Value {
        assert!(lit.is_constant(), "Literal {lit} is not a constant");
        if lit.is_negated() {
            Value::Negative
        } else {
            Value::Positive
        }
    }

    /// Value of a literal given the value of its variable
    pub fn of_literal(self, lit: Literal) -> Value {
        if lit.is_negated() {
            self.negate()
        } else {
            self
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let c = match self {
            Value::Positive => "1",
            Value::Negative => "0",
            Value::DontCare => "X",
            Value::Invalid => "-",
        };
        write!(f, "{c}")
    }
}

/// Family of a solver proxy
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SolverKind {
    /// Plain or incremental SAT
    Sat,
    /// Weighted partial MaxSAT
    MaxSat,
    /// Bounded model checking
    Bmc,
}

/// Usage counters of a proxy, monotonic until the next reset
///
/// Conflicts and propagations are only filled by backends that report them.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SolverStatistics {
    /// Backend instances created
    pub instances: usize,
    /// Calls to the backend
    pub solves: usize,
    /// Variables allocated, including the constant
    pub variables: usize,
    /// Clauses committed
    pub clauses: usize,
    /// Conflicts reported by the backend
    pub conflicts: u64,
    /// Propagations reported by the backend
    pub propagations: u64,
    /// Satisfiable answers
    pub sat: usize,
    /// Unsatisfiable answers
    pub unsat: usize,
    /// Unknown answers (timeout, interruption or backend failure)
    pub unknown: usize,
    /// Time spent in the backend
    pub solve_time: Duration,
}

impl fmt::Display for SolverStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Solver statistics:")?;
        writeln!(f, "  Instances: {}", self.instances)?;
        writeln!(f, "  Solves: {}", self.solves)?;
        writeln!(f, "  Variables: {}", self.variables)?;
        writeln!(f, "  Clauses: {}", self.clauses)?;
        writeln!(
            f,
            "  Results: {} sat, {} unsat, {} unknown",
            self.sat, self.unsat, self.unknown
        )?;
        write!(f, "  Solve time: {:.3}s", self.solve_time.as_secs_f64())
    }
}

/// Settings shared by all proxies
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SolverSettings {
    /// Time limit for a single solve; None for no limit
    pub timeout: Option<Duration>,
    /// Trace every committed clause
    pub debug: bool,
    /// Do not log informational messages
    pub silent: bool,
}

impl SolverSettings {
    /// Settings with a timeout in seconds
    pub fn with_timeout(seconds: f64) -> SolverSettings {
        SolverSettings {
            timeout: Some(Duration::from_secs_f64(seconds)),
            ..Default::default()
        }
    }
}

/// Failure of a solver backend
///
/// These never abort the encoding: the proxy logs them and the next solve answers an unknown
/// result.
#[derive(Debug, Error)]
pub enum SolverError {
    /// The SAT backend reported an error
    #[error("{backend} backend failed: {message}")]
    Backend {
        /// Name of the backend
        backend: &'static str,
        /// Error reported by the backend
        message: String,
    },
    /// The instance could not be written
    #[error("could not write {}: {source}", path.display())]
    Io {
        /// File being written
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },
}

/// Common interface of all proxies: a sink for clauses and a source of solved values
///
/// Clauses are built incrementally: open with [`new_clause`](Self::new_clause), add literals
/// with [`add_literal`](Self::add_literal), close with [`commit_clause`](Self::commit_clause).
/// Protocol violations (opening a clause twice, adding a literal outside of a clause, adding an
/// undefined literal) panic.
pub trait SolverProxy {
    /// Family of the proxy
    fn kind(&self) -> SolverKind;

    /// Allocate a fresh variable and return its positive literal
    fn new_literal(&mut self) -> Literal;

    /// Open a new clause
    fn new_clause(&mut self);

    /// Add a literal to the open clause
    fn add_literal(&mut self, lit: Literal);

    /// Close the open clause and store it
    ///
    /// An empty clause is the always-false clause.
    fn commit_clause(&mut self);

    /// Value of a literal in the last solution
    ///
    /// Constants always have their value; other literals are [`Value::Invalid`] when no solution
    /// is available.
    fn literal_value(&self, lit: Literal) -> Value;

    /// Discard all clauses and variables, and allocate the constant variable
    fn reset(&mut self);

    /// Usage counters
    fn statistics(&self) -> &SolverStatistics;

    /// Commit a clause in one call
    fn commit(&mut self, lits: &[Literal]) {
        self.new_clause();
        for l in lits {
            self.add_literal(*l);
        }
        self.commit_clause();
    }

    /// Access the bounded model checking interface, if the proxy supports it
    fn as_bmc(&mut self) -> Option<&mut dyn BmcProxy> {
        None
    }
}

/// Log a committed clause when clause tracing is enabled
pub(crate) fn trace_clause<T: fmt::Debug>(settings: &SolverSettings, prefix: &str, clause: &[T]) {
    if settings.debug {
        tracing::trace!(target: "tpgenc::clauses", "{prefix} {clause:?}");
    }
}
