//! Multi-valued logic encoding for SAT-based test pattern generation
//!
//! This crate translates circuits over a multi-valued logic (0, 1, X, U) into clauses for SAT,
//! MaxSAT and bounded model checking engines. It is the core of a test pattern generator: the
//! circuit is built gate by gate on top of an encoder, faults are injected as requirements, and the
//! solver answers with the values of every signal.
//!
//! # Usage
//!
//! ```bash
//! # Show available commands
//! tpgenc help
//! # Print the truth table of a gate as solved by the encoder
//! tpgenc table mux --encoding U01X
//! # Check every gate and detector against its multi-valued semantics
//! tpgenc selfcheck
//! # Bounded model checking of a 4-bit counter
//! tpgenc counter 4
//! ```
//!
//! # Datastructures
//!
//! A signal is held in a [`LogicContainer`], made of one or two solver literals. The encoding is
//! part of the container type:
//! * [`LogicContainer01`]: boolean signals, a single literal;
//! * [`LogicContainer01X`]: 0, 1 and X;
//! * [`LogicContainerU01X`]: 0, 1, X and U;
//! * [`LogicContainer01F`] and [`LogicContainerU01F`]: the same values, but gates may forget a
//!   boolean value and answer X instead, which gives the solver more freedom.
//!
//! Inverters are free: negating a container swaps its literals.
//!
//! The [`LogicEncoder`] emits clauses to a [`solver::SolverProxy`]. For example, an and gate with
//! one input at X:
//! ```
//! use tpgenc::solver::{SatResult, SatSolver, SatSolverProxy};
//! use tpgenc::{Logic, LogicContainer01X, LogicEncoder};
//!
//! let mut enc = LogicEncoder::new(SatSolverProxy::new(SatSolver::Minisat));
//! let a: LogicContainer01X = enc.new_logic_container();
//! let b: LogicContainer01X = enc.new_logic_container();
//! let out = enc.encode_or(&a, &b);
//! enc.encode_logic_value(&a, Logic::DontCare);
//! enc.encode_logic_value(&out, Logic::One);
//! assert_eq!(enc.solver_mut().solve(), SatResult::Sat);
//! assert_eq!(enc.solved_logic_value(&b), Logic::One);
//! ```

#![warn(missing_docs)]

mod container;
pub mod encoder;
mod literal;
pub mod logic;
pub mod solver;

pub use container::{
    LogicContainer, LogicContainer01, LogicContainer01F, LogicContainer01X, LogicContainerU01F,
    LogicContainerU01X, LogicEncoding,
};
pub use encoder::{GateKind, LogicEncoder};
pub use literal::Literal;
pub use logic::{Logic, LogicConstraint};
