//! Encoding of multi-valued logic into clauses
//!
//! The [`LogicEncoder`] owns a solver proxy and translates operations on logic containers into
//! clauses: requirements constrain the value of a container, detectors observe it, gates compute
//! new containers, and sequential operations describe a state machine for bounded model checking.
//!
//! ```
//! use tpgenc::solver::{SatResult, SatSolver, SatSolverProxy};
//! use tpgenc::{Logic, LogicContainerU01X, LogicEncoder};
//!
//! let mut enc = LogicEncoder::new(SatSolverProxy::new(SatSolver::Minisat));
//! let a: LogicContainerU01X = enc.new_logic_container();
//! let b: LogicContainerU01X = enc.new_logic_container();
//! let out = enc.encode_and(&a, &b);
//! enc.encode_logic_value(&a, Logic::One);
//! enc.encode_logic_value(&b, Logic::DontCare);
//! assert_eq!(enc.solver_mut().solve(), SatResult::Sat);
//! assert_eq!(enc.solved_logic_value(&out), Logic::DontCare);
//! ```

mod detector;
mod gates;
mod requirement;
mod sequential;
mod table;

use std::rc::Rc;

use fxhash::FxHashMap;
use tracing::trace;

use crate::solver::{SolverProxy, Value};
use crate::{Literal, Logic, LogicContainer, LogicContainer01, LogicEncoding};

pub use table::GateKind;
pub(crate) use table::{ClauseTable, Slot, TableKind};

/// Translates logic operations into clauses of a solver proxy
pub struct LogicEncoder<S: SolverProxy> {
    solver: S,
    tables: FxHashMap<(TableKind, LogicEncoding), Rc<ClauseTable>>,
}

fn assert_set<C: LogicContainer>(c: &C) {
    assert!(c.is_set(), "Container {c} has unset literals");
}

/// Literals of a sequence of containers, bit by bit
fn flatten<C: LogicContainer>(containers: &[C]) -> Vec<Literal> {
    containers
        .iter()
        .flat_map(|c| {
            assert_set(c);
            c.literals()
        })
        .collect()
}

impl<S: SolverProxy> LogicEncoder<S> {
    /// Create an encoder emitting clauses to a proxy
    pub fn new(solver: S) -> LogicEncoder<S> {
        LogicEncoder {
            solver,
            tables: FxHashMap::default(),
        }
    }

    /// Access the proxy
    pub fn solver(&self) -> &S {
        &self.solver
    }

    /// Mutable access to the proxy, for solving and configuration
    pub fn solver_mut(&mut self) -> &mut S {
        &mut self.solver
    }

    /// Release the proxy
    pub fn into_solver(self) -> S {
        self.solver
    }

    /// Discard all clauses and variables of the proxy
    ///
    /// Containers created before the reset must not be used afterwards.
    pub fn reset(&mut self) {
        self.solver.reset();
    }

    /// Create a container with fresh literals
    ///
    /// For `01X` and `01F`, the unused pattern `11` is forbidden by a clause.
    pub fn new_logic_container<C: LogicContainer>(&mut self) -> C {
        let c = C::from_fn(|_| self.solver.new_literal());
        if matches!(C::ENCODING, LogicEncoding::L01X | LogicEncoding::L01F) {
            self.solver.commit(&[!c.literal(0), !c.literal(1)]);
        }
        c
    }

    /// Create a constant container, without allocating any literal
    pub fn new_constant_container<C: LogicContainer>(&self, value: Logic) -> C {
        C::constant(value)
            .unwrap_or_else(|| panic!("Value {value} is not supported by the {} encoding", C::ENCODING))
    }

    /// Create a container from existing literals, bit 0 first
    pub fn container_from_literals<C: LogicContainer>(&self, literals: &[Literal]) -> C {
        assert_eq!(
            literals.len(),
            C::width(),
            "The {} encoding uses {} literals",
            C::ENCODING,
            C::width()
        );
        let c = C::from_fn(|b| literals[b]);
        assert_set(&c);
        c
    }

    /// Convert a container to another encoding
    ///
    /// Values that the target encoding cannot represent become X (or stay X/U in encodings that
    /// support them). Only the conversion from `U01X`/`U01F` to `01X`/`01F` emits clauses.
    pub fn convert_logic_container<T: LogicContainer, F: LogicContainer>(&mut self, source: &F) -> T {
        use LogicEncoding::*;
        assert_set(source);
        let src = |b: usize| source.literal(b);
        match (F::ENCODING, T::ENCODING) {
            (L01, L01) => T::from_fn(src),
            (L01, _) => T::from_fn(|b| if b == 0 { !src(0) } else { src(0) }),
            (_, L01) => T::from_fn(|_| src(1)),
            (L01X | L01F, L01X | L01F) | (U01X | U01F, U01X | U01F) => T::from_fn(src),
            (L01X | L01F, U01X | U01F) => T::from_fn(|b| !src(1 - b)),
            (U01X | U01F, L01X | L01F) => {
                let l1 = self.encode_and(
                    &LogicContainer01::new(src(1)),
                    &LogicContainer01::new(!src(0)),
                );
                let l0 = self.encode_and(
                    &LogicContainer01::new(!src(1)),
                    &LogicContainer01::new(src(0)),
                );
                T::from_fn(|b| if b == 0 { l0.l0 } else { l1.l0 })
            }
        }
    }

    /// Returns true if all literals of the container are constants
    pub fn is_constant_logic_value<C: LogicContainer>(&self, c: &C) -> bool {
        assert_set(c);
        c.literals().iter().all(|l| l.is_constant())
    }

    /// Value of a constant container, or [`Logic::Invalid`] if it is not constant
    pub fn constant_logic_value<C: LogicContainer>(&self, c: &C) -> Logic {
        if !self.is_constant_logic_value(c) {
            return Logic::Invalid;
        }
        let pattern = c
            .literals()
            .iter()
            .enumerate()
            .map(|(b, l)| ((*l == Literal::one()) as u32) << b)
            .sum::<u32>();
        C::ENCODING.decode(pattern)
    }

    /// Value of a container in the last solution
    ///
    /// Constant containers always have a value; other containers panic if no solution is
    /// available. Bits left free by the solver are read as zero.
    pub fn solved_logic_value<C: LogicContainer>(&self, c: &C) -> Logic {
        let constant = self.constant_logic_value(c);
        if constant != Logic::Invalid {
            return constant;
        }
        let values: Vec<Value> = c
            .literals()
            .iter()
            .map(|l| self.solver.literal_value(*l))
            .collect();
        assert!(
            !values.contains(&Value::Invalid),
            "No solution available to read container {c}"
        );
        if C::ENCODING == LogicEncoding::L01 {
            return match values[0] {
                Value::DontCare => Logic::DontCare,
                Value::Negative => Logic::Zero,
                _ => Logic::One,
            };
        }
        let pattern = values
            .iter()
            .enumerate()
            .map(|(b, v)| ((*v == Value::Positive) as u32) << b)
            .sum::<u32>();
        match C::ENCODING.decode(pattern) {
            Logic::Invalid => panic!("Container {c} has the forbidden pattern {pattern:02b}"),
            v => v,
        }
    }

    /// Solved values of a sequence of containers
    pub fn solved_logic_values<C: LogicContainer>(&self, cs: &[C]) -> Vec<Logic> {
        cs.iter().map(|c| self.solved_logic_value(c)).collect()
    }

    /// Return a new container that implies the input: `out → in`
    pub fn encode_implication(&mut self, input: &LogicContainer01) -> LogicContainer01 {
        assert_set(input);
        let out: LogicContainer01 = self.new_logic_container();
        self.solver.commit(&[!out.l0, input.l0]);
        out
    }

    /// Return a new container that implies one of the inputs: `out → (in1 ∨ in2 ∨ ...)`
    pub fn encode_implication_any(&mut self, inputs: &[LogicContainer01]) -> LogicContainer01 {
        let out: LogicContainer01 = self.new_logic_container();
        self.encode_implication_to_any(&out, inputs);
        out
    }

    /// Encode `in1 → in2`
    pub fn encode_implication_between(&mut self, in1: &LogicContainer01, in2: &LogicContainer01) {
        assert_set(in1);
        assert_set(in2);
        self.solver.commit(&[!in1.l0, in2.l0]);
    }

    /// Encode `in1 → (in2 ∨ in3 ∨ ...)`
    pub fn encode_implication_to_any(&mut self, in1: &LogicContainer01, inputs: &[LogicContainer01]) {
        assert_set(in1);
        let mut clause = vec![!in1.l0];
        clause.extend(flatten(inputs));
        self.solver.commit(&clause);
    }

    /// Encode the clause `in1 ∨ in2 ∨ ...`
    pub fn encode_clause(&mut self, inputs: &[LogicContainer01]) {
        let clause = flatten(inputs);
        self.solver.commit(&clause);
    }

    /// Clause table of an operation, built on first use
    pub(crate) fn table(&mut self, kind: TableKind, encoding: LogicEncoding) -> Rc<ClauseTable> {
        self.tables
            .entry((kind, encoding))
            .or_insert_with(|| {
                let table = ClauseTable::new(kind, encoding);
                trace!(
                    kind = ?table.kind(),
                    %encoding,
                    clauses = table.clauses().len(),
                    "built clause table"
                );
                Rc::new(table)
            })
            .clone()
    }

    /// Emit the clauses of a table for the given input and output literals
    ///
    /// Constant literals are simplified away and satisfied clauses are skipped.
    pub(crate) fn emit_table(
        &mut self,
        kind: TableKind,
        encoding: LogicEncoding,
        inputs: &[Literal],
        outputs: &[Literal],
    ) {
        let table = self.table(kind, encoding);
        let mut lits: Vec<Literal> = Vec::new();
        'clauses: for clause in table.clauses() {
            lits.clear();
            for tl in clause {
                let l = match tl.slot {
                    Slot::Input(i) => inputs[i],
                    Slot::Output(k) => outputs[k],
                } ^ tl.negated;
                if l == Literal::one() || lits.contains(&!l) {
                    continue 'clauses;
                }
                if l != Literal::zero() && !lits.contains(&l) {
                    lits.push(l);
                }
            }
            self.solver.commit(&lits);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solver::{SatResult, SatSolver, SatSolverProxy};
    use crate::{
        LogicContainer01F, LogicContainer01X, LogicContainerU01F, LogicContainerU01X,
    };

    pub(crate) fn encoder() -> LogicEncoder<SatSolverProxy> {
        LogicEncoder::new(SatSolverProxy::new(SatSolver::Minisat))
    }

    /// All values a container takes in the solutions of the current problem, sorted
    pub(crate) fn solutions<C: LogicContainer>(
        enc: &mut LogicEncoder<SatSolverProxy>,
        c: &C,
    ) -> Vec<Logic> {
        let mut seen = Vec::new();
        while enc.solver_mut().solve() == SatResult::Sat {
            let v = enc.solved_logic_value(c);
            assert!(!seen.contains(&v), "Value {v} found twice for {c}");
            seen.push(v);
            if enc.is_constant_logic_value(c) {
                break;
            }
            let blocking: Vec<Literal> = c
                .literals()
                .iter()
                .map(|l| if enc.solver().literal_value(*l) == Value::Positive { !*l } else { *l })
                .collect();
            enc.solver_mut().commit(&blocking);
        }
        seen.sort();
        seen
    }

    /// Every value of the encoding is reachable by exactly one solution
    fn check_values<C: LogicContainer>() {
        let mut enc = encoder();
        let c: C = enc.new_logic_container();
        let seen = solutions(&mut enc, &c);
        let mut expected = C::ENCODING.values().to_vec();
        expected.sort();
        assert_eq!(seen, expected, "{}", C::ENCODING);
    }

    #[test]
    fn test_container_values() {
        check_values::<LogicContainer01>();
        check_values::<LogicContainer01X>();
        check_values::<LogicContainer01F>();
        check_values::<LogicContainerU01X>();
        check_values::<LogicContainerU01F>();
    }

    fn check_constants<C: LogicContainer>() {
        let mut enc = encoder();
        for v in C::ENCODING.values() {
            let c: C = enc.new_constant_container(*v);
            assert!(enc.is_constant_logic_value(&c));
            assert_eq!(enc.constant_logic_value(&c), *v);
            assert_eq!(enc.solved_logic_value(&c), *v);
        }
        let c: C = enc.new_logic_container();
        assert!(!enc.is_constant_logic_value(&c));
        assert_eq!(enc.constant_logic_value(&c), Logic::Invalid);
        assert_eq!(enc.solver().statistics().variables, 1 + C::width());
    }

    #[test]
    fn test_constants() {
        check_constants::<LogicContainer01>();
        check_constants::<LogicContainer01X>();
        check_constants::<LogicContainer01F>();
        check_constants::<LogicContainerU01X>();
        check_constants::<LogicContainerU01F>();
    }

    #[test]
    #[should_panic]
    fn test_unsupported_constant() {
        let enc = encoder();
        let _: LogicContainer01X = enc.new_constant_container(Logic::Unknown);
    }

    #[test]
    #[should_panic]
    fn test_value_before_solve() {
        let mut enc = encoder();
        let c: LogicContainer01 = enc.new_logic_container();
        enc.solved_logic_value(&c);
    }

    /// Convert each value of the source encoding and compare with the expected value
    fn check_conversion<T: LogicContainer, F: LogicContainer>(expected: &[(Logic, Logic)]) {
        for (from, to) in expected {
            let mut enc = encoder();
            let c: F = enc.new_logic_container();
            enc.encode_logic_value(&c, *from);
            let clauses = enc.solver().statistics().clauses;
            let out: T = enc.convert_logic_container(&c);
            if !(matches!(F::ENCODING, LogicEncoding::U01X | LogicEncoding::U01F)
                && matches!(T::ENCODING, LogicEncoding::L01X | LogicEncoding::L01F))
            {
                assert_eq!(enc.solver().statistics().clauses, clauses);
            }
            assert_eq!(enc.solver_mut().solve(), SatResult::Sat);
            assert_eq!(enc.solved_logic_value(&out), *to, "{from} to {}", T::ENCODING);
        }
    }

    #[test]
    fn test_conversions() {
        use Logic::*;
        let bool_values = [(Zero, Zero), (One, One)];
        check_conversion::<LogicContainer01X, LogicContainer01>(&bool_values);
        check_conversion::<LogicContainerU01F, LogicContainer01>(&bool_values);
        check_conversion::<LogicContainer01, LogicContainer01X>(&[(Zero, Zero), (One, One), (DontCare, Zero)]);
        check_conversion::<LogicContainer01, LogicContainerU01X>(&[(Unknown, Zero), (One, One)]);
        check_conversion::<LogicContainer01F, LogicContainer01X>(&[(Zero, Zero), (One, One), (DontCare, DontCare)]);
        check_conversion::<LogicContainerU01X, LogicContainer01X>(&[(Zero, Zero), (One, One), (DontCare, DontCare)]);
        check_conversion::<LogicContainer01X, LogicContainerU01X>(&[
            (Unknown, DontCare),
            (Zero, Zero),
            (One, One),
            (DontCare, DontCare),
        ]);
        check_conversion::<LogicContainerU01X, LogicContainerU01F>(&[
            (Unknown, Unknown),
            (Zero, Zero),
            (One, One),
            (DontCare, DontCare),
        ]);
    }

    #[test]
    fn test_container_from_literals() {
        let mut enc = encoder();
        let a = enc.solver_mut().new_literal();
        let b = enc.solver_mut().new_literal();
        let c: LogicContainerU01X = enc.container_from_literals(&[a, b]);
        assert_eq!(c.l0, a);
        assert_eq!(c.l1, b);
    }

    #[test]
    fn test_implications() {
        let mut enc = encoder();
        let a: LogicContainer01 = enc.new_logic_container();
        let b: LogicContainer01 = enc.new_logic_container();
        let c: LogicContainer01 = enc.new_logic_container();
        let i = enc.encode_implication(&a);
        let j = enc.encode_implication_any(&[a, b]);
        enc.encode_implication_between(&c, &b);
        enc.encode_clause(&[i, c]);
        enc.encode_logic_value(&a, Logic::Zero);
        assert_eq!(enc.solver_mut().solve(), SatResult::Sat);
        // i implies a, so c and then b hold
        assert_eq!(enc.solved_logic_value(&i), Logic::Zero);
        assert_eq!(enc.solved_logic_value(&c), Logic::One);
        assert_eq!(enc.solved_logic_value(&b), Logic::One);

        enc.encode_implication_to_any(&j, &[a]);
        enc.encode_logic_value(&j, Logic::One);
        assert_eq!(enc.solver_mut().solve(), SatResult::Unsat);
    }

    #[test]
    fn test_table_cache() {
        let mut enc = encoder();
        let t1 = enc.table(TableKind::Gate(GateKind::And), LogicEncoding::L01X);
        let t2 = enc.table(TableKind::Gate(GateKind::And), LogicEncoding::L01X);
        assert!(Rc::ptr_eq(&t1, &t2));
        let t3 = enc.table(TableKind::Gate(GateKind::And), LogicEncoding::L01F);
        assert!(!Rc::ptr_eq(&t1, &t3));
    }
}
