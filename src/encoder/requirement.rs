//! Requirements: hard constraints on the value of containers

use super::{assert_set, LogicEncoder, TableKind};
use crate::solver::SolverProxy;
use crate::{Logic, LogicConstraint, LogicContainer};

impl<S: SolverProxy> LogicEncoder<S> {
    /// Force a container to a value
    ///
    /// Panics if the value is not supported by the encoding.
    pub fn encode_logic_value<C: LogicContainer>(&mut self, target: &C, value: Logic) {
        assert_set(target);
        let Some(pattern) = C::ENCODING.pattern(value) else {
            panic!("Value {value} is not supported by the {} encoding", C::ENCODING);
        };
        for b in 0..C::width() {
            let l = target.literal(b);
            self.solver.commit(&[if pattern >> b & 1 != 0 { l } else { !l }]);
        }
    }

    /// Force a container to a value set
    pub fn encode_logic_value_constraint<C: LogicContainer>(&mut self, target: &C, constraint: LogicConstraint) {
        assert_set(target);
        self.emit_table(
            TableKind::ValueConstraint(constraint),
            C::ENCODING,
            &target.literals(),
            &[],
        );
    }

    /// Force two containers to the same value
    pub fn encode_logic_equivalence_constraint<C: LogicContainer>(&mut self, in1: &C, in2: &C) {
        assert_set(in1);
        assert_set(in2);
        if in1 == in2 {
            return;
        }
        for b in 0..C::width() {
            let (l1, l2) = (in1.literal(b), in2.literal(b));
            self.solver.commit(&[!l1, l2]);
            self.solver.commit(&[l1, !l2]);
        }
    }

    /// Force two containers to opposite boolean values
    ///
    /// Neither container may take X or U.
    pub fn encode_logic_01_difference_constraint<C: LogicContainer>(&mut self, in1: &C, in2: &C) {
        assert_set(in1);
        assert_set(in2);
        let inputs = [in1.literals(), in2.literals()].concat();
        self.emit_table(TableKind::DifferenceConstraint, C::ENCODING, &inputs, &[]);
    }

    /// Force each container to the corresponding value
    pub fn encode_logic_value_vec<C: LogicContainer>(&mut self, targets: &[C], values: &[Logic]) {
        assert_eq!(targets.len(), values.len(), "The size of the input vectors has to match.");
        for (t, v) in targets.iter().zip(values) {
            self.encode_logic_value(t, *v);
        }
    }

    /// Force each container to the corresponding value set
    pub fn encode_logic_value_constraint_vec<C: LogicContainer>(
        &mut self,
        targets: &[C],
        constraints: &[LogicConstraint],
    ) {
        assert_eq!(targets.len(), constraints.len(), "The size of the input vectors has to match.");
        for (t, c) in targets.iter().zip(constraints) {
            self.encode_logic_value_constraint(t, *c);
        }
    }

    /// Force two vectors of containers to the same values
    pub fn encode_logic_equivalence_constraint_vec<C: LogicContainer>(&mut self, in1: &[C], in2: &[C]) {
        assert_eq!(in1.len(), in2.len(), "The size of the input vectors has to match.");
        for (a, b) in in1.iter().zip(in2) {
            self.encode_logic_equivalence_constraint(a, b);
        }
    }

    /// Force two vectors of containers to opposite boolean values, element by element
    pub fn encode_logic_01_difference_constraint_vec<C: LogicContainer>(&mut self, in1: &[C], in2: &[C]) {
        assert_eq!(in1.len(), in2.len(), "The size of the input vectors has to match.");
        for (a, b) in in1.iter().zip(in2) {
            self.encode_logic_01_difference_constraint(a, b);
        }
    }
}
