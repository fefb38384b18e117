//! Detectors: boolean indicators of a property of containers
//!
//! A detector output is ONE exactly when the property holds. Unlike requirements, a detector does
//! not constrain its targets.

use super::{assert_set, LogicEncoder, TableKind};
use crate::solver::SolverProxy;
use crate::{Logic, LogicConstraint, LogicContainer, LogicContainer01, LogicEncoding};

impl<S: SolverProxy> LogicEncoder<S> {
    fn constant_01(&self, b: bool) -> LogicContainer01 {
        self.new_constant_container(Logic::from_bool(b))
    }

    /// Return a container that is ONE when the target has the given value
    pub fn encode_logic_value_detector<C: LogicContainer>(&mut self, target: &C, value: Logic) -> LogicContainer01 {
        assert_set(target);
        let constant = self.constant_logic_value(target);
        if constant != Logic::Invalid {
            return self.constant_01(constant == value);
        }
        if !C::ENCODING.supports(value) {
            return self.constant_01(false);
        }
        if C::ENCODING == LogicEncoding::L01 {
            let l = LogicContainer01::new(target.literal(0));
            return if value == Logic::One { l } else { !l };
        }
        let out = self.new_logic_container();
        self.encode_logic_value_detector_into(target, value, &out);
        out
    }

    /// Drive an existing container with a value detector
    pub fn encode_logic_value_detector_into<C: LogicContainer>(
        &mut self,
        target: &C,
        value: Logic,
        out: &LogicContainer01,
    ) {
        assert_set(target);
        assert_set(out);
        self.emit_table(
            TableKind::ValueDetector(value),
            C::ENCODING,
            &target.literals(),
            &[out.l0],
        );
    }

    /// Return a container that is ONE when the target satisfies the constraint
    pub fn encode_logic_value_constraint_detector<C: LogicContainer>(
        &mut self,
        target: &C,
        constraint: LogicConstraint,
    ) -> LogicContainer01 {
        assert_set(target);
        let constant = self.constant_logic_value(target);
        if constant != Logic::Invalid {
            return self.constant_01(constraint.accepts(constant));
        }
        let values = C::ENCODING.values();
        let accepted: Vec<Logic> = values
            .iter()
            .copied()
            .filter(|v| constraint.accepts(*v))
            .collect();
        if accepted.is_empty() || accepted.len() == values.len() {
            return self.constant_01(!accepted.is_empty());
        }
        if C::ENCODING == LogicEncoding::L01 {
            let l = LogicContainer01::new(target.literal(0));
            return if accepted[0] == Logic::One { l } else { !l };
        }
        let out = self.new_logic_container();
        self.encode_logic_value_constraint_detector_into(target, constraint, &out);
        out
    }

    /// Drive an existing container with a constraint detector
    pub fn encode_logic_value_constraint_detector_into<C: LogicContainer>(
        &mut self,
        target: &C,
        constraint: LogicConstraint,
        out: &LogicContainer01,
    ) {
        assert_set(target);
        assert_set(out);
        self.emit_table(
            TableKind::ConstraintDetector(constraint),
            C::ENCODING,
            &target.literals(),
            &[out.l0],
        );
    }

    /// Return a container that is ONE when both inputs have the same value
    pub fn encode_logic_equivalence_detector<C: LogicContainer>(&mut self, in1: &C, in2: &C) -> LogicContainer01 {
        assert_set(in1);
        assert_set(in2);
        if in1 == in2 {
            return self.constant_01(true);
        }
        let (v1, v2) = (self.constant_logic_value(in1), self.constant_logic_value(in2));
        if v1 != Logic::Invalid && v2 != Logic::Invalid {
            return self.constant_01(v1 == v2);
        }
        if C::ENCODING == LogicEncoding::L01 && *in1 == !*in2 {
            return self.constant_01(false);
        }
        let out = self.new_logic_container();
        self.encode_logic_equivalence_detector_into(in1, in2, &out);
        out
    }

    /// Drive an existing container with an equivalence detector
    pub fn encode_logic_equivalence_detector_into<C: LogicContainer>(
        &mut self,
        in1: &C,
        in2: &C,
        out: &LogicContainer01,
    ) {
        assert_set(in1);
        assert_set(in2);
        assert_set(out);
        let inputs = [in1.literals(), in2.literals()].concat();
        self.emit_table(TableKind::EquivalenceDetector, C::ENCODING, &inputs, &[out.l0]);
    }

    /// Return a container that is ONE when the inputs are opposite boolean values
    pub fn encode_logic_01_difference_detector<C: LogicContainer>(&mut self, in1: &C, in2: &C) -> LogicContainer01 {
        assert_set(in1);
        assert_set(in2);
        if in1 == in2 {
            return self.constant_01(false);
        }
        let (v1, v2) = (self.constant_logic_value(in1), self.constant_logic_value(in2));
        if v1 != Logic::Invalid && v2 != Logic::Invalid {
            return self.constant_01(v1.is_valid_01() && v2.is_valid_01() && v1 != v2);
        }
        if C::ENCODING == LogicEncoding::L01 && *in1 == !*in2 {
            return self.constant_01(true);
        }
        let out = self.new_logic_container();
        self.encode_logic_01_difference_detector_into(in1, in2, &out);
        out
    }

    /// Drive an existing container with a 01-difference detector
    pub fn encode_logic_01_difference_detector_into<C: LogicContainer>(
        &mut self,
        in1: &C,
        in2: &C,
        out: &LogicContainer01,
    ) {
        assert_set(in1);
        assert_set(in2);
        assert_set(out);
        let inputs = [in1.literals(), in2.literals()].concat();
        self.emit_table(TableKind::DifferenceDetector, C::ENCODING, &inputs, &[out.l0]);
    }

    /// Value detectors, element by element
    pub fn encode_logic_value_detector_vec<C: LogicContainer>(
        &mut self,
        targets: &[C],
        values: &[Logic],
    ) -> Vec<LogicContainer01> {
        assert_eq!(targets.len(), values.len(), "The size of the input vectors has to match.");
        targets
            .iter()
            .zip(values)
            .map(|(t, v)| self.encode_logic_value_detector(t, *v))
            .collect()
    }

    /// Value detectors driving existing containers, element by element
    pub fn encode_logic_value_detector_into_vec<C: LogicContainer>(
        &mut self,
        targets: &[C],
        values: &[Logic],
        outs: &[LogicContainer01],
    ) {
        assert_eq!(targets.len(), values.len(), "The size of the input vectors has to match.");
        assert_eq!(targets.len(), outs.len(), "The size of the input vectors has to match.");
        for ((t, v), o) in targets.iter().zip(values).zip(outs) {
            self.encode_logic_value_detector_into(t, *v, o);
        }
    }

    /// Constraint detectors, element by element
    pub fn encode_logic_value_constraint_detector_vec<C: LogicContainer>(
        &mut self,
        targets: &[C],
        constraints: &[LogicConstraint],
    ) -> Vec<LogicContainer01> {
        assert_eq!(targets.len(), constraints.len(), "The size of the input vectors has to match.");
        targets
            .iter()
            .zip(constraints)
            .map(|(t, c)| self.encode_logic_value_constraint_detector(t, *c))
            .collect()
    }

    /// Constraint detectors driving existing containers, element by element
    pub fn encode_logic_value_constraint_detector_into_vec<C: LogicContainer>(
        &mut self,
        targets: &[C],
        constraints: &[LogicConstraint],
        outs: &[LogicContainer01],
    ) {
        assert_eq!(targets.len(), constraints.len(), "The size of the input vectors has to match.");
        assert_eq!(targets.len(), outs.len(), "The size of the input vectors has to match.");
        for ((t, c), o) in targets.iter().zip(constraints).zip(outs) {
            self.encode_logic_value_constraint_detector_into(t, *c, o);
        }
    }

    /// Equivalence detectors, element by element
    pub fn encode_logic_equivalence_detector_vec<C: LogicContainer>(
        &mut self,
        in1: &[C],
        in2: &[C],
    ) -> Vec<LogicContainer01> {
        assert_eq!(in1.len(), in2.len(), "The size of the input vectors has to match.");
        in1.iter()
            .zip(in2)
            .map(|(a, b)| self.encode_logic_equivalence_detector(a, b))
            .collect()
    }

    /// Equivalence detectors driving existing containers, element by element
    pub fn encode_logic_equivalence_detector_into_vec<C: LogicContainer>(
        &mut self,
        in1: &[C],
        in2: &[C],
        outs: &[LogicContainer01],
    ) {
        assert_eq!(in1.len(), in2.len(), "The size of the input vectors has to match.");
        assert_eq!(in1.len(), outs.len(), "The size of the input vectors has to match.");
        for ((a, b), o) in in1.iter().zip(in2).zip(outs) {
            self.encode_logic_equivalence_detector_into(a, b, o);
        }
    }

    /// 01-difference detectors, element by element
    pub fn encode_logic_01_difference_detector_vec<C: LogicContainer>(
        &mut self,
        in1: &[C],
        in2: &[C],
    ) -> Vec<LogicContainer01> {
        assert_eq!(in1.len(), in2.len(), "The size of the input vectors has to match.");
        in1.iter()
            .zip(in2)
            .map(|(a, b)| self.encode_logic_01_difference_detector(a, b))
            .collect()
    }

    /// 01-difference detectors driving existing containers, element by element
    pub fn encode_logic_01_difference_detector_into_vec<C: LogicContainer>(
        &mut self,
        in1: &[C],
        in2: &[C],
        outs: &[LogicContainer01],
    ) {
        assert_eq!(in1.len(), in2.len(), "The size of the input vectors has to match.");
        assert_eq!(in1.len(), outs.len(), "The size of the input vectors has to match.");
        for ((a, b), o) in in1.iter().zip(in2).zip(outs) {
            self.encode_logic_01_difference_detector_into(a, b, o);
        }
    }
}
