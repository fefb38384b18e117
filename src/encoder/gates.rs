//! Gate encoders
//!
//! Every gate comes in a value-returning form, which folds constant and duplicate inputs without
//! emitting anything, and an `_into` form that always emits the gate clauses for an existing
//! output container. The `_vec` forms apply a gate element-wise, and the `_all` forms build a
//! balanced tree of an associative gate.

use super::{assert_set, flatten, GateKind, LogicEncoder, TableKind};
use crate::solver::SolverProxy;
use crate::{Logic, LogicContainer, LogicEncoding};

/// Associative gate under an n-ary gate, and whether the tree output is inverted
fn base_gate(kind: GateKind) -> (GateKind, bool) {
    match kind {
        GateKind::Nand => (GateKind::And, true),
        GateKind::Nor => (GateKind::Or, true),
        GateKind::Xnor => (GateKind::Xor, true),
        k => (k, false),
    }
}

/// Value forcing the output of an associative gate regardless of the other inputs
fn controlling_value(base: GateKind) -> Option<Logic> {
    match base {
        GateKind::And => Some(Logic::Zero),
        GateKind::Or => Some(Logic::One),
        _ => None,
    }
}

fn check_vectors<T>(vectors: &[&[T]]) -> usize {
    let n = vectors.first().map_or(0, |v| v.len());
    assert!(
        vectors.iter().all(|v| v.len() == n),
        "The size of the input vectors has to match."
    );
    n
}

macro_rules! gate {
    ($kind:ident, $what:literal, [$($arg:ident),+], $name:ident, $into:ident, $vec:ident, $into_vec:ident) => {
        #[doc = concat!("Return the output of ", $what)]
        pub fn $name<C: LogicContainer>(&mut self, $($arg: &C),+) -> C {
            self.encode_gate(GateKind::$kind, &[$(*$arg),+])
        }

        #[doc = concat!("Encode ", $what, " driving an existing container")]
        pub fn $into<C: LogicContainer>(&mut self, $($arg: &C,)+ out: &C) {
            self.encode_gate_into(GateKind::$kind, &[$(*$arg),+], out)
        }

        #[doc = concat!("Element-wise ", $what)]
        pub fn $vec<C: LogicContainer>(&mut self, $($arg: &[C]),+) -> Vec<C> {
            self.encode_gate_vec(GateKind::$kind, &[$($arg),+])
        }

        #[doc = concat!("Element-wise ", $what, " driving existing containers")]
        pub fn $into_vec<C: LogicContainer>(&mut self, $($arg: &[C],)+ out: &[C]) {
            self.encode_gate_into_vec(GateKind::$kind, &[$($arg),+], out)
        }
    };
}

macro_rules! nary_gate {
    ($kind:ident, $what:literal, $all:ident, $all_into:ident) => {
        #[doc = concat!("Return the ", $what, " of any number of inputs")]
        pub fn $all<C: LogicContainer>(&mut self, inputs: &[C]) -> C {
            self.encode_gate_all(GateKind::$kind, inputs)
        }

        #[doc = concat!("Encode the ", $what, " of any number of inputs into an existing container")]
        pub fn $all_into<C: LogicContainer>(&mut self, inputs: &[C], out: &C) {
            self.encode_gate_all_into(GateKind::$kind, inputs, out)
        }
    };
}

impl<S: SolverProxy> LogicEncoder<S> {
    /// Return the output of a gate
    ///
    /// Constant inputs, repeated inputs and complementary `01` inputs are folded without any new
    /// variable or clause; otherwise a fresh container is created and driven by the gate.
    pub fn encode_gate<C: LogicContainer>(&mut self, kind: GateKind, inputs: &[C]) -> C {
        assert_eq!(
            inputs.len(),
            kind.arity(),
            "Gate {kind} expects {} inputs",
            kind.arity()
        );
        inputs.iter().for_each(assert_set);
        if let Some(out) = self.fold_gate(kind, inputs) {
            return out;
        }
        let out = self.new_logic_container();
        self.encode_gate_into(kind, inputs, &out);
        out
    }

    /// Encode a gate driving an existing container
    pub fn encode_gate_into<C: LogicContainer>(&mut self, kind: GateKind, inputs: &[C], out: &C) {
        assert_eq!(
            inputs.len(),
            kind.arity(),
            "Gate {kind} expects {} inputs",
            kind.arity()
        );
        assert_set(out);
        let lits = flatten(inputs);
        self.emit_table(TableKind::Gate(kind), C::ENCODING, &lits, &out.literals());
    }

    /// Apply a gate element-wise, with one vector per gate input
    pub fn encode_gate_vec<C: LogicContainer>(&mut self, kind: GateKind, inputs: &[&[C]]) -> Vec<C> {
        let n = check_vectors(inputs);
        (0..n)
            .map(|i| {
                let ins: Vec<C> = inputs.iter().map(|v| v[i]).collect();
                self.encode_gate(kind, &ins)
            })
            .collect()
    }

    /// Apply a gate element-wise, driving existing containers
    pub fn encode_gate_into_vec<C: LogicContainer>(&mut self, kind: GateKind, inputs: &[&[C]], out: &[C]) {
        let n = check_vectors(inputs);
        assert_eq!(n, out.len(), "The size of the input vectors has to match.");
        for (i, o) in out.iter().enumerate() {
            let ins: Vec<C> = inputs.iter().map(|v| v[i]).collect();
            self.encode_gate_into(kind, &ins, o);
        }
    }

    /// Return the output of an associative gate over any number of inputs
    ///
    /// The gate is built as a balanced tree; for the inverting gates only the root is inverted.
    pub fn encode_gate_all<C: LogicContainer>(&mut self, kind: GateKind, inputs: &[C]) -> C {
        assert!(kind.is_nary(), "Gate {kind} does not accept an arbitrary number of inputs");
        assert!(!inputs.is_empty(), "Gate {kind} needs at least one input");
        inputs.iter().for_each(assert_set);
        let (base, inverted) = base_gate(kind);
        let out = match controlling_value(base) {
            Some(v) if inputs.iter().any(|c| self.constant_logic_value(c) == v) => {
                self.new_constant_container(v)
            }
            _ => self.encode_tree(base, inputs),
        };
        if inverted {
            !out
        } else {
            out
        }
    }

    /// Encode an associative gate over any number of inputs into an existing container
    pub fn encode_gate_all_into<C: LogicContainer>(&mut self, kind: GateKind, inputs: &[C], out: &C) {
        assert!(kind.is_nary(), "Gate {kind} does not accept an arbitrary number of inputs");
        assert!(!inputs.is_empty(), "Gate {kind} needs at least one input");
        let (base, inverted) = base_gate(kind);
        let target = if inverted { !*out } else { *out };
        self.encode_tree_into(base, inputs, &target);
    }

    fn encode_tree<C: LogicContainer>(&mut self, base: GateKind, inputs: &[C]) -> C {
        match inputs.len() {
            1 => inputs[0],
            2 => self.encode_gate(base, inputs),
            3 => {
                let t = self.encode_gate(base, &inputs[..2]);
                self.encode_gate(base, &[t, inputs[2]])
            }
            n => {
                let left = self.encode_tree(base, &inputs[..n / 2]);
                let right = self.encode_tree(base, &inputs[n / 2..]);
                self.encode_gate(base, &[left, right])
            }
        }
    }

    fn encode_tree_into<C: LogicContainer>(&mut self, base: GateKind, inputs: &[C], out: &C) {
        match inputs.len() {
            1 => self.encode_gate_into(GateKind::Buffer, inputs, out),
            2 => self.encode_gate_into(base, inputs, out),
            3 => {
                let t = self.new_logic_container();
                self.encode_gate_into(base, &inputs[..2], &t);
                self.encode_gate_into(base, &[t, inputs[2]], out);
            }
            n => {
                let left = self.new_logic_container();
                let right = self.new_logic_container();
                self.encode_tree_into(base, &inputs[..n / 2], &left);
                self.encode_tree_into(base, &inputs[n / 2..], &right);
                self.encode_gate_into(base, &[left, right], out);
            }
        }
    }

    /// Output of a gate when it does not depend on any new variable
    fn fold_gate<C: LogicContainer>(&self, kind: GateKind, inputs: &[C]) -> Option<C> {
        use GateKind::*;
        let value = |c: &C| self.constant_logic_value(c);
        match kind {
            Buffer => Some(inputs[0]),
            Inverter => Some(!inputs[0]),
            And => self.fold_and_or(&inputs[0], &inputs[1], Logic::Zero),
            Or => self.fold_and_or(&inputs[0], &inputs[1], Logic::One),
            Xor => self.fold_xor(&inputs[0], &inputs[1]),
            Nand | Nor | Xnor => self.fold_gate(base_gate(kind).0, inputs).map(|c| !c),
            TristateBuffer | TristateInverter => match value(&inputs[1]) {
                Logic::Invalid => None,
                Logic::One if kind == TristateInverter => Some(!inputs[0]),
                Logic::One => Some(inputs[0]),
                en => C::constant(kind.evaluate(&[Logic::Zero, en], C::ENCODING)),
            },
            Multiplexer => match value(&inputs[2]) {
                Logic::Invalid => None,
                Logic::Zero => Some(inputs[0]),
                Logic::One => Some(inputs[1]),
                sel => C::constant(sel),
            },
            SetControl | ResetControl => match value(&inputs[1]) {
                Logic::Invalid => None,
                Logic::Zero => Some(inputs[0]),
                ctrl => C::constant(kind.evaluate(&[Logic::Zero, ctrl], C::ENCODING)),
            },
        }
    }

    fn fold_and_or<C: LogicContainer>(&self, a: &C, b: &C, controlling: Logic) -> Option<C> {
        if a == b {
            return Some(*a);
        }
        if C::ENCODING == LogicEncoding::L01 && *a == !*b {
            return C::constant(controlling);
        }
        let (va, vb) = (self.constant_logic_value(a), self.constant_logic_value(b));
        if va == controlling || vb == controlling {
            return C::constant(controlling);
        }
        if va == controlling.invert() {
            return Some(*b);
        }
        if vb == controlling.invert() {
            return Some(*a);
        }
        self.fold_unknown::<C>(va, vb)
    }

    fn fold_xor<C: LogicContainer>(&self, a: &C, b: &C) -> Option<C> {
        if C::ENCODING == LogicEncoding::L01 {
            if a == b {
                return C::constant(Logic::Zero);
            }
            if *a == !*b {
                return C::constant(Logic::One);
            }
        }
        let (va, vb) = (self.constant_logic_value(a), self.constant_logic_value(b));
        match (va, vb) {
            (Logic::Zero, _) => Some(*b),
            (Logic::One, _) => Some(!*b),
            (_, Logic::Zero) => Some(*a),
            (_, Logic::One) => Some(!*a),
            _ => self.fold_unknown::<C>(va, vb),
        }
    }

    /// U dominates X when both inputs are constant, or when one is and the other is not 0/1
    fn fold_unknown<C: LogicContainer>(&self, va: Logic, vb: Logic) -> Option<C> {
        for v in [Logic::Unknown, Logic::DontCare] {
            if (va == v && vb != Logic::Invalid) || (vb == v && va != Logic::Invalid) {
                return C::constant(v);
            }
        }
        None
    }

    gate!(Buffer, "a buffer", [input], encode_buffer, encode_buffer_into, encode_buffer_vec, encode_buffer_into_vec);
    gate!(Inverter, "an inverter", [input], encode_inverter, encode_inverter_into, encode_inverter_vec, encode_inverter_into_vec);
    gate!(And, "an and gate", [in1, in2], encode_and, encode_and_into, encode_and_vec, encode_and_into_vec);
    gate!(Or, "an or gate", [in1, in2], encode_or, encode_or_into, encode_or_vec, encode_or_into_vec);
    gate!(Xor, "a xor gate", [in1, in2], encode_xor, encode_xor_into, encode_xor_vec, encode_xor_into_vec);
    gate!(Xnor, "a xnor gate", [in1, in2], encode_xnor, encode_xnor_into, encode_xnor_vec, encode_xnor_into_vec);
    gate!(Nand, "a nand gate", [in1, in2], encode_nand, encode_nand_into, encode_nand_vec, encode_nand_into_vec);
    gate!(Nor, "a nor gate", [in1, in2], encode_nor, encode_nor_into, encode_nor_vec, encode_nor_into_vec);
    gate!(
        TristateBuffer,
        "a tristate buffer",
        [input, en],
        encode_tristate_buffer,
        encode_tristate_buffer_into,
        encode_tristate_buffer_vec,
        encode_tristate_buffer_into_vec
    );
    gate!(
        TristateInverter,
        "a tristate inverter",
        [input, en],
        encode_tristate_inverter,
        encode_tristate_inverter_into,
        encode_tristate_inverter_vec,
        encode_tristate_inverter_into_vec
    );
    gate!(Multiplexer, "a multiplexer", [in1, in2, sel], encode_mux, encode_mux_into, encode_mux_vec, encode_mux_into_vec);
    gate!(
        SetControl,
        "a set control",
        [input, set],
        encode_set_control,
        encode_set_control_into,
        encode_set_control_vec,
        encode_set_control_into_vec
    );
    gate!(
        ResetControl,
        "a reset control",
        [input, reset],
        encode_reset_control,
        encode_reset_control_into,
        encode_reset_control_vec,
        encode_reset_control_into_vec
    );

    nary_gate!(And, "and", encode_and_all, encode_and_all_into);
    nary_gate!(Or, "or", encode_or_all, encode_or_all_into);
    nary_gate!(Xor, "xor", encode_xor_all, encode_xor_all_into);
    nary_gate!(Xnor, "xnor", encode_xnor_all, encode_xnor_all_into);
    nary_gate!(Nand, "nand", encode_nand_all, encode_nand_all_into);
    nary_gate!(Nor, "nor", encode_nor_all, encode_nor_all_into);
}

#[cfg(test)]
mod tests {
    use itertools::Itertools;

    use super::*;
    use crate::encoder::tests::{encoder, solutions};
    use crate::solver::SatResult;
    use crate::{
        LogicContainer01, LogicContainer01F, LogicContainer01X, LogicContainerU01F,
        LogicContainerU01X,
    };

    fn allowed<C: LogicContainer>(kind: GateKind, values: &[Logic]) -> Vec<Logic> {
        let mut res: Vec<Logic> = TableKind::Gate(kind)
            .allowed_outputs(values, C::ENCODING)
            .into_iter()
            .map(|p| C::ENCODING.decode(p))
            .collect();
        res.sort();
        res
    }

    fn value_tuples(encoding: LogicEncoding, n: usize) -> Vec<Vec<Logic>> {
        (0..n)
            .map(|_| encoding.values().iter().copied())
            .multi_cartesian_product()
            .collect()
    }

    /// The in-place form admits exactly the allowed outputs, and the value-returning form a
    /// subset containing the exact value, whichever inputs are constant
    fn check_gate<C: LogicContainer>(kind: GateKind) {
        for values in value_tuples(C::ENCODING, kind.arity()) {
            let expected = allowed::<C>(kind, &values);
            let exact = kind.evaluate(&values, C::ENCODING);

            let mut enc = encoder();
            let inputs: Vec<C> = values
                .iter()
                .map(|v| {
                    let c = enc.new_logic_container();
                    enc.encode_logic_value(&c, *v);
                    c
                })
                .collect();
            let out: C = enc.new_logic_container();
            enc.encode_gate_into(kind, &inputs, &out);
            assert_eq!(solutions(&mut enc, &out), expected, "{kind} {}: {values:?}", C::ENCODING);

            for mask in 0..(1 << values.len()) {
                let mut enc = encoder();
                let inputs: Vec<C> = values
                    .iter()
                    .enumerate()
                    .map(|(i, v)| {
                        if mask & (1 << i) != 0 {
                            enc.new_constant_container(*v)
                        } else {
                            let c = enc.new_logic_container();
                            enc.encode_logic_value(&c, *v);
                            c
                        }
                    })
                    .collect();
                let out = enc.encode_gate(kind, &inputs);
                let sols = solutions(&mut enc, &out);
                assert!(sols.contains(&exact), "{kind} {}: {values:?}", C::ENCODING);
                assert!(sols.iter().all(|s| expected.contains(s)), "{kind} {}: {values:?}", C::ENCODING);
            }
        }
    }

    #[test]
    fn test_gates_01() {
        for kind in GateKind::ALL {
            check_gate::<LogicContainer01>(kind);
        }
    }

    #[test]
    fn test_gates_01x() {
        for kind in GateKind::ALL {
            check_gate::<LogicContainer01X>(kind);
        }
    }

    #[test]
    fn test_gates_01f() {
        for kind in GateKind::ALL {
            check_gate::<LogicContainer01F>(kind);
        }
    }

    #[test]
    fn test_gates_u01x() {
        for kind in GateKind::ALL {
            check_gate::<LogicContainerU01X>(kind);
        }
    }

    #[test]
    fn test_gates_u01f() {
        for kind in GateKind::ALL {
            check_gate::<LogicContainerU01F>(kind);
        }
    }

    #[test]
    fn test_forgetful_and() {
        let mut enc = encoder();
        let a: LogicContainer01F = enc.new_logic_container();
        let b: LogicContainer01F = enc.new_logic_container();
        let out = enc.encode_and(&a, &b);
        enc.encode_logic_value(&a, Logic::One);
        enc.encode_logic_value(&b, Logic::One);
        assert_eq!(solutions(&mut enc, &out), vec![Logic::One, Logic::DontCare]);
    }

    #[test]
    fn test_static_simplification() {
        let mut enc = encoder();
        let a: LogicContainerU01X = enc.new_logic_container();
        let b: LogicContainerU01X = enc.new_logic_container();
        let p: LogicContainer01 = enc.new_logic_container();
        let variables = enc.solver().statistics().variables;
        let clauses = enc.solver().statistics().clauses;

        let zero: LogicContainerU01X = enc.new_constant_container(Logic::Zero);
        let one: LogicContainerU01X = enc.new_constant_container(Logic::One);
        let x: LogicContainerU01X = enc.new_constant_container(Logic::DontCare);
        let u: LogicContainerU01X = enc.new_constant_container(Logic::Unknown);
        assert_eq!(enc.encode_and(&a, &a), a);
        assert_eq!(enc.encode_or(&a, &one), one);
        assert_eq!(enc.encode_and(&one, &a), a);
        assert_eq!(enc.encode_nand(&zero, &a), one);
        assert_eq!(enc.encode_xor(&a, &zero), a);
        assert_eq!(enc.encode_xor(&one, &a), !a);
        assert_eq!(enc.encode_xnor(&a, &zero), !a);
        assert_eq!(enc.encode_and(&u, &x), u);
        assert_eq!(enc.encode_or(&x, &one), one);
        assert_eq!(enc.encode_mux(&a, &b, &zero), a);
        assert_eq!(enc.encode_mux(&a, &b, &one), b);
        assert_eq!(enc.encode_mux(&a, &b, &x), x);
        assert_eq!(enc.encode_set_control(&a, &one), one);
        assert_eq!(enc.encode_set_control(&a, &zero), a);
        assert_eq!(enc.encode_reset_control(&a, &one), zero);
        assert_eq!(enc.encode_reset_control(&a, &u), u);
        assert_eq!(enc.encode_tristate_buffer(&a, &one), a);
        assert_eq!(enc.encode_tristate_inverter(&a, &one), !a);
        assert_eq!(enc.encode_tristate_buffer(&a, &zero), u);
        assert_eq!(enc.encode_buffer(&a), a);
        assert_eq!(enc.encode_inverter(&a), !a);

        let zero01: LogicContainer01 = enc.new_constant_container(Logic::Zero);
        let one01: LogicContainer01 = enc.new_constant_container(Logic::One);
        assert_eq!(enc.encode_and(&p, &!p), zero01);
        assert_eq!(enc.encode_or(&p, &!p), one01);
        assert_eq!(enc.encode_xor(&p, &p), zero01);
        assert_eq!(enc.encode_xnor(&p, &!p), zero01);
        assert_eq!(enc.encode_tristate_buffer(&p, &zero01), zero01);

        assert_eq!(enc.solver().statistics().variables, variables);
        assert_eq!(enc.solver().statistics().clauses, clauses);

        enc.encode_and(&a, &b);
        assert_eq!(enc.solver().statistics().variables, variables + 2);
    }

    fn check_nary<C: LogicContainer>(kind: GateKind, n: usize) {
        let (base, inverted) = base_gate(kind);
        for values in value_tuples(C::ENCODING, n) {
            let mut exact = values[1..]
                .iter()
                .fold(values[0], |acc, v| base.evaluate(&[acc, *v], C::ENCODING));
            if inverted {
                exact = exact.invert();
            }

            for in_place in [false, true] {
                let mut enc = encoder();
                let inputs: Vec<C> = values
                    .iter()
                    .map(|v| {
                        let c = enc.new_logic_container();
                        enc.encode_logic_value(&c, *v);
                        c
                    })
                    .collect();
                let out = if in_place {
                    let out = enc.new_logic_container();
                    enc.encode_gate_all_into(kind, &inputs, &out);
                    out
                } else {
                    enc.encode_gate_all(kind, &inputs)
                };
                assert_eq!(solutions(&mut enc, &out), vec![exact], "{kind} {values:?}");
            }
        }
    }

    #[test]
    fn test_nary() {
        for kind in GateKind::ALL.into_iter().filter(|k| k.is_nary()) {
            for n in 1..=4 {
                check_nary::<LogicContainer01X>(kind, n);
            }
            check_nary::<LogicContainerU01X>(kind, 3);
            check_nary::<LogicContainer01>(kind, 5);
        }
    }

    #[test]
    fn test_nary_controlling() {
        let mut enc = encoder();
        let inputs: Vec<LogicContainer01X> = (0..6).map(|_| enc.new_logic_container()).collect();
        let clauses = enc.solver().statistics().clauses;
        let mut with_zero = inputs.clone();
        with_zero.push(enc.new_constant_container(Logic::Zero));
        let out = enc.encode_and_all(&with_zero);
        assert_eq!(enc.constant_logic_value(&out), Logic::Zero);
        let out = enc.encode_nand_all(&with_zero);
        assert_eq!(enc.constant_logic_value(&out), Logic::One);
        assert_eq!(enc.solver().statistics().clauses, clauses);
        let out = enc.encode_or_all(&with_zero);
        assert_eq!(enc.constant_logic_value(&out), Logic::Invalid);
    }

    #[test]
    fn test_vectors() {
        let mut enc = encoder();
        let a: Vec<LogicContainer01X> = (0..3).map(|_| enc.new_logic_container()).collect();
        let b: Vec<LogicContainer01X> = (0..3).map(|_| enc.new_logic_container()).collect();
        let out = enc.encode_xor_vec(&a, &b);
        let out_into: Vec<LogicContainer01X> = (0..3).map(|_| enc.new_logic_container()).collect();
        enc.encode_or_into_vec(&a, &b, &out_into);
        enc.encode_logic_value_vec(&a, &[Logic::Zero, Logic::One, Logic::DontCare]);
        enc.encode_logic_value_vec(&b, &[Logic::One, Logic::One, Logic::Zero]);
        assert_eq!(enc.solver_mut().solve(), SatResult::Sat);
        assert_eq!(
            enc.solved_logic_values(&out),
            vec![Logic::One, Logic::Zero, Logic::DontCare]
        );
        assert_eq!(
            enc.solved_logic_values(&out_into),
            vec![Logic::One, Logic::One, Logic::DontCare]
        );
    }

    #[test]
    #[should_panic(expected = "The size of the input vectors has to match.")]
    fn test_vector_size() {
        let mut enc = encoder();
        let a: Vec<LogicContainer01> = (0..3).map(|_| enc.new_logic_container()).collect();
        let b: Vec<LogicContainer01> = (0..2).map(|_| enc.new_logic_container()).collect();
        enc.encode_and_vec(&a, &b);
    }

    #[test]
    #[should_panic]
    fn test_wrong_arity() {
        let mut enc = encoder();
        let a: LogicContainer01 = enc.new_logic_container();
        enc.encode_gate(GateKind::Multiplexer, &[a, a]);
    }
}
