//! Sequential encoding: state elements for bounded model checking
//!
//! With a [`BmcProxy`], state containers are latches whose next value is tied to a container of
//! the current timeframe, and the initial and target values go to their own partitions. With a
//! plain SAT proxy the same calls build a single combinational timeframe.

use super::{assert_set, LogicEncoder};
use crate::solver::{BmcProxy, ClauseType, SolverProxy, VariableType};
use crate::{Logic, LogicContainer, LogicEncoding};

impl<S: SolverProxy> LogicEncoder<S> {
    /// Create a container for a primary input
    pub fn new_input_container<C: LogicContainer>(&mut self) -> C {
        self.new_sequential_container(VariableType::Input)
    }

    /// Create a container for a state element
    pub fn new_state_container<C: LogicContainer>(&mut self) -> C {
        self.new_sequential_container(VariableType::Latch)
    }

    fn new_sequential_container<C: LogicContainer>(&mut self, variable_type: VariableType) -> C {
        match self.solver.as_bmc() {
            None => self.new_logic_container(),
            Some(bmc) => {
                bmc.set_target_variable_type(variable_type);
                let c = C::from_fn(|_| bmc.new_literal());
                // The unused pattern is excluded in every timeframe
                if matches!(C::ENCODING, LogicEncoding::L01X | LogicEncoding::L01F) {
                    for clause_type in [ClauseType::Initial, ClauseType::Transition, ClauseType::Target] {
                        bmc.set_target_clause_type(clause_type);
                        bmc.commit(&[!c.literal(0), !c.literal(1)]);
                    }
                }
                bmc.set_target_clause_type(ClauseType::Transition);
                bmc.set_target_variable_type(VariableType::Auxiliary);
                c
            }
        }
    }

    /// Tie the value of a state container in the next timeframe to a container of the current one
    ///
    /// Forgetful encodings let the state decay to X. Without bounded model checking, the state
    /// container is simply driven by a buffer.
    pub fn encode_next_state<C: LogicContainer>(&mut self, out: &C, next: &C) {
        assert_set(out);
        assert_set(next);
        let bmc: &mut dyn BmcProxy = match self.solver.as_bmc() {
            None => {
                self.encode_buffer_into(next, out);
                return;
            }
            Some(bmc) => bmc,
        };
        bmc.set_target_clause_type(ClauseType::Transition);
        for b in 0..C::width() {
            let (n, o) = (next.literal(b), out.literal(b));
            match C::ENCODING {
                LogicEncoding::L01F => {
                    bmc.commit_timeframe_clause(&[(n, 0), (!o, 1)]);
                }
                LogicEncoding::U01F => {
                    bmc.commit_timeframe_clause(&[(!n, 0), (o, 1)]);
                    bmc.commit_timeframe_clause(&[(next.literal(0), 0), (next.literal(1), 0), (!o, 1)]);
                }
                _ => {
                    bmc.commit_timeframe_clause(&[(!n, 0), (o, 1)]);
                    bmc.commit_timeframe_clause(&[(n, 0), (!o, 1)]);
                }
            }
        }
    }

    /// Tie state containers to their next values, element by element
    pub fn encode_next_state_vec<C: LogicContainer>(&mut self, outs: &[C], nexts: &[C]) {
        assert_eq!(outs.len(), nexts.len(), "The size of the input vectors has to match.");
        for (o, n) in outs.iter().zip(nexts) {
            self.encode_next_state(o, n);
        }
    }

    /// Force the value of a state container in the first timeframe
    pub fn encode_initial_state_value<C: LogicContainer>(&mut self, out: &C, value: Logic) {
        self.with_clause_type(ClauseType::Initial, |enc| enc.encode_logic_value(out, value));
    }

    /// Force the value of a container in the states to reach
    pub fn encode_target_state_value<C: LogicContainer>(&mut self, out: &C, value: Logic) {
        self.with_clause_type(ClauseType::Target, |enc| enc.encode_logic_value(out, value));
    }

    fn with_clause_type<F: FnOnce(&mut Self)>(&mut self, clause_type: ClauseType, f: F) {
        if let Some(bmc) = self.solver.as_bmc() {
            bmc.set_target_clause_type(clause_type);
        }
        f(self);
        if let Some(bmc) = self.solver.as_bmc() {
            bmc.set_target_clause_type(ClauseType::Transition);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder::tests::encoder;
    use crate::solver::{BmcResult, BmcSolverProxy, SatResult};
    use crate::{LogicContainer01, LogicContainer01F, LogicContainer01X, LogicContainerU01F};

    fn bmc_encoder() -> LogicEncoder<BmcSolverProxy> {
        LogicEncoder::new(BmcSolverProxy::new())
    }

    fn value_at<C: LogicContainer>(enc: &mut LogicEncoder<BmcSolverProxy>, c: &C, timeframe: usize) -> Logic {
        enc.solver_mut().set_target_timeframe(timeframe);
        let v = enc.solved_logic_value(c);
        enc.solver_mut().set_target_timeframe(0);
        v
    }

    #[test]
    fn test_toggle() {
        let mut enc = bmc_encoder();
        let s: LogicContainer01X = enc.new_state_container();
        let n = enc.encode_inverter(&s);
        enc.encode_next_state(&s, &n);
        enc.encode_initial_state_value(&s, Logic::Zero);
        enc.encode_target_state_value(&s, Logic::One);
        assert_eq!(enc.solver().clauses(ClauseType::Target).len(), 4);
        assert_eq!(enc.solver_mut().solve(), BmcResult::Reachable);
        assert_eq!(enc.solver().last_depth(), 1);
        assert_eq!(value_at(&mut enc, &s, 0), Logic::Zero);
        assert_eq!(value_at(&mut enc, &s, 1), Logic::One);
    }

    #[test]
    fn test_toggle_never_dont_care() {
        let mut enc = bmc_encoder();
        let s: LogicContainer01X = enc.new_state_container();
        let n = enc.encode_inverter(&s);
        enc.encode_next_state(&s, &n);
        enc.encode_initial_state_value(&s, Logic::Zero);
        enc.encode_target_state_value(&s, Logic::DontCare);
        assert_eq!(enc.solver_mut().solve(), BmcResult::Unreachable);
    }

    #[test]
    fn test_forgetful_latch() {
        let mut enc = bmc_encoder();
        let s: LogicContainer01F = enc.new_state_container();
        enc.encode_next_state(&s, &s);
        enc.encode_initial_state_value(&s, Logic::One);
        enc.encode_target_state_value(&s, Logic::DontCare);
        assert_eq!(enc.solver_mut().solve(), BmcResult::Reachable);
        assert_eq!(enc.solver().last_depth(), 1);

        let mut enc = bmc_encoder();
        let s: LogicContainer01X = enc.new_state_container();
        enc.encode_next_state(&s, &s);
        enc.encode_initial_state_value(&s, Logic::One);
        enc.encode_target_state_value(&s, Logic::DontCare);
        assert_eq!(enc.solver_mut().solve(), BmcResult::Unreachable);
    }

    #[test]
    fn test_forgetful_keeps_unknown() {
        // An unknown state never becomes known
        let mut enc = bmc_encoder();
        let s: LogicContainerU01F = enc.new_state_container();
        enc.encode_next_state(&s, &s);
        enc.encode_initial_state_value(&s, Logic::Unknown);
        enc.encode_target_state_value(&s, Logic::One);
        assert_eq!(enc.solver_mut().solve(), BmcResult::Unreachable);
    }

    #[test]
    fn test_input() {
        let mut enc = bmc_encoder();
        let s: LogicContainer01 = enc.new_state_container();
        let i: LogicContainer01 = enc.new_input_container();
        let n = enc.encode_xor(&s, &i);
        enc.encode_next_state(&s, &n);
        enc.encode_initial_state_value(&s, Logic::Zero);
        enc.encode_target_state_value(&s, Logic::One);
        assert_eq!(enc.solver().variable_type(i.l0), VariableType::Input);
        assert_eq!(enc.solver().variable_type(n.l0), VariableType::Auxiliary);
        assert_eq!(enc.solver_mut().solve(), BmcResult::Reachable);
        assert_eq!(enc.solver().last_depth(), 1);
        assert_eq!(value_at(&mut enc, &i, 0), Logic::One);
    }

    #[test]
    fn test_without_bmc() {
        let mut enc = encoder();
        let s: LogicContainer01X = enc.new_state_container();
        let n: LogicContainer01X = enc.new_input_container();
        enc.encode_next_state(&s, &n);
        enc.encode_initial_state_value(&n, Logic::DontCare);
        assert_eq!(enc.solver_mut().solve(), SatResult::Sat);
        assert_eq!(enc.solved_logic_value(&s), Logic::DontCare);
        enc.encode_target_state_value(&s, Logic::One);
        assert_eq!(enc.solver_mut().solve(), SatResult::Unsat);
    }

    #[test]
    #[should_panic(expected = "Only latches")]
    fn test_next_state_of_input() {
        let mut enc = bmc_encoder();
        let s: LogicContainer01 = enc.new_input_container();
        let n: LogicContainer01 = enc.new_input_container();
        enc.encode_next_state(&s, &n);
    }
}
