//! Bounded model checking proxy
//!
//! Clauses are sorted into three partitions: the initial states, the transition relation and the
//! target states. Transition clauses hold literals tagged with a timeframe offset: 0 for the
//! current step, 1 for the next one. Only latches may refer to the next step.
//!
//! Solving unrolls the transition relation over a Minisat instance, one step at a time, until the
//! target is reached, proven unreachable, or the depth or time budget is exhausted.

use std::fmt;
use std::time::{Duration, Instant};

use fxhash::FxHashMap;
use tracing::{debug, error, info};

use super::backend::{MinisatBackend, Outcome, SatBackend};
use super::clause_db::PendingClause;
use super::{
    trace_clause, ClauseDatabase, SolverError, SolverKind, SolverProxy, SolverSettings,
    SolverStatistics, Value,
};
use crate::Literal;

/// Partition receiving the committed clauses
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ClauseType {
    /// Constraints on the first timeframe
    Initial,
    /// Constraints between a timeframe and the next one
    Transition,
    /// States to reach
    Target,
}

/// Role of a variable in the sequential circuit
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum VariableType {
    /// Primary input, free at every timeframe
    Input,
    /// Primary output
    Output,
    /// State element; may be referenced in the next timeframe
    Latch,
    /// Any other variable
    Auxiliary,
}

/// Answer of a bounded model checking run
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BmcResult {
    /// No sequence of transitions reaches the target
    Unreachable,
    /// The target is reached at [`BmcSolverProxy::last_depth`]
    Reachable,
    /// The time limit was reached or the backend failed
    Timeout,
    /// The maximum depth was explored without conclusion
    MaxIterationsReached,
}

impl fmt::Display for BmcResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BmcResult::Unreachable => "Unreachable",
            BmcResult::Reachable => "Reachable",
            BmcResult::Timeout => "Timeout",
            BmcResult::MaxIterationsReached => "MaxIterationsReached",
        };
        write!(f, "{s}")
    }
}

/// Settings of the unrolling
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BmcSettings {
    /// Deepest timeframe explored
    pub max_depth: usize,
}

impl Default for BmcSettings {
    fn default() -> Self {
        BmcSettings { max_depth: 100 }
    }
}

/// Bounded model checking operations, on top of the clause interface
///
/// Obtained from a generic proxy with [`SolverProxy::as_bmc`].
pub trait BmcProxy: SolverProxy {
    /// Select the partition receiving the next clauses
    fn set_target_clause_type(&mut self, clause_type: ClauseType);

    /// Partition receiving the next clauses
    fn target_clause_type(&self) -> ClauseType;

    /// Select the role of the next allocated variables
    fn set_target_variable_type(&mut self, variable_type: VariableType);

    /// Role of the next allocated variables
    fn target_variable_type(&self) -> VariableType;

    /// Role of the variable of a literal
    fn variable_type(&self, lit: Literal) -> VariableType;

    /// Add a literal with an explicit timeframe offset to the open clause
    fn add_timeframe_literal(&mut self, lit: Literal, timeframe: u32);

    /// Commit a clause of `(literal, timeframe offset)` pairs in one call
    fn commit_timeframe_clause(&mut self, lits: &[(Literal, u32)]) {
        self.new_clause();
        for (l, tf) in lits {
            self.add_timeframe_literal(*l, *tf);
        }
        self.commit_clause();
    }

    /// Select the timeframe: offset of the literals added with `add_literal`, and step read by
    /// `literal_value`
    fn set_target_timeframe(&mut self, timeframe: usize);

    /// Selected timeframe
    fn target_timeframe(&self) -> usize;

    /// Set the deepest timeframe explored
    fn set_maximum_depth(&mut self, depth: usize);

    /// Deepest timeframe explored
    fn maximum_depth(&self) -> usize;
}

/// Proxy collecting a sequential problem and unrolling it
///
/// ```
/// use tpgenc::solver::{BmcProxy, BmcResult, BmcSolverProxy, ClauseType, SolverProxy, VariableType};
///
/// let mut bmc = BmcSolverProxy::new();
/// bmc.set_target_variable_type(VariableType::Latch);
/// let state = bmc.new_literal();
/// bmc.set_target_clause_type(ClauseType::Initial);
/// bmc.commit(&[!state]);
/// bmc.set_target_clause_type(ClauseType::Transition);
/// bmc.commit_timeframe_clause(&[(state, 0), (state, 1)]);
/// bmc.commit_timeframe_clause(&[(!state, 0), (!state, 1)]);
/// bmc.set_target_clause_type(ClauseType::Target);
/// bmc.commit(&[state]);
/// assert_eq!(bmc.solve(), BmcResult::Reachable);
/// assert_eq!(bmc.last_depth(), 1);
/// ```
pub struct BmcSolverProxy {
    settings: SolverSettings,
    bmc: BmcSettings,
    variable_types: Vec<VariableType>,
    initial: ClauseDatabase<(Literal, u32)>,
    transition: ClauseDatabase<(Literal, u32)>,
    target: ClauseDatabase<(Literal, u32)>,
    pending: PendingClause<(Literal, u32)>,
    clause_type: ClauseType,
    variable_type: VariableType,
    timeframe: usize,
    trace: Vec<Vec<Value>>,
    last_result: BmcResult,
    last_depth: usize,
    last_error: Option<SolverError>,
    solves_since_reset: usize,
    stats: SolverStatistics,
}

impl Default for BmcSolverProxy {
    fn default() -> Self {
        BmcSolverProxy::new()
    }
}

impl BmcSolverProxy {
    /// Create a proxy with default settings
    pub fn new() -> BmcSolverProxy {
        BmcSolverProxy::with_settings(SolverSettings::default(), BmcSettings::default())
    }

    /// Create a proxy
    pub fn with_settings(settings: SolverSettings, bmc: BmcSettings) -> BmcSolverProxy {
        let mut ret = BmcSolverProxy {
            settings,
            bmc,
            variable_types: Vec::new(),
            initial: ClauseDatabase::new(),
            transition: ClauseDatabase::new(),
            target: ClauseDatabase::new(),
            pending: PendingClause::default(),
            clause_type: ClauseType::Initial,
            variable_type: VariableType::Auxiliary,
            timeframe: 0,
            trace: Vec::new(),
            last_result: BmcResult::MaxIterationsReached,
            last_depth: 0,
            last_error: None,
            solves_since_reset: 0,
            stats: SolverStatistics::default(),
        };
        ret.reset();
        ret
    }

    /// Settings
    pub fn settings(&self) -> &SolverSettings {
        &self.settings
    }

    /// Mutable settings
    pub fn settings_mut(&mut self) -> &mut SolverSettings {
        &mut self.settings
    }

    /// Number of variables, including the constant
    pub fn nb_variables(&self) -> usize {
        self.variable_types.len()
    }

    /// Clauses of a partition
    pub fn clauses(&self, clause_type: ClauseType) -> &ClauseDatabase<(Literal, u32)> {
        match clause_type {
            ClauseType::Initial => &self.initial,
            ClauseType::Transition => &self.transition,
            ClauseType::Target => &self.target,
        }
    }

    /// Result of the last solve
    pub fn last_result(&self) -> BmcResult {
        self.last_result
    }

    /// Depth reached by the last solve
    pub fn last_depth(&self) -> usize {
        self.last_depth
    }

    /// Backend failure of the last solve, if any
    pub fn last_error(&self) -> Option<&SolverError> {
        self.last_error.as_ref()
    }

    /// Search for a path from the initial states to the target states
    pub fn solve(&mut self) -> BmcResult {
        assert!(
            !self.pending.is_open(),
            "Solving while a clause is still open"
        );
        self.solves_since_reset += 1;
        if self.solves_since_reset == 1 {
            self.stats.instances += 1;
        }
        self.stats.solves += 1;
        self.trace.clear();
        self.last_error = None;
        self.last_depth = 0;

        let start = Instant::now();
        let res = match self.unroll() {
            Ok(res) => res,
            Err(e) => {
                error!(backend = "minisat", "{e}");
                self.last_error = Some(e);
                BmcResult::Timeout
            }
        };
        self.stats.solve_time += start.elapsed();
        match res {
            BmcResult::Reachable => self.stats.sat += 1,
            BmcResult::Unreachable => self.stats.unsat += 1,
            _ => self.stats.unknown += 1,
        }
        if !self.settings.silent {
            info!(depth = self.last_depth, result = %res, "BMC solve");
        }
        self.last_result = res;
        res
    }

    fn unroll(&mut self) -> Result<BmcResult, SolverError> {
        let deadline = self.settings.timeout.map(|t| Instant::now() + t);
        let max_depth = self.bmc.max_depth;
        let nb_vars = self.variable_types.len();

        // Base case and path termination
        let mut base = Unrolling::new();
        // Induction step
        let mut step = Unrolling::new();

        base.add_all(&self.initial, 0, None)?;
        step.add_all(&self.transition, 0, None)?;

        for depth in 0..=max_depth {
            self.last_depth = depth;
            base.add_all(&self.transition, depth, None)?;

            let Some(timeout) = remaining(deadline) else {
                return Ok(BmcResult::Timeout);
            };
            let act = base.fresh();
            base.add_all(&self.target, depth, Some(act))?;
            match base.solve(&[act], timeout)? {
                Outcome::Sat => {
                    self.trace = base.trace(nb_vars, depth);
                    return Ok(BmcResult::Reachable);
                }
                Outcome::Unknown => return Ok(BmcResult::Timeout),
                Outcome::Unsat => base.add(&[!act])?,
            }

            let Some(timeout) = remaining(deadline) else {
                return Ok(BmcResult::Timeout);
            };
            match base.solve(&[], timeout)? {
                Outcome::Unsat => {
                    debug!(depth, "no path of this length from the initial states");
                    return Ok(BmcResult::Unreachable);
                }
                Outcome::Unknown => return Ok(BmcResult::Timeout),
                Outcome::Sat => (),
            }

            let Some(timeout) = remaining(deadline) else {
                return Ok(BmcResult::Timeout);
            };
            step.add_all(&self.transition, depth + 1, None)?;
            step.add_negation(&self.target, depth)?;
            let act = step.fresh();
            step.add_all(&self.target, depth + 1, Some(act))?;
            match step.solve(&[act], timeout)? {
                Outcome::Unsat => {
                    debug!(depth, "target unreachable by induction");
                    return Ok(BmcResult::Unreachable);
                }
                Outcome::Unknown => return Ok(BmcResult::Timeout),
                Outcome::Sat => step.add(&[!act])?,
            }
            debug!(depth, "BMC step inconclusive");
        }
        Ok(BmcResult::MaxIterationsReached)
    }

    fn active_clauses(&mut self) -> &mut ClauseDatabase<(Literal, u32)> {
        match self.clause_type {
            ClauseType::Initial => &mut self.initial,
            ClauseType::Transition => &mut self.transition,
            ClauseType::Target => &mut self.target,
        }
    }
}

/// Time left before the deadline; None once it has passed
fn remaining(deadline: Option<Instant>) -> Option<Option<Duration>> {
    match deadline {
        Some(d) => {
            let now = Instant::now();
            if now >= d {
                None
            } else {
                Some(Some(d - now))
            }
        }
        None => Some(None),
    }
}

/// Copies of the problem for successive timeframes in a single SAT instance
///
/// Solver variables are allocated on first use, so the instance only grows with the timeframes
/// actually unrolled. The constant variable is shared by all timeframes.
struct Unrolling {
    backend: MinisatBackend,
    frames: FxHashMap<(u32, usize), u32>,
    next_var: u32,
}

impl Unrolling {
    fn new() -> Unrolling {
        Unrolling {
            backend: MinisatBackend::default(),
            frames: FxHashMap::default(),
            next_var: 1,
        }
    }

    fn alloc(&mut self) -> u32 {
        let v = self.next_var;
        self.next_var = v
            .checked_add(1)
            .unwrap_or_else(|| panic!("Unrolled instance exceeds {} variables", u32::MAX));
        v
    }

    fn map(&mut self, lit: Literal, frame: usize) -> Literal {
        let v = lit.var();
        if v == 0 {
            return lit;
        }
        let mapped = match self.frames.get(&(v, frame)) {
            Some(m) => *m,
            None => {
                let m = self.alloc();
                self.frames.insert((v, frame), m);
                m
            }
        };
        Literal::from_var(mapped) ^ lit.is_negated()
    }

    fn fresh(&mut self) -> Literal {
        Literal::from_var(self.alloc())
    }

    fn add(&mut self, clause: &[Literal]) -> Result<(), SolverError> {
        self.backend.add_clause(clause)
    }

    /// Add a partition at a timeframe, optionally enabled by an activation literal
    fn add_all(
        &mut self,
        db: &ClauseDatabase<(Literal, u32)>,
        frame: usize,
        act: Option<Literal>,
    ) -> Result<(), SolverError> {
        for clause in db.iter() {
            let mut lits: Vec<Literal> = act.iter().map(|a| !*a).collect();
            for (l, tf) in clause {
                lits.push(self.map(*l, frame + *tf as usize));
            }
            self.add(&lits)?;
        }
        Ok(())
    }

    /// Add the negation of a partition at a timeframe: at least one clause is falsified
    fn add_negation(
        &mut self,
        db: &ClauseDatabase<(Literal, u32)>,
        frame: usize,
    ) -> Result<(), SolverError> {
        let mut falsified = Vec::new();
        for clause in db.iter() {
            let d = self.fresh();
            for (l, tf) in clause {
                let l = self.map(*l, frame + *tf as usize);
                self.add(&[!d, !l])?;
            }
            falsified.push(d);
        }
        self.add(&falsified)
    }

    fn solve(
        &mut self,
        assumptions: &[Literal],
        timeout: Option<Duration>,
    ) -> Result<Outcome, SolverError> {
        self.backend.solve(assumptions, timeout)
    }

    /// Values of the problem variables for timeframes `0..=depth`
    fn trace(&mut self, nb_vars: usize, depth: usize) -> Vec<Vec<Value>> {
        let model = self.backend.model(self.next_var as usize);
        (0..=depth)
            .map(|f| {
                (0..nb_vars)
                    .map(|v| {
                        if v == 0 {
                            return Value::Positive;
                        }
                        // Variables absent from the unrolled clauses are unconstrained
                        match self.frames.get(&(v as u32, f)) {
                            Some(m) => model[*m as usize],
                            None => Value::DontCare,
                        }
                    })
                    .collect()
            })
            .collect()
    }
}

impl SolverProxy for BmcSolverProxy {
    fn kind(&self) -> SolverKind {
        SolverKind::Bmc
    }

    fn new_literal(&mut self) -> Literal {
        let l = Literal::from_var(self.variable_types.len() as u32);
        self.variable_types.push(self.variable_type);
        self.stats.variables += 1;
        l
    }

    fn new_clause(&mut self) {
        self.pending.begin();
    }

    fn add_literal(&mut self, lit: Literal) {
        self.add_timeframe_literal(lit, self.timeframe as u32);
    }

    fn commit_clause(&mut self) {
        let clause = self.pending.take();
        let prefix = match self.clause_type {
            ClauseType::Initial => "initial",
            ClauseType::Transition => "transition",
            ClauseType::Target => "target",
        };
        trace_clause(&self.settings, prefix, &clause);
        self.active_clauses().push(&clause);
        self.stats.clauses += 1;
    }

    fn literal_value(&self, lit: Literal) -> Value {
        assert!(lit.is_set(), "Querying invalid unset literal");
        if lit.is_constant() {
            return Value::from_constant(lit);
        }
        if self.last_result != BmcResult::Reachable {
            return Value::Invalid;
        }
        self.trace
            .get(self.timeframe)
            .and_then(|frame| frame.get(lit.var() as usize))
            .map(|v| v.of_literal(lit))
            .unwrap_or(Value::Invalid)
    }

    fn reset(&mut self) {
        self.variable_types.clear();
        self.initial.clear();
        self.transition.clear();
        self.target.clear();
        self.pending.discard();
        self.timeframe = 0;
        self.trace.clear();
        self.last_result = BmcResult::MaxIterationsReached;
        self.last_depth = 0;
        self.last_error = None;
        self.solves_since_reset = 0;
        self.stats = SolverStatistics {
            instances: self.stats.instances,
            ..Default::default()
        };

        self.set_target_variable_type(VariableType::Latch);
        let constant = self.new_literal();
        debug_assert_eq!(constant, Literal::one());
        for clause_type in [ClauseType::Initial, ClauseType::Transition, ClauseType::Target] {
            self.set_target_clause_type(clause_type);
            self.commit(&[constant]);
        }
        self.set_target_clause_type(ClauseType::Initial);
        self.set_target_variable_type(VariableType::Auxiliary);
    }

    fn statistics(&self) -> &SolverStatistics {
        &self.stats
    }

    fn as_bmc(&mut self) -> Option<&mut dyn BmcProxy> {
        Some(self)
    }
}

impl BmcProxy for BmcSolverProxy {
    fn set_target_clause_type(&mut self, clause_type: ClauseType) {
        self.clause_type = clause_type;
    }

    fn target_clause_type(&self) -> ClauseType {
        self.clause_type
    }

    fn set_target_variable_type(&mut self, variable_type: VariableType) {
        self.variable_type = variable_type;
    }

    fn target_variable_type(&self) -> VariableType {
        self.variable_type
    }

    fn variable_type(&self, lit: Literal) -> VariableType {
        self.variable_types[lit.var() as usize]
    }

    fn add_timeframe_literal(&mut self, lit: Literal, timeframe: u32) {
        assert!(lit.is_set(), "Adding invalid unset literal");
        assert!(
            (lit.var() as usize) < self.variable_types.len(),
            "Literal {lit} was not allocated by this solver"
        );
        assert!(
            timeframe <= 1,
            "Timeframe offset {timeframe} is out of range, only 0 and 1 are supported"
        );
        assert!(
            timeframe == 0 || self.variable_type(lit) == VariableType::Latch,
            "Only latches can have a timeframe different than 0, {lit} is {:?}",
            self.variable_type(lit)
        );
        self.pending.push((lit, timeframe));
    }

    fn set_target_timeframe(&mut self, timeframe: usize) {
        self.timeframe = timeframe;
    }

    fn target_timeframe(&self) -> usize {
        self.timeframe
    }

    fn set_maximum_depth(&mut self, depth: usize) {
        self.bmc.max_depth = depth;
    }

    fn maximum_depth(&self) -> usize {
        self.bmc.max_depth
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Two-bit counter counting from 0 to 3
    fn counter() -> (BmcSolverProxy, Literal, Literal) {
        let mut bmc = BmcSolverProxy::new();
        bmc.set_target_variable_type(VariableType::Latch);
        let b0 = bmc.new_literal();
        let b1 = bmc.new_literal();
        bmc.set_target_variable_type(VariableType::Auxiliary);

        bmc.set_target_clause_type(ClauseType::Initial);
        bmc.commit(&[!b0]);
        bmc.commit(&[!b1]);

        bmc.set_target_clause_type(ClauseType::Transition);
        bmc.commit_timeframe_clause(&[(b0, 0), (b0, 1)]);
        bmc.commit_timeframe_clause(&[(!b0, 0), (!b0, 1)]);
        bmc.commit_timeframe_clause(&[(b0, 0), (b1, 0), (!b1, 1)]);
        bmc.commit_timeframe_clause(&[(b0, 0), (!b1, 0), (b1, 1)]);
        bmc.commit_timeframe_clause(&[(!b0, 0), (b1, 0), (b1, 1)]);
        bmc.commit_timeframe_clause(&[(!b0, 0), (!b1, 0), (!b1, 1)]);

        bmc.set_target_clause_type(ClauseType::Target);
        bmc.commit(&[b0]);
        bmc.commit(&[b1]);
        bmc.set_target_clause_type(ClauseType::Transition);
        (bmc, b0, b1)
    }

    #[test]
    fn test_reset() {
        let bmc = BmcSolverProxy::new();
        assert_eq!(bmc.nb_variables(), 1);
        assert_eq!(bmc.variable_type(Literal::one()), VariableType::Latch);
        assert_eq!(bmc.target_variable_type(), VariableType::Auxiliary);
        assert_eq!(bmc.target_clause_type(), ClauseType::Initial);
        for t in [ClauseType::Initial, ClauseType::Transition, ClauseType::Target] {
            assert_eq!(bmc.clauses(t).len(), 1);
        }
        assert_eq!(bmc.maximum_depth(), 100);
    }

    #[test]
    fn test_counter() {
        let (mut bmc, b0, b1) = counter();
        assert_eq!(bmc.solve(), BmcResult::Reachable);
        assert_eq!(bmc.last_depth(), 3);
        let expected = [(0, 0), (1, 0), (0, 1), (1, 1)];
        for (tf, (v0, v1)) in expected.into_iter().enumerate() {
            bmc.set_target_timeframe(tf);
            let to_value = |v| if v == 1 { Value::Positive } else { Value::Negative };
            assert_eq!(bmc.literal_value(b0), to_value(v0));
            assert_eq!(bmc.literal_value(b1), to_value(v1));
        }
        bmc.set_target_timeframe(4);
        assert_eq!(bmc.literal_value(b0), Value::Invalid);
        assert_eq!(bmc.statistics().instances, 1);
        assert_eq!(bmc.statistics().sat, 1);
    }

    #[test]
    fn test_counter_unreachable() {
        let (mut bmc, _, b1) = counter();
        bmc.commit(&[!b1]);
        assert_eq!(bmc.solve(), BmcResult::Unreachable);
        assert_eq!(bmc.literal_value(b1), Value::Invalid);
    }

    #[test]
    fn test_max_depth() {
        let (mut bmc, _, _) = counter();
        bmc.set_maximum_depth(2);
        assert_eq!(bmc.solve(), BmcResult::MaxIterationsReached);
        bmc.set_maximum_depth(3);
        assert_eq!(bmc.solve(), BmcResult::Reachable);
        assert_eq!(bmc.statistics().solves, 2);
        assert_eq!(bmc.statistics().instances, 1);
    }

    #[test]
    fn test_huge_max_depth() {
        // The unrolled instance only holds the timeframes explored
        let mut bmc = BmcSolverProxy::new();
        bmc.set_target_variable_type(VariableType::Latch);
        let a = bmc.new_literal();
        bmc.set_target_clause_type(ClauseType::Initial);
        bmc.commit(&[!a]);
        bmc.set_target_clause_type(ClauseType::Transition);
        bmc.commit_timeframe_clause(&[(a, 0), (a, 1)]);
        bmc.commit_timeframe_clause(&[(!a, 0), (!a, 1)]);
        bmc.set_target_clause_type(ClauseType::Target);
        bmc.commit(&[a]);
        for depth in [(1 << 31) - 2, usize::MAX] {
            bmc.set_maximum_depth(depth);
            assert_eq!(bmc.solve(), BmcResult::Reachable);
            assert_eq!(bmc.last_depth(), 1);
            bmc.set_target_timeframe(0);
            assert_eq!(bmc.literal_value(a), Value::Negative);
            bmc.set_target_timeframe(1);
            assert_eq!(bmc.literal_value(a), Value::Positive);
        }
    }

    #[test]
    fn test_unsat_initial() {
        let mut bmc = BmcSolverProxy::new();
        let a = bmc.new_literal();
        bmc.commit(&[a]);
        bmc.commit(&[!a]);
        assert_eq!(bmc.solve(), BmcResult::Unreachable);
        assert_eq!(bmc.last_depth(), 0);
    }

    #[test]
    fn test_routing() {
        let mut bmc = BmcSolverProxy::new();
        let a = bmc.new_literal();
        bmc.set_target_clause_type(ClauseType::Target);
        bmc.commit(&[a]);
        bmc.set_target_clause_type(ClauseType::Transition);
        bmc.commit(&[!a]);
        assert_eq!(bmc.clauses(ClauseType::Initial).len(), 1);
        assert_eq!(bmc.clauses(ClauseType::Transition).len(), 2);
        assert_eq!(bmc.clauses(ClauseType::Target).len(), 2);
        assert_eq!(bmc.clauses(ClauseType::Target)[1], [(a, 0)]);
        assert_eq!(bmc.as_bmc().map(|b| b.kind()), Some(SolverKind::Bmc));
    }

    #[test]
    #[should_panic]
    fn test_offset_on_auxiliary() {
        let mut bmc = BmcSolverProxy::new();
        let a = bmc.new_literal();
        bmc.set_target_clause_type(ClauseType::Transition);
        bmc.commit_timeframe_clause(&[(a, 1)]);
    }

    #[test]
    fn test_reset_keeps_instances() {
        let (mut bmc, _, _) = counter();
        bmc.solve();
        bmc.reset();
        assert_eq!(bmc.statistics().instances, 1);
        assert_eq!(bmc.statistics().solves, 0);
        assert_eq!(bmc.nb_variables(), 1);
    }
}
