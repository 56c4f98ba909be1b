//! Objectives: ordered steps plus assignability and capacity rules.

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use qb_core::{AgentId, ObjectiveId, Position};
use rustc_hash::FxHashSet;

use crate::Step;

/// What an assignability rule may know about an agent.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AgentProfile {
    pub id:    AgentId,
    pub level: u32,
}

impl AgentProfile {
    pub fn new(id: AgentId, level: u32) -> Self {
        Self { id, level }
    }
}

/// Host-supplied predicate deciding whether an agent may take an objective
/// (item availability, faction, anything the engine does not model).
///
/// Must be pure for the duration of one decision.
pub type AssignRule = Arc<dyn Fn(&AgentProfile) -> bool + Send + Sync>;

/// An ordered sequence of [`Step`]s forming one sub-goal of a quest.
///
/// Steps are immutable after construction.  The only mutable state is the
/// set of agents currently mid-objective, which enforces `max_bots`.
/// Equality is identity: two objectives are equal iff their IDs match.
pub struct Objective {
    id:                    ObjectiveId,
    name:                  String,
    tag:                   Option<String>,
    steps:                 Vec<Step>,
    max_bots:              usize,
    min_time_at_objective: f64,
    rule:                  Option<AssignRule>,
    assigned:              Mutex<FxHashSet<AgentId>>,
}

impl Objective {
    pub fn new(id: ObjectiveId, name: impl Into<String>, steps: Vec<Step>) -> Self {
        Self {
            id,
            name: name.into(),
            tag: None,
            steps,
            max_bots: 2,
            min_time_at_objective: 10.0,
            rule: None,
            assigned: Mutex::new(FxHashSet::default()),
        }
    }

    /// Cap on agents pursuing this objective at the same time.
    pub fn with_max_bots(mut self, max_bots: usize) -> Self {
        self.max_bots = max_bots;
        self
    }

    /// Minimum dwell at a reached step before the agent may move on.
    pub fn with_min_time_at_objective(mut self, secs: f64) -> Self {
        self.min_time_at_objective = secs.max(0.0);
        self
    }

    /// Lookup key such as a zone ID or an item template.
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    pub fn with_rule<F>(mut self, rule: F) -> Self
    where
        F: Fn(&AgentProfile) -> bool + Send + Sync + 'static,
    {
        self.rule = Some(Arc::new(rule));
        self
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    #[inline]
    pub fn id(&self) -> ObjectiveId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn tag(&self) -> Option<&str> {
        self.tag.as_deref()
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn max_bots(&self) -> usize {
        self.max_bots
    }

    pub fn min_time_at_objective(&self) -> f64 {
        self.min_time_at_objective
    }

    /// `None` means the objective is structurally invalid.
    pub fn first_step_position(&self) -> Option<Position> {
        self.steps.first().and_then(Step::position)
    }

    /// Step by zero-based index.
    pub fn step(&self, index: usize) -> Option<&Step> {
        self.steps.get(index)
    }

    /// Index of the step after `current`, or of the first step when
    /// `current` is `None`.  `None` once the sequence is exhausted.
    pub fn next_step(&self, current: Option<usize>) -> Option<usize> {
        let next = current.map_or(0, |i| i + 1);
        (next < self.steps.len()).then_some(next)
    }

    /// 1-based ordinal of `step`; 0 if absent or out of range.
    pub fn step_number(&self, step: Option<usize>) -> usize {
        match step {
            Some(i) if i < self.steps.len() => i + 1,
            _ => 0,
        }
    }

    // ── Assignability ─────────────────────────────────────────────────────

    pub fn can_assign_bot(&self, agent: &AgentProfile) -> bool {
        self.rule.as_ref().is_none_or(|rule| rule(agent))
    }

    pub fn can_assign_more_bots(&self) -> bool {
        self.assigned_bot_count() < self.max_bots
    }

    pub fn assigned_bot_count(&self) -> usize {
        self.assigned.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_assigned(&self, agent: AgentId) -> bool {
        self.assigned.lock().unwrap_or_else(PoisonError::into_inner).contains(&agent)
    }

    /// Claim a slot for `agent`.  The cap is checked under the same lock as
    /// the insert, so concurrent claims never overrun `max_bots`.  Returns
    /// `false` when the objective is full; an agent already holding a slot
    /// keeps it.
    pub(crate) fn try_assign_bot(&self, agent: AgentId) -> bool {
        let mut assigned = self.assigned.lock().unwrap_or_else(PoisonError::into_inner);
        if assigned.contains(&agent) {
            return true;
        }
        if assigned.len() >= self.max_bots {
            return false;
        }
        assigned.insert(agent)
    }

    /// Returns `false` if `agent` was not mid-objective.
    pub(crate) fn unassign_bot(&self, agent: AgentId) -> bool {
        self.assigned.lock().unwrap_or_else(PoisonError::into_inner).remove(&agent)
    }
}

impl PartialEq for Objective {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Objective {}

impl fmt::Debug for Objective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Objective")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("tag", &self.tag)
            .field("steps", &self.steps.len())
            .field("max_bots", &self.max_bots)
            .field("assigned", &self.assigned_bot_count())
            .finish()
    }
}

impl fmt::Display for Objective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
