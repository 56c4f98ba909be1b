//! The lifecycle record binding one agent to one quest/objective/step.
//!
//! ```text
//! NotStarted ──advance──▶ Pending ──begin──▶ Active ──▶ Completed ──advance──▶ Pending …
//!                                               └─────▶ Failed
//! any state ──archive──▶ Archived
//! ```
//!
//! The start time is written once per assignment, on the first successful
//! advance.  The end time is written once per step: the first `complete` or
//! `fail` wins, and a later successful advance clears it for the next step.
//!
//! An assignment occupies one capacity slot on its objective from its first
//! successful advance until it is archived or dropped.

use std::fmt;
use std::sync::Arc;

use qb_core::{AgentId, Position, SimTime};
use tracing::{info, warn};

use crate::{Objective, Quest, Step};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AssignmentStatus {
    NotStarted,
    Pending,
    Active,
    Completed,
    Failed,
    Archived,
}

impl fmt::Display for AssignmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AssignmentStatus::NotStarted => "not started",
            AssignmentStatus::Pending    => "pending",
            AssignmentStatus::Active     => "active",
            AssignmentStatus::Completed  => "completed",
            AssignmentStatus::Failed     => "failed",
            AssignmentStatus::Archived   => "archived",
        };
        f.write_str(s)
    }
}

pub struct Assignment {
    agent:      AgentId,
    quest:      Option<Arc<Quest>>,
    objective:  Option<Arc<Objective>>,
    step:       Option<usize>,
    status:     AssignmentStatus,
    start_time: Option<SimTime>,
    end_time:   Option<SimTime>,
    holds_slot: bool,

    /// Cleared by the movement collaborator when no route to the current
    /// step exists; reset to `true` whenever a step (re)starts.
    pub has_complete_path: bool,
}

impl Assignment {
    /// An empty assignment with no quest attached.
    pub fn new(agent: AgentId) -> Self {
        Self {
            agent,
            quest: None,
            objective: None,
            step: None,
            status: AssignmentStatus::NotStarted,
            start_time: None,
            end_time: None,
            holds_slot: false,
            has_complete_path: true,
        }
    }

    /// Bind `agent` to `objective` of `quest` and start its first step.
    ///
    /// If the objective has no first step, or is already full, the result
    /// stays `NotStarted`; the caller should check [`is_started`](Self::is_started) and discard it.
    pub fn for_objective(
        agent:     AgentId,
        quest:     Arc<Quest>,
        objective: Arc<Objective>,
        now:       SimTime,
    ) -> Self {
        let mut assignment = Self::new(agent);
        assignment.quest = Some(quest);
        assignment.objective = Some(objective);
        if !assignment.advance_step(now) {
            warn!(%agent, assignment = %assignment, "unable to set first step");
        }
        assignment
    }

    // ── Transitions ───────────────────────────────────────────────────────

    /// Move on to the next step of the objective.
    ///
    /// Only allowed from `Completed` or `NotStarted`; returns `false` without
    /// touching any state otherwise, when the objective has no further step,
    /// or when the objective is already at capacity.
    pub fn advance_step(&mut self, now: SimTime) -> bool {
        if !matches!(self.status, AssignmentStatus::Completed | AssignmentStatus::NotStarted) {
            return false;
        }
        let Some(objective) = self.objective.as_ref() else {
            return false;
        };
        let Some(next) = objective.next_step(self.step) else {
            return false;
        };

        if !self.holds_slot {
            if !objective.try_assign_bot(self.agent) {
                return false;
            }
            self.holds_slot = true;
        }
        self.step = Some(next);
        self.end_time = None;
        if self.start_time.is_none() {
            self.start_time = Some(now);
        }
        self.status = AssignmentStatus::Pending;
        self.has_complete_path = true;
        true
    }

    /// Execution of the current step has visibly begun.
    pub fn begin(&mut self) {
        self.status = AssignmentStatus::Active;
    }

    pub fn complete(&mut self, now: SimTime) {
        self.end(now);
        if self.status != AssignmentStatus::Completed {
            info!(agent = %self.agent, assignment = %self, "step completed");
        }
        self.status = AssignmentStatus::Completed;
    }

    pub fn fail(&mut self, now: SimTime) {
        self.end(now);
        if self.status != AssignmentStatus::Failed {
            info!(agent = %self.agent, assignment = %self, "step failed");
        }
        self.status = AssignmentStatus::Failed;
    }

    /// Terminal: the record is kept for history only.  Releases the
    /// objective's capacity slot.
    pub fn archive(&mut self) {
        self.status = AssignmentStatus::Archived;
        self.release_slot();
    }

    fn end(&mut self, now: SimTime) {
        if self.end_time.is_none() {
            self.end_time = Some(now);
        }
    }

    fn release_slot(&mut self) {
        if self.holds_slot {
            if let Some(objective) = &self.objective {
                objective.unassign_bot(self.agent);
            }
            self.holds_slot = false;
        }
    }

    // ── Queries ───────────────────────────────────────────────────────────

    #[inline]
    pub fn agent(&self) -> AgentId {
        self.agent
    }

    #[inline]
    pub fn status(&self) -> AssignmentStatus {
        self.status
    }

    pub fn quest(&self) -> Option<&Arc<Quest>> {
        self.quest.as_ref()
    }

    pub fn objective(&self) -> Option<&Arc<Objective>> {
        self.objective.as_ref()
    }

    /// Zero-based index of the current step.
    pub fn step_index(&self) -> Option<usize> {
        self.step
    }

    pub fn current_step(&self) -> Option<&Step> {
        let objective = self.objective.as_ref()?;
        objective.step(self.step?)
    }

    pub fn position(&self) -> Option<Position> {
        self.current_step().and_then(Step::position)
    }

    pub fn start_time(&self) -> Option<SimTime> {
        self.start_time
    }

    pub fn end_time(&self) -> Option<SimTime> {
        self.end_time
    }

    /// `true` once a first step was set.
    pub fn is_started(&self) -> bool {
        self.step.is_some()
    }

    /// `Pending` or `Active`.
    pub fn is_active(&self) -> bool {
        matches!(self.status, AssignmentStatus::Pending | AssignmentStatus::Active)
    }

    pub fn elapsed_since_start(&self, now: SimTime) -> Option<f64> {
        self.start_time.map(|t| now.secs_since(t))
    }

    pub fn elapsed_since_end(&self, now: SimTime) -> Option<f64> {
        self.end_time.map(|t| now.secs_since(t))
    }

    /// `false` while the step has not ended.
    pub fn has_waited_long_enough_after_ending(&self, now: SimTime) -> bool {
        let wait = self.current_step().map_or(0.0, Step::wait_time_after_completing);
        self.elapsed_since_end(now).is_some_and(|elapsed| elapsed >= wait)
    }
}

impl Drop for Assignment {
    fn drop(&mut self) {
        self.release_slot();
    }
}

impl fmt::Display for Assignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let step_number = self.objective.as_ref().map_or(0, |o| o.step_number(self.step));
        let objective = self.objective.as_ref().map_or("???", |o| o.name());
        let quest = self.quest.as_ref().map_or("???", |q| q.name());
        write!(f, "Step #{step_number} for objective {objective} in quest {quest}")
    }
}

impl fmt::Debug for Assignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Assignment")
            .field("agent", &self.agent)
            .field("quest", &self.quest.as_ref().map(|q| q.id()))
            .field("objective", &self.objective.as_ref().map(|o| o.id()))
            .field("step", &self.step)
            .field("status", &self.status)
            .field("start_time", &self.start_time)
            .field("end_time", &self.end_time)
            .field("has_complete_path", &self.has_complete_path)
            .finish()
    }
}
