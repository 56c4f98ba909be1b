//! The agent's current assignment and the clocks that pace it.

use std::collections::VecDeque;

use qb_core::{SimTime, Stopwatch};
use qb_quest::{Assignment, AssignmentStatus};

/// Archived assignments kept per agent.
const HISTORY_LEN: usize = 16;

/// Holds the agent's live [`Assignment`], a short history of retired ones,
/// and the timers gates 11 and 12 read.
#[derive(Debug)]
pub struct ObjectiveTracker {
    assignment:       Option<Assignment>,
    history:          VecDeque<Assignment>,
    questing_enabled: bool,
    /// Time since the objective or step last changed.
    changed:          Stopwatch,
    /// When the current step was reached, if it has been.
    reached_at:       Option<SimTime>,
    can_change:       bool,
}

impl ObjectiveTracker {
    pub fn new(now: SimTime) -> Self {
        Self {
            assignment:       None,
            history:          VecDeque::new(),
            questing_enabled: true,
            changed:          Stopwatch::started(now),
            reached_at:       None,
            can_change:       false,
        }
    }

    // ── Assignment handling ───────────────────────────────────────────────

    /// Replace the current assignment, retiring the old one.
    pub fn assign(&mut self, assignment: Assignment, now: SimTime) {
        self.retire();
        self.assignment = Some(assignment);
        self.changed.restart(now);
        self.reached_at = None;
    }

    /// Archive the current assignment (releasing its capacity slot) and move
    /// it into the history.
    pub fn retire(&mut self) -> Option<&Assignment> {
        let mut old = self.assignment.take()?;
        old.archive();
        if self.history.len() == HISTORY_LEN {
            self.history.pop_front();
        }
        self.history.push_back(old);
        self.history.back()
    }

    pub fn assignment(&self) -> Option<&Assignment> {
        self.assignment.as_ref()
    }

    pub fn assignment_mut(&mut self) -> Option<&mut Assignment> {
        self.assignment.as_mut()
    }

    /// Retired assignments, oldest first.
    pub fn history(&self) -> impl Iterator<Item = &Assignment> {
        self.history.iter()
    }

    // ── Questing switch ───────────────────────────────────────────────────

    pub fn is_questing_enabled(&self) -> bool {
        self.questing_enabled
    }

    /// Permanently switch questing off for this agent.
    pub fn stop_questing(&mut self) {
        self.questing_enabled = false;
    }

    /// Questing is on and the assignment is in a state the gate chain can
    /// drive: started and neither failed nor archived.
    pub fn is_active(&self) -> bool {
        self.questing_enabled
            && self.assignment.as_ref().is_some_and(|a| {
                a.is_started()
                    && !matches!(a.status(), AssignmentStatus::Failed | AssignmentStatus::Archived)
            })
    }

    // ── Step progress ─────────────────────────────────────────────────────

    pub fn can_reach(&self) -> bool {
        self.assignment.as_ref().is_some_and(|a| a.has_complete_path)
    }

    pub fn can_change_objective(&self) -> bool {
        self.can_change
    }

    pub(crate) fn set_can_change_objective(&mut self, value: bool) {
        self.can_change = value;
    }

    pub fn time_since_changing(&self, now: SimTime) -> f64 {
        self.changed.elapsed_secs(now)
    }

    pub fn is_reached(&self) -> bool {
        self.reached_at.is_some()
    }

    /// Seconds spent at the current step; zero until it is reached.
    pub fn time_at_objective(&self, now: SimTime) -> f64 {
        self.reached_at.map_or(0.0, |t| now.secs_since(t))
    }

    pub fn min_time_at_objective(&self) -> f64 {
        self.assignment
            .as_ref()
            .and_then(Assignment::objective)
            .map_or(0.0, |o| o.min_time_at_objective())
    }

    pub fn has_waited_long_enough_after_ending(&self, now: SimTime) -> bool {
        self.assignment
            .as_ref()
            .is_some_and(|a| a.has_waited_long_enough_after_ending(now))
    }

    /// Mark the current step reached and complete it.
    pub fn mark_reached(&mut self, now: SimTime) {
        if let Some(assignment) = self.assignment.as_mut() {
            assignment.complete(now);
        }
        self.reached_at = Some(now);
    }

    /// Move to the next step.  On success the step clocks restart.
    pub fn try_advance(&mut self, now: SimTime) -> bool {
        let advanced = self
            .assignment
            .as_mut()
            .is_some_and(|a| a.advance_step(now));
        if advanced {
            self.changed.restart(now);
            self.reached_at = None;
        }
        advanced
    }

    /// Give up on the current step and try the next one.  A step still in
    /// progress is completed first so the advance is allowed.
    pub fn skip_step(&mut self, now: SimTime) -> bool {
        if let Some(assignment) = self.assignment.as_mut() {
            if assignment.is_active() {
                assignment.complete(now);
            }
        }
        self.try_advance(now)
    }

    pub fn fail(&mut self, now: SimTime) {
        if let Some(assignment) = self.assignment.as_mut() {
            assignment.fail(now);
        }
    }
}
