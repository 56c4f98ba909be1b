//! The `Sim` struct and its tick loop.

use std::sync::Arc;

use qb_core::{AgentId, SimClock, SimConfig, SimRng, SimTime};
use qb_engine::{
    Decision, InactiveReason, ObjectiveEngine, SwitchReason, TickContext, TickOutcome, World,
};
use qb_quest::{AgentProfile, Assignment, AssignmentStatus, Objective, Quest, QuestRegistry};
use tracing::{debug, info};

use crate::{SimObserver, SimResult};

// ── Sim ───────────────────────────────────────────────────────────────────────

/// The scheduler: owns the quest pool, the engine and the collaborators, and
/// drives the three-phase tick loop.
///
/// 1. **Assign** (sequential): every agent that still quests but holds no
///    live assignment gets a quest and objective from the registry.
/// 2. **Decide** (optionally parallel with the `parallel` feature): run
///    every agent's gate chain against one shared [`TickContext`].
/// 3. **Apply** (sequential, ascending `AgentId` for determinism):
///    - `Continue`         → a pending step becomes active.
///    - `SwitchRequested`  → book the objective as done for the agent, then
///                           pick the next objective (same quest first).
///    - `Inactive` after following a leader or choosing to extract → the
///                           agent leaves questing; see below.
///    - `Pause`/other `Inactive` → nothing; the engine already holds its timers.
///
/// An agent that leaves questing (leader, extraction, host switch-off, or a
/// body reported inactive) gives up its objective slot and is dropped from
/// every quest's active set.  Its blacklist entries stay.
///
/// Create via [`SimBuilder`][crate::SimBuilder].
pub struct Sim<W: World> {
    /// Run parameters (seed, tick length, total ticks).
    pub config: SimConfig,

    /// Simulation clock.  Its elapsed time doubles as elapsed raid time.
    pub clock: SimClock,

    /// Per-agent decision engine.
    pub engine: ObjectiveEngine,

    /// Every quest available in the run.
    pub quests: QuestRegistry,

    /// Agents taking part, sorted by ID.
    pub agents: Vec<AgentProfile>,

    /// Host collaborators.  Mutate between ticks to move the world along.
    pub world: W,

    /// Global readiness flag handed to every tick.
    pub triggers_found: bool,

    /// Selection RNG, used only in the sequential phases.
    pub rng: SimRng,
}

impl<W: World> Sim<W> {
    // ── Public API ────────────────────────────────────────────────────────

    /// Run the simulation from the current instant to `config.end_time()`.
    ///
    /// Calls observer hooks at every tick boundary.  Use
    /// [`NoopObserver`][crate::NoopObserver] if you don't need callbacks.
    pub fn run<O: SimObserver>(&mut self, observer: &mut O) -> SimResult<()> {
        while self.clock.now < self.config.end_time() {
            self.step(observer)?;
        }
        observer.on_sim_end(self.clock.now);
        Ok(())
    }

    /// Run exactly `n` ticks from the current instant (ignores `end_time`).
    ///
    /// Useful for tests and incremental stepping.
    pub fn run_ticks<O: SimObserver>(&mut self, n: u64, observer: &mut O) -> SimResult<()> {
        for _ in 0..n {
            self.step(observer)?;
        }
        Ok(())
    }

    pub fn profile(&self, agent: AgentId) -> Option<AgentProfile> {
        self.agents
            .binary_search_by_key(&agent, |p| p.id)
            .ok()
            .map(|i| self.agents[i])
    }

    /// The agent's live assignment, if any.
    pub fn assignment(&self, agent: AgentId) -> Option<&Assignment> {
        self.engine.agent(agent).ok()?.tracker().assignment()
    }

    // ── Core tick processing ──────────────────────────────────────────────

    fn step<O: SimObserver>(&mut self, observer: &mut O) -> SimResult<()> {
        let now = self.clock.now;
        observer.on_tick_start(now);
        let questing = self.process_tick(now, observer)?;
        observer.on_tick_end(now, questing);
        self.clock.advance();
        Ok(())
    }

    fn process_tick<O: SimObserver>(&mut self, now: SimTime, observer: &mut O) -> SimResult<usize> {
        // ── Phase 1: release, then hand out assignments ───────────────────
        //
        // Agents that are gone or no longer quest must not keep a slot.  Live
        // agents that still quest but hold nothing the gate chain can drive
        // get a new pick; a failed pick leaves the agent idle until the next
        // tick.
        let gone: Vec<AgentId> = self
            .agents
            .iter()
            .filter(|p| {
                self.engine.agent(p.id).is_ok_and(|s| {
                    s.tracker().assignment().is_some()
                        && (!s.tracker().is_questing_enabled() || !self.world.is_active(p.id))
                })
            })
            .map(|p| p.id)
            .collect();
        for agent in gone {
            self.disengage(agent)?;
        }

        let idle: Vec<AgentProfile> = self
            .agents
            .iter()
            .filter(|p| self.world.is_active(p.id))
            .filter(|p| {
                self.engine.agent(p.id).is_ok_and(|s| {
                    s.tracker().is_questing_enabled() && !s.tracker().is_active()
                })
            })
            .copied()
            .collect();
        for profile in idle {
            self.engine.agent_mut(profile.id)?.tracker_mut().retire();
            self.assign_from_registry(profile, now, observer)?;
        }

        // ── Phase 2: decisions ────────────────────────────────────────────
        let outcomes = self.compute_outcomes(now);

        // ── Phase 3: apply ────────────────────────────────────────────────
        //
        // Outcomes are sorted by AgentId.  Sequential application in this
        // order keeps quest bookkeeping and selection RNG draws deterministic
        // even when decisions were computed in parallel.
        let mut questing = 0;
        for outcome in outcomes {
            if !outcome.decision.is_inactive() {
                questing += 1;
            }
            self.apply_outcome(outcome, now, observer)?;
        }
        Ok(questing)
    }

    /// Run every registered agent's gate chain.
    ///
    /// With the `parallel` Cargo feature the chains run on Rayon's thread
    /// pool; each touches only its own `AgentState`.
    fn compute_outcomes(&mut self, now: SimTime) -> Vec<TickOutcome> {
        // Explicit field borrows so the borrow checker sees disjoint access.
        let ctx = TickContext::new(now, self.triggers_found, &self.world);
        let (config, states) = self.engine.split_mut();

        #[cfg(not(feature = "parallel"))]
        let mut outcomes: Vec<TickOutcome> =
            states.values_mut().map(|state| state.tick(config, &ctx)).collect();

        #[cfg(feature = "parallel")]
        let mut outcomes: Vec<TickOutcome> = {
            use rayon::prelude::*;

            states
                .par_iter_mut()
                .map(|(_, state)| state.tick(config, &ctx))
                .collect()
        };

        outcomes.sort_unstable_by_key(|o| o.agent);
        outcomes
    }

    fn apply_outcome<O: SimObserver>(
        &mut self,
        outcome:  TickOutcome,
        now:      SimTime,
        observer: &mut O,
    ) -> SimResult<()> {
        let agent = outcome.agent;
        for event in &outcome.events {
            observer.on_event(now, agent, event);
        }
        observer.on_decision(now, agent, &outcome.decision);

        match outcome.decision {
            Decision::Continue => {
                let tracker = self.engine.agent_mut(agent)?.tracker_mut();
                if let Some(assignment) = tracker.assignment_mut() {
                    if assignment.status() == AssignmentStatus::Pending {
                        assignment.begin();
                    }
                }
            }
            Decision::SwitchRequested(reason) => self.switch_objective(agent, reason, now, observer)?,
            Decision::Inactive(InactiveReason::FollowingLeader | InactiveReason::WantsToExtract) => {
                self.disengage(agent)?;
            }
            Decision::Pause { .. } | Decision::Inactive(_) => {}
        }
        Ok(())
    }

    // ── Assignment ────────────────────────────────────────────────────────

    /// Retire `agent`'s assignment, freeing its objective slot, and remove it
    /// from every quest's active set.
    fn disengage(&mut self, agent: AgentId) -> SimResult<()> {
        let tracker = self.engine.agent_mut(agent)?.tracker_mut();
        let Some(old) = tracker.retire() else {
            return Ok(());
        };
        info!(%agent, assignment = %old, "left questing");
        self.quests.stop_all_for_bot(agent);
        Ok(())
    }

    /// Close out the agent's current objective and find it another one.
    ///
    /// The objective is booked as done for the agent whatever the reason, so
    /// an unreachable or stuck objective is not offered to it again while it
    /// stays on the quest.
    fn switch_objective<O: SimObserver>(
        &mut self,
        agent:    AgentId,
        reason:   SwitchReason,
        now:      SimTime,
        observer: &mut O,
    ) -> SimResult<()> {
        let Some(profile) = self.profile(agent) else {
            return Ok(());
        };
        let tracker = self.engine.agent_mut(agent)?.tracker_mut();
        let current = tracker
            .assignment()
            .and_then(|a| Some((Arc::clone(a.quest()?), Arc::clone(a.objective()?))));
        tracker.retire();
        let Some((quest, objective)) = current else {
            return self.assign_from_registry(profile, now, observer);
        };

        info!(%agent, quest = %quest, objective = %objective, %reason, "switching objective");
        if reason == SwitchReason::ObjectiveExhausted {
            quest.start_quest_for_bot(agent, now);
        }
        quest.complete_objective(agent, objective.id());

        if let Some(next) = quest.random_new_objective(&profile, now, &mut self.rng) {
            if self.start(agent, Arc::clone(&quest), next, now, observer)? {
                return Ok(());
            }
        }

        if quest.settings().is_repeatable {
            quest.stop_quest_for_bot(agent);
        } else {
            quest.blacklist_bot(agent);
        }
        debug!(%agent, quest = %quest, "done with quest");
        self.assign_from_registry(profile, now, observer)
    }

    fn assign_from_registry<O: SimObserver>(
        &mut self,
        profile:  AgentProfile,
        now:      SimTime,
        observer: &mut O,
    ) -> SimResult<()> {
        let elapsed = self.clock.elapsed_secs();
        let exclude_by_level = self.engine.config().requirements.exclude_bots_by_level;
        let Some((quest, objective)) =
            self.quests.select(&profile, elapsed, exclude_by_level, now, &mut self.rng)
        else {
            debug!(agent = %profile.id, "no quest available");
            return Ok(());
        };
        self.start(profile.id, quest, objective, now, observer)?;
        Ok(())
    }

    /// Build an assignment and hand it to the engine.  An objective with no
    /// first step bars the agent from that quest.
    fn start<O: SimObserver>(
        &mut self,
        agent:     AgentId,
        quest:     Arc<Quest>,
        objective: Arc<Objective>,
        now:       SimTime,
        observer:  &mut O,
    ) -> SimResult<bool> {
        let assignment =
            Assignment::for_objective(agent, Arc::clone(&quest), Arc::clone(&objective), now);
        if !assignment.is_started() {
            // A full objective only means someone else got there first.
            if objective.first_step_position().is_none() {
                quest.blacklist_bot(agent);
            }
            return Ok(false);
        }
        observer.on_assignment(agent, &assignment);
        self.engine.assign(agent, assignment, now)?;
        Ok(true)
    }
}
