//! `ObjectiveEngine` — per-agent state plus the ordered gate chain.
//!
//! # Gate order
//!
//! Each tick evaluates these gates in order; the first one that returns
//! ends the tick.
//!
//! ```text
//!  1  liveness          Inactive(NotQuesting)
//!  2  following leader  Inactive(FollowingLeader), questing off for good
//!  3  readiness         Inactive(TriggersNotFound)
//!  4  pause window      Pause(Cooldown)
//!  5  stationary layer  Inactive(ExclusiveLayer)
//!  6  loot break        Pause(Looting)
//!  7  extraction        Inactive(WantsToExtract), questing off for good
//!  8  followers         Pause(WaitingForFollowers)
//!  9  able-bodied       Pause(NotAbleBodied)
//! 10  combat search     Pause(SearchingForEnemy)
//! 11  step lifecycle    Pause(Unreachable) | SwitchRequested
//! 12  reach / stuck     Pause(AtObjective) | Continue | SwitchRequested(Stuck)
//! ```
//!
//! Every gate that pauses restarts both the pause window and the stuck
//! timer; the pause-window gate itself only reports the time left.

use std::collections::hash_map::Entry;

use qb_core::{AgentId, EngineConfig, SimTime};
use qb_quest::Assignment;
use rustc_hash::FxHashMap;
use tracing::{debug, trace};

use crate::{
    AgentState, BodyPart, Decision, EngineError, EngineEvent, EngineResult, Impairment,
    InactiveReason, Layer, PauseReason, SwitchReason, TickContext, TickOutcome,
};

// ── ObjectiveEngine ───────────────────────────────────────────────────────────

/// Owns the configuration and every registered agent's [`AgentState`].
pub struct ObjectiveEngine {
    config: EngineConfig,
    seed:   u64,
    agents: FxHashMap<AgentId, AgentState>,
}

impl ObjectiveEngine {
    /// Validate `config` and build an engine with no agents.
    ///
    /// `seed` feeds each agent's private RNG.
    pub fn new(config: EngineConfig, seed: u64) -> EngineResult<Self> {
        config.validate()?;
        Ok(Self { config, seed, agents: FxHashMap::default() })
    }

    #[inline]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Start tracking `agent` with fresh state, replacing any previous state.
    pub fn register(&mut self, agent: AgentId, now: SimTime) -> &mut AgentState {
        debug!(%agent, "agent registered");
        let state = AgentState::new(agent, self.seed, &self.config, now);
        match self.agents.entry(agent) {
            Entry::Occupied(mut slot) => {
                slot.insert(state);
                slot.into_mut()
            }
            Entry::Vacant(slot) => slot.insert(state),
        }
    }

    /// Stop tracking `agent`.  Its assignment is archived as the state drops.
    pub fn deregister(&mut self, agent: AgentId) -> Option<AgentState> {
        let mut state = self.agents.remove(&agent)?;
        state.tracker.retire();
        debug!(%agent, "agent deregistered");
        Some(state)
    }

    pub fn is_registered(&self, agent: AgentId) -> bool {
        self.agents.contains_key(&agent)
    }

    pub fn agent(&self, agent: AgentId) -> EngineResult<&AgentState> {
        self.agents.get(&agent).ok_or(EngineError::NotRegistered(agent))
    }

    pub fn agent_mut(&mut self, agent: AgentId) -> EngineResult<&mut AgentState> {
        self.agents.get_mut(&agent).ok_or(EngineError::NotRegistered(agent))
    }

    /// Registered agents in ascending ID order.
    pub fn agent_ids(&self) -> Vec<AgentId> {
        let mut ids: Vec<AgentId> = self.agents.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    /// Borrow the configuration and the agent table together so callers can
    /// tick several agents at once (e.g. with `rayon`).
    pub fn split_mut(&mut self) -> (&EngineConfig, &mut FxHashMap<AgentId, AgentState>) {
        (&self.config, &mut self.agents)
    }

    /// Hand `agent` a new assignment, retiring the current one.
    pub fn assign(&mut self, agent: AgentId, assignment: Assignment, now: SimTime) -> EngineResult<()> {
        if assignment.agent() != agent {
            return Err(EngineError::WrongAgent { agent, assigned: assignment.agent() });
        }
        let state = self.agent_mut(agent)?;
        debug!(%agent, %assignment, "assigned");
        state.tracker.assign(assignment, now);
        state.restart_movement(now);
        Ok(())
    }

    /// Evaluate the gate chain once for `agent`.
    pub fn tick(&mut self, agent: AgentId, ctx: &TickContext<'_>) -> EngineResult<TickOutcome> {
        let state = self
            .agents
            .get_mut(&agent)
            .ok_or(EngineError::NotRegistered(agent))?;
        Ok(state.tick(&self.config, ctx))
    }
}

// ── Gate chain ────────────────────────────────────────────────────────────────

/// Result of the stuck check in gate 12.
enum Progress {
    Moving,
    SkippedStep,
    GaveUp,
}

impl AgentState {
    /// Evaluate the gate chain once.  Touches only this agent's state and the
    /// shared collaborators.
    pub fn tick(&mut self, config: &EngineConfig, ctx: &TickContext<'_>) -> TickOutcome {
        let mut events = Vec::new();
        let decision = self.evaluate(config, ctx, &mut events);
        trace!(agent = %self.agent, ?decision, "tick");
        TickOutcome { agent: self.agent, decision, events }
    }

    fn evaluate(
        &mut self,
        config: &EngineConfig,
        ctx:    &TickContext<'_>,
        events: &mut Vec<EngineEvent>,
    ) -> Decision {
        let agent = self.agent;
        let now = ctx.now;

        // 1
        if !ctx.body.is_active(agent) || !self.tracker.is_active() {
            return Decision::Inactive(InactiveReason::NotQuesting);
        }

        // 2
        if let Some(leader) = ctx.squads.leader(agent) {
            ctx.squads.register_follower(leader, agent);
            self.tracker.stop_questing();
            self.emit(events, EngineEvent::FollowingLeader { leader });
            return Decision::Inactive(InactiveReason::FollowingLeader);
        }

        // 3
        if !ctx.triggers_found {
            return Decision::Inactive(InactiveReason::TriggersNotFound);
        }

        // 4
        let paused_for = self.pause_timer.elapsed_secs(now);
        if paused_for < self.pause_secs {
            return Decision::Pause {
                secs:   self.pause_secs - paused_for,
                reason: PauseReason::Cooldown,
            };
        }

        // 5
        if ctx.layers.can_layer_be_used(agent, Layer::StationaryWeapon)
            && ctx.layers.is_layer_requested(agent, Layer::StationaryWeapon)
        {
            return Decision::Inactive(InactiveReason::ExclusiveLayer);
        }

        // 6
        if self.should_check_for_loot(config, ctx, events) {
            let secs = config.requirements.break_for_looting.max_time_to_start_looting;
            return self.pause(now, secs, PauseReason::Looting);
        }

        // 7
        if ctx.layers.can_layer_be_used(agent, Layer::Extract)
            && (ctx.layers.is_layer_active(agent, Layer::Extract)
                || ctx.layers.is_layer_requested(agent, Layer::Extract))
        {
            self.tracker.stop_questing();
            self.emit(events, EngineEvent::WantsToExtract);
            return Decision::Inactive(InactiveReason::WantsToExtract);
        }

        // 8
        if self.should_wait_for_followers(config, ctx) {
            return self.pause(now, config.follower_wait_secs, PauseReason::WaitingForFollowers);
        }

        // 9
        if let Some(impairment) = impairment(agent, config, ctx) {
            if self.was_able_bodied {
                self.emit(events, EngineEvent::Impaired(impairment));
            }
            self.was_able_bodied = false;
            return self.pause(now, 0.0, PauseReason::NotAbleBodied);
        }
        if !self.was_able_bodied {
            self.emit(events, EngineEvent::Recovered);
        }
        self.was_able_bodied = true;

        // 10
        if self.should_search_for_enemy(ctx) {
            if !self.was_searching_for_enemy {
                let range = config.search_time_after_combat;
                self.search_time_after_combat = self.rng.whole_secs_between(range.min, range.max);
                let search_secs = self.search_time_after_combat;
                self.emit(events, EngineEvent::CombatSearchStarted { search_secs });
            }
            self.was_searching_for_enemy = true;
            return self.pause(now, 0.0, PauseReason::SearchingForEnemy);
        }
        self.was_searching_for_enemy = false;

        // 11
        let can_change =
            self.tracker.time_since_changing(now) > config.min_time_between_switching_objectives;
        self.tracker.set_can_change_objective(can_change);
        let can_reach = self.tracker.can_reach();
        if !can_reach && !can_change {
            return self.pause(now, 0.0, PauseReason::Unreachable);
        }
        if can_change && self.tracker.is_reached() {
            let dwell_secs = self.tracker.time_at_objective(now);
            if dwell_secs > self.tracker.min_time_at_objective()
                && self.tracker.has_waited_long_enough_after_ending(now)
            {
                if !self.tracker.try_advance(now) {
                    return Decision::SwitchRequested(SwitchReason::ObjectiveExhausted);
                }
                self.restart_movement(now);
                let step = self.current_step_index();
                self.emit(events, EngineEvent::StepAdvanced { step, dwell_secs });
            }
        }
        if !can_reach && !self.tracker.is_reached() {
            self.tracker.fail(now);
            return Decision::SwitchRequested(SwitchReason::Unreachable);
        }

        // 12
        if self.tracker.is_reached() {
            return self.pause(now, 0.0, PauseReason::AtObjective);
        }
        let Some(target) = self.tracker.assignment().and_then(Assignment::position) else {
            self.tracker.fail(now);
            return Decision::SwitchRequested(SwitchReason::Unreachable);
        };
        if ctx.body.position(agent).within(target, config.objective_reach_distance) {
            self.tracker.mark_reached(now);
            let step = self.current_step_index();
            self.emit(events, EngineEvent::StepReached { step });
            return self.pause(now, 0.0, PauseReason::AtObjective);
        }
        match self.check_progress(config, ctx, events) {
            Progress::GaveUp => Decision::SwitchRequested(SwitchReason::Stuck),
            Progress::Moving | Progress::SkippedStep => Decision::Continue,
        }
    }

    // ── Helpers ───────────────────────────────────────────────────────────

    pub(crate) fn emit(&self, events: &mut Vec<EngineEvent>, event: EngineEvent) {
        event.log(self.agent);
        events.push(event);
    }

    fn pause(&mut self, now: SimTime, secs: f64, reason: PauseReason) -> Decision {
        self.pause_secs = secs;
        self.pause_timer.restart(now);
        self.stuck_timer.restart(now);
        Decision::Pause { secs, reason }
    }

    fn current_step_index(&self) -> usize {
        self.tracker
            .assignment()
            .and_then(Assignment::step_index)
            .unwrap_or_default()
    }

    fn should_wait_for_followers(&self, config: &EngineConfig, ctx: &TickContext<'_>) -> bool {
        let followers = ctx.squads.alive_followers(self.agent);
        if followers.is_empty() {
            return false;
        }
        let me = ctx.body.position(self.agent);
        let limits = config.requirements.max_follower_distance;
        let too_far = followers.iter().any(|f| f.distance(me) > limits.furthest);
        let none_near = followers.iter().all(|f| f.distance(me) > limits.nearest);
        too_far || none_near
    }

    fn should_search_for_enemy(&self, ctx: &TickContext<'_>) -> bool {
        let memory = ctx.threats.combat_memory(self.agent);
        if memory.has_close_danger {
            return true;
        }
        let recent = |t: Option<SimTime>| {
            t.is_some_and(|t| ctx.now.secs_since(t) < self.search_time_after_combat)
        };
        recent(memory.last_time_hit)
            || recent(memory.enemy_set_time)
            || recent(memory.last_enemy_seen)
            || recent(memory.under_fire_time)
    }

    /// Stuck detection.  The timer restarts whenever the agent has moved more
    /// than the threshold from the last recorded position.
    fn check_progress(
        &mut self,
        config: &EngineConfig,
        ctx:    &TickContext<'_>,
        events: &mut Vec<EngineEvent>,
    ) -> Progress {
        let now = ctx.now;
        let pos = ctx.body.position(self.agent);
        let last = *self.last_position.get_or_insert(pos);
        if last.distance(pos) > config.stuck_detection.distance {
            self.last_position = Some(pos);
            self.stuck_timer.restart(now);
        }

        if self.stuck_timer.elapsed_secs(now) <= config.stuck_detection.time {
            self.was_stuck = false;
            return Progress::Moving;
        }

        if !self.was_stuck {
            let path = ctx.paths.current_path(self.agent);
            self.emit(events, EngineEvent::Stuck { path });
        }
        self.was_stuck = true;

        if self.tracker.skip_step(now) {
            self.stuck_timer.restart(now);
            self.last_position = Some(pos);
            return Progress::SkippedStep;
        }
        self.tracker.fail(now);
        Progress::GaveUp
    }
}

/// First failing able-bodied check, if any.
fn impairment(agent: AgentId, config: &EngineConfig, ctx: &TickContext<'_>) -> Option<Impairment> {
    let req = &config.requirements;
    if ctx.body.needs_first_aid(agent) || ctx.body.needs_surgery(agent) {
        return Some(Impairment::NeedsHealing);
    }
    if ctx.body.hydration(agent).percent() < req.min_hydration {
        return Some(Impairment::NeedsToDrink);
    }
    if ctx.body.energy(agent).percent() < req.min_energy {
        return Some(Impairment::NeedsToEat);
    }
    let floor = |part: BodyPart| match part {
        BodyPart::Head                        => req.min_health_head,
        BodyPart::Chest                       => req.min_health_chest,
        BodyPart::Stomach                     => req.min_health_stomach,
        BodyPart::LeftLeg | BodyPart::RightLeg => req.min_health_legs,
    };
    if BodyPart::ALL
        .iter()
        .any(|&part| ctx.body.body_part_health(agent, part).percent() < floor(part))
    {
        return Some(Impairment::CannotHeal);
    }
    if 100.0 * ctx.body.overweight(agent) > req.max_overweight_percentage {
        return Some(Impairment::Overweight);
    }
    None
}
