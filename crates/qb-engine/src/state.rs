//! Everything the engine remembers about one agent between ticks.

use qb_core::{AgentId, AgentRng, EngineConfig, Position, SimTime, Stopwatch};

use crate::ObjectiveTracker;

/// Loot sub-protocol memory (gate 6).
#[derive(Clone, Debug, Default)]
pub struct LootState {
    /// Time spent searching for loot, frozen while loot is picked up.
    pub(crate) search_timer:     Stopwatch,
    /// Minimum layer cooldown (seconds) used on the next check.
    pub(crate) next_check_delay: f32,
    pub(crate) was_looting:      bool,
    pub(crate) has_found_loot:   bool,
}

impl LootState {
    pub(crate) fn reset(&mut self) {
        self.search_timer.reset();
        self.was_looting = false;
        self.has_found_loot = false;
    }

    pub fn search_secs(&self, now: SimTime) -> f64 {
        self.search_timer.elapsed_secs(now)
    }

    pub fn is_looting(&self) -> bool {
        self.was_looting
    }

    pub fn has_found_loot(&self) -> bool {
        self.has_found_loot
    }

    pub fn next_check_delay(&self) -> f32 {
        self.next_check_delay
    }
}

/// Per-agent engine state.
///
/// Created by [`ObjectiveEngine::register`][crate::ObjectiveEngine::register]
/// and mutated only by that agent's own tick, so ticks for distinct agents
/// may run in parallel.
pub struct AgentState {
    pub(crate) agent:   AgentId,
    pub(crate) tracker: ObjectiveTracker,
    pub(crate) rng:     AgentRng,

    // ── Pause window (gate 4) ─────────────────────────────────────────────
    pub(crate) pause_timer: Stopwatch,
    pub(crate) pause_secs:  f64,

    // ── Movement ──────────────────────────────────────────────────────────
    pub(crate) stuck_timer:   Stopwatch,
    pub(crate) last_position: Option<Position>,

    pub(crate) loot: LootState,

    /// Current post-combat search threshold, redrawn on every transition
    /// into searching.
    pub(crate) search_time_after_combat: f64,

    // ── Edge latches ──────────────────────────────────────────────────────
    pub(crate) was_searching_for_enemy: bool,
    pub(crate) was_able_bodied:         bool,
    pub(crate) was_stuck:               bool,
}

impl AgentState {
    pub fn new(agent: AgentId, seed: u64, config: &EngineConfig, now: SimTime) -> Self {
        Self {
            agent,
            tracker: ObjectiveTracker::new(now),
            rng: AgentRng::new(seed, agent),
            pause_timer: Stopwatch::started(now),
            pause_secs: 0.0,
            stuck_timer: Stopwatch::started(now),
            last_position: None,
            loot: LootState {
                next_check_delay: config.requirements.break_for_looting.min_time_between_looting_checks,
                ..LootState::default()
            },
            search_time_after_combat: config.search_time_after_combat.min,
            was_searching_for_enemy: false,
            was_able_bodied: true,
            was_stuck: false,
        }
    }

    #[inline]
    pub fn agent(&self) -> AgentId {
        self.agent
    }

    pub fn tracker(&self) -> &ObjectiveTracker {
        &self.tracker
    }

    pub fn tracker_mut(&mut self) -> &mut ObjectiveTracker {
        &mut self.tracker
    }

    pub fn loot(&self) -> &LootState {
        &self.loot
    }

    /// Seconds left in the current pause window.
    pub fn pause_remaining(&self, now: SimTime) -> f64 {
        (self.pause_secs - self.pause_timer.elapsed_secs(now)).max(0.0)
    }

    pub fn search_time_after_combat(&self) -> f64 {
        self.search_time_after_combat
    }

    pub fn is_searching_for_enemy(&self) -> bool {
        self.was_searching_for_enemy
    }

    pub fn is_able_bodied(&self) -> bool {
        self.was_able_bodied
    }

    pub fn is_stuck(&self) -> bool {
        self.was_stuck
    }

    pub fn time_since_progress(&self, now: SimTime) -> f64 {
        self.stuck_timer.elapsed_secs(now)
    }

    /// Reset movement tracking for a fresh assignment.
    pub(crate) fn restart_movement(&mut self, now: SimTime) {
        self.stuck_timer.restart(now);
        self.last_position = None;
        self.was_stuck = false;
    }
}
