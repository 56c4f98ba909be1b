//! Deterministic per-agent and process-wide RNG wrappers.
//!
//! # Determinism strategy
//!
//! Quest and objective selection draw from one `SimRng` owned by the
//! scheduler and passed down by `&mut`, so a fixed seed reproduces a whole
//! run.  Per-agent draws made inside an engine tick (the post-combat search
//! threshold) use an `AgentRng` seeded by:
//!
//!   seed = global_seed XOR (agent_id * MIXING_CONSTANT)
//!
//! The mixing constant is the 64-bit fractional part of the golden ratio, so
//! consecutive agent IDs land far apart in seed space and agents never share
//! RNG state.  Registering agents in a different order does not change any
//! individual agent's stream.

use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::AgentId;

/// 64-bit fractional golden-ratio constant for seed mixing.
const MIXING_CONSTANT: u64 = 0x9e37_79b9_7f4a_7c15;

// ── AgentRng ──────────────────────────────────────────────────────────────────

/// Per-agent deterministic RNG, owned by that agent's engine state.
pub struct AgentRng(SmallRng);

impl AgentRng {
    /// Seed deterministically from the run's global seed and an agent ID.
    pub fn new(global_seed: u64, agent: AgentId) -> Self {
        let seed = global_seed ^ (agent.0 as u64).wrapping_mul(MIXING_CONSTANT);
        AgentRng(SmallRng::seed_from_u64(seed))
    }

    /// Uniform draw of whole seconds in `[ceil(min), floor(max))`, so the
    /// result never falls below `min`.
    ///
    /// Ranges holding no whole second below `max` return `min` itself.
    pub fn whole_secs_between(&mut self, min: f64, max: f64) -> f64 {
        let (lo, hi) = (min.ceil() as i64, max.floor() as i64);
        if hi <= lo {
            return min;
        }
        self.0.gen_range(lo..hi) as f64
    }
}

// ── SimRng ────────────────────────────────────────────────────────────────────

/// Process-wide RNG for selection among quests and objectives.
///
/// Used only in the scheduler's sequential phase.
pub struct SimRng(SmallRng);

impl SimRng {
    pub fn new(seed: u64) -> Self {
        SimRng(SmallRng::seed_from_u64(seed))
    }

    /// `true` with probability `p` (clamped to [0, 1]).
    #[inline]
    pub fn gen_bool(&mut self, p: f64) -> bool {
        self.0.gen_bool(p.clamp(0.0, 1.0))
    }

    /// Choose a uniformly random element; `None` if the slice is empty.
    #[inline]
    pub fn choose<'a, T>(&mut self, slice: &'a [T]) -> Option<&'a T> {
        slice.choose(&mut self.0)
    }

    /// Shuffle a mutable slice in place.
    #[inline]
    pub fn shuffle<T>(&mut self, slice: &mut [T]) {
        slice.shuffle(&mut self.0);
    }
}
