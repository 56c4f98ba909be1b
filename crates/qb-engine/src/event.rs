//! Signals raised by the gate chain.
//!
//! Latched conditions (impairment, combat search, stuck) raise their event
//! on the edge only, not on every tick the condition holds.  Every event is
//! also logged through `tracing` when it is raised.

use std::fmt;

use qb_core::{AgentId, Position};
use tracing::{debug, info, warn};

/// Why an agent is not fit to quest.  Checked in declaration order; the
/// first failing check names the impairment.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Impairment {
    NeedsHealing,
    NeedsToDrink,
    NeedsToEat,
    CannotHeal,
    Overweight,
}

impl fmt::Display for Impairment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Impairment::NeedsHealing => "needs to heal",
            Impairment::NeedsToDrink => "needs to drink",
            Impairment::NeedsToEat   => "needs to eat",
            Impairment::CannotHeal   => "cannot heal",
            Impairment::Overweight   => "overweight",
        };
        f.write_str(s)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum EngineEvent {
    /// Questing was switched off for good because the agent joined a group.
    FollowingLeader { leader: AgentId },
    /// Questing was switched off for good because the agent wants to leave.
    WantsToExtract,

    Impaired(Impairment),
    /// First able-bodied tick after an impairment.
    Recovered,

    /// Combat memory says to hold and search for `search_secs`.
    CombatSearchStarted { search_secs: f64 },

    LootSearchStarted,
    LootFound,
    /// Looting ended; `search_secs` is the time spent searching for loot.
    DoneLooting { search_secs: f64 },

    /// The agent arrived at the current step (zero-based `step`).
    StepReached { step: usize },
    /// Moved on to `step` after dwelling `dwell_secs` at the previous one.
    StepAdvanced { step: usize, dwell_secs: f64 },

    /// No progress for the stuck-detection window.  `path` is the route the
    /// agent was following, if the movement collaborator had one.
    Stuck { path: Option<Vec<Position>> },
}

impl EngineEvent {
    pub(crate) fn log(&self, agent: AgentId) {
        match self {
            EngineEvent::FollowingLeader { leader } => {
                info!(%agent, %leader, "following leader; questing disabled");
            }
            EngineEvent::WantsToExtract => info!(%agent, "wants to extract; questing disabled"),
            EngineEvent::Impaired(why) => info!(%agent, reason = %why, "cannot quest"),
            EngineEvent::Recovered => info!(%agent, "able to quest again"),
            EngineEvent::CombatSearchStarted { search_secs } => {
                debug!(%agent, search_secs, "searching for enemy");
            }
            EngineEvent::LootSearchStarted => debug!(%agent, "searching for loot"),
            EngineEvent::LootFound => debug!(%agent, "found loot"),
            EngineEvent::DoneLooting { search_secs } => {
                debug!(%agent, search_secs, "done looting");
            }
            EngineEvent::StepReached { step } => debug!(%agent, step, "reached step"),
            EngineEvent::StepAdvanced { step, dwell_secs } => {
                debug!(%agent, step, dwell_secs, "advanced to next step");
            }
            EngineEvent::Stuck { path } => match path {
                Some(corners) => {
                    let corners: Vec<String> = corners.iter().map(ToString::to_string).collect();
                    warn!(%agent, path = %corners.join(" -> "), "stuck");
                }
                None => warn!(%agent, "stuck with no path"),
            },
        }
    }
}
