//! What one tick of the gate chain tells the caller to do.

use std::fmt;

use qb_core::AgentId;

use crate::EngineEvent;

/// The verdict of one tick.
#[derive(Clone, Debug, PartialEq)]
pub enum Decision {
    /// The engine must not drive this agent right now; let another behavior
    /// run.
    Inactive(InactiveReason),

    /// Keep moving toward the current step.
    Continue,

    /// Hold still.  `secs == 0.0` means "re-check on the next tick".
    Pause {
        secs:   f64,
        reason: PauseReason,
    },

    /// The current objective is finished or hopeless; the scheduler should
    /// pick another one.
    SwitchRequested(SwitchReason),
}

impl Decision {
    #[inline]
    pub fn is_inactive(&self) -> bool {
        matches!(self, Decision::Inactive(_))
    }

    #[inline]
    pub fn is_pause(&self) -> bool {
        matches!(self, Decision::Pause { .. })
    }

    pub fn pause_reason(&self) -> Option<PauseReason> {
        match self {
            Decision::Pause { reason, .. } => Some(*reason),
            _ => None,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum InactiveReason {
    /// Dead, despawned, no assignment or questing switched off.
    NotQuesting,
    FollowingLeader,
    /// The global readiness flag is not set yet.
    TriggersNotFound,
    /// A higher-priority exclusive layer wants the agent.
    ExclusiveLayer,
    WantsToExtract,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum PauseReason {
    /// Still inside the window set by an earlier pause.
    Cooldown,
    Looting,
    WaitingForFollowers,
    NotAbleBodied,
    SearchingForEnemy,
    /// No route to the current step and switching is not allowed yet.
    Unreachable,
    /// At the step's position, dwelling before moving on.
    AtObjective,
}

impl fmt::Display for PauseReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PauseReason::Cooldown            => "cooldown",
            PauseReason::Looting             => "looting",
            PauseReason::WaitingForFollowers => "waiting for followers",
            PauseReason::NotAbleBodied       => "not able-bodied",
            PauseReason::SearchingForEnemy   => "searching for enemy",
            PauseReason::Unreachable         => "unreachable",
            PauseReason::AtObjective         => "at objective",
        };
        f.write_str(s)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum SwitchReason {
    /// Every step of the objective has been reached.
    ObjectiveExhausted,
    /// No path to the current step once switching became allowed.
    Unreachable,
    /// Stuck at the last step, or a step that could not be skipped.
    Stuck,
}

impl fmt::Display for SwitchReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SwitchReason::ObjectiveExhausted => "objective exhausted",
            SwitchReason::Unreachable        => "unreachable",
            SwitchReason::Stuck              => "stuck",
        };
        f.write_str(s)
    }
}

/// One agent's decision plus every signal raised while reaching it.
#[derive(Clone, Debug, PartialEq)]
pub struct TickOutcome {
    pub agent:    AgentId,
    pub decision: Decision,
    pub events:   Vec<EngineEvent>,
}
