//! A passive world — every agent is healthy, alone, unthreatened and has no
//! competing layers.

use qb_core::{AgentId, Position, SimTime};

use crate::{
    AgentBody, BodyPart, CombatMemory, Layer, LayerRegistry, PathProvider, Ratio, SquadRegistry,
    ThreatMonitor,
};

/// Collaborators that never interfere with questing.
///
/// Every agent is active and standing at the origin, so with a `NoopWorld`
/// the gate chain only ever exercises the objective lifecycle gates.  Useful
/// as a placeholder in tests and for dry runs of a quest pool.
#[derive(Copy, Clone, Debug, Default)]
pub struct NoopWorld;

impl AgentBody for NoopWorld {
    fn is_active(&self, _agent: AgentId) -> bool {
        true
    }

    fn position(&self, _agent: AgentId) -> Position {
        Position::default()
    }

    fn hydration(&self, _agent: AgentId) -> Ratio {
        Ratio::full()
    }

    fn energy(&self, _agent: AgentId) -> Ratio {
        Ratio::full()
    }

    fn body_part_health(&self, _agent: AgentId, _part: BodyPart) -> Ratio {
        Ratio::full()
    }

    fn overweight(&self, _agent: AgentId) -> f32 {
        0.0
    }

    fn needs_first_aid(&self, _agent: AgentId) -> bool {
        false
    }

    fn needs_surgery(&self, _agent: AgentId) -> bool {
        false
    }
}

impl ThreatMonitor for NoopWorld {
    fn combat_memory(&self, _agent: AgentId) -> CombatMemory {
        CombatMemory::default()
    }
}

impl LayerRegistry for NoopWorld {
    fn can_layer_be_used(&self, _agent: AgentId, _layer: Layer) -> bool {
        false
    }

    fn is_layer_requested(&self, _agent: AgentId, _layer: Layer) -> bool {
        false
    }

    fn is_layer_active(&self, _agent: AgentId, _layer: Layer) -> bool {
        false
    }

    fn is_looting(&self, _agent: AgentId) -> bool {
        false
    }

    fn can_use_layer(&self, _agent: AgentId, _layer: Layer, _min_delay_secs: f32, _now: SimTime) -> bool {
        false
    }

    fn restart_can_use_timer(&self, _agent: AgentId, _layer: Layer, _now: SimTime) {}
}

impl SquadRegistry for NoopWorld {
    fn leader(&self, _agent: AgentId) -> Option<AgentId> {
        None
    }

    fn alive_followers(&self, _agent: AgentId) -> Vec<Position> {
        vec![]
    }

    fn register_follower(&self, _leader: AgentId, _follower: AgentId) {}
}

impl PathProvider for NoopWorld {
    fn current_path(&self, _agent: AgentId) -> Option<Vec<Position>> {
        None
    }
}
