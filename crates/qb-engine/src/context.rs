//! Per-tick view of the world passed to every gate.

use qb_core::SimTime;

use crate::{AgentBody, LayerRegistry, PathProvider, SquadRegistry, ThreatMonitor, World};

/// Everything one tick of the gate chain may consult.
///
/// Built once per tick by the caller and shared immutably by every agent
/// evaluated during that tick.  The collaborators are `Sync`, so the same
/// context may be read from several threads at once.
#[derive(Copy, Clone)]
pub struct TickContext<'a> {
    /// Current simulation time.
    pub now: SimTime,

    /// Global readiness flag: map data the engine depends on has been
    /// discovered.  No agent quests before this is set.
    pub triggers_found: bool,

    pub body:    &'a dyn AgentBody,
    pub threats: &'a dyn ThreatMonitor,
    pub layers:  &'a dyn LayerRegistry,
    pub squads:  &'a dyn SquadRegistry,
    pub paths:   &'a dyn PathProvider,
}

impl<'a> TickContext<'a> {
    /// Borrow every collaborator from one [`World`].
    #[inline]
    pub fn new<W: World>(now: SimTime, triggers_found: bool, world: &'a W) -> Self {
        Self {
            now,
            triggers_found,
            body:    world,
            threats: world,
            layers:  world,
            squads:  world,
            paths:   world,
        }
    }
}
