//! Collaborator traits — everything the engine asks the host about.
//!
//! Every method is a cheap synchronous state query keyed by agent.  Methods
//! take `&self` so one world can be shared by ticks running on several
//! threads; implementations that need to record something (layer cooldowns,
//! follower registration) use interior mutability.
//!
//! Implement [`World`] by implementing the five traits below; the blanket
//! impl does the rest.  [`NoopWorld`][crate::NoopWorld] is a passive default.

use qb_core::{AgentId, Position, SimTime};

/// A `(current, maximum)` pair for a health or resource value.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Ratio {
    pub current: f32,
    pub maximum: f32,
}

impl Ratio {
    pub fn new(current: f32, maximum: f32) -> Self {
        Self { current, maximum }
    }

    pub fn full() -> Self {
        Self { current: 1.0, maximum: 1.0 }
    }

    /// `100 * current / maximum`.  A value with no maximum counts as full.
    pub fn percent(self) -> f32 {
        if self.maximum <= 0.0 {
            return 100.0;
        }
        100.0 * self.current / self.maximum
    }
}

/// Body parts with a questing health floor.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum BodyPart {
    Head,
    Chest,
    Stomach,
    LeftLeg,
    RightLeg,
}

impl BodyPart {
    pub const ALL: [BodyPart; 5] = [
        BodyPart::Head,
        BodyPart::Chest,
        BodyPart::Stomach,
        BodyPart::LeftLeg,
        BodyPart::RightLeg,
    ];
}

/// Liveness, position and health/resource state.
pub trait AgentBody: Send + Sync {
    /// Alive and in a state where behavior logic runs at all.
    fn is_active(&self, agent: AgentId) -> bool;
    fn position(&self, agent: AgentId) -> Position;
    fn hydration(&self, agent: AgentId) -> Ratio;
    fn energy(&self, agent: AgentId) -> Ratio;
    fn body_part_health(&self, agent: AgentId, part: BodyPart) -> Ratio;
    /// Encumbrance beyond the carry limit as a fraction (0.0 = not overweight).
    fn overweight(&self, agent: AgentId) -> f32;
    fn needs_first_aid(&self, agent: AgentId) -> bool;
    fn needs_surgery(&self, agent: AgentId) -> bool;
}

/// What an agent remembers about recent combat.  `None` means "never".
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct CombatMemory {
    pub last_time_hit:   Option<SimTime>,
    pub enemy_set_time:  Option<SimTime>,
    pub last_enemy_seen: Option<SimTime>,
    pub under_fire_time: Option<SimTime>,
    pub has_close_danger: bool,
}

pub trait ThreatMonitor: Send + Sync {
    fn combat_memory(&self, agent: AgentId) -> CombatMemory;
}

/// External behavior layers the engine has to coexist with.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Layer {
    /// Searches for and picks up loot.
    Looting,
    /// Takes the agent out of the simulation.
    Extract,
    /// Mans a stationary weapon; always has priority over questing.
    StationaryWeapon,
}

/// Registry of external behavior layers.
pub trait LayerRegistry: Send + Sync {
    /// The layer exists for this agent and is allowed to run.
    fn can_layer_be_used(&self, agent: AgentId, layer: Layer) -> bool;
    /// The layer asked to take over.
    fn is_layer_requested(&self, agent: AgentId, layer: Layer) -> bool;
    /// The layer is the agent's currently running layer.
    fn is_layer_active(&self, agent: AgentId, layer: Layer) -> bool;
    /// Loot is actually being picked up right now.
    fn is_looting(&self, agent: AgentId) -> bool;
    /// At least `min_delay_secs` have passed since the layer's reuse timer
    /// was last restarted.
    fn can_use_layer(&self, agent: AgentId, layer: Layer, min_delay_secs: f32, now: SimTime) -> bool;
    fn restart_can_use_timer(&self, agent: AgentId, layer: Layer, now: SimTime);
}

/// Leader/follower grouping.
pub trait SquadRegistry: Send + Sync {
    fn leader(&self, agent: AgentId) -> Option<AgentId>;
    /// Positions of the agent's followers that are still alive.
    fn alive_followers(&self, agent: AgentId) -> Vec<Position>;
    fn register_follower(&self, leader: AgentId, follower: AgentId);
}

/// Movement diagnostics.
pub trait PathProvider: Send + Sync {
    /// Corners of the path the agent is currently following.
    fn current_path(&self, agent: AgentId) -> Option<Vec<Position>>;
}

/// Every collaborator in one bound.
pub trait World: AgentBody + ThreatMonitor + LayerRegistry + SquadRegistry + PathProvider {}

impl<T> World for T where T: AgentBody + ThreatMonitor + LayerRegistry + SquadRegistry + PathProvider {}
