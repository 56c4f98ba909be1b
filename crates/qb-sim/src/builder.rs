//! Fluent builder for constructing a [`Sim`].

use qb_core::{EngineConfig, SimConfig, SimRng, SimTime};
use qb_engine::{ObjectiveEngine, World};
use qb_quest::{AgentProfile, QuestRegistry};

use crate::{Sim, SimError, SimResult};

/// Fluent builder for [`Sim<W>`].
///
/// # Required inputs
///
/// - [`SimConfig`] — seed, tick length, total ticks
/// - [`EngineConfig`] — every gate threshold
/// - `W: World` — the host collaborators
///
/// # Optional inputs (have defaults)
///
/// | Method                 | Default                 |
/// |------------------------|-------------------------|
/// | `.agents(v)`           | No agents               |
/// | `.quests(r)`           | Empty `QuestRegistry`   |
/// | `.triggers_found(b)`   | `true`                  |
///
/// # Example
///
/// ```rust,ignore
/// let mut sim = SimBuilder::new(config, EngineConfig::default(), NoopWorld)
///     .agents(profiles)
///     .quests(registry)
///     .build()?;
/// sim.run(&mut NoopObserver)?;
/// ```
pub struct SimBuilder<W: World> {
    config:         SimConfig,
    engine_config:  EngineConfig,
    world:          W,
    agents:         Vec<AgentProfile>,
    quests:         Option<QuestRegistry>,
    triggers_found: bool,
}

impl<W: World> SimBuilder<W> {
    /// Create a builder with all required inputs.
    pub fn new(config: SimConfig, engine_config: EngineConfig, world: W) -> Self {
        Self {
            config,
            engine_config,
            world,
            agents:         vec![],
            quests:         None,
            triggers_found: true,
        }
    }

    /// Agents taking part.  Order does not matter; IDs must be unique.
    pub fn agents(mut self, agents: Vec<AgentProfile>) -> Self {
        self.agents = agents;
        self
    }

    pub fn quests(mut self, quests: QuestRegistry) -> Self {
        self.quests = Some(quests);
        self
    }

    /// Start with the global readiness flag cleared; no agent quests until
    /// the host sets `Sim::triggers_found`.
    pub fn triggers_found(mut self, found: bool) -> Self {
        self.triggers_found = found;
        self
    }

    /// Validate inputs, register every agent with the engine, and return a
    /// ready-to-run [`Sim`].
    pub fn build(self) -> SimResult<Sim<W>> {
        if self.config.tick_ms == 0 {
            return Err(SimError::Config("tick_ms must be non-zero".into()));
        }

        let mut agents = self.agents;
        agents.sort_unstable_by_key(|p| p.id);
        if let Some(pair) = agents.windows(2).find(|w| w[0].id == w[1].id) {
            return Err(SimError::DuplicateAgent(pair[0].id));
        }

        let mut engine = ObjectiveEngine::new(self.engine_config, self.config.seed)?;
        for profile in &agents {
            engine.register(profile.id, SimTime::ZERO);
        }

        Ok(Sim {
            clock:          self.config.make_clock(),
            rng:            SimRng::new(self.config.seed),
            config:         self.config,
            engine,
            quests:         self.quests.unwrap_or_default(),
            agents,
            world:          self.world,
            triggers_found: self.triggers_found,
        })
    }
}
