//! `qb-engine` — the per-agent objective decision engine.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                          |
//! |---------------|-------------------------------------------------------------------|
//! | [`providers`] | Collaborator traits (`AgentBody`, `LayerRegistry`, …) and `World` |
//! | [`context`]   | `TickContext<'a>` — per-tick view shared by all agents            |
//! | [`noop`]      | `NoopWorld` — collaborators that never interfere                  |
//! | [`decision`]  | `Decision`, its reasons, and `TickOutcome`                        |
//! | [`event`]     | `EngineEvent`, `Impairment`                                       |
//! | [`tracker`]   | `ObjectiveTracker` — current assignment and step clocks           |
//! | [`state`]     | `AgentState` — timers and edge latches kept between ticks         |
//! | [`loot`]      | Loot-break sub-protocol (gate 6)                                  |
//! | [`engine`]    | `ObjectiveEngine` and the ordered gate chain                      |
//! | [`error`]     | `EngineError`, `EngineResult<T>`                                  |
//!
//! # Design notes
//!
//! A tick for one agent reads the shared collaborators through `&self` and
//! mutates only that agent's `AgentState`.  Ticks for distinct agents can
//! therefore run in parallel; see `qb-sim` for the two-phase loop that does
//! so and then applies the resulting decisions in ascending agent order.

pub mod context;
pub mod decision;
pub mod engine;
pub mod error;
pub mod event;
pub mod loot;
pub mod noop;
pub mod providers;
pub mod state;
pub mod tracker;


pub use context::TickContext;
pub use decision::{Decision, InactiveReason, PauseReason, SwitchReason, TickOutcome};
pub use engine::ObjectiveEngine;
pub use error::{EngineError, EngineResult};
pub use event::{EngineEvent, Impairment};
pub use noop::NoopWorld;
pub use providers::{
    AgentBody, BodyPart, CombatMemory, Layer, LayerRegistry, PathProvider, Ratio, SquadRegistry,
    ThreatMonitor, World,
};
pub use state::{AgentState, LootState};
pub use tracker::ObjectiveTracker;
