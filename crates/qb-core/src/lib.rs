//! `qb-core` — foundational types for the questing engine workspace.
//!
//! Every other `qb-*` crate depends on this one.  It has no `qb-*`
//! dependencies and only `rand` and `thiserror` externally, plus optional
//! `serde`.
//!
//! # What lives here
//!
//! | Module       | Contents                                                  |
//! |--------------|-----------------------------------------------------------|
//! | [`ids`]      | `AgentId`, `QuestId`, `ObjectiveId`                       |
//! | [`geo`]      | `Position`, euclidean distance                            |
//! | [`time`]     | `SimTime`, `SimClock`, `SimConfig`, `Stopwatch`           |
//! | [`rng`]      | `AgentRng` (per-agent), `SimRng` (process-wide)           |
//! | [`config`]   | `EngineConfig` and its threshold groups                   |
//! | [`error`]    | `QbError`, `QbResult`                                     |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types so the  |
//! |         | host can load configuration from its own file format.      |

pub mod config;
pub mod error;
pub mod geo;
pub mod ids;
pub mod rng;
pub mod time;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use config::{
    EngineConfig, FollowerDistance, LootBreak, MinMax, QuestingRequirements, StuckDetection,
};
pub use error::{QbError, QbResult};
pub use geo::Position;
pub use ids::{AgentId, ObjectiveId, QuestId};
pub use rng::{AgentRng, SimRng};
pub use time::{SimClock, SimConfig, SimTime, Stopwatch};
