//! `qb-sim` — scheduler loop driving the objective engine.
//!
//! # Three-phase tick loop
//!
//! ```text
//! for each tick until config.end_time():
//!   ① Assign  — idle agents get a quest/objective from QuestRegistry::select.
//!   ② Decide  — run every agent's gate chain against one TickContext
//!               (parallel with the `parallel` feature).
//!   ③ Apply   — for each outcome in ascending AgentId order:
//!                 events             → SimObserver::on_event
//!                 Continue           → pending step becomes active
//!                 SwitchRequested(r) → book objective, pick the next one
//! ```
//!
//! # Cargo features
//!
//! | Feature    | Effect                                                 |
//! |------------|--------------------------------------------------------|
//! | `parallel` | Runs the decide phase on Rayon's thread pool.          |
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use qb_core::{EngineConfig, SimConfig};
//! use qb_engine::NoopWorld;
//! use qb_sim::{NoopObserver, SimBuilder};
//!
//! let mut sim = SimBuilder::new(config, EngineConfig::default(), NoopWorld)
//!     .agents(profiles)
//!     .quests(registry)
//!     .build()?;
//! sim.run(&mut NoopObserver)?;
//! ```

pub mod builder;
pub mod error;
pub mod observer;
pub mod sim;


pub use builder::SimBuilder;
pub use error::{SimError, SimResult};
pub use observer::{NoopObserver, SimObserver};
pub use sim::Sim;
