//! `qb-quest` — the goal model shared by every agent.
//!
//! # Crate layout
//!
//! | Module         | Contents                                                     |
//! |----------------|--------------------------------------------------------------|
//! | [`step`]       | `Step` — position plus post-completion wait                  |
//! | [`objective`]  | `Objective`, `AgentProfile`, `AssignRule`                    |
//! | [`quest`]      | `Quest`, `QuestSettings` — selection and per-agent bookkeeping |
//! | [`assignment`] | `Assignment`, `AssignmentStatus` — one agent's lifecycle record |
//! | [`registry`]   | `QuestRegistry` — the shared pool and quest-level selection  |
//! | [`error`]      | `QuestError`, `QuestResult<T>`                               |
//!
//! # Sharing model
//!
//! Quests and objectives are handed out as `Arc`s.  A quest's per-agent
//! bookkeeping sits behind its own `RwLock`, so any number of agents can
//! query a quest concurrently while mutations of that quest serialize.
//! Objectives only track which agents currently occupy them.

pub mod assignment;
pub mod error;
pub mod objective;
pub mod quest;
pub mod registry;
pub mod step;

#[cfg(test)]
mod tests;

pub use assignment::{Assignment, AssignmentStatus};
pub use error::{QuestError, QuestResult};
pub use objective::{AgentProfile, AssignRule, Objective};
pub use quest::{Quest, QuestSettings};
pub use registry::{QuestRegistry, Selection};
pub use step::Step;
