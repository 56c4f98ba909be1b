//! Workspace error type.
//!
//! Sub-crates define their own error enums and wrap `QbError` as one variant
//! via `#[from]`.  Gate outcomes are never errors; only configuration and
//! registry lookups fail.

use thiserror::Error;

use crate::QuestId;

/// The base error type for `qb-core` and a common variant for sub-crates.
#[derive(Debug, Error)]
pub enum QbError {
    #[error("quest {0} not found")]
    QuestNotFound(QuestId),

    #[error("configuration error: {0}")]
    Config(String),
}

/// Shorthand result type for all `qb-*` crates.
pub type QbResult<T> = Result<T, QbError>;
