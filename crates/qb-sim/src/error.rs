use qb_core::AgentId;
use qb_engine::EngineError;
use qb_quest::QuestError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("simulation configuration error: {0}")]
    Config(String),

    #[error("agent {0} listed more than once")]
    DuplicateAgent(AgentId),

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error(transparent)]
    Quest(#[from] QuestError),
}

pub type SimResult<T> = Result<T, SimError>;
