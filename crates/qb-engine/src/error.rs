use qb_core::{AgentId, QbError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("agent {0} is not registered with the engine")]
    NotRegistered(AgentId),

    #[error("assignment for {assigned} handed to agent {agent}")]
    WrongAgent {
        agent:    AgentId,
        assigned: AgentId,
    },

    #[error(transparent)]
    Core(#[from] QbError),
}

pub type EngineResult<T> = Result<T, EngineError>;
