use qb_core::{ObjectiveId, QbError, QuestId};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum QuestError {
    #[error("quest {0} is already registered")]
    DuplicateQuest(QuestId),

    #[error("objective {objective} already belongs to quest {quest}")]
    DuplicateObjective {
        quest:     QuestId,
        objective: ObjectiveId,
    },

    #[error(transparent)]
    Core(#[from] QbError),
}

pub type QuestResult<T> = Result<T, QuestError>;
