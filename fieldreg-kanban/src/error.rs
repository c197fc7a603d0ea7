//! Error types for the pipeline engine

use fieldreg_backend::BackendError;
use fieldreg_fields::EntityKey;
use thiserror::Error;

/// Result type for pipeline operations
pub type Result<T> = std::result::Result<T, KanbanError>;

/// Shown when the server rejects a move without saying why
pub const GENERIC_MOVE_MESSAGE: &str = "Failed to move item";

/// Errors that can occur in pipeline operations
#[derive(Debug, Error)]
pub enum KanbanError {
    /// The board could not be fetched
    #[error("failed to load board for {key}: {source}")]
    Load {
        key: EntityKey,
        #[source]
        source: BackendError,
    },

    /// The server refused a stage change; the board has been resynced
    #[error("{message}")]
    MoveRejected {
        item_id: String,
        stage: String,
        message: String,
        #[source]
        source: BackendError,
    },

    /// The server refused a stage change and the resync failed too, so the
    /// board still shows the optimistic guess
    #[error("{message} (resync failed: {resync})")]
    ResyncFailed {
        item_id: String,
        stage: String,
        message: String,
        resync: BackendError,
    },

    /// Item not on the board
    #[error("item not found: {id}")]
    ItemNotFound { id: String },
}

impl KanbanError {
    pub(crate) fn rejected(item_id: &str, stage: &str, source: BackendError) -> Self {
        Self::MoveRejected {
            item_id: item_id.to_string(),
            stage: stage.to_string(),
            message: source.message_or(GENERIC_MOVE_MESSAGE),
            source,
        }
    }

    /// Check if this is a retryable error
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Load { source, .. } | Self::MoveRejected { source, .. } => source.is_retryable(),
            Self::ResyncFailed { .. } => true,
            Self::ItemNotFound { .. } => false,
        }
    }
}
