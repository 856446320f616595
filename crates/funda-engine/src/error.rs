use thiserror::Error;

use funda_bedrock::error::BedrockError;
use funda_store::error::StorageError;

#[derive(Debug, Error)]
pub enum EngineError {
    /// Malformed turn input, rejected before any persistence.
    #[error("invalid turn: {0}")]
    InvalidTurn(String),

    /// The addressed session does not exist; sessions are never created
    /// implicitly.
    #[error("unknown session: {0}")]
    UnknownSession(String),

    /// The external model call errored or returned no usable text.
    /// Surfaced as one failure; retrying the turn is the caller's call.
    #[error("completion failed: {0}")]
    CompletionFailed(String),

    #[error("storage error: {0}")]
    Storage(String),
}

impl From<StorageError> for EngineError {
    fn from(e: StorageError) -> Self {
        match e {
            StorageError::UnknownSession { session_id } => {
                EngineError::UnknownSession(session_id)
            }
            other => EngineError::Storage(other.to_string()),
        }
    }
}

impl From<BedrockError> for EngineError {
    fn from(e: BedrockError) -> Self {
        EngineError::CompletionFailed(e.to_string())
    }
}
