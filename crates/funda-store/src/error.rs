use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("unknown session: {session_id}")]
    UnknownSession { session_id: String },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
