use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid grade: {0} (expected 1-12)")]
    InvalidGrade(u8),

    #[error("invalid subject: {0}")]
    InvalidSubject(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
