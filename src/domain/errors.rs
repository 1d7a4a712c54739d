use thiserror::Error;

/// Errors surfaced by the persistence layer.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("record not found")]
    NotFound,
    #[error("{0}")]
    Conflict(String),
    #[error("unexpected repository error: {0}")]
    Unexpected(String),
}

impl RepositoryError {
    pub fn conflict(message: impl Into<String>) -> Self {
        RepositoryError::Conflict(message.into())
    }

    pub fn unexpected(message: impl Into<String>) -> Self {
        RepositoryError::Unexpected(message.into())
    }
}
