//! Error types for repository operations

/// Errors from repository operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("video already exists: {0}")]
    Duplicate(String),

    #[error("I/O error: {0}")]
    Io(String),

    #[error("store file parse error: {0}")]
    Parse(String),
}

/// Result alias for repository operations.
pub type Result<T> = std::result::Result<T, Error>;
