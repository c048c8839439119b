//! Error types for fetch cycles

/// Why a fetch-and-reconcile cycle failed.
///
/// Per-record storage failures are not cycle errors; they are counted in
/// `CycleReport::failed`.
#[derive(Debug, thiserror::Error)]
pub enum CycleError {
    #[error("no API keys available")]
    NoCredentials,

    #[error("quota exceeded on {attempts} API key(s), none left to try")]
    QuotaRetriesExhausted { attempts: usize },

    #[error("search failed: {0}")]
    Provider(#[from] provider::Error),

    #[error("cycle cancelled")]
    Cancelled,
}

/// Result alias for cycle operations.
pub type Result<T> = std::result::Result<T, CycleError>;
