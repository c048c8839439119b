//! Search provider abstraction for upstream video APIs
//!
//! Defines the `SearchProvider` trait that decouples the poller from any one
//! video API. A provider performs one search round trip with a caller-chosen
//! credential and returns normalized `FetchedVideo` records. Providers are
//! stateless with respect to credentials: rotation and quota bookkeeping live
//! in the key pool, which reacts to `Error::QuotaExceeded`.

pub mod request;
pub mod video;

pub use request::{MAX_RESULTS_PER_CALL, SearchOrder, SearchRequest};
pub use video::{FetchedVideo, Thumbnail, Thumbnails};

use std::future::Future;
use std::pin::Pin;

/// Errors from a search round trip.
///
/// Only `QuotaExceeded` is recoverable by the caller (rotate to another
/// credential). Every other variant is a provider failure for this cycle.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("quota exceeded: {0}")]
    QuotaExceeded(String),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("upstream returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed response: {0}")]
    Malformed(String),
}

impl Error {
    /// Whether the caller should mark the credential exhausted and rotate.
    pub fn is_quota_exceeded(&self) -> bool {
        matches!(self, Error::QuotaExceeded(_))
    }
}

/// Result alias for provider operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Boxed future returned by `SearchProvider` methods.
pub type SearchFuture<'a> = Pin<Box<dyn Future<Output = Result<Vec<FetchedVideo>>> + Send + 'a>>;

/// Abstraction over upstream video search APIs.
///
/// Uses `Pin<Box<dyn Future>>` return types for dyn-compatibility (`Arc<dyn SearchProvider>`).
pub trait SearchProvider: Send + Sync {
    /// Identifier for logging and status reporting (e.g. "youtube")
    fn id(&self) -> &str;

    /// Search for videos matching `request` and fetch their details using
    /// `credential`.
    ///
    /// Returns an empty list when nothing matches. Returns
    /// `Error::QuotaExceeded` when the upstream rejected the call because of
    /// this credential's rate limit.
    fn search<'a>(&'a self, credential: &'a str, request: &'a SearchRequest) -> SearchFuture<'a>;
}
