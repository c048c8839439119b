//! YouTube Data API v3 search client
//!
//! Implements `provider::SearchProvider` against the YouTube Data API. Each
//! search is a two-phase round trip:
//! 1. `search.list` returns matching video IDs (capped at 50 per call)
//! 2. `videos.list` returns snippet, statistics and content details for those IDs
//!
//! Responses are normalized into `provider::FetchedVideo`. A 403 whose body
//! reports quota exhaustion surfaces as `provider::Error::QuotaExceeded` so the
//! caller can rotate to another API key.

pub mod client;
pub mod constants;
pub mod quota;
pub mod wire;

pub use client::YouTubeClient;
pub use constants::*;
pub use quota::{classify_failure, is_quota_body};
