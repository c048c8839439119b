//! Video repository keyed by YouTube video ID
//!
//! Fetched videos are reconciled into the repository by natural key: the
//! poller looks a video up by `video_id` and either updates it in place or
//! creates it. `created_at` is set once; `updated_at` moves on every write.
//!
//! `VideoStore` keeps records in memory and can persist them to a JSON file
//! with atomic temp-file + rename writes.

pub mod error;
pub mod repository;
pub mod store;

pub use error::{Error, Result};
pub use repository::{RepoFuture, StoredVideo, VideoFilter, VideoPage, VideoRepository};
pub use store::VideoStore;
