//! Repository trait and record types

use std::cmp::Ordering;
use std::future::Future;
use std::pin::Pin;

use chrono::NaiveDateTime;
use provider::FetchedVideo;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// A persisted video: the fetched fields plus bookkeeping timestamps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredVideo {
    #[serde(flatten)]
    pub video: FetchedVideo,
    /// Set on create, never changed.
    pub created_at: NaiveDateTime,
    /// Set on create and on every update.
    pub updated_at: NaiveDateTime,
}

impl StoredVideo {
    pub fn video_id(&self) -> &str {
        &self.video.video_id
    }

    /// Newest first; ties broken by `video_id` so order is stable.
    pub fn newest_first(a: &StoredVideo, b: &StoredVideo) -> Ordering {
        b.video
            .published_at
            .cmp(&a.video.published_at)
            .then_with(|| a.video.video_id.cmp(&b.video.video_id))
    }
}

/// Filters for `list`. All set fields must match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VideoFilter {
    /// Case-insensitive substring over title, description and channel title.
    pub search: Option<String>,
    pub channel_id: Option<String>,
    /// Inclusive lower bound on `published_at`.
    pub published_after: Option<NaiveDateTime>,
    /// Inclusive upper bound on `published_at`.
    pub published_before: Option<NaiveDateTime>,
}

impl VideoFilter {
    pub fn matches(&self, stored: &StoredVideo) -> bool {
        let video = &stored.video;

        if self
            .channel_id
            .as_ref()
            .is_some_and(|channel_id| &video.channel_id != channel_id)
        {
            return false;
        }
        if self
            .published_after
            .is_some_and(|after| video.published_at < after)
        {
            return false;
        }
        if self
            .published_before
            .is_some_and(|before| video.published_at > before)
        {
            return false;
        }
        if let Some(search) = &self.search {
            let needle = search.to_lowercase();
            let hit = [&video.title, &video.description, &video.channel_title]
                .iter()
                .any(|field| field.to_lowercase().contains(&needle));
            if !hit {
                return false;
            }
        }
        true
    }
}

/// One page of `list` results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VideoPage {
    pub videos: Vec<StoredVideo>,
    pub total: usize,
    pub page: u32,
    pub per_page: u32,
    pub total_pages: u32,
}

/// Boxed future returned by `VideoRepository` methods.
pub type RepoFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + Send + 'a>>;

/// Storage for fetched videos, keyed by `video_id`.
///
/// Uses `Pin<Box<dyn Future>>` return types for dyn-compatibility (`Arc<dyn VideoRepository>`).
pub trait VideoRepository: Send + Sync {
    /// Insert a new video. Fails with `Error::Duplicate` if the key exists.
    fn create(&self, video: FetchedVideo) -> RepoFuture<'_, StoredVideo>;

    fn find_by_key<'a>(&'a self, video_id: &'a str) -> RepoFuture<'a, Option<StoredVideo>>;

    /// Overwrite every field except the key and `created_at`, and refresh
    /// `updated_at`. Returns `None` if the key is unknown.
    fn update<'a>(
        &'a self,
        video_id: &'a str,
        video: FetchedVideo,
    ) -> RepoFuture<'a, Option<StoredVideo>>;

    /// Filtered page, newest first. `page` is 1-based.
    fn list<'a>(
        &'a self,
        filter: &'a VideoFilter,
        page: u32,
        per_page: u32,
    ) -> RepoFuture<'a, VideoPage>;

    /// The `limit` most recently published videos.
    fn latest(&self, limit: usize) -> RepoFuture<'_, Vec<StoredVideo>>;

    fn count(&self) -> RepoFuture<'_, usize>;

    /// Returns whether a record was removed.
    fn delete<'a>(&'a self, video_id: &'a str) -> RepoFuture<'a, bool>;
}
