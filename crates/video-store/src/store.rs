//! In-memory video store with optional JSON file persistence
//!
//! Records live in a `HashMap` keyed by `video_id`. When a path is given,
//! every write is persisted with an atomic temp-file + rename. A tokio Mutex
//! serializes writes so the file always reflects a consistent snapshot.
//!
//! Writes are staged on a copy of the map and only committed once the file
//! write succeeds, so a failed persist leaves memory matching disk.
//!
//! Each write rewrites the whole file, so a tick costs one full-file write
//! per created or updated record. That is fine for the few thousand records
//! one search query accumulates; a larger catalogue wants a real database
//! behind `VideoRepository` rather than batching here.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::NaiveDateTime;
use common::Clock;
use provider::FetchedVideo;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::repository::{RepoFuture, StoredVideo, VideoFilter, VideoPage, VideoRepository};

/// `VideoRepository` backed by memory, optionally mirrored to a JSON file.
pub struct VideoStore {
    path: Option<PathBuf>,
    state: Mutex<HashMap<String, StoredVideo>>,
    clock: Arc<dyn Clock>,
}

impl VideoStore {
    /// Store that never touches disk.
    pub fn in_memory(clock: Arc<dyn Clock>) -> Self {
        Self {
            path: None,
            state: Mutex::new(HashMap::new()),
            clock,
        }
    }

    /// Load videos from the given file path.
    ///
    /// If the file doesn't exist, creates it as `{}`.
    pub async fn load(path: PathBuf, clock: Arc<dyn Clock>) -> Result<Self> {
        let state = if path.exists() {
            let contents = tokio::fs::read_to_string(&path)
                .await
                .map_err(|e| Error::Io(format!("reading video store file: {e}")))?;
            let videos: HashMap<String, StoredVideo> = serde_json::from_str(&contents)
                .map_err(|e| Error::Parse(format!("parsing video store file: {e}")))?;
            info!(path = %path.display(), videos = videos.len(), "loaded video store");
            videos
        } else {
            info!(path = %path.display(), "video store file not found, starting empty");
            let videos = HashMap::new();
            write_atomic(&path, &videos).await?;
            videos
        };

        Ok(Self {
            path: Some(path),
            state: Mutex::new(state),
            clock,
        })
    }

    fn now(&self) -> NaiveDateTime {
        self.clock.now().naive_utc()
    }

    async fn persist(&self, state: &HashMap<String, StoredVideo>) -> Result<()> {
        match &self.path {
            Some(path) => write_atomic(path, state).await,
            None => Ok(()),
        }
    }

    /// Persist `next` and swap it in. On error `state` is left untouched.
    async fn commit(
        &self,
        state: &mut HashMap<String, StoredVideo>,
        next: HashMap<String, StoredVideo>,
    ) -> Result<()> {
        self.persist(&next).await?;
        *state = next;
        Ok(())
    }

    async fn sorted(&self, filter: &VideoFilter) -> Vec<StoredVideo> {
        let state = self.state.lock().await;
        let mut videos: Vec<StoredVideo> =
            state.values().filter(|v| filter.matches(v)).cloned().collect();
        videos.sort_by(StoredVideo::newest_first);
        videos
    }
}

impl VideoRepository for VideoStore {
    fn create(&self, video: FetchedVideo) -> RepoFuture<'_, StoredVideo> {
        Box::pin(async move {
            let mut state = self.state.lock().await;
            if state.contains_key(&video.video_id) {
                return Err(Error::Duplicate(video.video_id));
            }

            let now = self.now();
            let stored = StoredVideo {
                video,
                created_at: now,
                updated_at: now,
            };
            let mut next = state.clone();
            next.insert(stored.video.video_id.clone(), stored.clone());
            self.commit(&mut state, next).await?;
            debug!(video_id = %stored.video.video_id, "created video");
            Ok(stored)
        })
    }

    fn find_by_key<'a>(&'a self, video_id: &'a str) -> RepoFuture<'a, Option<StoredVideo>> {
        Box::pin(async move { Ok(self.state.lock().await.get(video_id).cloned()) })
    }

    fn update<'a>(
        &'a self,
        video_id: &'a str,
        mut video: FetchedVideo,
    ) -> RepoFuture<'a, Option<StoredVideo>> {
        Box::pin(async move {
            let mut state = self.state.lock().await;
            let mut next = state.clone();
            let Some(stored) = next.get_mut(video_id) else {
                return Ok(None);
            };

            video.video_id = video_id.to_string();
            stored.video = video;
            stored.updated_at = self.now();
            let updated = stored.clone();
            self.commit(&mut state, next).await?;
            debug!(video_id, "updated video");
            Ok(Some(updated))
        })
    }

    fn list<'a>(
        &'a self,
        filter: &'a VideoFilter,
        page: u32,
        per_page: u32,
    ) -> RepoFuture<'a, VideoPage> {
        Box::pin(async move {
            let page = page.max(1);
            let per_page = per_page.max(1);
            let matching = self.sorted(filter).await;
            let total = matching.len();
            let total_pages = total.div_ceil(per_page as usize) as u32;
            let skip = (page as usize - 1).saturating_mul(per_page as usize);
            let videos = matching
                .into_iter()
                .skip(skip)
                .take(per_page as usize)
                .collect();

            Ok(VideoPage {
                videos,
                total,
                page,
                per_page,
                total_pages,
            })
        })
    }

    fn latest(&self, limit: usize) -> RepoFuture<'_, Vec<StoredVideo>> {
        Box::pin(async move {
            let mut videos = self.sorted(&VideoFilter::default()).await;
            videos.truncate(limit);
            Ok(videos)
        })
    }

    fn count(&self) -> RepoFuture<'_, usize> {
        Box::pin(async move { Ok(self.state.lock().await.len()) })
    }

    fn delete<'a>(&'a self, video_id: &'a str) -> RepoFuture<'a, bool> {
        Box::pin(async move {
            let mut state = self.state.lock().await;
            if !state.contains_key(video_id) {
                return Ok(false);
            }
            let mut next = state.clone();
            next.remove(video_id);
            self.commit(&mut state, next).await?;
            debug!(video_id, "deleted video");
            Ok(true)
        })
    }
}

/// Write videos to a file atomically.
///
/// Writes to a temporary file in the same directory, then renames it over
/// the target. This prevents corruption if the process crashes mid-write.
async fn write_atomic(path: &Path, data: &HashMap<String, StoredVideo>) -> Result<()> {
    let json = serde_json::to_string_pretty(data)
        .map_err(|e| Error::Parse(format!("serializing videos: {e}")))?;

    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    let tmp_path = dir.join(format!(".videos.tmp.{}", std::process::id()));

    tokio::fs::write(&tmp_path, json.as_bytes())
        .await
        .map_err(|e| Error::Io(format!("writing temp video store file: {e}")))?;

    tokio::fs::rename(&tmp_path, path)
        .await
        .map_err(|e| Error::Io(format!("renaming temp video store file: {e}")))?;

    debug!(path = %path.display(), videos = data.len(), "persisted video store");
    Ok(())
}
