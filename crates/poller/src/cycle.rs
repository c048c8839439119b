//! One fetch-and-reconcile cycle
//!
//! Searches for videos published within the overlap window and upserts them
//! by `video_id`. Key rotation on quota exhaustion is a bounded loop: at most
//! one attempt per key in the pool.

use std::sync::Arc;

use chrono::Duration;
use common::Clock;
use key_pool::CredentialPool;
use provider::{FetchedVideo, SearchOrder, SearchProvider, SearchRequest};
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use video_store::VideoRepository;

use crate::error::{CycleError, Result};

/// How far back each search reaches. Consecutive ticks overlap so videos
/// indexed late are still picked up.
pub const OVERLAP_WINDOW_SECS: i64 = 3600;

/// Outcome counts of a successful cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CycleReport {
    pub fetched: usize,
    pub created: usize,
    pub updated: usize,
    pub failed: usize,
}

enum Upserted {
    Created,
    Updated,
}

/// Everything a cycle needs: key pool, search provider, repository and the
/// search parameters.
pub struct FetchCycle {
    pool: Arc<CredentialPool>,
    provider: Arc<dyn SearchProvider>,
    repository: Arc<dyn VideoRepository>,
    clock: Arc<dyn Clock>,
    query: String,
    max_results: u32,
}

impl FetchCycle {
    pub fn new(
        pool: Arc<CredentialPool>,
        provider: Arc<dyn SearchProvider>,
        repository: Arc<dyn VideoRepository>,
        clock: Arc<dyn Clock>,
        query: impl Into<String>,
        max_results: u32,
    ) -> Self {
        Self {
            pool,
            provider,
            repository,
            clock,
            query: query.into(),
            max_results,
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn max_results(&self) -> u32 {
        self.max_results
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    /// Run one cycle. `token` is checked between steps; a call already in
    /// flight completes before cancellation is observed.
    pub async fn run(&self, token: &CancellationToken) -> Result<CycleReport> {
        let published_after =
            (self.clock.now() - Duration::seconds(OVERLAP_WINDOW_SECS)).naive_utc();
        let request = SearchRequest::new(self.query.clone(), self.max_results)
            .published_after(published_after)
            .order(SearchOrder::Date);

        let videos = self.fetch(&request, token).await?;
        self.reconcile(videos, token).await
    }

    /// Search with key rotation.
    ///
    /// A quota error marks the key exhausted and moves on to the next one.
    /// Any other provider error ends the cycle.
    async fn fetch(
        &self,
        request: &SearchRequest,
        token: &CancellationToken,
    ) -> Result<Vec<FetchedVideo>> {
        let mut quota_hits = 0usize;

        for attempt in 1..=self.pool.len() {
            if token.is_cancelled() {
                return Err(CycleError::Cancelled);
            }

            let Some(selected) = self.pool.next_available().await else {
                return Err(if quota_hits > 0 {
                    CycleError::QuotaRetriesExhausted {
                        attempts: quota_hits,
                    }
                } else {
                    CycleError::NoCredentials
                });
            };

            match self.provider.search(selected.key.expose(), request).await {
                Ok(videos) => {
                    debug!(
                        key_suffix = %selected.suffix,
                        attempt,
                        count = videos.len(),
                        "search succeeded"
                    );
                    return Ok(videos);
                }
                Err(e) if e.is_quota_exceeded() => {
                    warn!(
                        key_suffix = %selected.suffix,
                        attempt,
                        error = %e,
                        "quota exceeded, rotating API key"
                    );
                    self.pool.mark_exhausted(selected.key.expose()).await;
                    quota_hits += 1;
                }
                Err(e) => return Err(CycleError::Provider(e)),
            }
        }

        Err(CycleError::QuotaRetriesExhausted {
            attempts: quota_hits,
        })
    }

    /// Upsert each video by key. A storage failure skips that record and the
    /// batch continues.
    pub async fn reconcile(
        &self,
        videos: Vec<FetchedVideo>,
        token: &CancellationToken,
    ) -> Result<CycleReport> {
        let mut report = CycleReport {
            fetched: videos.len(),
            ..Default::default()
        };

        for video in videos {
            if token.is_cancelled() {
                return Err(CycleError::Cancelled);
            }

            let video_id = video.video_id.clone();
            match self.upsert(video).await {
                Ok(Upserted::Created) => report.created += 1,
                Ok(Upserted::Updated) => report.updated += 1,
                Err(e) => {
                    warn!(video_id, error = %e, "failed to store video");
                    report.failed += 1;
                }
            }
        }

        info!(
            fetched = report.fetched,
            created = report.created,
            updated = report.updated,
            failed = report.failed,
            "reconcile complete"
        );
        Ok(report)
    }

    async fn upsert(&self, video: FetchedVideo) -> video_store::Result<Upserted> {
        let video_id = video.video_id.clone();
        if self.repository.find_by_key(&video_id).await?.is_some()
            && self.repository.update(&video_id, video.clone()).await?.is_some()
        {
            return Ok(Upserted::Updated);
        }
        self.repository.create(video).await?;
        Ok(Upserted::Created)
    }
}
