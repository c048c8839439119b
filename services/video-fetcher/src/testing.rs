//! Test doubles for handler and service tests

use std::sync::Arc;
use std::time::Duration;

use chrono::{NaiveDate, NaiveDateTime, TimeZone, Utc};
use common::{Clock, ManualClock};
use key_pool::CredentialPool;
use poller::{FetchCycle, Poller, PollerConfig};
use provider::{FetchedVideo, SearchFuture, SearchProvider, SearchRequest, Thumbnails};
use video_store::{VideoRepository, VideoStore};

use crate::service::AppServices;

pub fn manual_clock() -> Arc<ManualClock> {
    Arc::new(ManualClock::new(
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
    ))
}

pub fn at(day: u32, hour: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 5, day)
        .unwrap()
        .and_hms_opt(hour, 0, 0)
        .unwrap()
}

pub fn video(id: &str, published_at: NaiveDateTime) -> FetchedVideo {
    FetchedVideo {
        video_id: id.into(),
        title: format!("Video {id}"),
        description: "learn python the fun way".into(),
        published_at,
        channel_id: "UC1".into(),
        channel_title: "Tutorials".into(),
        thumbnails: Thumbnails::default(),
        duration: Some("PT10M".into()),
        view_count: 100,
        like_count: 10,
        comment_count: 1,
        tags: vec!["python".into()],
        category_id: Some("27".into()),
        language: Some("en".into()),
    }
}

/// Provider answering every search with the same result.
pub struct StubProvider {
    videos: Vec<FetchedVideo>,
    quota_exceeded: bool,
}

impl StubProvider {
    pub fn videos(ids: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            videos: ids.iter().map(|id| video(id, at(1, 11))).collect(),
            quota_exceeded: false,
        })
    }

    pub fn quota_exceeded() -> Arc<Self> {
        Arc::new(Self {
            videos: Vec::new(),
            quota_exceeded: true,
        })
    }
}

impl SearchProvider for StubProvider {
    fn id(&self) -> &str {
        "stub"
    }

    fn search<'a>(&'a self, _credential: &'a str, _request: &'a SearchRequest) -> SearchFuture<'a> {
        let result = if self.quota_exceeded {
            Err(provider::Error::QuotaExceeded("quotaExceeded".into()))
        } else {
            Ok(self.videos.clone())
        };
        Box::pin(async move { result })
    }
}

pub fn test_services(provider: Arc<dyn SearchProvider>, keys: &[&str]) -> AppServices {
    let clock = manual_clock();
    let clock_dyn: Arc<dyn Clock> = clock;
    let pool = Arc::new(
        CredentialPool::new(keys.iter().map(|k| k.to_string()).collect(), clock_dyn.clone())
            .unwrap(),
    );
    let repository: Arc<dyn VideoRepository> = Arc::new(VideoStore::in_memory(clock_dyn.clone()));
    let cycle = FetchCycle::new(
        pool.clone(),
        provider,
        repository.clone(),
        clock_dyn,
        "python programming",
        50,
    );
    let poller = Arc::new(Poller::new(
        cycle,
        PollerConfig {
            interval: Duration::from_secs(10),
        },
    ));
    AppServices::new(poller, pool, repository)
}

/// Services whose repository already holds `videos`.
pub async fn seeded_services(videos: Vec<FetchedVideo>) -> AppServices {
    let services = test_services(StubProvider::videos(&[]), &["key-aaaa"]);
    for video in videos {
        services.repository.create(video).await.unwrap();
    }
    services
}

pub async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}
