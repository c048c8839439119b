//! Test doubles shared by cycle and poller tests

use std::collections::{HashSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use common::{Clock, ManualClock};
use key_pool::CredentialPool;
use provider::{FetchedVideo, SearchFuture, SearchProvider, SearchRequest, Thumbnails};
use video_store::{RepoFuture, StoredVideo, VideoFilter, VideoPage, VideoRepository, VideoStore};

pub fn start_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
}

pub fn manual_clock() -> Arc<ManualClock> {
    Arc::new(ManualClock::new(start_time()))
}

pub fn pool(keys: &[&str], clock: Arc<dyn Clock>) -> Arc<CredentialPool> {
    Arc::new(CredentialPool::new(keys.iter().map(|k| k.to_string()).collect(), clock).unwrap())
}

pub fn video(id: &str) -> FetchedVideo {
    FetchedVideo {
        video_id: id.into(),
        title: format!("Video {id}"),
        description: "python tutorial".into(),
        published_at: NaiveDate::from_ymd_opt(2024, 5, 1)
            .unwrap()
            .and_hms_opt(11, 30, 0)
            .unwrap(),
        channel_id: "UC1".into(),
        channel_title: "Channel".into(),
        thumbnails: Thumbnails::default(),
        duration: None,
        view_count: 1,
        like_count: 0,
        comment_count: 0,
        tags: Vec::new(),
        category_id: None,
        language: None,
    }
}

pub fn videos(ids: &[&str]) -> Vec<FetchedVideo> {
    ids.iter().map(|id| video(id)).collect()
}

/// Provider that replays scripted responses in order, then returns an
/// empty result forever. Records the credential and request of every call.
#[derive(Default)]
pub struct ScriptedProvider {
    responses: Mutex<VecDeque<provider::Result<Vec<FetchedVideo>>>>,
    fallback: Mutex<Option<fn() -> provider::Result<Vec<FetchedVideo>>>>,
    calls: Mutex<Vec<(String, SearchRequest)>>,
}

impl ScriptedProvider {
    pub fn new(responses: Vec<provider::Result<Vec<FetchedVideo>>>) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(responses.into()),
            ..Default::default()
        })
    }

    /// Provider that answers every call with `response()`.
    pub fn always(response: fn() -> provider::Result<Vec<FetchedVideo>>) -> Arc<Self> {
        Arc::new(Self {
            fallback: Mutex::new(Some(response)),
            ..Default::default()
        })
    }

    pub fn credentials_used(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|(credential, _)| credential.clone())
            .collect()
    }

    pub fn requests(&self) -> Vec<SearchRequest> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|(_, request)| request.clone())
            .collect()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

impl SearchProvider for ScriptedProvider {
    fn id(&self) -> &str {
        "scripted"
    }

    fn search<'a>(&'a self, credential: &'a str, request: &'a SearchRequest) -> SearchFuture<'a> {
        self.calls
            .lock()
            .unwrap()
            .push((credential.to_string(), request.clone()));
        let response = match self.responses.lock().unwrap().pop_front() {
            Some(response) => response,
            None => match *self.fallback.lock().unwrap() {
                Some(make) => make(),
                None => Ok(Vec::new()),
            },
        };
        Box::pin(async move { response })
    }
}

/// Provider whose every search takes `delay` before returning no videos.
pub struct SlowProvider {
    delay: Duration,
    calls: AtomicUsize,
}

impl SlowProvider {
    pub fn new(delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            delay,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl SearchProvider for SlowProvider {
    fn id(&self) -> &str {
        "slow"
    }

    fn search<'a>(&'a self, _credential: &'a str, _request: &'a SearchRequest) -> SearchFuture<'a> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Box::pin(async move {
            tokio::time::sleep(self.delay).await;
            Ok(Vec::new())
        })
    }
}

pub fn quota_error() -> provider::Result<Vec<FetchedVideo>> {
    Err(provider::Error::QuotaExceeded("daily quota exceeded".into()))
}

pub fn server_error() -> provider::Result<Vec<FetchedVideo>> {
    Err(provider::Error::Status {
        status: 500,
        body: "backendError".into(),
    })
}

/// Repository that delegates to an in-memory store but fails `create` for
/// selected video IDs.
pub struct FlakyRepository {
    inner: VideoStore,
    fail_create: HashSet<String>,
}

impl FlakyRepository {
    pub fn new(clock: Arc<dyn Clock>, fail_create: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            inner: VideoStore::in_memory(clock),
            fail_create: fail_create.iter().map(|s| s.to_string()).collect(),
        })
    }
}

impl VideoRepository for FlakyRepository {
    fn create(&self, video: FetchedVideo) -> RepoFuture<'_, StoredVideo> {
        if self.fail_create.contains(&video.video_id) {
            let id = video.video_id;
            return Box::pin(async move { Err(video_store::Error::Io(format!("disk full: {id}"))) });
        }
        self.inner.create(video)
    }

    fn find_by_key<'a>(&'a self, video_id: &'a str) -> RepoFuture<'a, Option<StoredVideo>> {
        self.inner.find_by_key(video_id)
    }

    fn update<'a>(
        &'a self,
        video_id: &'a str,
        video: FetchedVideo,
    ) -> RepoFuture<'a, Option<StoredVideo>> {
        self.inner.update(video_id, video)
    }

    fn list<'a>(
        &'a self,
        filter: &'a VideoFilter,
        page: u32,
        per_page: u32,
    ) -> RepoFuture<'a, VideoPage> {
        self.inner.list(filter, page, per_page)
    }

    fn latest(&self, limit: usize) -> RepoFuture<'_, Vec<StoredVideo>> {
        self.inner.latest(limit)
    }

    fn count(&self) -> RepoFuture<'_, usize> {
        self.inner.count()
    }

    fn delete<'a>(&'a self, video_id: &'a str) -> RepoFuture<'a, bool> {
        self.inner.delete(video_id)
    }
}
