//! HTTP client for the YouTube Data API

use provider::{Error, FetchedVideo, Result, SearchFuture, SearchProvider, SearchRequest};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::constants::*;
use crate::quota::classify_failure;
use crate::wire::{SearchListResponse, VideoListResponse};

/// YouTube Data API v3 client.
///
/// Holds no credentials; the API key is passed per call so the key pool
/// can rotate between calls.
#[derive(Debug, Clone)]
pub struct YouTubeClient {
    http: reqwest::Client,
    base_url: String,
    region_code: Option<String>,
    relevance_language: Option<String>,
}

impl YouTubeClient {
    pub fn new(http: reqwest::Client) -> Self {
        Self {
            http,
            base_url: DEFAULT_BASE_URL.to_string(),
            region_code: Some(DEFAULT_REGION_CODE.to_string()),
            relevance_language: Some(DEFAULT_RELEVANCE_LANGUAGE.to_string()),
        }
    }

    /// Override the API root (used to point at a mock server in tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// `None` omits `regionCode` from search calls.
    pub fn with_region_code(mut self, region_code: Option<String>) -> Self {
        self.region_code = region_code;
        self
    }

    /// `None` omits `relevanceLanguage` from search calls.
    pub fn with_relevance_language(mut self, language: Option<String>) -> Self {
        self.relevance_language = language;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Phase 1: `search.list`, returning matching video IDs.
    pub async fn search_ids(&self, api_key: &str, request: &SearchRequest) -> Result<Vec<String>> {
        let mut query: Vec<(&str, String)> = vec![
            ("part", SEARCH_PARTS.to_string()),
            ("q", request.query.clone()),
            ("type", "video".to_string()),
            ("order", request.order.as_str().to_string()),
            ("maxResults", request.capped_max_results().to_string()),
        ];
        if let Some(region) = &self.region_code {
            query.push(("regionCode", region.clone()));
        }
        if let Some(language) = &self.relevance_language {
            query.push(("relevanceLanguage", language.clone()));
        }
        if let Some(bound) = request.published_after {
            query.push((
                "publishedAfter",
                bound.format("%Y-%m-%dT%H:%M:%SZ").to_string(),
            ));
        }

        let response: SearchListResponse = self.get_json(SEARCH_PATH, api_key, query).await?;
        Ok(response.video_ids())
    }

    /// Phase 2: `videos.list` for the given IDs, normalized.
    ///
    /// Items with an unparseable publish time are skipped with a warning.
    pub async fn video_details(&self, api_key: &str, ids: &[String]) -> Result<Vec<FetchedVideo>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let query = vec![
            ("part", VIDEO_PARTS.to_string()),
            ("id", ids.join(",")),
        ];
        let response: VideoListResponse = self.get_json(VIDEOS_PATH, api_key, query).await?;

        let mut videos = Vec::with_capacity(response.items.len());
        for item in response.items {
            match item.into_fetched() {
                Ok(video) => videos.push(video),
                Err(e) => warn!(error = %e, "skipping video with invalid details"),
            }
        }
        Ok(videos)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        api_key: &str,
        mut query: Vec<(&str, String)>,
    ) -> Result<T> {
        query.push((API_KEY_PARAM, api_key.to_string()));
        let url = format!("{}{}", self.base_url, path);

        // without_url() keeps the API key out of error messages
        let response = self
            .http
            .get(&url)
            .query(&query)
            .send()
            .await
            .map_err(|e| Error::Transport(format!("{path} request failed: {}", e.without_url())))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| String::from("<no body>"));
            return Err(classify_failure(status.as_u16(), body));
        }

        let body = response.text().await.map_err(|e| {
            Error::Transport(format!("reading {path} response failed: {}", e.without_url()))
        })?;
        serde_json::from_str(&body)
            .map_err(|e| Error::Malformed(format!("invalid {path} response: {e}")))
    }
}

impl SearchProvider for YouTubeClient {
    fn id(&self) -> &str {
        "youtube"
    }

    fn search<'a>(&'a self, credential: &'a str, request: &'a SearchRequest) -> SearchFuture<'a> {
        Box::pin(async move {
            let ids = self.search_ids(credential, request).await?;
            if ids.is_empty() {
                debug!(query = %request.query, "search returned no videos");
                return Ok(Vec::new());
            }
            debug!(query = %request.query, count = ids.len(), "fetching video details");
            self.video_details(credential, &ids).await
        })
    }
}
