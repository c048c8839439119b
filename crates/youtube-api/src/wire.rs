//! Wire types for YouTube Data API responses
//!
//! Only the fields the fetcher uses are modeled. Normalization into
//! `FetchedVideo` is lenient about counters and optional snippet fields and
//! strict about the publish timestamp.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDateTime};
use provider::{Error, FetchedVideo, Result, Thumbnail, Thumbnails};
use serde::Deserialize;

/// Response body of `search.list`.
#[derive(Debug, Deserialize)]
pub struct SearchListResponse {
    #[serde(default)]
    pub items: Vec<SearchItem>,
}

impl SearchListResponse {
    /// Video IDs in response order. Channel and playlist hits carry no
    /// `videoId` and are skipped.
    pub fn video_ids(self) -> Vec<String> {
        self.items
            .into_iter()
            .filter_map(|item| item.id.video_id)
            .collect()
    }
}

#[derive(Debug, Deserialize)]
pub struct SearchItem {
    pub id: SearchItemId,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchItemId {
    #[serde(default)]
    pub video_id: Option<String>,
}

/// Response body of `videos.list`.
#[derive(Debug, Deserialize)]
pub struct VideoListResponse {
    #[serde(default)]
    pub items: Vec<VideoItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoItem {
    pub id: String,
    pub snippet: Snippet,
    #[serde(default)]
    pub statistics: Statistics,
    #[serde(default)]
    pub content_details: ContentDetails,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snippet {
    pub published_at: String,
    #[serde(default)]
    pub channel_id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub channel_title: String,
    #[serde(default)]
    pub thumbnails: HashMap<String, WireThumbnail>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub category_id: Option<String>,
    #[serde(default)]
    pub default_language: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct WireThumbnail {
    pub url: String,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
}

/// Counters arrive as decimal strings; some are hidden by the uploader.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Statistics {
    #[serde(default)]
    pub view_count: Option<serde_json::Value>,
    #[serde(default)]
    pub like_count: Option<serde_json::Value>,
    #[serde(default)]
    pub comment_count: Option<serde_json::Value>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ContentDetails {
    #[serde(default)]
    pub duration: Option<String>,
}

impl VideoItem {
    /// Normalize into a `FetchedVideo`.
    ///
    /// Fails only when `publishedAt` is not a valid RFC 3339 timestamp.
    pub fn into_fetched(self) -> Result<FetchedVideo> {
        let published_at = parse_published_at(&self.snippet.published_at).ok_or_else(|| {
            Error::Malformed(format!(
                "video {} has invalid publishedAt: {}",
                self.id, self.snippet.published_at
            ))
        })?;

        let mut thumbnails = Thumbnails::default();
        for (variant, thumb) in self.snippet.thumbnails {
            thumbnails.insert(
                &variant,
                Thumbnail {
                    url: thumb.url,
                    width: thumb.width.unwrap_or(0),
                    height: thumb.height.unwrap_or(0),
                },
            );
        }

        Ok(FetchedVideo {
            video_id: self.id,
            title: self.snippet.title,
            description: self.snippet.description,
            published_at,
            channel_id: self.snippet.channel_id,
            channel_title: self.snippet.channel_title,
            thumbnails,
            duration: self.content_details.duration,
            view_count: parse_count(self.statistics.view_count.as_ref()),
            like_count: parse_count(self.statistics.like_count.as_ref()),
            comment_count: parse_count(self.statistics.comment_count.as_ref()),
            tags: self.snippet.tags,
            category_id: self.snippet.category_id,
            language: self.snippet.default_language,
        })
    }
}

/// Parse an RFC 3339 timestamp into naive UTC.
pub fn parse_published_at(raw: &str) -> Option<NaiveDateTime> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.naive_utc())
}

/// Missing, hidden or unparseable counters become 0.
fn parse_count(value: Option<&serde_json::Value>) -> u64 {
    match value {
        Some(serde_json::Value::String(s)) => s.parse().unwrap_or(0),
        Some(serde_json::Value::Number(n)) => n.as_u64().unwrap_or(0),
        _ => 0,
    }
}
