//! Normalized video records returned by providers

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// One thumbnail variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thumbnail {
    pub url: String,
    pub width: u32,
    pub height: u32,
}

/// Named thumbnail variants. Providers fill whichever variants they return.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thumbnails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Thumbnail>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub medium: Option<Thumbnail>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub high: Option<Thumbnail>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub standard: Option<Thumbnail>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maxres: Option<Thumbnail>,
}

impl Thumbnails {
    /// Store a variant by its provider name. Unknown names are ignored.
    pub fn insert(&mut self, variant: &str, thumbnail: Thumbnail) -> bool {
        let slot = match variant {
            "default" => &mut self.default,
            "medium" => &mut self.medium,
            "high" => &mut self.high,
            "standard" => &mut self.standard,
            "maxres" => &mut self.maxres,
            _ => return false,
        };
        *slot = Some(thumbnail);
        true
    }
}

/// A video as returned by one fetch, keyed by the provider's `video_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchedVideo {
    pub video_id: String,
    pub title: String,
    pub description: String,
    /// Publish time in UTC without a timezone.
    pub published_at: NaiveDateTime,
    pub channel_id: String,
    pub channel_title: String,
    #[serde(default)]
    pub thumbnails: Thumbnails,
    /// ISO-8601 duration, e.g. `PT4M13S`.
    #[serde(default)]
    pub duration: Option<String>,
    #[serde(default)]
    pub view_count: u64,
    #[serde(default)]
    pub like_count: u64,
    #[serde(default)]
    pub comment_count: u64,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub category_id: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
}
