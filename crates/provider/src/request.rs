//! Search request parameters

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Upper bound on results per search call enforced by the YouTube Data API.
pub const MAX_RESULTS_PER_CALL: u32 = 50;

/// Result ordering accepted by the search endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SearchOrder {
    #[default]
    Date,
    Rating,
    Relevance,
    Title,
    ViewCount,
}

impl SearchOrder {
    /// Wire value for the `order` query parameter.
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchOrder::Date => "date",
            SearchOrder::Rating => "rating",
            SearchOrder::Relevance => "relevance",
            SearchOrder::Title => "title",
            SearchOrder::ViewCount => "viewCount",
        }
    }
}

/// One search round trip: query text, requested result count, optional
/// publish-time lower bound (naive UTC) and ordering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub query: String,
    pub max_results: u32,
    pub published_after: Option<NaiveDateTime>,
    pub order: SearchOrder,
}

impl SearchRequest {
    /// Date-ordered request without a publish-time bound.
    pub fn new(query: impl Into<String>, max_results: u32) -> Self {
        Self {
            query: query.into(),
            max_results,
            published_after: None,
            order: SearchOrder::Date,
        }
    }

    /// Date-ordered request for uploads of a single channel.
    pub fn for_channel(
        channel_id: &str,
        max_results: u32,
        published_after: Option<NaiveDateTime>,
    ) -> Self {
        Self {
            query: format!("channel:{channel_id}"),
            max_results,
            published_after,
            order: SearchOrder::Date,
        }
    }

    pub fn published_after(mut self, bound: NaiveDateTime) -> Self {
        self.published_after = Some(bound);
        self
    }

    pub fn order(mut self, order: SearchOrder) -> Self {
        self.order = order;
        self
    }

    /// Requested result count clamped to the per-call maximum.
    pub fn capped_max_results(&self) -> u32 {
        self.max_results.min(MAX_RESULTS_PER_CALL)
    }
}
