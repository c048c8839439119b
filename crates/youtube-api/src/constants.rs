//! YouTube Data API constants
//!
//! Endpoint paths and fixed request parameters. None of these are secrets;
//! API keys are supplied per call by the key pool.

/// Default API root for the YouTube Data API v3
pub const DEFAULT_BASE_URL: &str = "https://www.googleapis.com/youtube/v3";

/// Search endpoint path (appended to the base URL)
pub const SEARCH_PATH: &str = "/search";

/// Video details endpoint path (appended to the base URL)
pub const VIDEOS_PATH: &str = "/videos";

/// Query parameter carrying the API key
pub const API_KEY_PARAM: &str = "key";

/// Parts requested from `search.list`
pub const SEARCH_PARTS: &str = "id,snippet";

/// Parts requested from `videos.list`
pub const VIDEO_PARTS: &str = "snippet,statistics,contentDetails";

/// Default `regionCode` for searches
pub const DEFAULT_REGION_CODE: &str = "US";

/// Default `relevanceLanguage` for searches
pub const DEFAULT_RELEVANCE_LANGUAGE: &str = "en";
