//! Configuration types and loading
//!
//! Config precedence: CLI args > env vars > config file > defaults.
//! API keys are resolved from the YOUTUBE_API_KEYS env var, then
//! api_keys_file, then the inline api_keys list, so deployments can keep
//! keys out of the TOML entirely.

use common::Secret;
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

/// Env var holding comma-separated API keys. Overrides the config file.
pub const API_KEYS_ENV: &str = "YOUTUBE_API_KEYS";

/// Root configuration
#[derive(Debug, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    #[serde(default)]
    pub youtube: YouTubeConfig,
    #[serde(default)]
    pub poller: PollerSettings,
    #[serde(default)]
    pub storage: StorageConfig,
}

/// HTTP listener settings
#[derive(Debug, Deserialize)]
pub struct ServerConfig {
    pub listen_addr: SocketAddr,
    #[serde(default = "default_max_connections")]
    pub max_connections: usize,
}

/// YouTube Data API settings
#[derive(Debug, Deserialize)]
pub struct YouTubeConfig {
    /// Resolved keys, in rotation order. Filled by `Config::load`.
    #[serde(skip)]
    pub keys: Vec<Secret<String>>,
    /// Inline keys. Moved into `keys` on load.
    #[serde(default)]
    pub api_keys: Vec<String>,
    /// File with comma- or newline-separated keys
    #[serde(default)]
    pub api_keys_file: Option<PathBuf>,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Empty string omits `regionCode` from searches
    #[serde(default = "default_region_code")]
    pub region_code: String,
    /// Empty string omits `relevanceLanguage` from searches
    #[serde(default = "default_relevance_language")]
    pub relevance_language: String,
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    #[serde(default = "default_quota_cooldown")]
    pub quota_cooldown_secs: u64,
}

/// Background poller settings
#[derive(Debug, Deserialize)]
pub struct PollerSettings {
    #[serde(default = "default_search_query")]
    pub search_query: String,
    #[serde(default = "default_interval")]
    pub interval_secs: u64,
    #[serde(default = "default_max_results")]
    pub max_results_per_tick: u32,
    #[serde(default = "default_start_on_boot")]
    pub start_on_boot: bool,
}

/// Video storage settings
#[derive(Debug, Default, Deserialize)]
pub struct StorageConfig {
    /// JSON file for persistence. Absent means in-memory only.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

fn default_max_connections() -> usize {
    1000
}

fn default_base_url() -> String {
    youtube_api::DEFAULT_BASE_URL.to_string()
}

fn default_region_code() -> String {
    youtube_api::DEFAULT_REGION_CODE.to_string()
}

fn default_relevance_language() -> String {
    youtube_api::DEFAULT_RELEVANCE_LANGUAGE.to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_quota_cooldown() -> u64 {
    key_pool::DEFAULT_COOLDOWN_SECS as u64
}

fn default_search_query() -> String {
    "python programming".to_string()
}

fn default_interval() -> u64 {
    10
}

fn default_max_results() -> u32 {
    50
}

fn default_start_on_boot() -> bool {
    true
}

impl Default for YouTubeConfig {
    fn default() -> Self {
        Self {
            keys: Vec::new(),
            api_keys: Vec::new(),
            api_keys_file: None,
            base_url: default_base_url(),
            region_code: default_region_code(),
            relevance_language: default_relevance_language(),
            timeout_secs: default_timeout(),
            quota_cooldown_secs: default_quota_cooldown(),
        }
    }
}

impl Default for PollerSettings {
    fn default() -> Self {
        Self {
            search_query: default_search_query(),
            interval_secs: default_interval(),
            max_results_per_tick: default_max_results(),
            start_on_boot: default_start_on_boot(),
        }
    }
}

impl YouTubeConfig {
    /// `None` when the configured value is empty.
    pub fn region_code(&self) -> Option<String> {
        non_empty(&self.region_code)
    }

    pub fn relevance_language(&self) -> Option<String> {
        non_empty(&self.relevance_language)
    }
}

fn non_empty(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

/// Split a comma- or newline-separated key list, dropping blanks.
fn split_keys(raw: &str) -> Vec<String> {
    raw.split([',', '\n'])
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(str::to_owned)
        .collect()
}

impl Config {
    /// Load configuration from a TOML file, then overlay environment variables.
    ///
    /// API key resolution order:
    /// 1. YOUTUBE_API_KEYS env var
    /// 2. api_keys_file path from config
    /// 3. api_keys list from config
    pub fn load(path: &Path) -> common::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let mut config: Config = toml::from_str(&contents)?;
        config.validate()?;

        let inline = std::mem::take(&mut config.youtube.api_keys);
        let keys = if let Ok(raw) = std::env::var(API_KEYS_ENV) {
            split_keys(&raw)
        } else if let Some(ref key_file) = config.youtube.api_keys_file {
            let raw = std::fs::read_to_string(key_file).map_err(|e| {
                common::Error::Config(format!(
                    "failed to read api_keys_file {}: {e}",
                    key_file.display()
                ))
            })?;
            split_keys(&raw)
        } else {
            split_keys(&inline.join(","))
        };
        config.youtube.keys = keys.into_iter().map(Secret::new).collect();

        Ok(config)
    }

    fn validate(&self) -> common::Result<()> {
        if !self.youtube.base_url.starts_with("http://")
            && !self.youtube.base_url.starts_with("https://")
        {
            return Err(common::Error::Config(format!(
                "base_url must start with http:// or https://, got: {}",
                self.youtube.base_url
            )));
        }

        if self.youtube.timeout_secs == 0 {
            return Err(common::Error::Config(
                "timeout_secs must be greater than 0".into(),
            ));
        }

        if self.youtube.quota_cooldown_secs == 0 {
            return Err(common::Error::Config(
                "quota_cooldown_secs must be greater than 0".into(),
            ));
        }

        if self.server.max_connections == 0 {
            return Err(common::Error::Config(
                "max_connections must be greater than 0".into(),
            ));
        }

        if self.poller.interval_secs == 0 {
            return Err(common::Error::Config(
                "interval_secs must be greater than 0".into(),
            ));
        }

        if self.poller.max_results_per_tick == 0 {
            return Err(common::Error::Config(
                "max_results_per_tick must be at least 1".into(),
            ));
        }

        if self.poller.search_query.trim().is_empty() {
            return Err(common::Error::Config(
                "search_query must not be empty".into(),
            ));
        }

        Ok(())
    }

    /// Resolve config file path from CLI arg or CONFIG_PATH env var.
    pub fn resolve_path(cli_path: Option<&str>) -> PathBuf {
        if let Some(p) = cli_path {
            return PathBuf::from(p);
        }
        if let Ok(p) = std::env::var("CONFIG_PATH") {
            return PathBuf::from(p);
        }
        PathBuf::from("video-fetcher.toml")
    }
}
