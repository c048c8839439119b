//! Round-robin key selection and quota exhaustion tracking
//!
//! The pool owns an ordered list of API keys and a single map of exhausted
//! positions to their reset times. A key is exhausted iff it has an entry in
//! that map. Expired entries are released lazily at selection time.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use common::{Clock, Secret};
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};

/// Default quota cooldown: YouTube quotas reset daily.
pub const DEFAULT_COOLDOWN_SECS: i64 = 86_400;

/// Number of trailing key characters exposed in status and logs.
const SUFFIX_LEN: usize = 4;

/// A key handed out for one upstream call.
#[derive(Debug, Clone)]
pub struct SelectedKey {
    pub position: usize,
    pub key: Secret<String>,
    /// Last four characters, safe to log.
    pub suffix: String,
}

/// Per-key entry in `PoolStatus`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeyStatus {
    pub index: usize,
    pub key_suffix: String,
    pub is_exhausted: bool,
    pub reset_time: Option<DateTime<Utc>>,
}

/// Snapshot of pool state for the admin API.
///
/// `status` mapping: all keys available → healthy, some available →
/// degraded, none available → unhealthy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PoolStatus {
    pub total_keys: usize,
    pub available_keys: usize,
    pub exhausted_keys: usize,
    /// Position the next selection scan starts from.
    pub current_key_index: usize,
    pub status: &'static str,
    pub keys: Vec<KeyStatus>,
}

#[derive(Debug, Default)]
struct PoolState {
    cursor: usize,
    exhausted: HashMap<usize, DateTime<Utc>>,
}

impl PoolState {
    /// Drop every entry whose reset time has passed. Returns released
    /// positions in ascending order.
    fn release_expired(&mut self, now: DateTime<Utc>) -> Vec<usize> {
        let mut released: Vec<usize> = self
            .exhausted
            .iter()
            .filter(|(_, reset_at)| **reset_at <= now)
            .map(|(position, _)| *position)
            .collect();
        released.sort_unstable();
        for position in &released {
            self.exhausted.remove(position);
        }
        released
    }
}

/// Pool of YouTube API keys.
///
/// Keys are fixed at construction. Cursor and exhaustion map share one
/// `RwLock` so status snapshots are internally consistent.
pub struct CredentialPool {
    keys: Vec<Secret<String>>,
    state: RwLock<PoolState>,
    cooldown: Duration,
    clock: Arc<dyn Clock>,
}

impl CredentialPool {
    /// Create a pool from configured keys.
    ///
    /// Duplicate keys are collapsed (first occurrence wins). Returns
    /// `NoCredentials` if `keys` is empty.
    pub fn new(keys: Vec<String>, clock: Arc<dyn Clock>) -> Result<Self> {
        if keys.is_empty() {
            return Err(Error::NoCredentials);
        }

        let mut seen = HashSet::new();
        let mut unique = Vec::with_capacity(keys.len());
        for key in keys {
            if seen.insert(key.clone()) {
                unique.push(Secret::new(key));
            } else {
                let suffix = Secret::new(key).suffix(SUFFIX_LEN);
                warn!(key_suffix = %suffix, "duplicate API key ignored");
            }
        }

        info!(keys = unique.len(), "key pool initialized");
        Ok(Self {
            keys: unique,
            state: RwLock::new(PoolState::default()),
            cooldown: Duration::seconds(DEFAULT_COOLDOWN_SECS),
            clock,
        })
    }

    /// Override the exhaustion cooldown.
    pub fn with_cooldown(mut self, cooldown: Duration) -> Self {
        self.cooldown = cooldown;
        self
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }

    /// Select the next usable key.
    ///
    /// Releases expired exhaustion entries, then scans forward from the
    /// cursor with wrap-around. The cursor moves past the returned key so
    /// successive calls visit every available key before repeating.
    ///
    /// Returns `None` when every key is exhausted.
    pub async fn next_available(&self) -> Option<SelectedKey> {
        let now = self.clock.now();
        let mut state = self.state.write().await;

        for position in state.release_expired(now) {
            info!(
                key_suffix = %self.keys[position].suffix(SUFFIX_LEN),
                "quota reset, key available again"
            );
        }

        let n = self.keys.len();
        for offset in 0..n {
            let position = (state.cursor + offset) % n;
            if state.exhausted.contains_key(&position) {
                continue;
            }
            state.cursor = (position + 1) % n;
            self.record_exhausted_gauge(&state);

            let key = self.keys[position].clone();
            let suffix = key.suffix(SUFFIX_LEN);
            debug!(position, key_suffix = %suffix, "selected API key");
            return Some(SelectedKey {
                position,
                key,
                suffix,
            });
        }

        self.record_exhausted_gauge(&state);
        warn!(keys = n, "all API keys exhausted");
        None
    }

    /// Park `key` until `now + cooldown`.
    ///
    /// Re-marking an exhausted key refreshes its reset time. Unknown keys are
    /// logged and ignored. Returns whether the key belongs to the pool.
    pub async fn mark_exhausted(&self, key: &str) -> bool {
        let Some(position) = self.keys.iter().position(|k| k.expose() == key) else {
            warn!("attempted to mark unknown API key as exhausted");
            return false;
        };

        let reset_at = self.clock.now() + self.cooldown;
        let mut state = self.state.write().await;
        state.exhausted.insert(position, reset_at);
        self.record_exhausted_gauge(&state);
        metrics::counter!("key_pool_exhausted_total").increment(1);

        info!(
            position,
            key_suffix = %self.keys[position].suffix(SUFFIX_LEN),
            reset_at = %reset_at,
            "API key quota exhausted"
        );
        true
    }

    /// Read-only status snapshot.
    ///
    /// Entries whose reset time has passed are reported as available even
    /// before the next selection releases them.
    pub async fn status(&self) -> PoolStatus {
        let now = self.clock.now();
        let state = self.state.read().await;

        let keys: Vec<KeyStatus> = self
            .keys
            .iter()
            .enumerate()
            .map(|(index, key)| {
                let reset_time = state
                    .exhausted
                    .get(&index)
                    .copied()
                    .filter(|reset_at| *reset_at > now);
                KeyStatus {
                    index,
                    key_suffix: format!("...{}", key.suffix(SUFFIX_LEN)),
                    is_exhausted: reset_time.is_some(),
                    reset_time,
                }
            })
            .collect();

        let total = keys.len();
        let exhausted = keys.iter().filter(|k| k.is_exhausted).count();
        let available = total - exhausted;
        let status = if available == total && total > 0 {
            "healthy"
        } else if available > 0 {
            "degraded"
        } else {
            "unhealthy"
        };

        PoolStatus {
            total_keys: total,
            available_keys: available,
            exhausted_keys: exhausted,
            current_key_index: state.cursor,
            status,
            keys,
        }
    }

    fn record_exhausted_gauge(&self, state: &PoolState) {
        metrics::gauge!("key_pool_exhausted_keys").set(state.exhausted.len() as f64);
    }
}
