//! API key pool with quota-aware rotation
//!
//! Holds the configured YouTube API keys and hands them out round-robin,
//! skipping keys whose daily quota is exhausted. A key reported exhausted is
//! parked until its reset time (24 hours by default) and then released
//! automatically on the next selection.
//!
//! Key lifecycle:
//! 1. Keys loaded from config at startup → all available
//! 2. Poller asks for `next_available()` → key returned, cursor advances past it
//! 3. Upstream reports quota exhaustion → `mark_exhausted()` parks the key
//! 4. Reset time passes → key released by the next selection sweep

pub mod error;
pub mod pool;

pub use error::{Error, Result};
pub use pool::{CredentialPool, DEFAULT_COOLDOWN_SECS, KeyStatus, PoolStatus, SelectedKey};
