//! Background poller for the video fetcher
//!
//! Runs a fetch-and-reconcile cycle on a fixed interval:
//! 1. Pick an API key from the pool
//! 2. Search for recent videos, rotating keys on quota exhaustion
//! 3. Upsert every returned video into the repository by `video_id`
//!
//! The loop runs as a tokio task controlled by a `CancellationToken`. Failed
//! cycles are counted and retried after a capped backoff; the loop only ends
//! when stopped.

pub mod cycle;
pub mod error;
pub mod lifecycle;
pub mod metrics;
pub mod poller;

#[cfg(test)]
mod testing;

pub use cycle::{CycleReport, FetchCycle, OVERLAP_WINDOW_SECS};
pub use error::{CycleError, Result};
pub use poller::{ForceTickResult, Poller, PollerConfig, PollerStatus};
