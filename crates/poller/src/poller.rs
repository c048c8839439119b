//! Background tick loop and its control surface
//!
//! `Poller` owns at most one loop task. Start and stop go through the pure
//! `lifecycle::transition` function; the lifecycle mutex is held across the
//! whole of `stop()` so a concurrent `start()` cannot interleave with it.
//! The resulting state is published to an atomic flag, so `status()` never
//! waits on that mutex while a stop is draining an in-flight tick.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::cycle::FetchCycle;
use crate::error::CycleError;
use crate::lifecycle::{Action, Command, LoopState, transition};

/// Upper bound on the sleep after a failed tick.
pub const MAX_ERROR_BACKOFF: Duration = Duration::from_secs(60);

/// Tick loop settings.
#[derive(Debug, Clone)]
pub struct PollerConfig {
    pub interval: Duration,
}

/// Counters exposed through `status()`. Never decrease.
#[derive(Debug, Clone, Default)]
struct PollerStats {
    last_tick_at: Option<DateTime<Utc>>,
    tick_count: u64,
    error_count: u64,
}

/// Snapshot returned by `Poller::status`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PollerStatus {
    pub running: bool,
    pub last_tick_at: Option<DateTime<Utc>>,
    pub tick_count: u64,
    pub error_count: u64,
    pub tick_interval_seconds: u64,
    pub query: String,
    pub max_results_per_tick: u32,
}

/// Outcome of a manual tick. Failures are reported here, never raised.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForceTickResult {
    pub success: bool,
    pub message: String,
    pub duration_seconds: f64,
    pub timestamp: DateTime<Utc>,
}

struct Shared {
    cycle: FetchCycle,
    config: PollerConfig,
    stats: RwLock<PollerStats>,
    running: AtomicBool,
}

impl Shared {
    fn publish(&self, state: LoopState) {
        self.running
            .store(state == LoopState::Running, Ordering::Release);
    }
}

/// Clears the running flag when the loop task ends, including by panic.
struct RunningGuard(Arc<Shared>);

impl Drop for RunningGuard {
    fn drop(&mut self) {
        self.0.publish(LoopState::Stopped);
    }
}

struct LoopHandle {
    token: CancellationToken,
    handle: JoinHandle<()>,
}

/// Background poller with start/stop/force-tick/status.
pub struct Poller {
    shared: Arc<Shared>,
    task: Mutex<Option<LoopHandle>>,
}

impl Poller {
    pub fn new(cycle: FetchCycle, config: PollerConfig) -> Self {
        Self {
            shared: Arc::new(Shared {
                cycle,
                config,
                stats: RwLock::new(PollerStats::default()),
                running: AtomicBool::new(false),
            }),
            task: Mutex::new(None),
        }
    }

    /// Spawn the tick loop. Returns `false` (and logs a warning) if it is
    /// already running.
    pub async fn start(&self) -> bool {
        let mut task = self.task.lock().await;
        let (state, action) = transition(loop_state(&task), Command::Start);

        match action {
            Action::SpawnLoop => {
                let token = CancellationToken::new();
                self.shared.publish(state);
                let handle = tokio::spawn(run_loop(self.shared.clone(), token.clone()));
                *task = Some(LoopHandle { token, handle });
                info!(
                    interval_secs = self.shared.config.interval.as_secs(),
                    query = %self.shared.cycle.query(),
                    "poller started"
                );
                true
            }
            _ => {
                warn!("poller already running");
                false
            }
        }
    }

    /// Cancel the tick loop and wait for it to finish. Returns `false` (and
    /// logs a warning) if it was not running.
    ///
    /// Cancel-safe: the handle stays in its slot until the join completes,
    /// so dropping this future mid-drain leaves the loop owned and a later
    /// `start()` sees it as still running.
    pub async fn stop(&self) -> bool {
        let mut task = self.task.lock().await;
        let (state, action) = transition(loop_state(&task), Command::Stop);

        match action {
            Action::CancelLoop => {
                if let Some(LoopHandle { token, handle }) = task.as_mut() {
                    token.cancel();
                    match handle.await {
                        Err(e) if e.is_panic() => error!(error = %e, "poller loop panicked"),
                        _ => {}
                    }
                }
                task.take();
                self.shared.publish(state);
                info!("poller stopped");
                true
            }
            _ => {
                // Drop a handle left behind by a loop that panicked
                task.take();
                self.shared.publish(state);
                warn!("poller not running");
                false
            }
        }
    }

    /// Lock-free read of the lifecycle state; safe to call during `stop()`.
    pub fn is_running(&self) -> bool {
        self.shared.running.load(Ordering::Acquire)
    }

    /// Run one cycle inline, whether or not the loop is running. Does not
    /// touch the tick counters.
    pub async fn force_tick(&self) -> ForceTickResult {
        let started = Instant::now();
        let outcome = self.shared.cycle.run(&CancellationToken::new()).await;
        let duration_seconds = started.elapsed().as_secs_f64();
        let timestamp = self.shared.cycle.clock().now();

        match outcome {
            Ok(report) => {
                info!(
                    fetched = report.fetched,
                    created = report.created,
                    updated = report.updated,
                    "forced fetch completed"
                );
                ForceTickResult {
                    success: true,
                    message: format!(
                        "Fetch completed: {} fetched, {} created, {} updated, {} failed",
                        report.fetched, report.created, report.updated, report.failed
                    ),
                    duration_seconds,
                    timestamp,
                }
            }
            Err(e) => {
                error!(error = %e, "forced fetch failed");
                ForceTickResult {
                    success: false,
                    message: format!("Fetch failed: {e}"),
                    duration_seconds,
                    timestamp,
                }
            }
        }
    }

    pub async fn status(&self) -> PollerStatus {
        let running = self.is_running();
        let stats = self.shared.stats.read().await.clone();
        PollerStatus {
            running,
            last_tick_at: stats.last_tick_at,
            tick_count: stats.tick_count,
            error_count: stats.error_count,
            tick_interval_seconds: self.shared.config.interval.as_secs(),
            query: self.shared.cycle.query().to_string(),
            max_results_per_tick: self.shared.cycle.max_results(),
        }
    }
}

fn loop_state(task: &Option<LoopHandle>) -> LoopState {
    match task {
        Some(handle) if !handle.handle.is_finished() => LoopState::Running,
        _ => LoopState::Stopped,
    }
}

/// Sleep after a failed tick: twice the interval, capped at 60 seconds.
pub fn error_backoff(interval: Duration) -> Duration {
    interval.saturating_mul(2).min(MAX_ERROR_BACKOFF)
}

async fn run_loop(shared: Arc<Shared>, token: CancellationToken) {
    let _running = RunningGuard(shared.clone());
    let interval = shared.config.interval;
    info!("poller loop running");

    loop {
        let started = Instant::now();
        let outcome = shared.cycle.run(&token).await;
        let elapsed = started.elapsed().as_secs_f64();

        let delay = match outcome {
            Ok(report) => {
                let mut stats = shared.stats.write().await;
                stats.tick_count += 1;
                stats.last_tick_at = Some(shared.cycle.clock().now());
                drop(stats);
                crate::metrics::record_tick("success", elapsed);
                crate::metrics::record_reconciled(&report);
                interval
            }
            Err(CycleError::Cancelled) => break,
            Err(e) => {
                shared.stats.write().await.error_count += 1;
                crate::metrics::record_tick("error", elapsed);
                let backoff = error_backoff(interval);
                error!(error = %e, backoff_secs = backoff.as_secs(), "poll tick failed");
                backoff
            }
        };

        tokio::select! {
            biased;
            _ = token.cancelled() => break,
            _ = tokio::time::sleep(delay) => {}
        }
    }

    info!("poller loop exited");
}
