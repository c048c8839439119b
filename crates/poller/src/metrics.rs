//! Poller metrics
//!
//! - `poller_ticks_total` (counter): label `outcome` (`success` | `error`)
//! - `poller_tick_duration_seconds` (histogram): label `outcome`
//! - `poller_videos_reconciled_total` (counter): label `action`
//!   (`created` | `updated` | `failed`)

use crate::cycle::CycleReport;

/// Histogram buckets for `poller_tick_duration_seconds`, 50ms to 2 minutes.
pub const TICK_DURATION_BUCKETS: &[f64] = &[
    0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0, 120.0,
];

/// Record a completed tick.
pub fn record_tick(outcome: &'static str, duration_secs: f64) {
    metrics::counter!("poller_ticks_total", "outcome" => outcome).increment(1);
    metrics::histogram!("poller_tick_duration_seconds", "outcome" => outcome)
        .record(duration_secs);
}

/// Record per-record reconcile outcomes of one cycle.
pub fn record_reconciled(report: &CycleReport) {
    for (action, count) in [
        ("created", report.created),
        ("updated", report.updated),
        ("failed", report.failed),
    ] {
        if count > 0 {
            metrics::counter!("poller_videos_reconciled_total", "action" => action)
                .increment(count as u64);
        }
    }
}
