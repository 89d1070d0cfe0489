//! Leaderboard metrics via the `metrics` crate.
//!
//! ## Metric Naming Conventions
//!
//! All metrics follow the pattern: `rankboard_{subsystem}_{name}_{unit}`
//!
//! - Counters: `_total` suffix
//! - Histograms: `_seconds` suffix, or a bare name for sizes
//!
//! Nothing is recorded unless the embedding application installs a recorder.

use std::time::Instant;

use metrics::{counter, histogram};

// =============================================================================
// Metric Names
// =============================================================================

const WRITES_TOTAL: &str = "rankboard_engine_writes_total";
const WRITE_LATENCY: &str = "rankboard_engine_write_latency_seconds";
pub(crate) const TRANSACTION_FAILURES_TOTAL: &str = "rankboard_engine_transaction_failures_total";
pub(crate) const FIRE_AND_FORGET_DROPPED_TOTAL: &str = "rankboard_engine_fire_and_forget_dropped_total";

const READS_TOTAL: &str = "rankboard_engine_reads_total";
const READ_LATENCY: &str = "rankboard_engine_read_latency_seconds";
const WINDOW_ROWS: &str = "rankboard_engine_window_rows";

// =============================================================================
// Writes
// =============================================================================

/// Records a completed write operation.
#[inline]
pub fn record_write(operation: &'static str, success: bool, latency_secs: f64) {
    let status = if success { "success" } else { "error" };
    counter!(WRITES_TOTAL, "operation" => operation, "status" => status).increment(1);
    histogram!(WRITE_LATENCY, "operation" => operation).record(latency_secs);
}

/// Records a transaction the store refused to commit.
#[inline]
pub fn record_transaction_failure(operation: &'static str) {
    counter!(TRANSACTION_FAILURES_TOTAL, "operation" => operation).increment(1);
}

/// Records a fire-and-forget write whose failure was swallowed.
#[inline]
pub fn record_fire_and_forget_dropped(operation: &'static str) {
    counter!(FIRE_AND_FORGET_DROPPED_TOTAL, "operation" => operation).increment(1);
}

// =============================================================================
// Reads
// =============================================================================

/// Records a completed read operation.
///
/// `ranking` is `"none"` for reads that compute no rank.
#[inline]
pub fn record_read(operation: &'static str, ranking: &'static str, success: bool, latency_secs: f64) {
    let status = if success { "success" } else { "error" };
    counter!(READS_TOTAL, "operation" => operation, "ranking" => ranking, "status" => status)
        .increment(1);
    histogram!(READ_LATENCY, "operation" => operation).record(latency_secs);
}

/// Records the number of rows a windowed read returned.
#[inline]
pub fn record_window_rows(ranking: &'static str, rows: usize) {
    histogram!(WINDOW_ROWS, "ranking" => ranking).record(rows as f64);
}

// =============================================================================
// Timing
// =============================================================================

/// Wall-clock timer for one operation.
#[derive(Debug)]
pub(crate) struct OperationTimer {
    start: Instant,
}

impl OperationTimer {
    pub(crate) fn start() -> Self {
        Self { start: Instant::now() }
    }

    pub(crate) fn elapsed_secs(&self) -> f64 {
        self.start.elapsed().as_secs_f64()
    }
}
