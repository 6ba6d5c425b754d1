//! # Beacon Metrics
//!
//! Prometheus metrics for round health. Enable with the `metrics` feature;
//! without it every recorder is a no-op.
//!
//! ## Metrics Exported
//!
//! - `beacon_rounds_finalized_total{path}` - Finalized rounds by path
//! - `beacon_rounds_failed_total` - Rounds that missed their VDF deadline
//! - `beacon_commits_total` / `beacon_reveals_total` - Accepted submissions
//! - `beacon_vdf_verify_seconds` - VDF verification latency

#[cfg(feature = "metrics")]
use lazy_static::lazy_static;

#[cfg(feature = "metrics")]
use prometheus::{
    register_counter_vec, register_histogram, register_int_counter, CounterVec, Histogram,
    IntCounter,
};

#[cfg(feature = "metrics")]
lazy_static! {
    /// Finalized rounds, labeled by finalization path.
    pub static ref ROUNDS_FINALIZED: CounterVec = register_counter_vec!(
        "beacon_rounds_finalized_total",
        "Total beacon rounds finalized",
        &["path"]
    )
    .expect("Failed to create ROUNDS_FINALIZED metric");

    /// Rounds that missed their VDF deadline.
    pub static ref ROUNDS_FAILED: IntCounter = register_int_counter!(
        "beacon_rounds_failed_total",
        "Total beacon rounds that missed the VDF deadline"
    )
    .expect("Failed to create ROUNDS_FAILED metric");

    /// Accepted commitments.
    pub static ref COMMITS: IntCounter = register_int_counter!(
        "beacon_commits_total",
        "Total accepted beacon commitments"
    )
    .expect("Failed to create COMMITS metric");

    /// Accepted reveals.
    pub static ref REVEALS: IntCounter = register_int_counter!(
        "beacon_reveals_total",
        "Total accepted beacon reveals"
    )
    .expect("Failed to create REVEALS metric");

    /// VDF verification latency.
    pub static ref VDF_VERIFY_SECONDS: Histogram = register_histogram!(
        "beacon_vdf_verify_seconds",
        "Wall-clock seconds spent verifying a VDF solution",
        vec![0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0]
    )
    .expect("Failed to create VDF_VERIFY_SECONDS metric");
}

/// Record a finalized round.
#[cfg(feature = "metrics")]
pub fn record_round_finalized(fallback: bool) {
    let path = if fallback { "fallback" } else { "vdf" };
    ROUNDS_FINALIZED.with_label_values(&[path]).inc();
}

/// Record a round that missed its VDF deadline.
#[cfg(feature = "metrics")]
pub fn record_round_failed() {
    ROUNDS_FAILED.inc();
}

/// Record an accepted commitment.
#[cfg(feature = "metrics")]
pub fn record_commit() {
    COMMITS.inc();
}

/// Record an accepted reveal.
#[cfg(feature = "metrics")]
pub fn record_reveal() {
    REVEALS.inc();
}

/// Record VDF verification latency.
#[cfg(feature = "metrics")]
pub fn observe_vdf_verify_seconds(seconds: f64) {
    VDF_VERIFY_SECONDS.observe(seconds);
}

// No-op implementations when the metrics feature is disabled
#[cfg(not(feature = "metrics"))]
pub fn record_round_finalized(_fallback: bool) {}

#[cfg(not(feature = "metrics"))]
pub fn record_round_failed() {}

#[cfg(not(feature = "metrics"))]
pub fn record_commit() {}

#[cfg(not(feature = "metrics"))]
pub fn record_reveal() {}

#[cfg(not(feature = "metrics"))]
pub fn observe_vdf_verify_seconds(_seconds: f64) {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recorders_are_callable() {
        record_round_finalized(true);
        record_round_finalized(false);
        record_round_failed();
        record_commit();
        record_reveal();
        observe_vdf_verify_seconds(0.1);
    }
}
