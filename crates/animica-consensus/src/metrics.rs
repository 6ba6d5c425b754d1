//! # Consensus Metrics
//!
//! Prometheus metrics for block admission, fork choice and retargeting.
//! Enable with the `metrics` feature; no-op shims otherwise.
//!
//! ## Metrics Exported
//!
//! - `consensus_blocks_accepted_total` - Admitted candidate blocks
//! - `consensus_blocks_rejected_total{reason}` - Rejections by taxonomy label
//! - `consensus_nullifier_reuse_total` - Replay attempts caught
//! - `consensus_reorg_depth` - Applied head-switch depths
//! - `consensus_retarget_ratio` - Clamped retarget ratios
//! - `consensus_theta` - Current Θ (approximate, for dashboards)
//! - `consensus_head_height` - Canonical tip height
//! - `consensus_validation_seconds` - Full pipeline latency

#[cfg(feature = "metrics")]
use lazy_static::lazy_static;

#[cfg(feature = "metrics")]
use prometheus::{
    register_counter_vec, register_gauge, register_histogram, register_int_counter,
    register_int_gauge, CounterVec, Gauge, Histogram, IntCounter, IntGauge,
};

#[cfg(feature = "metrics")]
lazy_static! {
    /// Admitted candidate blocks.
    pub static ref BLOCKS_ACCEPTED: IntCounter = register_int_counter!(
        "consensus_blocks_accepted_total",
        "Total candidate blocks admitted to the forest"
    )
    .expect("Failed to create BLOCKS_ACCEPTED metric");

    /// Rejections, labeled by the error taxonomy.
    pub static ref BLOCKS_REJECTED: CounterVec = register_counter_vec!(
        "consensus_blocks_rejected_total",
        "Total candidate blocks rejected",
        &["reason"]
    )
    .expect("Failed to create BLOCKS_REJECTED metric");

    /// Replay attempts caught by the nullifier store.
    pub static ref NULLIFIER_REUSE: IntCounter = register_int_counter!(
        "consensus_nullifier_reuse_total",
        "Total nullifier reuse rejections"
    )
    .expect("Failed to create NULLIFIER_REUSE metric");

    /// Applied head-switch depths.
    pub static ref REORG_DEPTH: Histogram = register_histogram!(
        "consensus_reorg_depth",
        "Depth of applied reorgs",
        vec![0.0, 1.0, 2.0, 4.0, 8.0, 16.0, 32.0, 64.0]
    )
    .expect("Failed to create REORG_DEPTH metric");

    /// Clamped retarget ratios.
    pub static ref RETARGET_RATIO: Histogram = register_histogram!(
        "consensus_retarget_ratio",
        "Clamped Θ retarget ratios",
        vec![0.25, 0.5, 0.75, 1.0, 1.5, 2.0, 3.0, 4.0]
    )
    .expect("Failed to create RETARGET_RATIO metric");

    /// Current Θ, approximated to f64 for dashboards only.
    pub static ref THETA_CURRENT: Gauge = register_gauge!(
        "consensus_theta",
        "Current difficulty target (approximate)"
    )
    .expect("Failed to create THETA_CURRENT metric");

    /// Canonical tip height.
    pub static ref HEAD_HEIGHT: IntGauge = register_int_gauge!(
        "consensus_head_height",
        "Height of the canonical head"
    )
    .expect("Failed to create HEAD_HEIGHT metric");

    /// Full validation pipeline latency.
    pub static ref VALIDATION_SECONDS: Histogram = register_histogram!(
        "consensus_validation_seconds",
        "Time to validate one candidate block in seconds",
        vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5]
    )
    .expect("Failed to create VALIDATION_SECONDS metric");
}

/// Record an admitted block.
#[cfg(feature = "metrics")]
pub fn record_block_accepted() {
    BLOCKS_ACCEPTED.inc();
}

/// Record a rejection by taxonomy label.
#[cfg(feature = "metrics")]
pub fn record_block_rejected(reason: &str) {
    BLOCKS_REJECTED.with_label_values(&[reason]).inc();
    if reason == "nullifier_reuse" {
        NULLIFIER_REUSE.inc();
    }
}

/// Record an applied head-switch depth.
#[cfg(feature = "metrics")]
pub fn record_reorg_depth(depth: u64) {
    REORG_DEPTH.observe(depth as f64);
}

/// Record a clamped retarget ratio.
#[cfg(feature = "metrics")]
pub fn record_retarget_ratio(ratio: f64) {
    RETARGET_RATIO.observe(ratio);
}

/// Update the head gauges.
#[cfg(feature = "metrics")]
pub fn set_head(height: u64, theta_approx: f64) {
    HEAD_HEIGHT.set(height as i64);
    THETA_CURRENT.set(theta_approx);
}

/// Record the full pipeline latency.
#[cfg(feature = "metrics")]
pub fn observe_validation_seconds(seconds: f64) {
    VALIDATION_SECONDS.observe(seconds);
}

// No-op implementations when the metrics feature is disabled
#[cfg(not(feature = "metrics"))]
pub fn record_block_accepted() {}

#[cfg(not(feature = "metrics"))]
pub fn record_block_rejected(_reason: &str) {}

#[cfg(not(feature = "metrics"))]
pub fn record_reorg_depth(_depth: u64) {}

#[cfg(not(feature = "metrics"))]
pub fn record_retarget_ratio(_ratio: f64) {}

#[cfg(not(feature = "metrics"))]
pub fn set_head(_height: u64, _theta_approx: f64) {}

#[cfg(not(feature = "metrics"))]
pub fn observe_validation_seconds(_seconds: f64) {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recorders_are_callable() {
        record_block_accepted();
        record_block_rejected("bad_header");
        record_block_rejected("nullifier_reuse");
        record_reorg_depth(3);
        record_retarget_ratio(2.0);
        set_head(10, 1.0);
        observe_validation_seconds(0.01);
    }
}
