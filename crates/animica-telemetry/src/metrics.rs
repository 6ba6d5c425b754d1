//! Prometheus export helpers.
//!
//! Subsystem crates register their series into the default registry behind
//! their own `metrics` features; this module renders the scrape body the
//! node's HTTP endpoint serves.

use crate::TelemetryError;
use prometheus::{Encoder, TextEncoder};

/// Render all registered metrics in the Prometheus text exposition format.
pub fn export_metrics() -> Result<String, TelemetryError> {
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    TextEncoder::new()
        .encode(&metric_families, &mut buffer)
        .map_err(|e| TelemetryError::Export(e.to_string()))?;
    String::from_utf8(buffer).map_err(|e| TelemetryError::Export(e.to_string()))
}
