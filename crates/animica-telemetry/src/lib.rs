//! # Animica Telemetry
//!
//! Observability bootstrap for node binaries.
//!
//! ## Components
//!
//! - **Logging**: `tracing` with env-filter; plain fmt for development,
//!   JSON for shipped environments.
//! - **Metrics**: the Prometheus default registry plus the text-format
//!   export the scrape endpoint serves. Subsystem crates own their series.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use animica_telemetry::{init_telemetry, TelemetryConfig};
//!
//! fn main() {
//!     let _guard = init_telemetry(TelemetryConfig::from_env()).expect("telemetry init");
//!     // node wiring follows
//! }
//! ```

mod config;
mod logging;
mod metrics;

use thiserror::Error;

pub use config::TelemetryConfig;
pub use logging::{init_logging, TelemetryGuard};
pub use metrics::export_metrics;

/// Telemetry bootstrap errors.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// Log level filter did not parse.
    #[error("bad log filter: {0}")]
    BadFilter(String),

    /// A global subscriber is already installed.
    #[error("subscriber already initialized: {0}")]
    AlreadyInitialized(String),

    /// Metric export failed.
    #[error("metric export failed: {0}")]
    Export(String),
}

/// Install logging and return the guard that keeps it alive.
pub fn init_telemetry(config: TelemetryConfig) -> Result<TelemetryGuard, TelemetryError> {
    init_logging(&config)
}
