//! Tracing subscriber installation.

use crate::{TelemetryConfig, TelemetryError};
use tracing_subscriber::{fmt, EnvFilter};

/// Guard keeping the installed subscriber alive; drop at shutdown.
pub struct TelemetryGuard {
    _private: (),
}

/// Install the global tracing subscriber per configuration.
///
/// Returns an error when a subscriber is already installed (e.g., from a
/// test harness); callers may treat that as benign.
pub fn init_logging(config: &TelemetryConfig) -> Result<TelemetryGuard, TelemetryError> {
    let filter = EnvFilter::try_new(&config.log_level)
        .map_err(|e| TelemetryError::BadFilter(e.to_string()))?;

    let result = if config.json_logs {
        fmt()
            .with_env_filter(filter)
            .json()
            .with_current_span(true)
            .try_init()
    } else {
        fmt().with_env_filter(filter).try_init()
    };
    result.map_err(|e| TelemetryError::AlreadyInitialized(e.to_string()))?;

    tracing::info!(
        service = %config.service_name,
        network = %config.network,
        "telemetry initialized"
    );
    Ok(TelemetryGuard { _private: () })
}
