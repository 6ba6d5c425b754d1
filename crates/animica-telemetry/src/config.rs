//! Telemetry configuration from environment variables.

use std::env;

/// Configuration for logging and metrics export.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// Service name attached to logs.
    pub service_name: String,

    /// Log level filter (trace, debug, info, warn, error).
    pub log_level: String,

    /// Whether to emit JSON-formatted logs (for log shippers).
    pub json_logs: bool,

    /// Prometheus metrics port.
    pub metrics_port: u16,

    /// Network identifier (devnet, testnet, mainnet).
    pub network: String,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: "animica".to_string(),
            log_level: "info".to_string(),
            json_logs: false,
            metrics_port: 9100,
            network: "devnet".to_string(),
        }
    }
}

impl TelemetryConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `ANIMICA_SERVICE_NAME`: Service name (default: animica)
    /// - `ANIMICA_LOG_LEVEL` or `RUST_LOG`: Log level (default: info)
    /// - `ANIMICA_JSON_LOGS`: JSON logs (default: false; true in containers)
    /// - `ANIMICA_METRICS_PORT`: Prometheus port (default: 9100)
    /// - `ANIMICA_NETWORK`: Network name (default: devnet)
    pub fn from_env() -> Self {
        let is_container =
            env::var("KUBERNETES_SERVICE_HOST").is_ok() || env::var("DOCKER_CONTAINER").is_ok();
        let defaults = Self::default();

        Self {
            service_name: env::var("ANIMICA_SERVICE_NAME").unwrap_or(defaults.service_name),
            log_level: env::var("ANIMICA_LOG_LEVEL")
                .or_else(|_| env::var("RUST_LOG"))
                .unwrap_or(defaults.log_level),
            json_logs: env::var("ANIMICA_JSON_LOGS")
                .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
                .unwrap_or(is_container),
            metrics_port: env::var("ANIMICA_METRICS_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.metrics_port),
            network: env::var("ANIMICA_NETWORK").unwrap_or(defaults.network),
        }
    }
}
