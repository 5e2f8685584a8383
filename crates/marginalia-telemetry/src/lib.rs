//! # Marginalia Telemetry
//!
//! Logging and metrics for a Marginalia node.
//!
//! - **Logs**: `tracing` events, formatted by `tracing-subscriber` (pretty in
//!   development, JSON lines in containers).
//! - **Metrics**: Prometheus counters, gauges and histograms in one global
//!   registry, scraped from the gateway's `GET /metrics`.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use marginalia_telemetry::{init_telemetry, TelemetryConfig};
//!
//! fn main() -> anyhow::Result<()> {
//!     init_telemetry(&TelemetryConfig::from_env())?;
//!     // ...
//!     Ok(())
//! }
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `MG_SERVICE_NAME` | `marginalia` | Service name in logs |
//! | `MG_LOG_LEVEL` | `info` | Log level filter (falls back to `RUST_LOG`) |
//! | `MG_JSON_LOGS` | `false` | JSON log lines |

#![cfg_attr(test, allow(clippy::unwrap_used))]

mod config;
mod logging;
mod metrics;

pub use config::TelemetryConfig;
pub use logging::init_logging;
pub use metrics::{
    encode_metrics, register_metrics, HistogramTimer, ANNOTATIONS_SERVED, LIVE_PEERS,
    READ_LATENCY, REGISTRY, SWEEPS_RUN, TOMBSTONES_WRITTEN, WRITES_ACCEPTED, WRITES_REJECTED,
};

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Failed to initialize logger: {0}")]
    LoggerInit(String),

    #[error("Failed to initialize Prometheus metrics: {0}")]
    MetricsInit(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Register metrics, then install the global log subscriber.
pub fn init_telemetry(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    register_metrics()?;
    init_logging(config)?;
    tracing::info!(service = %config.service_name, "Telemetry initialized");
    Ok(())
}

/// Convenience macro for recording a metric increment.
#[macro_export]
macro_rules! metric_inc {
    ($metric:expr) => {
        $metric.inc()
    };
    ($metric:expr, $labels:expr) => {
        $metric.with_label_values($labels).inc()
    };
}

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
