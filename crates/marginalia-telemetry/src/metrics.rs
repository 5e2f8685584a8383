//! Prometheus metrics for Marginalia subsystems.
//!
//! All metrics follow the naming convention: `mg_<subsystem>_<metric>_<unit>`
//!
//! ## Metric Types
//!
//! - **Counter**: Monotonically increasing value (e.g., writes_accepted_total)
//! - **Gauge**: Value that can go up or down (e.g., live_peers)
//! - **Histogram**: Distribution of values (e.g., read_duration_seconds)

use lazy_static::lazy_static;
use prometheus::{
    Counter, CounterVec, Encoder, Gauge, Histogram, HistogramOpts, Opts, Registry, TextEncoder,
};

use crate::TelemetryError;

lazy_static! {
    /// Global metrics registry
    pub static ref REGISTRY: Registry = Registry::new();

    // =========================================================================
    // GRAPH STORE / WRITE VALIDATOR (Subsystems 2, 4)
    // =========================================================================

    /// Puts that changed a node, by origin (local, gossip, sync, internal).
    pub static ref WRITES_ACCEPTED: CounterVec = CounterVec::new(
        Opts::new("mg_graph_writes_accepted_total", "Puts that won the merge"),
        &["origin"]
    ).expect("metric creation failed");

    /// Puts refused by the write validator, by reason label.
    pub static ref WRITES_REJECTED: CounterVec = CounterVec::new(
        Opts::new("mg_validator_writes_rejected_total", "Puts refused by the write validator"),
        &["reason"]
    ).expect("metric creation failed");

    // =========================================================================
    // READ PATH (Subsystem 5)
    // =========================================================================

    /// Annotations returned to clients.
    pub static ref ANNOTATIONS_SERVED: Counter = Counter::new(
        "mg_reads_annotations_served_total",
        "Annotations returned by GET /annotations"
    ).expect("metric creation failed");

    /// End-to-end read latency, collection window included.
    pub static ref READ_LATENCY: Histogram = Histogram::with_opts(
        HistogramOpts::new(
            "mg_reads_duration_seconds",
            "Time spent answering GET /annotations"
        ).buckets(vec![0.005, 0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0])
    ).expect("metric creation failed");

    // =========================================================================
    // PEER DIRECTORY (Subsystem 1)
    // =========================================================================

    /// Directory entries currently considered live.
    pub static ref LIVE_PEERS: Gauge = Gauge::new(
        "mg_directory_live_peers",
        "Live, non-stale peers in the directory"
    ).expect("metric creation failed");

    // =========================================================================
    // MAINTENANCE (Subsystems 1, 6)
    // =========================================================================

    /// Maintenance sweeps that actually ran, by kind (gc, prune).
    pub static ref SWEEPS_RUN: CounterVec = CounterVec::new(
        Opts::new("mg_maintenance_sweeps_total", "Sweeps that ran to completion"),
        &["kind"]
    ).expect("metric creation failed");

    /// Tombstones written by sweeps, by kind.
    pub static ref TOMBSTONES_WRITTEN: CounterVec = CounterVec::new(
        Opts::new("mg_maintenance_tombstones_total", "Souls tombstoned by sweeps"),
        &["kind"]
    ).expect("metric creation failed");
}

/// Register all metrics with the global registry.
///
/// Safe to call more than once.
pub fn register_metrics() -> Result<(), TelemetryError> {
    let metrics: Vec<Box<dyn prometheus::core::Collector>> = vec![
        Box::new(WRITES_ACCEPTED.clone()),
        Box::new(WRITES_REJECTED.clone()),
        Box::new(ANNOTATIONS_SERVED.clone()),
        Box::new(READ_LATENCY.clone()),
        Box::new(LIVE_PEERS.clone()),
        Box::new(SWEEPS_RUN.clone()),
        Box::new(TOMBSTONES_WRITTEN.clone()),
    ];

    for metric in metrics {
        match REGISTRY.register(metric) {
            Ok(()) | Err(prometheus::Error::AlreadyReg) => {}
            Err(e) => return Err(TelemetryError::MetricsInit(e.to_string())),
        }
    }
    Ok(())
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> Result<String, TelemetryError> {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    String::from_utf8(buffer).map_err(|e| TelemetryError::MetricsInit(e.to_string()))
}

/// Timer guard for automatic histogram observation.
pub struct HistogramTimer {
    histogram: Histogram,
    start: std::time::Instant,
}

impl HistogramTimer {
    /// Start timing against `histogram`.
    pub fn new(histogram: &Histogram) -> Self {
        Self {
            histogram: histogram.clone(),
            start: std::time::Instant::now(),
        }
    }
}

impl Drop for HistogramTimer {
    fn drop(&mut self) {
        self.histogram.observe(self.start.elapsed().as_secs_f64());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_twice_is_ok() {
        register_metrics().unwrap();
        register_metrics().unwrap();
    }

    #[test]
    fn test_encoded_output_names_metrics() {
        register_metrics().unwrap();
        WRITES_REJECTED.with_label_values(&["invalid_signature"]).inc();
        let text = encode_metrics().unwrap();
        assert!(text.contains("mg_validator_writes_rejected_total"));
        assert!(text.contains("invalid_signature"));
    }

    #[test]
    fn test_timer_observes_on_drop() {
        let before = READ_LATENCY.get_sample_count();
        drop(HistogramTimer::new(&READ_LATENCY));
        assert_eq!(READ_LATENCY.get_sample_count(), before + 1);
    }
}
