//! Request counters for the gateway itself.
//!
//! Subsystem metrics live in the global Prometheus registry; these are
//! appended to the same `/metrics` page.

use axum::extract::{Request, State};
use axum::http::Method;
use axum::middleware::Next;
use axum::response::Response;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// API Gateway metrics
#[derive(Debug, Default)]
pub struct GatewayMetrics {
    pub requests_total: AtomicU64,
    pub requests_success: AtomicU64,
    pub requests_client_error: AtomicU64,
    pub requests_server_error: AtomicU64,
    pub write_requests_total: AtomicU64,

    // Latency tracking (simplified; read latency proper is a histogram)
    pub total_latency_ms: AtomicU64,
}

impl GatewayMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a finished request.
    pub fn record_request(&self, status: u16, is_write: bool, latency_ms: u64) {
        self.requests_total.fetch_add(1, Ordering::Relaxed);
        let bucket = match status {
            500..=u16::MAX => &self.requests_server_error,
            400..=499 => &self.requests_client_error,
            _ => &self.requests_success,
        };
        bucket.fetch_add(1, Ordering::Relaxed);
        if is_write {
            self.write_requests_total.fetch_add(1, Ordering::Relaxed);
        }
        self.total_latency_ms.fetch_add(latency_ms, Ordering::Relaxed);
    }

    /// Get average latency in ms
    pub fn average_latency_ms(&self) -> f64 {
        let total = self.total_latency_ms.load(Ordering::Relaxed);
        let count = self.requests_total.load(Ordering::Relaxed);
        if count == 0 {
            0.0
        } else {
            total as f64 / count as f64
        }
    }

    /// Export in Prometheus text format
    pub fn to_prometheus(&self) -> String {
        let counters = [
            ("requests_total", "Total HTTP requests", &self.requests_total),
            ("requests_success_total", "Requests answered 1xx-3xx", &self.requests_success),
            ("requests_client_error_total", "Requests answered 4xx", &self.requests_client_error),
            ("requests_server_error_total", "Requests answered 5xx", &self.requests_server_error),
            ("write_requests_total", "POST /graph requests", &self.write_requests_total),
        ];

        let mut output = String::new();
        for (name, help, value) in counters {
            output.push_str(&format!(
                "# HELP mg_gateway_{name} {help}\n\
                 # TYPE mg_gateway_{name} counter\n\
                 mg_gateway_{name} {}\n",
                value.load(Ordering::Relaxed)
            ));
        }
        output.push_str(&format!(
            "# HELP mg_gateway_average_latency_ms Average request latency\n\
             # TYPE mg_gateway_average_latency_ms gauge\n\
             mg_gateway_average_latency_ms {:.2}\n",
            self.average_latency_ms()
        ));
        output
    }
}

/// `from_fn_with_state` middleware that records every request.
pub async fn track_requests(
    State(metrics): State<Arc<GatewayMetrics>>,
    request: Request,
    next: Next,
) -> Response {
    let is_write = request.method() == Method::POST;
    let start = Instant::now();
    let response = next.run(request).await;
    let latency_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
    metrics.record_request(response.status().as_u16(), is_write, latency_ms);
    response
}
