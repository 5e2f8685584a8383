//! # Middleware
//!
//! ```text
//! request → CORS → trace → timeout → body limit → request metrics → handler
//! ```

pub mod cors;
pub mod metrics;

pub use cors::create_cors_layer;
pub use metrics::{track_requests, GatewayMetrics};
