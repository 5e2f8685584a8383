//! # API Gateway (Subsystem 8)
//!
//! The node's only network surface. Browser clients read annotations and
//! submit graph writes; peers relay messages and pull nodes through the same
//! `/graph` endpoints.
//!
//! ```text
//!  client / peer
//!       │ HTTP
//!  ┌────┴──────────────────────────────────────┐
//!  │ CORS → trace → timeout → body limit → metrics │
//!  └────┬──────────────┬──────────────┬────────┘
//!       ▼              ▼              ▼
//!   read path     graph store    replication
//!    (mg-05)        (mg-02)        (mg-07)
//! ```
//!
//! Validation rejections are never HTTP errors: `POST /graph` answers `202`
//! whatever the validator decides.

#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod domain;
pub mod middleware;
pub mod router;
pub mod service;

pub use domain::{CorsConfig, GatewayConfig, GatewayError};
pub use middleware::GatewayMetrics;
pub use router::{build_router, AppState};
pub use service::ApiGatewayService;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
