//! # Background Handlers
//!
//! Long-running tasks the runtime spawns next to the HTTP server: periodic
//! maintenance sweeps and the bus-to-metrics bridge.

pub mod maintenance;
pub mod metrics;

pub use maintenance::{
    collect_once, prune_at_startup, prune_once, purge_caches_once, refresh_once, run_periodic,
    CachePurge,
};
pub use metrics::MetricsHandler;
