//! # Shard Router (mg-03)
//!
//! Maps a URL to the shard(s) its annotations live in.
//!
//! ## Purpose
//!
//! - Normalize URLs so trivially different spellings share a location
//! - Partition annotations by domain (`annotations_<domain>`)
//! - Spread high-traffic domains over numbered sub-shards
//!
//! ## Module Structure
//!
//! ```text
//! mg-03-shard-router/
//! ├── domain/          # normalization, placement hash, shard keys, config
//! ├── ports/           # ShardingApi
//! └── service.rs       # ShardRouter
//! ```

#![warn(clippy::all)]

pub mod domain;
pub mod ports;
pub mod service;

pub use domain::{
    bucket, domain_of, host_of, normalize_url, placement_hash, Placement, ShardConfig, ShardError,
    ShardKey, DEFAULT_HIGH_TRAFFIC_DOMAINS, DEFAULT_SUB_SHARD_COUNT, INVALID_DOMAIN,
};
pub use ports::ShardingApi;
pub use service::ShardRouter;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    #[test]
    fn test_version() {
        assert!(!super::VERSION.is_empty());
    }
}
