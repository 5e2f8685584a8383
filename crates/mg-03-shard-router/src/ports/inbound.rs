//! # Inbound Ports
//!
//! What the shard router offers the validator, the read path and the
//! gateway.

use crate::domain::{Placement, ShardKey};

/// Shard router API.
pub trait ShardingApi: Send + Sync {
    /// Normalized form of `url`.
    fn normalize(&self, url: &str) -> String;

    /// Shard key of `url` (normalized first).
    fn shard_key(&self, url: &str) -> ShardKey;

    /// Normalize once and derive everything from it.
    fn placement(&self, url: &str) -> Placement;

    /// Whether `domain` (in shard-label form) is split into sub-shards.
    fn is_high_traffic(&self, domain: &str) -> bool;
}
