//! # Domain Errors
//!
//! Routing itself never fails; these only come from bad configuration.

use thiserror::Error;

/// Shard router error types.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShardError {
    /// Sub-shard count must be at least one.
    #[error("Invalid sub-shard count: {0}")]
    InvalidSubShardCount(u32),

    /// A configured high-traffic domain sanitized to nothing.
    #[error("Invalid high-traffic domain: {0:?}")]
    InvalidHighTrafficDomain(String),
}
