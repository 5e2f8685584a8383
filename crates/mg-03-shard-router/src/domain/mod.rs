//! # Domain Layer
//!
//! Normalization, placement hashing and shard keys. Pure functions only.

pub mod config;
pub mod errors;
pub mod normalize;
pub mod placement_hash;
pub mod shard_key;

pub use config::{ShardConfig, DEFAULT_HIGH_TRAFFIC_DOMAINS, DEFAULT_SUB_SHARD_COUNT};
pub use errors::ShardError;
pub use normalize::{domain_of, host_of, normalize_url, sanitize_domain, INVALID_DOMAIN};
pub use placement_hash::{bucket, placement_hash};
pub use shard_key::{Placement, ShardKey, SUB_SHARD_INFIX};
