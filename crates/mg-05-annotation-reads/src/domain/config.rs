//! Read path configuration.

use serde::{Deserialize, Serialize};

/// How long a read listens for records arriving from peers.
pub const DEFAULT_COLLECTION_WINDOW_MS: u64 = 5_000;

pub const DEFAULT_PROFILE_TTL_MS: u64 = 5 * 60 * 1000;

/// Unknown authors are retried sooner than known ones expire.
pub const DEFAULT_PROFILE_MISS_TTL_MS: u64 = 30 * 1000;

pub const DEFAULT_PROFILE_RETRIES: u32 = 3;

pub const DEFAULT_PROFILE_BACKOFF_MS: u64 = 100;

pub const DEFAULT_RECENT_CAPACITY: usize = 50;

pub const DEFAULT_DISPLAY_NAME: &str = "Anonymous";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReadPathConfig {
    pub collection_window_ms: u64,
    pub profile_ttl_ms: u64,
    pub profile_miss_ttl_ms: u64,
    pub profile_retries: u32,
    /// First retry delay; doubles on every attempt.
    pub profile_backoff_ms: u64,
    pub recent_capacity: usize,
    pub default_display_name: String,
}

impl Default for ReadPathConfig {
    fn default() -> Self {
        Self {
            collection_window_ms: DEFAULT_COLLECTION_WINDOW_MS,
            profile_ttl_ms: DEFAULT_PROFILE_TTL_MS,
            profile_miss_ttl_ms: DEFAULT_PROFILE_MISS_TTL_MS,
            profile_retries: DEFAULT_PROFILE_RETRIES,
            profile_backoff_ms: DEFAULT_PROFILE_BACKOFF_MS,
            recent_capacity: DEFAULT_RECENT_CAPACITY,
            default_display_name: DEFAULT_DISPLAY_NAME.to_string(),
        }
    }
}
