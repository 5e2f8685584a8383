//! Replication configuration.

use serde::{Deserialize, Serialize};

/// Peers each accepted write is relayed to.
pub const DEFAULT_FANOUT: usize = 8;

pub const DEFAULT_SEEN_CACHE_SIZE: usize = 10_000;

pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 5_000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplicationConfig {
    pub fanout: usize,
    pub seen_cache_size: usize,
    pub request_timeout_ms: u64,
    /// Graph endpoints contacted at startup.
    pub seed_peers: Vec<String>,
    /// Our own graph endpoint, sent along with relayed messages.
    pub public_url: Option<String>,
}

impl Default for ReplicationConfig {
    fn default() -> Self {
        Self {
            fanout: DEFAULT_FANOUT,
            seen_cache_size: DEFAULT_SEEN_CACHE_SIZE,
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
            seed_peers: Vec::new(),
            public_url: None,
        }
    }
}
