//! Peer directory configuration.

use serde::{Deserialize, Serialize};

/// Own entry refresh period.
pub const DEFAULT_REFRESH_INTERVAL_MS: u64 = 5 * 60 * 1000;

/// Idle time after which the periodic sweep prunes an entry.
pub const DEFAULT_STALE_AFTER_MS: u64 = 10 * 60 * 1000;

/// Looser threshold for the sweep run once at startup.
pub const DEFAULT_STARTUP_STALE_AFTER_MS: u64 = 60 * 60 * 1000;

/// Period of the high-frequency sweep.
pub const DEFAULT_PRUNE_INTERVAL_MS: u64 = 60 * 1000;

/// Path every peer endpoint ends with.
pub const DEFAULT_PEER_URL_SUFFIX: &str = "/graph";

/// A contact this soon after the last recorded one is not written again.
pub const DEFAULT_CONTACT_DEBOUNCE_MS: u64 = 60 * 1000;

/// Sweeps closer together than this are skipped.
pub const DEFAULT_SWEEP_MIN_INTERVAL_MS: u64 = 30 * 1000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DirectoryConfig {
    /// This node's public graph endpoint, e.g. `https://node.example/graph`.
    /// A node without one reads the directory but does not register.
    pub public_url: Option<String>,
    pub url_suffix: String,
    pub refresh_interval_ms: u64,
    pub stale_after_ms: u64,
    pub startup_stale_after_ms: u64,
    pub prune_interval_ms: u64,
    pub sweep_min_interval_ms: u64,
    pub contact_debounce_ms: u64,
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            public_url: None,
            url_suffix: DEFAULT_PEER_URL_SUFFIX.to_string(),
            refresh_interval_ms: DEFAULT_REFRESH_INTERVAL_MS,
            stale_after_ms: DEFAULT_STALE_AFTER_MS,
            startup_stale_after_ms: DEFAULT_STARTUP_STALE_AFTER_MS,
            prune_interval_ms: DEFAULT_PRUNE_INTERVAL_MS,
            sweep_min_interval_ms: DEFAULT_SWEEP_MIN_INTERVAL_MS,
            contact_debounce_ms: DEFAULT_CONTACT_DEBOUNCE_MS,
        }
    }
}
