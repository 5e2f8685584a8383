//! Validator configuration.

use serde::{Deserialize, Serialize};

/// Signed timestamps may differ from the reference clock by at most this.
pub const DEFAULT_SKEW_WINDOW_MS: u64 = 30 * 60 * 1000;

/// Actions per author per window.
pub const DEFAULT_RATE_LIMIT_MAX: u32 = 100;

pub const DEFAULT_RATE_LIMIT_WINDOW_MS: u64 = 60 * 60 * 1000;

/// Every peer URL must point at a graph endpoint.
pub const DEFAULT_PEER_URL_SUFFIX: &str = "/graph";

pub const DEFAULT_SECURITY_LOG_CAPACITY: usize = 1_000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    pub skew_window_ms: u64,
    pub rate_limit_max: u32,
    pub rate_limit_window_ms: u64,
    /// DIDs allowed to delete anyone's content.
    pub admins: Vec<String>,
    /// Keep a copy of each accepted content version under `history/`.
    pub record_history: bool,
    pub peer_url_suffix: String,
    pub security_log_capacity: usize,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            skew_window_ms: DEFAULT_SKEW_WINDOW_MS,
            rate_limit_max: DEFAULT_RATE_LIMIT_MAX,
            rate_limit_window_ms: DEFAULT_RATE_LIMIT_WINDOW_MS,
            admins: Vec::new(),
            record_history: true,
            peer_url_suffix: DEFAULT_PEER_URL_SUFFIX.to_string(),
            security_log_capacity: DEFAULT_SECURITY_LOG_CAPACITY,
        }
    }
}
