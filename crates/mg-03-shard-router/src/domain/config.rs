//! Shard router configuration.

use serde::{Deserialize, Serialize};

/// Domains whose annotations are spread over sub-shards.
pub const DEFAULT_HIGH_TRAFFIC_DOMAINS: [&str; 3] = ["google_com", "youtube_com", "facebook_com"];

/// Sub-shards per high-traffic domain.
pub const DEFAULT_SUB_SHARD_COUNT: u32 = 10;

/// Shard router configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShardConfig {
    /// Either hostname (`google.com`) or domain (`google_com`) form.
    pub high_traffic_domains: Vec<String>,
    pub sub_shard_count: u32,
}

impl Default for ShardConfig {
    fn default() -> Self {
        Self {
            high_traffic_domains: DEFAULT_HIGH_TRAFFIC_DOMAINS
                .iter()
                .map(|d| d.to_string())
                .collect(),
            sub_shard_count: DEFAULT_SUB_SHARD_COUNT,
        }
    }
}
