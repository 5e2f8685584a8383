//! # Shard Router Service

use crate::domain::config::ShardConfig;
use crate::domain::errors::ShardError;
use crate::domain::normalize::{domain_of, normalize_url, sanitize_domain};
use crate::domain::placement_hash::bucket;
use crate::domain::shard_key::{Placement, ShardKey, SUB_SHARD_INFIX};
use crate::ports::inbound::ShardingApi;
use shared_types::souls::SHARD_PREFIX;
use std::collections::HashSet;
use tracing::trace;

/// Deterministic URL → shard mapping.
#[derive(Debug, Clone)]
pub struct ShardRouter {
    high_traffic: HashSet<String>,
    sub_shard_count: u32,
}

impl ShardRouter {
    pub fn new(config: &ShardConfig) -> Result<Self, ShardError> {
        if config.sub_shard_count == 0 {
            return Err(ShardError::InvalidSubShardCount(config.sub_shard_count));
        }
        let mut high_traffic = HashSet::new();
        for domain in &config.high_traffic_domains {
            let label = sanitize_domain(domain.trim());
            if label.trim_matches('_').is_empty() {
                return Err(ShardError::InvalidHighTrafficDomain(domain.clone()));
            }
            high_traffic.insert(label);
        }
        Ok(Self {
            high_traffic,
            sub_shard_count: config.sub_shard_count,
        })
    }

    fn key_for_normalized(&self, normalized: &str) -> ShardKey {
        let domain = domain_of(normalized);
        let domain_shard = format!("{SHARD_PREFIX}{domain}");
        let sub_shard = self.high_traffic.contains(&domain).then(|| {
            let n = bucket(normalized, self.sub_shard_count);
            format!("{domain_shard}{SUB_SHARD_INFIX}{n}")
        });
        trace!(url = normalized, %domain_shard, ?sub_shard, "[mg-03] Routed URL");
        ShardKey {
            domain_shard,
            sub_shard,
        }
    }
}

impl Default for ShardRouter {
    fn default() -> Self {
        Self {
            high_traffic: ShardConfig::default()
                .high_traffic_domains
                .into_iter()
                .collect(),
            sub_shard_count: ShardConfig::default().sub_shard_count,
        }
    }
}

impl ShardingApi for ShardRouter {
    fn normalize(&self, url: &str) -> String {
        normalize_url(url)
    }

    fn shard_key(&self, url: &str) -> ShardKey {
        self.key_for_normalized(&normalize_url(url))
    }

    fn placement(&self, url: &str) -> Placement {
        let normalized_url = normalize_url(url);
        let key = self.key_for_normalized(&normalized_url);
        Placement {
            normalized_url,
            key,
        }
    }

    fn is_high_traffic(&self, domain: &str) -> bool {
        self.high_traffic.contains(domain)
    }
}
