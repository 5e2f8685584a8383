//! # Shard Keys
//!
//! `annotations_<domain>` is the domain shard. High-traffic domains also get
//! a sub-shard `annotations_<domain>_shard_<n>`. Reads always cover both;
//! new writes go to the sub-shard when there is one.

use serde::{Deserialize, Serialize};
use shared_types::Soul;

/// Separator between a domain shard and its sub-shard number.
pub const SUB_SHARD_INFIX: &str = "_shard_";

/// Shards a URL's annotations may live in.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShardKey {
    pub domain_shard: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_shard: Option<String>,
}

impl ShardKey {
    /// Shard new writes go to.
    pub fn primary(&self) -> &str {
        self.sub_shard.as_deref().unwrap_or(&self.domain_shard)
    }

    /// Every shard a read must cover: the domain shard first.
    pub fn candidates(&self) -> Vec<&str> {
        std::iter::once(self.domain_shard.as_str())
            .chain(self.sub_shard.as_deref())
            .collect()
    }

    pub fn contains(&self, shard: &str) -> bool {
        self.domain_shard == shard || self.sub_shard.as_deref() == Some(shard)
    }
}

/// A routed URL: its normalized form plus its shard key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Placement {
    pub normalized_url: String,
    pub key: ShardKey,
}

impl Placement {
    /// Location souls for every candidate shard, domain shard first.
    pub fn locations(&self) -> Vec<Soul> {
        self.key
            .candidates()
            .into_iter()
            .map(|shard| Soul::location(shard, &self.normalized_url))
            .collect()
    }

    /// Location new annotations are written to.
    pub fn primary_location(&self) -> Soul {
        Soul::location(self.key.primary(), &self.normalized_url)
    }
}
