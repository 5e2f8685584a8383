//! Graph store configuration.

use serde::{Deserialize, Serialize};

/// Default tolerance for states written by clocks ahead of ours.
pub const DEFAULT_MAX_DRIFT_MS: u64 = 10 * 60 * 1000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphStoreConfig {
    /// Field states further than this ahead of the local clock are deferred.
    pub max_drift_ms: u64,
}

impl Default for GraphStoreConfig {
    fn default() -> Self {
        Self {
            max_drift_ms: DEFAULT_MAX_DRIFT_MS,
        }
    }
}
