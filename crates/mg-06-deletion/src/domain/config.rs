//! Deletion and garbage-collection settings.

use serde::{Deserialize, Serialize};

const DAY_MS: u64 = 24 * 60 * 60 * 1000;

/// Age of a soft delete before its content may be reclaimed.
pub const DEFAULT_TOMBSTONE_AFTER_MS: u64 = 30 * DAY_MS;

/// How often the runtime triggers a sweep.
pub const DEFAULT_GC_INTERVAL_MS: u64 = 60 * 60 * 1000;

pub const DEFAULT_SWEEP_MIN_INTERVAL_MS: u64 = 60 * 1000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeletionConfig {
    pub tombstone_after_ms: u64,
    pub gc_interval_ms: u64,
    /// Sweeps started closer together than this are skipped.
    pub sweep_min_interval_ms: u64,
}

impl Default for DeletionConfig {
    fn default() -> Self {
        Self {
            tombstone_after_ms: DEFAULT_TOMBSTONE_AFTER_MS,
            gc_interval_ms: DEFAULT_GC_INTERVAL_MS,
            sweep_min_interval_ms: DEFAULT_SWEEP_MIN_INTERVAL_MS,
        }
    }
}
