//! # Content Lifecycle
//!
//! ```text
//! Active --delete--> SoftDeleted --GC sweep--> Tombstoned
//! ```
//!
//! `SoftDeleted` keeps the content and carries `isDeleted = true`; it is
//! the state every replica converges on. `Tombstoned` is a null write that
//! erases the content. It is terminal and optional.

use serde::Serialize;
use shared_types::{fields, Node, Timestamp};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Lifecycle {
    Active,
    SoftDeleted {
        /// HAM state of the `isDeleted` flag.
        since: Timestamp,
    },
    Tombstoned,
}

pub fn lifecycle_of(node: &Node) -> Lifecycle {
    if node.is_tombstoned() && !node.has_content() {
        return Lifecycle::Tombstoned;
    }
    match node.flag(fields::IS_DELETED) {
        Some(true) => Lifecycle::SoftDeleted {
            since: node.state_of(fields::IS_DELETED).unwrap_or_default(),
        },
        _ => Lifecycle::Active,
    }
}

/// Soft-deleted for at least `after_ms`.
pub fn is_reclaimable(node: &Node, now: Timestamp, after_ms: u64) -> bool {
    match lifecycle_of(node) {
        Lifecycle::SoftDeleted { since } => now.saturating_sub(since) >= after_ms,
        Lifecycle::Active | Lifecycle::Tombstoned => false,
    }
}
