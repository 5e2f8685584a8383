//! # Inbound Ports (Driving Ports)
//!
//! The graph API used by the peer directory, replication, the read path,
//! deletion and the HTTP gateway.

use crate::domain::errors::GraphError;
use async_trait::async_trait;
use shared_types::{GraphPut, Node, Soul, WriteOrigin};

/// Result of a put that reached the store.
#[derive(Debug, Clone, PartialEq)]
pub enum PutOutcome {
    /// At least one field (or the tombstone) won the merge.
    Applied {
        /// Node after the merge.
        node: Node,
        /// The part of the put that changed the node.
        diff: GraphPut,
    },
    /// Valid, but nothing newer than what is already stored.
    Unchanged {
        /// Fields held back for being too far ahead of our clock.
        deferred: usize,
    },
    /// Refused by the write hook. Nothing was stored.
    Rejected {
        reason: String,
    },
}

impl PutOutcome {
    /// Whether the put changed the node.
    pub fn is_applied(&self) -> bool {
        matches!(self, PutOutcome::Applied { .. })
    }

    pub fn is_rejected(&self) -> bool {
        matches!(self, PutOutcome::Rejected { .. })
    }
}

/// Primary API of the graph store.
#[async_trait]
pub trait GraphApi: Send + Sync {
    /// Validate, merge, persist and announce one put.
    async fn put(&self, put: GraphPut, origin: WriteOrigin) -> Result<PutOutcome, GraphError>;

    /// Read one node (tombstoned nodes included).
    fn get(&self, soul: &Soul) -> Result<Option<Node>, GraphError>;

    /// Nodes directly below `parent`, ordered by soul.
    fn children(&self, parent: &Soul) -> Result<Vec<Node>, GraphError>;

    /// Every node whose soul starts with `prefix`, ordered by soul.
    fn scan_prefix(&self, prefix: &str) -> Result<Vec<Node>, GraphError>;
}
