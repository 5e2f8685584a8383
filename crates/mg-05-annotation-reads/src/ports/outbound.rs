//! # Driven Ports (Outbound Dependencies)

use async_trait::async_trait;
use shared_types::Soul;

/// Catch-up from other replicas. Pulled nodes land in the local graph store
/// (and on the bus) before these calls return. Failures are the
/// implementation's to log; reads degrade to what is stored locally.
#[async_trait]
pub trait LocationSync: Send + Sync {
    /// Pull a location with its annotations, comments and deletion records.
    async fn sync_location(&self, location: &Soul);

    /// Pull one node.
    async fn sync_node(&self, soul: &Soul);
}
