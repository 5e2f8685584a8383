//! # Inbound Ports

use crate::domain::{DeletionError, DeletionReceipt, GcReport, Lifecycle};
use async_trait::async_trait;
use shared_crypto::Ed25519KeyPair;
use shared_types::Soul;

/// Deletion API used by the runtime and tooling that deletes on behalf of a
/// local identity.
#[async_trait]
pub trait DeletionApi: Send + Sync {
    /// Sign and apply a soft delete of an annotation or comment.
    async fn soft_delete(
        &self,
        keypair: &Ed25519KeyPair,
        target: &Soul,
    ) -> Result<DeletionReceipt, DeletionError>;

    /// Where `target` is in its lifecycle.
    fn lifecycle(&self, target: &Soul) -> Result<Lifecycle, DeletionError>;

    /// Run one garbage-collection sweep now.
    async fn collect_garbage(&self) -> Result<GcReport, DeletionError>;
}
