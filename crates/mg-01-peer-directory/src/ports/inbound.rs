//! # Driving Ports (Inbound API)
//!
//! What the runtime, replication and the gateway call on the directory.

use crate::domain::{PeerDirectoryError, PeerEntry, SweepReport};
use async_trait::async_trait;

/// Peer directory API.
#[async_trait]
pub trait PeerDirectoryApi: Send + Sync {
    /// Write this node's own entry, keeping its first-seen timestamp if it
    /// already has one.
    async fn register_self(&self) -> Result<PeerEntry, PeerDirectoryError>;

    /// Upsert the entry for a peer we just heard from.
    async fn on_peer_connect(&self, url: &str) -> Result<PeerEntry, PeerDirectoryError>;

    /// Bump `lastConnection` on our own entry.
    async fn refresh_self(&self) -> Result<PeerEntry, PeerDirectoryError>;

    /// High-frequency sweep: tombstone invalid entries and entries idle
    /// beyond the staleness threshold.
    async fn prune_stale(&self) -> Result<SweepReport, PeerDirectoryError>;

    /// Startup sweep with the looser threshold.
    async fn prune_at_startup(&self) -> Result<SweepReport, PeerDirectoryError>;

    /// Valid, non-stale entries other than our own.
    fn live_peers(&self) -> Result<Vec<PeerEntry>, PeerDirectoryError>;

    /// Every valid entry, including stale ones and our own.
    fn all_peers(&self) -> Result<Vec<PeerEntry>, PeerDirectoryError>;
}
