//! # Peer Directory (mg-01)
//!
//! Tracks which peer endpoints are alive. Entries live in the graph at
//! `peers/<key>`, where `key` is a short blake3 digest of the peer's public
//! URL, so a peer can only ever occupy its own slot.
//!
//! ## Responsibilities
//!
//! - `register_self` / `refresh_self`: keep our own entry fresh
//! - `on_peer_connect`: upsert an entry when a peer answers or sends to us
//! - `prune_stale` / `prune_at_startup`: throttled, idempotent sweeps that
//!   tombstone idle or structurally invalid entries
//! - `live_peers`: the relay and pull targets for replication

pub mod domain;
pub mod ports;
pub mod service;

pub use domain::{
    classify, DirectoryConfig, EntryHealth, PeerDirectoryError, PeerEntry, SweepReport,
};
pub use ports::PeerDirectoryApi;
pub use service::PeerDirectory;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
