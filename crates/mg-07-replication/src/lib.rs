//! # Replication (Subsystem 7)
//!
//! Moves graph data between peers.
//!
//! ## Responsibilities
//!
//! - Relay accepted local and gossiped changes to live peers
//! - Deduplicate inbound gossip by content-derived message id
//! - Pull a location from peers on demand (deletion records first)
//! - Learn the peer directory from seed peers at startup
//!
//! ## Architecture
//!
//! ```text
//! GraphStore ──NodeUpdated──→ Replicator ──PeerTransport──→ peers
//!      ↑                          │
//!      └──── put(Gossip/Sync) ────┘
//! ```

#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

pub use adapters::HttpPeerTransport;
#[cfg(any(test, feature = "test-utils"))]
pub use adapters::LoopbackNetwork;
pub use domain::{
    message_id, select_relay_targets, BootstrapReport, Delivery, GraphMessage, PullReport,
    RelayReport, ReplicationConfig, ReplicationError, SeenMessageCache,
};
pub use ports::{PeerTransport, ReplicationApi};
pub use service::Replicator;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
