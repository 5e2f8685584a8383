//! # Outbound Ports

use crate::domain::{GraphMessage, ReplicationError};
use async_trait::async_trait;
use shared_types::{Node, Soul};

/// How we talk to other peers. `peer_url` is the peer's graph endpoint.
#[async_trait]
pub trait PeerTransport: Send + Sync {
    /// Deliver one relayed put.
    async fn send(&self, peer_url: &str, message: &GraphMessage) -> Result<(), ReplicationError>;

    /// Nodes directly below `parent` on the peer.
    async fn fetch_children(&self, peer_url: &str, parent: &Soul)
        -> Result<Vec<Node>, ReplicationError>;

    /// One node from the peer.
    async fn fetch_node(&self, peer_url: &str, soul: &Soul)
        -> Result<Option<Node>, ReplicationError>;
}
