//! # Inbound Ports

use crate::domain::{BootstrapReport, Delivery, GraphMessage, PullReport, RelayReport, ReplicationError};
use async_trait::async_trait;
use shared_types::{GraphPut, Soul};

/// Replication API used by the gateway, the runtime and the read path.
#[async_trait]
pub trait ReplicationApi: Send + Sync {
    /// Apply a message relayed to us by a peer.
    async fn handle_message(&self, message: GraphMessage) -> Result<Delivery, ReplicationError>;

    /// Send an accepted change to up to `fanout` live peers.
    async fn relay(&self, put: &GraphPut) -> RelayReport;

    /// Pull every node under `location` from live peers and merge it
    /// through the local validator.
    async fn fetch_location(&self, location: &Soul) -> Result<PullReport, ReplicationError>;

    /// Pull a single node (a profile, say) from live peers.
    async fn fetch_node(&self, soul: &Soul) -> Result<PullReport, ReplicationError>;

    /// Contact the seed peers and learn their directory.
    async fn bootstrap(&self) -> BootstrapReport;
}
