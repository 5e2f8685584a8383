//! # Error Types

use mg_01_peer_directory::PeerDirectoryError;
use mg_02_graph_store::GraphError;
use thiserror::Error;

/// Errors from replication.
#[derive(Debug, Error)]
pub enum ReplicationError {
    /// The peer could not be reached or answered with an error status.
    #[error("Transport error talking to {peer}: {message}")]
    Transport { peer: String, message: String },

    /// The peer answered with something we cannot decode.
    #[error("Invalid response from {peer}: {message}")]
    InvalidResponse { peer: String, message: String },

    /// No live peer to talk to.
    #[error("No live peers")]
    NoPeers,

    /// Local graph store failure.
    #[error("Graph error: {0}")]
    Graph(#[from] GraphError),

    /// Peer directory failure.
    #[error("Directory error: {0}")]
    Directory(#[from] PeerDirectoryError),
}
