//! # Error Types

use mg_02_graph_store::GraphError;
use thiserror::Error;

/// Errors from peer directory operations.
#[derive(Debug, Error)]
pub enum PeerDirectoryError {
    /// `register_self` / `refresh_self` on a node with no public URL.
    #[error("No public URL configured")]
    NoPublicUrl,

    /// Peer URLs must be http(s) graph endpoints.
    #[error("Invalid peer URL: {0}")]
    InvalidPeerUrl(String),

    /// The write hook refused a directory write.
    #[error("Directory write rejected: {0}")]
    Rejected(String),

    /// Graph store failure.
    #[error("Graph error: {0}")]
    Graph(#[from] GraphError),
}
