//! Read path errors.

use mg_02_graph_store::GraphError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReadError {
    /// No live annotation in any candidate location.
    #[error("No annotations found")]
    NotFound,

    #[error("Missing url parameter")]
    MissingUrl,

    /// Every candidate location failed to read.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<GraphError> for ReadError {
    fn from(e: GraphError) -> Self {
        ReadError::Internal(e.to_string())
    }
}
