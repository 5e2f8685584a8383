//! Deletion error types.

use mg_02_graph_store::GraphError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DeletionError {
    /// Only annotations and comments can be deleted.
    #[error("Not deletable: {0}")]
    NotDeletable(String),

    /// Nothing stored at the target, or it was already reclaimed.
    #[error("Nothing to delete at {0}")]
    NotFound(String),

    /// The write validator refused one of the deletion puts.
    #[error("Deletion of {soul} refused: {reason}")]
    Rejected { soul: String, reason: String },

    #[error(transparent)]
    Graph(#[from] GraphError),
}
