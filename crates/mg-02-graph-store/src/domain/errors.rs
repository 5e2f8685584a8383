//! # Domain Errors
//!
//! Error types for the graph store.
//!
//! A put refused by the write hook is not an error: it comes back as
//! [`PutOutcome::Rejected`](crate::service::PutOutcome::Rejected). These
//! variants cover the store itself failing.

use thiserror::Error;

/// Errors that can occur during graph operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    /// The put addressed no soul.
    #[error("Put has an empty soul")]
    EmptySoul,

    /// Key-value backend failed.
    #[error("Storage error: {0}")]
    Storage(#[from] KVStoreError),

    /// A stored node could not be encoded or decoded.
    #[error("Serialization error: {0}")]
    Serialization(#[from] SerializationError),
}

/// Key-value store errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KVStoreError {
    /// I/O failure in a file-backed store.
    #[error("I/O error: {message}")]
    IOError { message: String },

    /// Backend-specific failure.
    #[error("Backend error: {message}")]
    Backend { message: String },

    /// A persisted log frame could not be decoded.
    #[error("Corrupt graph log at byte {offset}: {message}")]
    Corrupt { offset: u64, message: String },
}

/// Node encoding errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct SerializationError {
    pub message: String,
}
