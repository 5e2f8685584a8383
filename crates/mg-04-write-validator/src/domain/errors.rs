//! # Validation Rejections
//!
//! Why a write was refused. Rejections are logged and announced on the bus;
//! they never surface to the writer as an error.

use shared_types::{EntityError, Timestamp};
use thiserror::Error;

/// Reasons a write is refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationRejection {
    /// A peer or rate-limit entry does not match its schema.
    #[error("Invalid control record: {0}")]
    InvalidControlRecord(String),

    /// A peer tried to write an entry keyed for a different URL.
    #[error("Peer key mismatch: entry {actual}, url hashes to {expected}")]
    PeerKeyMismatch { expected: String, actual: String },

    /// Content write without an author.
    #[error("Missing author")]
    MissingAuthor,

    /// The author is not a usable `did:key`.
    #[error("Invalid author: {0}")]
    InvalidAuthor(String),

    /// Too many actions by one author in the window.
    #[error("Rate limit exceeded for {did}, retry in {retry_after_ms}ms")]
    RateLimited { did: String, retry_after_ms: u64 },

    /// Content write without a signature.
    #[error("Missing signature")]
    MissingSignature,

    /// The signature does not verify against the author's key.
    #[error("Invalid signature")]
    InvalidSignature,

    /// A signed timestamp is outside the skew window.
    #[error("Timestamp {timestamp} outside skew window of {reference}")]
    ClockSkew {
        timestamp: Timestamp,
        reference: Timestamp,
    },

    /// Fields do not parse as the entity the soul holds.
    #[error("Malformed entity: {0}")]
    MalformedEntity(#[from] EntityError),

    /// The entity does not belong at the soul it was written to.
    #[error("Soul mismatch: {0}")]
    SoulMismatch(String),

    /// Content writes are not allowed at this kind of soul.
    #[error("Unsupported soul for content: {0}")]
    UnsupportedSoul(String),

    /// `isDeleted = true` with no deletion record stored for the target.
    #[error("No deletion record for {0}")]
    MissingDeletionRecord(String),

    /// The deletion record does not verify.
    #[error("Invalid deletion record: {0}")]
    InvalidDeletionRecord(String),

    /// The deleter is neither the author nor an admin.
    #[error("{deleter} may not delete content by {owner}")]
    UnauthorizedDeletion { deleter: String, owner: String },

    /// A delete for content this node has never seen an author for.
    #[error("Deletion target has no known author")]
    UnknownDeletionTarget,

    /// `deletedBy` does not name the deletion record's author.
    #[error("deletedBy {deleted_by:?} does not match record author {record_author}")]
    DeletedByMismatch {
        deleted_by: Option<String>,
        record_author: String,
    },

    /// Attempt to clear `isDeleted` on deleted content.
    #[error("Deleted content cannot be restored")]
    Resurrection,

    /// The current node could not be read.
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),
}

impl ValidationRejection {
    /// Rejections that go to the security log as well as the debug log.
    pub fn is_security_relevant(&self) -> bool {
        matches!(
            self,
            Self::PeerKeyMismatch { .. }
                | Self::RateLimited { .. }
                | Self::InvalidSignature
                | Self::ClockSkew { .. }
                | Self::MissingDeletionRecord(_)
                | Self::InvalidDeletionRecord(_)
                | Self::UnauthorizedDeletion { .. }
                | Self::UnknownDeletionTarget
                | Self::DeletedByMismatch { .. }
                | Self::Resurrection
        )
    }

    /// Short label for metrics.
    pub fn label(&self) -> &'static str {
        match self {
            Self::InvalidControlRecord(_) => "invalid_control_record",
            Self::PeerKeyMismatch { .. } => "peer_key_mismatch",
            Self::MissingAuthor => "missing_author",
            Self::InvalidAuthor(_) => "invalid_author",
            Self::RateLimited { .. } => "rate_limited",
            Self::MissingSignature => "missing_signature",
            Self::InvalidSignature => "invalid_signature",
            Self::ClockSkew { .. } => "clock_skew",
            Self::MalformedEntity(_) => "malformed_entity",
            Self::SoulMismatch(_) => "soul_mismatch",
            Self::UnsupportedSoul(_) => "unsupported_soul",
            Self::MissingDeletionRecord(_) => "missing_deletion_record",
            Self::InvalidDeletionRecord(_) => "invalid_deletion_record",
            Self::UnauthorizedDeletion { .. } => "unauthorized_deletion",
            Self::UnknownDeletionTarget => "unknown_deletion_target",
            Self::DeletedByMismatch { .. } => "deleted_by_mismatch",
            Self::Resurrection => "resurrection",
            Self::StorageUnavailable(_) => "storage_unavailable",
        }
    }
}
