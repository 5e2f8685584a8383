//! # Write Validator (mg-04)
//!
//! Decides, for every put that reaches the graph store from a client, a
//! gossip relay or a pull sync, whether it may be stored.
//!
//! ## Responsibilities
//!
//! - Schema checks for peer directory entries and rate-limit counters
//! - Ed25519 signature and clock-skew checks for annotations, comments,
//!   profiles and deletion records
//! - Owner-or-admin authorization of soft deletes, no resurrection
//! - Per-author sliding-window rate limiting
//! - Security log of rejected writes
//!
//! The validator is installed with
//! [`GraphStore::with_write_hook`](mg_02_graph_store::GraphStore::with_write_hook).

pub mod domain;
pub mod service;

pub use domain::signing::{annotation_id, sign_annotation, sign_comment, sign_deletion, sign_profile};
pub use domain::{
    AdminRegistry, AuthorRateLimiter, RateLimitResult, SecurityEvent, SecurityLog,
    ValidationConfig, ValidationRejection,
};
pub use service::{Refusal, WriteValidator};

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
