//! # Deletion (Subsystem 6)
//!
//! Signed soft deletes and the optional tombstone sweep that reclaims
//! long-deleted content.
//!
//! ## Responsibilities
//!
//! - Build the deletion record and flag write for a target
//! - Classify content as Active, SoftDeleted or Tombstoned
//! - Tombstone soft-deleted content past the reclamation age
//!
//! A replica that never runs the collector stays correct: soft-deleted
//! content is already hidden from every read.

#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod domain;
pub mod ports;
pub mod service;

pub use domain::{
    is_reclaimable, lifecycle_of, DeletionConfig, DeletionError, DeletionReceipt,
    DeletionRequest, GcReport, Lifecycle,
};
pub use ports::DeletionApi;
pub use service::{DeletionService, GarbageCollector};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
