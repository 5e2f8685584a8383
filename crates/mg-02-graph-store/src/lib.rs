//! # Graph Store (mg-02)
//!
//! The replicated substrate every other subsystem reads and writes: a graph
//! of nodes addressed by soul, merged field-by-field with HAM last-write-wins
//! semantics.
//!
//! ## Responsibilities
//!
//! - Stamp, validate (through the installed [`WriteHook`]), merge and persist
//!   puts.
//! - Publish `NodeUpdated` / `WriteRejected` on the shared bus.
//! - Serve point reads, child listings and prefix scans.
//!
//! ## Crate Structure (Hexagonal Architecture)
//!
//! - `domain/` - HAM merge, configuration, errors
//! - `ports/` - [`GraphApi`] (inbound); backend, encoding and hook (outbound)
//! - `adapters/` - in-memory and file-backed stores, bincode encoding
//! - `service.rs` - [`GraphStore`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

pub use adapters::{BincodeNodeSerializer, FileBackedKVStore, InMemoryKVStore};
pub use domain::{GraphError, GraphStoreConfig, KVStoreError, MergeResult, SerializationError};
pub use ports::{
    BatchOperation, GraphApi, GraphReader, KeyValueStore, NodeSerializer, PutOutcome,
    WriteContext, WriteHook, WriteVerdict,
};
pub use service::GraphStore;

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
