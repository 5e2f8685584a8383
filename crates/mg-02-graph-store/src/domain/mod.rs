//! # Domain Layer
//!
//! Pure merge logic and configuration. No I/O.

pub mod config;
pub mod errors;
pub mod ham;

pub use config::GraphStoreConfig;
pub use errors::{GraphError, KVStoreError, SerializationError};
pub use ham::{ham, merge, merge_flag, FieldDecision, MergeResult};
