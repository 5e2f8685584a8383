//! # Domain Layer
//!
//! Directory configuration, entry classification and errors.

pub mod config;
pub mod entry;
pub mod errors;

pub use config::DirectoryConfig;
pub use entry::{classify, EntryHealth, PeerEntry, SweepReport};
pub use errors::PeerDirectoryError;
