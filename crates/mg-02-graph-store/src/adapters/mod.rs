//! # Adapters
//!
//! Concrete implementations of the outbound ports.

pub mod serializer;
pub mod storage;

pub use serializer::BincodeNodeSerializer;
pub use storage::{FileBackedKVStore, InMemoryKVStore};
