//! # Outbound Ports (Driven Ports)
//!
//! Dependencies required by the graph store.

use crate::domain::errors::{GraphError, KVStoreError, SerializationError};
use shared_types::{GraphPut, Node, Soul, Timestamp, WriteOrigin};

/// Key/value pairs returned by a prefix scan.
pub type ScanResult = Vec<(Vec<u8>, Vec<u8>)>;

/// Abstract interface for key-value database operations.
///
/// Keys are soul bytes, so a prefix scan over a soul returns its subtree.
pub trait KeyValueStore: Send + Sync {
    /// Get a value by key.
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, KVStoreError>;

    /// Put a single key-value pair.
    fn put(&mut self, key: &[u8], value: &[u8]) -> Result<(), KVStoreError>;

    /// Delete a key.
    fn delete(&mut self, key: &[u8]) -> Result<(), KVStoreError>;

    /// Apply all operations or none.
    fn atomic_batch_write(&mut self, operations: Vec<BatchOperation>) -> Result<(), KVStoreError>;

    /// Check if a key exists.
    fn exists(&self, key: &[u8]) -> Result<bool, KVStoreError>;

    /// Pairs whose key starts with `prefix`, in key order.
    fn prefix_scan(&self, prefix: &[u8]) -> Result<ScanResult, KVStoreError>;
}

/// Batch operation for atomic writes.
#[derive(Debug, Clone)]
pub enum BatchOperation {
    /// Put a key-value pair.
    Put { key: Vec<u8>, value: Vec<u8> },
    /// Delete a key.
    Delete { key: Vec<u8> },
}

impl BatchOperation {
    pub fn put(key: impl Into<Vec<u8>>, value: impl Into<Vec<u8>>) -> Self {
        BatchOperation::Put {
            key: key.into(),
            value: value.into(),
        }
    }

    pub fn delete(key: impl Into<Vec<u8>>) -> Self {
        BatchOperation::Delete { key: key.into() }
    }
}

/// Encoding of nodes at rest.
pub trait NodeSerializer: Send + Sync {
    fn serialize(&self, node: &Node) -> Result<Vec<u8>, SerializationError>;

    fn deserialize(&self, data: &[u8]) -> Result<Node, SerializationError>;
}

/// Read access handed to the write hook.
///
/// The hook runs while the store holds its write lock, so it must read
/// through this view rather than through the store's public API.
pub trait GraphReader {
    fn node(&self, soul: &Soul) -> Result<Option<Node>, GraphError>;
}

/// Facts about a put that are not part of the put itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteContext {
    pub origin: WriteOrigin,
    /// Local clock when the put arrived.
    pub now: Timestamp,
}

/// Answer of the write hook.
#[derive(Debug, Clone, PartialEq)]
pub enum WriteVerdict {
    /// Store the put, then apply these extra puts with internal origin.
    Accepted { side_writes: Vec<GraphPut> },
    /// Drop the put.
    Rejected {
        reason: String,
        /// Short, stable label for the reason (metrics).
        code: &'static str,
        /// Identity the put acted as, when it named one.
        actor: Option<String>,
    },
}

impl WriteVerdict {
    pub fn accept() -> Self {
        WriteVerdict::Accepted {
            side_writes: Vec::new(),
        }
    }
}

/// Called synchronously for every put that is not internal, before merge.
///
/// Implementations never fail: anything wrong with the put is a rejection.
pub trait WriteHook: Send + Sync {
    fn check(&self, put: &GraphPut, ctx: &WriteContext, reader: &dyn GraphReader) -> WriteVerdict;
}
