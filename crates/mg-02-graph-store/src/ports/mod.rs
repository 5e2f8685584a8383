//! # Ports
//!
//! - `inbound`: the API other subsystems call.
//! - `outbound`: what the store needs from its host (persistence, encoding,
//!   and the write hook).

pub mod inbound;
pub mod outbound;

pub use inbound::{GraphApi, PutOutcome};
pub use outbound::{
    BatchOperation, GraphReader, KeyValueStore, NodeSerializer, ScanResult, WriteContext,
    WriteHook, WriteVerdict,
};
