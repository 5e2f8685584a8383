//! # Adapters
//!
//! Port implementations that connect one subsystem to another where a
//! direct crate dependency would create a cycle.

pub mod location_sync;

pub use location_sync::ReplicationSync;
