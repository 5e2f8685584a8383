//! # Peer Directory Service
//!
//! Keeps `peers/<key>` entries in the graph: our own, refreshed on a timer,
//! and one per peer we hear from. Sweeps tombstone the rest.
//!
//! Entries are ordinary graph nodes, so they replicate like any other write
//! and every peer converges on the same directory.

mod api;
mod core;
mod events;
mod maintenance;

pub use core::PeerDirectory;

#[cfg(test)]
mod tests;
