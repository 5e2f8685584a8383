//! # Marginalia Test Suite
//!
//! Cross-subsystem flows wired from the real crates, in-process.
//!
//! ## Structure
//!
//! ```text
//! tests/
//! ├── src/
//! │   ├── harness.rs       # TestNode: a full container on a manual clock
//! │   └── integration/
//! │       ├── properties.rs  # idempotence, monotonic deletion, shard determinism
//! │       ├── security.rs    # tampered signatures, unauthorized deletes
//! │       ├── scenarios.rs   # end-to-end read scenarios
//! │       └── multi_node.rs  # replication over the loopback network
//! └── benches/
//!     └── subsystem_benchmarks.rs
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p mg-tests
//! cargo test -p mg-tests integration::multi_node::
//! cargo bench -p mg-tests
//! ```

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

pub mod harness;
pub mod integration;
