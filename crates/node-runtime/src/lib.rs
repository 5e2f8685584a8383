//! # Marginalia Node Runtime
//!
//! Loads configuration, wires every subsystem together, runs the background
//! tasks and serves the HTTP gateway.
//!
//! ## Modular Structure
//!
//! - `cli` - command-line flags and `MG_*` environment overrides
//! - `container/` - configuration and dependency-ordered subsystem wiring
//! - `adapters/` - port implementations that bridge two subsystems
//! - `handlers/` - maintenance loops and the bus-to-metrics bridge
//! - `runtime` - startup and graceful shutdown
//!
//! ## Subsystems
//!
//! | Id | Crate | Role |
//! |----|-------|------|
//! | 01 | `mg-01-peer-directory` | Peer registry stored in the graph |
//! | 02 | `mg-02-graph-store` | Last-write-wins node store |
//! | 03 | `mg-03-shard-router` | URL to shard mapping |
//! | 04 | `mg-04-write-validator` | Signature and ownership checks |
//! | 05 | `mg-05-annotation-reads` | Annotation queries |
//! | 06 | `mg-06-deletion` | Tombstone garbage collection |
//! | 07 | `mg-07-replication` | Gossip relay and pull sync |
//! | 08 | `mg-08-api-gateway` | HTTP surface |

#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod adapters;
pub mod cli;
pub mod container;
pub mod handlers;
pub mod runtime;

pub use cli::Cli;
pub use container::{ConfigError, ContainerError, NodeConfig, SubsystemContainer};
pub use runtime::{NodeRuntime, RuntimeError};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
