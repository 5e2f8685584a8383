//! # Subsystem Container
//!
//! Configuration plus the fully wired set of subsystem instances.

pub mod config;
pub mod subsystems;

pub use config::{ConfigError, NetworkConfig, NodeConfig, StorageConfig};
pub use subsystems::{ContainerError, SubsystemContainer};
