//! # Domain Layer
//!
//! Lifecycle of deletable content and the signed request that moves it.

pub mod config;
pub mod errors;
pub mod lifecycle;
pub mod request;

pub use config::DeletionConfig;
pub use errors::DeletionError;
pub use lifecycle::{is_reclaimable, lifecycle_of, Lifecycle};
pub use request::{DeletionReceipt, DeletionRequest, GcReport};
