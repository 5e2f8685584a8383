//! # Domain Layer

pub mod config;
pub mod errors;

pub use config::{CorsConfig, GatewayConfig};
pub use errors::GatewayError;
