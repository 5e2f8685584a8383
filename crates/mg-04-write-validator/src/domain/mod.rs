//! # Domain Layer
//!
//! Validation rules, the per-author rate limiter, the security log and the
//! admin registry.

pub mod admins;
pub mod config;
pub mod errors;
pub mod rate_limit;
pub mod rules;
pub mod security_log;
pub mod signing;

pub use admins::AdminRegistry;
pub use config::ValidationConfig;
pub use errors::ValidationRejection;
pub use rate_limit::{AuthorRateLimiter, RateLimitResult};
pub use security_log::{SecurityEvent, SecurityLog};
