//! # Annotation Read Path (Subsystem 5)
//!
//! Answers "what annotations exist on this URL".
//!
//! ## Read flow
//!
//! ```text
//! url ─→ placement ─→ candidate locations (domain shard [+ sub-shard])
//!          │
//!          ├─ subscribe to candidate children
//!          ├─ pull candidates from peers (background)
//!          ├─ local read + live events until pulls finish or the window closes
//!          ├─ dedup by id, drop deleted
//!          ├─ comments from every candidate, dedup, drop deleted
//!          ├─ author profiles (cache → primary → legacy → placeholder)
//!          └─ sync marker on every candidate
//! ```
//!
//! Nothing found is [`ReadError::NotFound`]; partial failures degrade to
//! what could be read.

#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod domain;
pub mod ports;
pub mod service;

pub use domain::{
    AnnotationView, AuthorProfile, Collector, CommentView, ProfileCache, ReadError,
    ReadPathConfig, ReadResponse, RecentAnnotationsCache,
};
pub use ports::{AnnotationReadApi, LocationSync};
pub use service::{ProfileResolver, ReadService};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
