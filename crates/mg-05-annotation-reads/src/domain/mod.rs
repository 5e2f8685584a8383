//! # Domain Layer
//!
//! Deduplication of records gathered from several shards, response views,
//! and the two process-wide caches.

pub mod collector;
pub mod config;
pub mod errors;
pub mod profile_cache;
pub mod recent;
pub mod view;

pub use collector::{Collectable, Collector};
pub use config::ReadPathConfig;
pub use errors::ReadError;
pub use profile_cache::ProfileCache;
pub use recent::RecentAnnotationsCache;
pub use view::{AnnotationView, AuthorProfile, CommentView, ReadResponse};
