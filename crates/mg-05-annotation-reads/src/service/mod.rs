//! # Read Service
//!
//! - `core`: the collection window and response assembly
//! - `api`: [`AnnotationReadApi`](crate::ports::AnnotationReadApi) implementation
//! - `profiles`: author profile resolution
//! - `events`: feeds the recent-annotations cache from the bus

mod api;
mod core;
mod events;
mod profiles;


pub use self::core::ReadService;
pub use profiles::ProfileResolver;
