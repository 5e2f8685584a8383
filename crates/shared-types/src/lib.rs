//! # Shared Types Crate
//!
//! Graph primitives and annotation entities shared by every subsystem.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: souls, nodes, puts and entity schemas are
//!   defined here and nowhere else.
//! - **Untyped on the wire, typed at the boundary**: nodes travel as field
//!   maps; [`GraphEntity`] is where a map becomes an `Annotation`, `Comment`,
//!   `PeerRecord`, `DeletionRecord` or `Profile`.
//! - **One clock unit**: all timestamps are milliseconds since the epoch.

pub mod entities;
pub mod errors;
pub mod graph;
pub mod souls;
pub mod throttle;
pub mod time;

pub use entities::*;
pub use errors::*;
pub use graph::*;
pub use souls::{escape_segment, unescape_segment, Soul, SoulKind};
pub use throttle::{SweepPermit, SweepThrottle};
pub use time::*;
