//! # Domain Layer
//!
//! Wire message, deduplication cache, relay target selection.

pub mod config;
pub mod errors;
pub mod message;
pub mod seen_cache;
pub mod selection;

pub use config::ReplicationConfig;
pub use errors::ReplicationError;
pub use message::{message_id, BootstrapReport, Delivery, GraphMessage, PullReport, RelayReport};
pub use seen_cache::SeenMessageCache;
pub use selection::select_relay_targets;
