//! # Shared Bus - Event Bus Between Subsystems
//!
//! The graph store publishes every accepted change here; replication, the
//! read path, the peer directory and telemetry subscribe with filters.
//!
//! ```text
//! ┌──────────────┐                    ┌──────────────┐
//! │ Graph store  │                    │ Replication  │
//! │              │    publish()       │ Read path    │
//! │              │ ──────┐            │ Telemetry    │
//! └──────────────┘       │            └──────────────┘
//!                        ▼                    ↑
//!                  ┌──────────────┐          │
//!                  │  Event Bus   │          │
//!                  │              │ ─────────┘
//!                  └──────────────┘  subscribe()
//! ```
//!
//! Delivery is best effort: a subscriber that falls more than the channel
//! capacity behind skips the events it missed.

#![allow(clippy::missing_const_for_fn)]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod events;
pub mod publisher;
pub mod subscriber;

pub use events::{EventFilter, EventTopic, GraphEvent};
pub use publisher::{EventPublisher, InMemoryEventBus};
pub use subscriber::{EventStream, EventSubscriber, Subscription, SubscriptionError};

/// Maximum events to buffer per subscriber before it starts lagging.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1024;
