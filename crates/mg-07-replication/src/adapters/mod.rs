//! # Adapters
//!
//! - `http` - reqwest client speaking the gateway's `/graph` routes
//! - `loopback` - in-process network of nodes, for tests (`test-utils`)

pub mod http;
#[cfg(any(test, feature = "test-utils"))]
pub mod loopback;

pub use http::HttpPeerTransport;
#[cfg(any(test, feature = "test-utils"))]
pub use loopback::LoopbackNetwork;
