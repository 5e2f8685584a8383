//! # Ports Layer

pub mod inbound;
pub mod outbound;

pub use inbound::ReplicationApi;
pub use outbound::PeerTransport;
