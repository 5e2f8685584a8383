//! # Ports Layer

pub mod inbound;
pub mod outbound;

pub use inbound::AnnotationReadApi;
pub use outbound::LocationSync;
