//! # Integration Flows

pub mod multi_node;
pub mod properties;
pub mod scenarios;
pub mod security;
