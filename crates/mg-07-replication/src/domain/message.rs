//! # Wire Messages
//!
//! A relayed put travels as a [`GraphMessage`]. Its id is a digest of the
//! put, so the same change relayed along different paths carries the same id
//! and is processed once per node.

use mg_02_graph_store::PutOutcome;
use serde::{Deserialize, Serialize};
use shared_crypto::short_hex_digest;
use shared_types::GraphPut;

/// Digest bytes kept in a message id.
const MESSAGE_ID_BYTES: usize = 16;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphMessage {
    pub id: String,
    pub put: GraphPut,
    /// Graph endpoint of the sender, when it has one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
}

impl GraphMessage {
    pub fn new(put: GraphPut, from: Option<String>) -> Self {
        Self {
            id: message_id(&put),
            put,
            from,
        }
    }

    /// Whether `id` matches the content. Senders may omit or garble ids.
    pub fn has_valid_id(&self) -> bool {
        self.id == message_id(&self.put)
    }
}

pub fn message_id(put: &GraphPut) -> String {
    // GraphPut holds only maps of scalars; serialization cannot fail.
    let bytes = serde_json::to_vec(put).unwrap_or_default();
    short_hex_digest(&bytes, MESSAGE_ID_BYTES)
}

/// What happened to an inbound message.
#[derive(Debug, Clone, PartialEq)]
pub enum Delivery {
    /// Already processed.
    Duplicate,
    /// Handed to the graph store.
    Delivered(PutOutcome),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RelayReport {
    pub attempted: usize,
    pub delivered: usize,
    pub failed: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PullReport {
    pub peers_queried: usize,
    pub peers_failed: usize,
    pub nodes_received: usize,
    pub nodes_applied: usize,
    pub nodes_rejected: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BootstrapReport {
    pub seeds_contacted: usize,
    pub seeds_failed: usize,
    pub peers_learned: usize,
}
