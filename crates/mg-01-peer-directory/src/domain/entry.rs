//! # Directory Entries
//!
//! An entry at `peers/<key>` is valid when it parses as a peer record and
//! its key is the hash of its URL. Valid entries are live until they have
//! been idle longer than the sweep's threshold.

use serde::Serialize;
use shared_crypto::peer_key;
use shared_types::{Node, PeerRecord, SoulKind, Timestamp};

/// A parsed directory entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PeerEntry {
    pub key: String,
    #[serde(flatten)]
    pub record: PeerRecord,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryHealth {
    Live(PeerEntry),
    Stale(PeerEntry),
    /// Unparseable, keyed wrong, or not a directory soul at all.
    Invalid(String),
    /// Already tombstoned; nothing to do.
    Gone,
}

/// Classify a stored directory node against an idle threshold.
pub fn classify(node: &Node, now: Timestamp, stale_after_ms: u64) -> EntryHealth {
    if node.is_tombstoned() && !node.has_content() {
        return EntryHealth::Gone;
    }
    let SoulKind::Peer { key } = node.soul.kind() else {
        return EntryHealth::Invalid(format!("{} is not a peer soul", node.soul));
    };
    let record = match PeerRecord::from_fields(&node.fields) {
        Ok(record) => record,
        Err(e) => return EntryHealth::Invalid(e.to_string()),
    };
    if peer_key(&record.url) != key {
        return EntryHealth::Invalid(format!("key {} does not match {}", key, record.url));
    }

    let entry = PeerEntry { key, record };
    if now.saturating_sub(entry.record.last_connection) > stale_after_ms {
        EntryHealth::Stale(entry)
    } else {
        EntryHealth::Live(entry)
    }
}

/// What one sweep did.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SweepReport {
    /// Another sweep was running or one ran too recently.
    pub skipped: bool,
    pub examined: usize,
    pub pruned_stale: Vec<String>,
    pub pruned_invalid: Vec<String>,
}

impl SweepReport {
    pub fn skipped() -> Self {
        Self {
            skipped: true,
            ..Self::default()
        }
    }

    pub fn pruned(&self) -> usize {
        self.pruned_stale.len() + self.pruned_invalid.len()
    }
}
