//! # Graph Primitives
//!
//! The replicated substrate is a graph of nodes. Each node is a flat map of
//! fields, and every field carries the HAM state (write timestamp) at which
//! it was last set. A node may also carry a soul-level tombstone state: every
//! field written at or before that state is considered gone.

use crate::souls::Soul;
use crate::time::Timestamp;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Prefix reserved for bookkeeping keys that never carry content.
pub const MARKER_PREFIX: char = '_';

/// A scalar stored in a node field.
///
/// Nested objects are not supported; structured data (e.g. annotation
/// metadata) is stored as JSON text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Null,
    Bool(bool),
    Int(i64),
    Text(String),
}

impl FieldValue {
    /// JSON text of the value, used to break ties between equal states.
    pub fn lexical(&self) -> String {
        match self {
            FieldValue::Null => "null".to_string(),
            FieldValue::Bool(b) => b.to_string(),
            FieldValue::Int(i) => i.to_string(),
            FieldValue::Text(s) => serde_json::Value::String(s.clone()).to_string(),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            FieldValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FieldValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Text(s)
    }
}

impl From<i64> for FieldValue {
    fn from(i: i64) -> Self {
        FieldValue::Int(i)
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        FieldValue::Bool(b)
    }
}

/// Field name to value.
pub type FieldMap = BTreeMap<String, FieldValue>;

/// Field name to HAM state.
pub type StateMap = BTreeMap<String, Timestamp>;

/// Whether a key is bookkeeping rather than content.
pub fn is_marker_key(key: &str) -> bool {
    key.starts_with(MARKER_PREFIX)
}

/// A stored node: current field values plus their states.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    pub soul: Soul,
    #[serde(default)]
    pub fields: FieldMap,
    #[serde(default)]
    pub states: StateMap,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tombstone: Option<Timestamp>,
}

impl Node {
    pub fn new(soul: Soul) -> Self {
        Self {
            soul,
            ..Self::default()
        }
    }

    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.fields.get(key)
    }

    pub fn text(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(FieldValue::as_str)
    }

    pub fn int(&self, key: &str) -> Option<i64> {
        self.get(key).and_then(FieldValue::as_i64)
    }

    pub fn flag(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(FieldValue::as_bool)
    }

    pub fn state_of(&self, key: &str) -> Option<Timestamp> {
        self.states.get(key).copied()
    }

    /// Tombstoned and nothing written since.
    pub fn is_tombstoned(&self) -> bool {
        self.tombstone.is_some() && self.fields.is_empty()
    }

    /// Fields that carry content (markers excluded).
    pub fn content_fields(&self) -> impl Iterator<Item = (&String, &FieldValue)> {
        self.fields.iter().filter(|(k, _)| !is_marker_key(k))
    }

    /// Whether any non-marker field is present.
    pub fn has_content(&self) -> bool {
        self.content_fields().next().is_some()
    }

    /// Replay this node as a put carrying its original states.
    pub fn to_put(&self) -> GraphPut {
        GraphPut {
            soul: self.soul.clone(),
            data: if self.fields.is_empty() && self.tombstone.is_some() {
                None
            } else {
                Some(self.fields.clone())
            },
            states: self.states.clone(),
            tombstone: self.tombstone,
        }
    }
}

/// A write against one soul.
///
/// `data: None` is a tombstone (the null write). States are optional on the
/// wire; the receiving node stamps missing ones with its own clock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphPut {
    pub soul: Soul,
    #[serde(default)]
    pub data: Option<FieldMap>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub states: StateMap,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tombstone: Option<Timestamp>,
}

impl GraphPut {
    /// Field write without explicit states.
    pub fn fields(soul: Soul, data: FieldMap) -> Self {
        Self {
            soul,
            data: Some(data),
            states: StateMap::new(),
            tombstone: None,
        }
    }

    /// Null write.
    pub fn tombstone(soul: Soul) -> Self {
        Self {
            soul,
            data: None,
            states: StateMap::new(),
            tombstone: None,
        }
    }

    /// Builder: a single field.
    pub fn field(soul: Soul, key: &str, value: impl Into<FieldValue>) -> Self {
        let mut data = FieldMap::new();
        data.insert(key.to_string(), value.into());
        Self::fields(soul, data)
    }

    pub fn is_tombstone(&self) -> bool {
        self.data.is_none()
    }

    /// Only bookkeeping keys are written.
    pub fn is_marker_only(&self) -> bool {
        self.data
            .as_ref()
            .is_some_and(|d| !d.is_empty() && d.keys().all(|k| is_marker_key(k)))
    }

    pub fn value(&self, key: &str) -> Option<&FieldValue> {
        self.data.as_ref().and_then(|d| d.get(key))
    }

    pub fn text(&self, key: &str) -> Option<&str> {
        self.value(key).and_then(FieldValue::as_str)
    }

    /// Fill in any missing state with `now`.
    pub fn stamp(&mut self, now: Timestamp) {
        match &self.data {
            Some(data) => {
                for key in data.keys() {
                    self.states.entry(key.clone()).or_insert(now);
                }
            }
            None => {
                self.tombstone.get_or_insert(now);
            }
        }
    }

    /// Highest state carried by this put.
    pub fn max_state(&self) -> Option<Timestamp> {
        self.states.values().copied().chain(self.tombstone).max()
    }
}

/// Where a write came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WriteOrigin {
    /// A client of this node.
    Local,
    /// Relayed live by a peer.
    Gossip,
    /// Pulled from a peer to catch up on history.
    Sync,
    /// Side effect of another accepted write on this node.
    Internal,
}

impl WriteOrigin {
    /// Writes that should be relayed to other peers.
    pub fn is_replicable(self) -> bool {
        matches!(self, WriteOrigin::Local | WriteOrigin::Gossip)
    }

    /// Writes that pass through the write hook.
    pub fn is_validated(self) -> bool {
        !matches!(self, WriteOrigin::Internal)
    }
}
