//! Bincode encoding of nodes.
//!
//! Field values are untagged in JSON, which bincode cannot read back, so
//! nodes are stored through a tagged mirror of the shared types.

use crate::domain::errors::SerializationError;
use crate::ports::outbound::NodeSerializer;
use serde::{Deserialize, Serialize};
use shared_types::{FieldValue, Node, Soul, Timestamp};

#[derive(Serialize, Deserialize)]
enum StoredValue {
    Null,
    Bool(bool),
    Int(i64),
    Text(String),
}

#[derive(Serialize, Deserialize)]
struct StoredField {
    key: String,
    value: StoredValue,
    state: Timestamp,
}

#[derive(Serialize, Deserialize)]
struct StoredNode {
    soul: String,
    fields: Vec<StoredField>,
    tombstone: Option<Timestamp>,
}

impl From<&FieldValue> for StoredValue {
    fn from(value: &FieldValue) -> Self {
        match value {
            FieldValue::Null => StoredValue::Null,
            FieldValue::Bool(b) => StoredValue::Bool(*b),
            FieldValue::Int(i) => StoredValue::Int(*i),
            FieldValue::Text(s) => StoredValue::Text(s.clone()),
        }
    }
}

impl From<StoredValue> for FieldValue {
    fn from(value: StoredValue) -> Self {
        match value {
            StoredValue::Null => FieldValue::Null,
            StoredValue::Bool(b) => FieldValue::Bool(b),
            StoredValue::Int(i) => FieldValue::Int(i),
            StoredValue::Text(s) => FieldValue::Text(s),
        }
    }
}

/// Default node serializer using bincode.
#[derive(Debug, Default, Clone, Copy)]
pub struct BincodeNodeSerializer;

impl NodeSerializer for BincodeNodeSerializer {
    fn serialize(&self, node: &Node) -> Result<Vec<u8>, SerializationError> {
        let stored = StoredNode {
            soul: node.soul.as_str().to_string(),
            fields: node
                .fields
                .iter()
                .map(|(key, value)| StoredField {
                    key: key.clone(),
                    value: value.into(),
                    state: node.state_of(key).unwrap_or_default(),
                })
                .collect(),
            tombstone: node.tombstone,
        };
        bincode::serialize(&stored).map_err(|e| SerializationError {
            message: e.to_string(),
        })
    }

    fn deserialize(&self, data: &[u8]) -> Result<Node, SerializationError> {
        let stored: StoredNode = bincode::deserialize(data).map_err(|e| SerializationError {
            message: e.to_string(),
        })?;
        let mut node = Node::new(Soul::new(stored.soul));
        node.tombstone = stored.tombstone;
        for field in stored.fields {
            node.states.insert(field.key.clone(), field.state);
            node.fields.insert(field.key, field.value.into());
        }
        Ok(node)
    }
}
