//! # Entities
//!
//! Typed views over graph nodes. Nodes on the wire are untyped field maps;
//! these types are where a payload is checked against its schema.
//!
//! Every signed entity exposes `signing_bytes()`: the compact JSON of the
//! signed fields in a fixed order. Signers and verifiers both go through it.

use crate::errors::EntityError;
use crate::graph::{FieldMap, FieldValue, Node};
use crate::souls::{Soul, SoulKind};
use crate::time::Timestamp;
use serde::{Deserialize, Serialize};

/// Field names as they appear in the graph.
pub mod fields {
    pub const ID: &str = "id";
    pub const URL: &str = "url";
    pub const CONTENT: &str = "content";
    pub const AUTHOR: &str = "author";
    pub const TIMESTAMP: &str = "timestamp";
    pub const IS_DELETED: &str = "isDeleted";
    pub const DELETED_BY: &str = "deletedBy";
    pub const SCREENSHOT: &str = "screenshot";
    pub const SIGNATURE: &str = "signature";
    pub const NONCE: &str = "nonce";
    pub const METADATA: &str = "metadata";
    pub const ANNOTATION_ID: &str = "annotationId";
    pub const LAST_CONNECTION: &str = "lastConnection";
    pub const DISPLAY_NAME: &str = "displayName";
    pub const AVATAR: &str = "avatar";
    pub const COUNT: &str = "count";
    pub const WINDOW_START: &str = "windowStart";
    /// Marker written by readers to nudge lagging replicas.
    pub const SYNC_MARKER: &str = "_sync";
}

/// Prefix of every `did:key` identifier.
pub const DID_KEY_PREFIX: &str = "did:key:";

/// Cheap syntactic check; real validation happens when the key is decoded.
pub fn is_did_key(value: &str) -> bool {
    value
        .strip_prefix(DID_KEY_PREFIX)
        .is_some_and(|rest| rest.len() > 1 && !rest.contains(crate::souls::SEPARATOR))
}

fn require_text(map: &FieldMap, field: &'static str) -> Result<String, EntityError> {
    match map.get(field) {
        Some(FieldValue::Text(s)) => Ok(s.clone()),
        Some(FieldValue::Null) | None => Err(EntityError::MissingField(field)),
        Some(_) => Err(EntityError::WrongType {
            field,
            expected: "text",
        }),
    }
}

fn optional_text(map: &FieldMap, field: &'static str) -> Result<Option<String>, EntityError> {
    match map.get(field) {
        Some(FieldValue::Text(s)) => Ok(Some(s.clone())),
        Some(FieldValue::Null) | None => Ok(None),
        Some(_) => Err(EntityError::WrongType {
            field,
            expected: "text",
        }),
    }
}

fn require_timestamp(map: &FieldMap, field: &'static str) -> Result<Timestamp, EntityError> {
    match map.get(field) {
        Some(FieldValue::Int(i)) if *i >= 0 => Ok(*i as Timestamp),
        Some(FieldValue::Int(_)) => Err(EntityError::Invalid {
            field,
            reason: "negative timestamp".into(),
        }),
        Some(FieldValue::Null) | None => Err(EntityError::MissingField(field)),
        Some(_) => Err(EntityError::WrongType {
            field,
            expected: "integer",
        }),
    }
}

fn deleted_flag(map: &FieldMap) -> Result<bool, EntityError> {
    match map.get(fields::IS_DELETED) {
        Some(FieldValue::Bool(b)) => Ok(*b),
        Some(FieldValue::Null) | None => Ok(false),
        Some(_) => Err(EntityError::WrongType {
            field: fields::IS_DELETED,
            expected: "bool",
        }),
    }
}

fn signing_json<T: Serialize>(payload: &T) -> Vec<u8> {
    // Serializing a struct of strings and integers cannot fail.
    serde_json::to_vec(payload).unwrap_or_default()
}

fn int(ts: Timestamp) -> FieldValue {
    FieldValue::Int(ts as i64)
}

/// An annotation on a URL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Annotation {
    /// Convention: `<author-did>-<creation-epoch-ms>`.
    pub id: String,
    pub url: String,
    pub content: String,
    pub author: String,
    pub timestamp: Timestamp,
    #[serde(default)]
    pub is_deleted: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub screenshot: Option<String>,
    pub signature: String,
    pub nonce: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

#[derive(Serialize)]
struct AnnotationSigningPayload<'a> {
    id: &'a str,
    url: &'a str,
    content: &'a str,
    author: &'a str,
    timestamp: Timestamp,
    nonce: &'a str,
}

impl Annotation {
    pub fn from_fields(map: &FieldMap) -> Result<Self, EntityError> {
        let metadata = match optional_text(map, fields::METADATA)? {
            Some(raw) => Some(serde_json::from_str(&raw).map_err(|e| EntityError::Invalid {
                field: fields::METADATA,
                reason: e.to_string(),
            })?),
            None => None,
        };
        Ok(Self {
            id: require_text(map, fields::ID)?,
            url: require_text(map, fields::URL)?,
            content: require_text(map, fields::CONTENT)?,
            author: require_text(map, fields::AUTHOR)?,
            timestamp: require_timestamp(map, fields::TIMESTAMP)?,
            is_deleted: deleted_flag(map)?,
            screenshot: optional_text(map, fields::SCREENSHOT)?,
            signature: require_text(map, fields::SIGNATURE)?,
            nonce: require_text(map, fields::NONCE)?,
            metadata,
        })
    }

    pub fn to_fields(&self) -> FieldMap {
        let mut map = FieldMap::new();
        map.insert(fields::ID.into(), self.id.clone().into());
        map.insert(fields::URL.into(), self.url.clone().into());
        map.insert(fields::CONTENT.into(), self.content.clone().into());
        map.insert(fields::AUTHOR.into(), self.author.clone().into());
        map.insert(fields::TIMESTAMP.into(), int(self.timestamp));
        map.insert(fields::IS_DELETED.into(), self.is_deleted.into());
        map.insert(fields::SIGNATURE.into(), self.signature.clone().into());
        map.insert(fields::NONCE.into(), self.nonce.clone().into());
        if let Some(screenshot) = &self.screenshot {
            map.insert(fields::SCREENSHOT.into(), screenshot.clone().into());
        }
        if let Some(metadata) = &self.metadata {
            map.insert(fields::METADATA.into(), metadata.to_string().into());
        }
        map
    }

    /// Bytes covered by the author's signature.
    pub fn signing_bytes(&self) -> Vec<u8> {
        signing_json(&AnnotationSigningPayload {
            id: &self.id,
            url: &self.url,
            content: &self.content,
            author: &self.author,
            timestamp: self.timestamp,
            nonce: &self.nonce,
        })
    }
}

/// A comment nested under an annotation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: String,
    pub annotation_id: String,
    pub content: String,
    pub author: String,
    pub timestamp: Timestamp,
    #[serde(default)]
    pub is_deleted: bool,
    pub signature: String,
    pub nonce: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CommentSigningPayload<'a> {
    id: &'a str,
    annotation_id: &'a str,
    content: &'a str,
    author: &'a str,
    timestamp: Timestamp,
    nonce: &'a str,
}

impl Comment {
    pub fn from_fields(map: &FieldMap) -> Result<Self, EntityError> {
        Ok(Self {
            id: require_text(map, fields::ID)?,
            annotation_id: require_text(map, fields::ANNOTATION_ID)?,
            content: require_text(map, fields::CONTENT)?,
            author: require_text(map, fields::AUTHOR)?,
            timestamp: require_timestamp(map, fields::TIMESTAMP)?,
            is_deleted: deleted_flag(map)?,
            signature: require_text(map, fields::SIGNATURE)?,
            nonce: require_text(map, fields::NONCE)?,
        })
    }

    pub fn to_fields(&self) -> FieldMap {
        let mut map = FieldMap::new();
        map.insert(fields::ID.into(), self.id.clone().into());
        map.insert(fields::ANNOTATION_ID.into(), self.annotation_id.clone().into());
        map.insert(fields::CONTENT.into(), self.content.clone().into());
        map.insert(fields::AUTHOR.into(), self.author.clone().into());
        map.insert(fields::TIMESTAMP.into(), int(self.timestamp));
        map.insert(fields::IS_DELETED.into(), self.is_deleted.into());
        map.insert(fields::SIGNATURE.into(), self.signature.clone().into());
        map.insert(fields::NONCE.into(), self.nonce.clone().into());
        map
    }

    pub fn signing_bytes(&self) -> Vec<u8> {
        signing_json(&CommentSigningPayload {
            id: &self.id,
            annotation_id: &self.annotation_id,
            content: &self.content,
            author: &self.author,
            timestamp: self.timestamp,
            nonce: &self.nonce,
        })
    }
}

/// Authorization for soft-deleting the content at one soul.
///
/// Stored at `deletions/<target soul>`, separately from its target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeletionRecord {
    pub signature: String,
    pub author: String,
    pub timestamp: Timestamp,
    pub nonce: String,
}

#[derive(Serialize)]
struct DeletionSigningPayload<'a> {
    key: &'a str,
    timestamp: Timestamp,
    nonce: &'a str,
}

impl DeletionRecord {
    pub fn from_fields(map: &FieldMap) -> Result<Self, EntityError> {
        Ok(Self {
            signature: require_text(map, fields::SIGNATURE)?,
            author: require_text(map, fields::AUTHOR)?,
            timestamp: require_timestamp(map, fields::TIMESTAMP)?,
            nonce: require_text(map, fields::NONCE)?,
        })
    }

    pub fn to_fields(&self) -> FieldMap {
        let mut map = FieldMap::new();
        map.insert(fields::SIGNATURE.into(), self.signature.clone().into());
        map.insert(fields::AUTHOR.into(), self.author.clone().into());
        map.insert(fields::TIMESTAMP.into(), int(self.timestamp));
        map.insert(fields::NONCE.into(), self.nonce.clone().into());
        map
    }

    /// Signed bytes: `{key, timestamp, nonce}` where `key` is the target soul.
    pub fn signing_bytes(target: &Soul, timestamp: Timestamp, nonce: &str) -> Vec<u8> {
        signing_json(&DeletionSigningPayload {
            key: target.as_str(),
            timestamp,
            nonce,
        })
    }
}

/// A peer directory entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeerRecord {
    pub url: String,
    /// First seen.
    pub timestamp: Timestamp,
    pub last_connection: Timestamp,
}

impl PeerRecord {
    /// Parse a directory entry. `lastConnection` falls back to `timestamp`.
    pub fn from_fields(map: &FieldMap) -> Result<Self, EntityError> {
        let timestamp = require_timestamp(map, fields::TIMESTAMP)?;
        let last_connection = match map.get(fields::LAST_CONNECTION) {
            None | Some(FieldValue::Null) => timestamp,
            Some(_) => require_timestamp(map, fields::LAST_CONNECTION)?,
        };
        Ok(Self {
            url: require_text(map, fields::URL)?,
            timestamp,
            last_connection,
        })
    }

    pub fn to_fields(&self) -> FieldMap {
        let mut map = FieldMap::new();
        map.insert(fields::URL.into(), self.url.clone().into());
        map.insert(fields::TIMESTAMP.into(), int(self.timestamp));
        map.insert(fields::LAST_CONNECTION.into(), int(self.last_connection));
        map
    }
}

/// Display profile of an author.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub author: String,
    pub display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    pub timestamp: Timestamp,
    pub nonce: String,
    pub signature: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ProfileSigningPayload<'a> {
    author: &'a str,
    display_name: &'a str,
    timestamp: Timestamp,
    nonce: &'a str,
}

impl Profile {
    pub fn from_fields(map: &FieldMap) -> Result<Self, EntityError> {
        Ok(Self {
            author: require_text(map, fields::AUTHOR)?,
            display_name: require_text(map, fields::DISPLAY_NAME)?,
            avatar: optional_text(map, fields::AVATAR)?,
            timestamp: require_timestamp(map, fields::TIMESTAMP)?,
            nonce: require_text(map, fields::NONCE)?,
            signature: require_text(map, fields::SIGNATURE)?,
        })
    }

    pub fn to_fields(&self) -> FieldMap {
        let mut map = FieldMap::new();
        map.insert(fields::AUTHOR.into(), self.author.clone().into());
        map.insert(fields::DISPLAY_NAME.into(), self.display_name.clone().into());
        map.insert(fields::TIMESTAMP.into(), int(self.timestamp));
        map.insert(fields::NONCE.into(), self.nonce.clone().into());
        map.insert(fields::SIGNATURE.into(), self.signature.clone().into());
        if let Some(avatar) = &self.avatar {
            map.insert(fields::AVATAR.into(), avatar.clone().into());
        }
        map
    }

    pub fn signing_bytes(&self) -> Vec<u8> {
        signing_json(&ProfileSigningPayload {
            author: &self.author,
            display_name: &self.display_name,
            timestamp: self.timestamp,
            nonce: &self.nonce,
        })
    }
}

/// Typed payload of a node, chosen by the family of its soul.
#[derive(Debug, Clone, PartialEq)]
pub enum GraphEntity {
    Annotation(Annotation),
    Comment(Comment),
    Peer(PeerRecord),
    Deletion(DeletionRecord),
    Profile(Profile),
}

impl GraphEntity {
    /// Parse `fields` as whatever entity lives at `soul`.
    ///
    /// History copies parse as the entity they copy. Souls that hold no
    /// entity (locations, comment indexes, counters) yield `None`.
    pub fn parse(soul: &Soul, map: &FieldMap) -> Option<Result<Self, EntityError>> {
        match soul.kind() {
            SoulKind::History { target, .. } => Self::parse(&target, map),
            SoulKind::Annotation { .. } => {
                Some(Annotation::from_fields(map).map(GraphEntity::Annotation))
            }
            SoulKind::Comment { .. } => Some(Comment::from_fields(map).map(GraphEntity::Comment)),
            SoulKind::Peer { .. } => Some(PeerRecord::from_fields(map).map(GraphEntity::Peer)),
            SoulKind::DeletionRecord { .. } => {
                Some(DeletionRecord::from_fields(map).map(GraphEntity::Deletion))
            }
            SoulKind::Profile { .. } => Some(Profile::from_fields(map).map(GraphEntity::Profile)),
            SoulKind::RateLimit { .. }
            | SoulKind::Location { .. }
            | SoulKind::CommentIndex { .. }
            | SoulKind::Other => None,
        }
    }

    /// Parse a stored node, skipping tombstoned ones.
    pub fn from_node(node: &Node) -> Option<Result<Self, EntityError>> {
        if node.is_tombstoned() {
            return None;
        }
        Self::parse(&node.soul, &node.fields)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn annotation() -> Annotation {
        Annotation {
            id: "a1".into(),
            url: "https://example.com/page?utm_source=x".into(),
            content: "hello".into(),
            author: "did:key:z6MkTest".into(),
            timestamp: 1000,
            is_deleted: false,
            screenshot: None,
            signature: "00".into(),
            nonce: "n1".into(),
            metadata: Some(serde_json::json!({"title": "Page"})),
        }
    }

    #[test]
    fn test_annotation_fields_roundtrip() {
        let a = annotation();
        assert_eq!(Annotation::from_fields(&a.to_fields()).unwrap(), a);
    }

    #[test]
    fn test_signing_bytes_fixed_order() {
        let bytes = annotation().signing_bytes();
        assert_eq!(
            String::from_utf8(bytes).unwrap(),
            r#"{"id":"a1","url":"https://example.com/page?utm_source=x","content":"hello","author":"did:key:z6MkTest","timestamp":1000,"nonce":"n1"}"#
        );
    }

    #[test]
    fn test_signing_bytes_ignore_deleted_flag() {
        let mut deleted = annotation();
        deleted.is_deleted = true;
        assert_eq!(deleted.signing_bytes(), annotation().signing_bytes());
    }

    #[test]
    fn test_missing_author_is_reported() {
        let mut map = annotation().to_fields();
        map.remove(fields::AUTHOR);
        assert_eq!(
            Annotation::from_fields(&map).unwrap_err(),
            EntityError::MissingField(fields::AUTHOR)
        );
    }

    #[test]
    fn test_deletion_payload_binds_key() {
        let a = DeletionRecord::signing_bytes(&Soul::new("x/1"), 5, "n");
        let b = DeletionRecord::signing_bytes(&Soul::new("x/2"), 5, "n");
        assert_ne!(a, b);
        assert_eq!(
            String::from_utf8(a).unwrap(),
            r#"{"key":"x/1","timestamp":5,"nonce":"n"}"#
        );
    }

    #[test]
    fn test_peer_last_connection_defaults_to_first_seen() {
        let mut map = FieldMap::new();
        map.insert(fields::URL.into(), "http://peer:8765/graph".into());
        map.insert(fields::TIMESTAMP.into(), FieldValue::Int(10));
        let peer = PeerRecord::from_fields(&map).unwrap();
        assert_eq!(peer.last_connection, 10);
    }

    #[test]
    fn test_did_key_syntax() {
        assert!(is_did_key("did:key:z6MkhaXgBZDvotDkL5257faiztiGiC2QtKLGpbnnEGta2doK"));
        assert!(!is_did_key("did:web:example.com"));
        assert!(!is_did_key("did:key:"));
    }

    #[test]
    fn test_entity_dispatch_by_soul() {
        let loc = Soul::location("annotations_example_com", "https://example.com/page");
        let soul = Soul::annotation(&loc, "a1");
        let parsed = GraphEntity::parse(&soul, &annotation().to_fields());
        assert!(matches!(parsed, Some(Ok(GraphEntity::Annotation(_)))));
        assert!(GraphEntity::parse(&loc, &FieldMap::new()).is_none());
    }
}
