//! # Validation Rules
//!
//! Stateless checks the validator composes. Content is always checked as
//! the merged view (stored fields overlaid with the put) because gossip and
//! partial updates carry only the fields that changed.

use crate::domain::errors::ValidationRejection;
use mg_03_shard_router::{host_of, ShardingApi};
use shared_crypto::{decode_did_key, peer_key};
use shared_types::{
    fields, is_did_key, is_marker_key, Annotation, Comment, EntityError, FieldMap, FieldValue,
    GraphPut, Node, PeerRecord, Profile, Soul, SoulKind, Timestamp,
};

/// Stored content fields with the put's fields laid over them.
pub fn merged_fields(current: Option<&Node>, put: &GraphPut) -> FieldMap {
    let mut merged = current.map(|node| node.fields.clone()).unwrap_or_default();
    if let Some(data) = &put.data {
        for (key, value) in data {
            merged.insert(key.clone(), value.clone());
        }
    }
    merged
}

/// Every non-marker field of the put already holds the same value.
pub fn is_redundant(current: Option<&Node>, put: &GraphPut) -> bool {
    let (Some(node), Some(data)) = (current, &put.data) else {
        return false;
    };
    put.tombstone.is_none()
        && data
            .iter()
            .filter(|(key, _)| !is_marker_key(key))
            .all(|(key, value)| node.get(key) == Some(value))
}

/// The put changes something besides the deletion flag.
pub fn touches_content(put: &GraphPut) -> bool {
    put.data.as_ref().is_some_and(|data| {
        data.keys().any(|key| {
            !is_marker_key(key) && key != fields::IS_DELETED && key != fields::DELETED_BY
        })
    })
}

/// The put gives some field besides the deletion flag a value that differs
/// from what is stored.
pub fn changes_beyond_flag(current: Option<&Node>, put: &GraphPut) -> bool {
    put.data.as_ref().is_some_and(|data| {
        data.iter().any(|(key, value)| {
            !is_marker_key(key)
                && key != fields::IS_DELETED
                && key != fields::DELETED_BY
                && current.and_then(|node| node.get(key)) != Some(value)
        })
    })
}

/// Map schema errors for signed entities onto the specific rejections.
pub fn entity_rejection(error: EntityError) -> ValidationRejection {
    match error {
        EntityError::MissingField(fields::SIGNATURE) => ValidationRejection::MissingSignature,
        EntityError::MissingField(fields::AUTHOR) => ValidationRejection::MissingAuthor,
        other => ValidationRejection::MalformedEntity(other),
    }
}

pub fn within_window(
    timestamp: Timestamp,
    reference: Timestamp,
    window_ms: u64,
) -> Result<(), ValidationRejection> {
    if timestamp.abs_diff(reference) <= window_ms {
        Ok(())
    } else {
        Err(ValidationRejection::ClockSkew {
            timestamp,
            reference,
        })
    }
}

/// Verify `signature` (hex) over `message` with the key inside `author`.
pub fn verify_signature(
    author: &str,
    message: &[u8],
    signature: &str,
) -> Result<(), ValidationRejection> {
    if signature.is_empty() {
        return Err(ValidationRejection::MissingSignature);
    }
    if !is_did_key(author) {
        return Err(ValidationRejection::InvalidAuthor(author.to_string()));
    }
    let key = decode_did_key(author)
        .map_err(|e| ValidationRejection::InvalidAuthor(e.to_string()))?;
    key.verify_hex(message, signature)
        .map_err(|_| ValidationRejection::InvalidSignature)
}

/// A peer entry must name an http(s) graph endpoint that hashes to its key.
pub fn check_peer_record(
    key: &str,
    merged: &FieldMap,
    url_suffix: &str,
) -> Result<(), ValidationRejection> {
    let record = PeerRecord::from_fields(merged)
        .map_err(|e| ValidationRejection::InvalidControlRecord(e.to_string()))?;

    let scheme_ok = record.url.starts_with("http://") || record.url.starts_with("https://");
    if !scheme_ok || host_of(&record.url).is_none() {
        return Err(ValidationRejection::InvalidControlRecord(format!(
            "peer url {} is not http(s)",
            record.url
        )));
    }
    if !record.url.ends_with(url_suffix) {
        return Err(ValidationRejection::InvalidControlRecord(format!(
            "peer url {} does not end with {}",
            record.url, url_suffix
        )));
    }
    let expected = peer_key(&record.url);
    if expected != key {
        return Err(ValidationRejection::PeerKeyMismatch {
            expected,
            actual: key.to_string(),
        });
    }
    Ok(())
}

fn non_negative_int(merged: &FieldMap, field: &str) -> Result<(), ValidationRejection> {
    match merged.get(field) {
        Some(FieldValue::Int(n)) if *n >= 0 => Ok(()),
        _ => Err(ValidationRejection::InvalidControlRecord(format!(
            "{field} must be a non-negative integer"
        ))),
    }
}

/// Rate-limit counters hold `count` and `windowStart`.
pub fn check_rate_limit_record(merged: &FieldMap) -> Result<(), ValidationRejection> {
    non_negative_int(merged, fields::COUNT)?;
    non_negative_int(merged, fields::WINDOW_START)
}

fn mismatch(reason: String) -> ValidationRejection {
    ValidationRejection::SoulMismatch(reason)
}

/// The annotation's id and URL must agree with the soul it is stored at.
pub fn check_annotation_placement(
    annotation: &Annotation,
    location: &Soul,
    id: &str,
    router: &dyn ShardingApi,
) -> Result<(), ValidationRejection> {
    if annotation.id != id {
        return Err(mismatch(format!("id {} stored under {}", annotation.id, id)));
    }
    let SoulKind::Location { shard, url } = location.kind() else {
        return Err(mismatch(format!("{location} is not a location")));
    };
    let placement = router.placement(&annotation.url);
    if placement.normalized_url != url {
        return Err(mismatch(format!(
            "url {} normalizes to {}, stored under {}",
            annotation.url, placement.normalized_url, url
        )));
    }
    if !placement.key.contains(&shard) {
        return Err(mismatch(format!(
            "shard {} is not a candidate for {}",
            shard, annotation.url
        )));
    }
    Ok(())
}

pub fn check_comment_placement(
    comment: &Comment,
    annotation: &Soul,
    id: &str,
) -> Result<(), ValidationRejection> {
    if comment.id != id {
        return Err(mismatch(format!("id {} stored under {}", comment.id, id)));
    }
    if comment.annotation_id != annotation.last_segment() {
        return Err(mismatch(format!(
            "comment on {} stored under {}",
            comment.annotation_id, annotation
        )));
    }
    Ok(())
}

pub fn check_profile_placement(profile: &Profile, did: &str) -> Result<(), ValidationRejection> {
    if profile.author != did {
        return Err(mismatch(format!(
            "profile of {} stored under {}",
            profile.author, did
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use mg_03_shard_router::ShardRouter;

    fn node_with(soul: &str, pairs: &[(&str, FieldValue)]) -> Node {
        let mut node = Node::new(Soul::new(soul));
        for (key, value) in pairs {
            node.fields.insert(key.to_string(), value.clone());
            node.states.insert(key.to_string(), 1);
        }
        node
    }

    #[test]
    fn test_merged_view_overlays_put() {
        let node = node_with("s", &[("a", "1".into()), ("b", "2".into())]);
        let put = GraphPut::field(Soul::new("s"), "b", "3");
        let merged = merged_fields(Some(&node), &put);
        assert_eq!(merged.get("a"), Some(&FieldValue::from("1")));
        assert_eq!(merged.get("b"), Some(&FieldValue::from("3")));
    }

    #[test]
    fn test_changes_beyond_flag() {
        let node = node_with("s", &[("content", "a".into()), (fields::IS_DELETED, true.into())]);
        let mut revive = GraphPut::field(Soul::new("s"), fields::IS_DELETED, false);
        assert!(!changes_beyond_flag(Some(&node), &revive));
        revive
            .data
            .as_mut()
            .unwrap()
            .insert(fields::CONTENT.into(), "a".into());
        assert!(!changes_beyond_flag(Some(&node), &revive));
        revive
            .data
            .as_mut()
            .unwrap()
            .insert(fields::CONTENT.into(), "b".into());
        assert!(changes_beyond_flag(Some(&node), &revive));
    }

    #[test]
    fn test_redundant_ignores_markers() {
        let node = node_with("s", &[("a", "1".into())]);
        let mut put = GraphPut::field(Soul::new("s"), "a", "1");
        assert!(is_redundant(Some(&node), &put));
        put.data
            .as_mut()
            .unwrap()
            .insert(fields::SYNC_MARKER.into(), 5i64.into());
        assert!(is_redundant(Some(&node), &put));
        assert!(!is_redundant(None, &put));
        assert!(!is_redundant(
            Some(&node),
            &GraphPut::field(Soul::new("s"), "a", "2")
        ));
    }

    #[test]
    fn test_touches_content() {
        let soul = Soul::new("s");
        assert!(!touches_content(&GraphPut::field(soul.clone(), fields::IS_DELETED, true)));
        assert!(touches_content(&GraphPut::field(soul, fields::CONTENT, "x")));
    }

    #[test]
    fn test_window_is_symmetric() {
        assert!(within_window(100, 130, 30).is_ok());
        assert!(within_window(160, 130, 30).is_ok());
        assert!(within_window(99, 130, 30).is_err());
    }

    #[test]
    fn test_peer_record_must_hash_to_key() {
        let url = "https://peer.example/graph";
        let record = PeerRecord {
            url: url.into(),
            timestamp: 1,
            last_connection: 1,
        };
        let fields = record.to_fields();
        assert!(check_peer_record(&peer_key(url), &fields, "/graph").is_ok());
        assert!(matches!(
            check_peer_record("0000000000000000", &fields, "/graph"),
            Err(ValidationRejection::PeerKeyMismatch { .. })
        ));
        assert!(matches!(
            check_peer_record(&peer_key(url), &fields, "/gun"),
            Err(ValidationRejection::InvalidControlRecord(_))
        ));
    }

    #[test]
    fn test_peer_record_requires_http() {
        let url = "ftp://peer.example/graph";
        let record = PeerRecord {
            url: url.into(),
            timestamp: 1,
            last_connection: 1,
        };
        assert!(check_peer_record(&peer_key(url), &record.to_fields(), "/graph").is_err());
    }

    #[test]
    fn test_rate_limit_record_schema() {
        let mut fields = FieldMap::new();
        fields.insert(fields::COUNT.into(), 3i64.into());
        assert!(check_rate_limit_record(&fields).is_err());
        fields.insert(fields::WINDOW_START.into(), 1_000i64.into());
        assert!(check_rate_limit_record(&fields).is_ok());
        fields.insert(fields::COUNT.into(), "three".into());
        assert!(check_rate_limit_record(&fields).is_err());
    }

    #[test]
    fn test_annotation_placement() {
        let router = ShardRouter::default();
        let placement = router.placement("https://example.com/page?utm_source=x");
        let location = placement.primary_location();
        let annotation = Annotation {
            id: "a1".into(),
            url: "https://example.com/page/".into(),
            content: "c".into(),
            author: "did:key:zA".into(),
            timestamp: 1,
            is_deleted: false,
            screenshot: None,
            signature: "00".into(),
            nonce: "n".into(),
            metadata: None,
        };
        assert!(check_annotation_placement(&annotation, &location, "a1", &router).is_ok());
        assert!(check_annotation_placement(&annotation, &location, "a2", &router).is_err());

        let elsewhere = router.placement("https://other.org/page").primary_location();
        assert!(matches!(
            check_annotation_placement(&annotation, &elsewhere, "a1", &router),
            Err(ValidationRejection::SoulMismatch(_))
        ));
    }

    #[test]
    fn test_entity_rejection_mapping() {
        assert_eq!(
            entity_rejection(EntityError::MissingField(fields::SIGNATURE)),
            ValidationRejection::MissingSignature
        );
        assert!(matches!(
            entity_rejection(EntityError::MissingField(fields::URL)),
            ValidationRejection::MalformedEntity(_)
        ));
    }
}
