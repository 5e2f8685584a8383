//! # Souls
//!
//! A soul is the address of a node in the graph. Souls are `/`-separated
//! paths; the first segment decides what family the node belongs to:
//!
//! ```text
//! annotations_<domain>[_shard_<n>]/<url>                      location (per URL)
//! annotations_<domain>[_shard_<n>]/<url>/<id>                 annotation
//! annotations_<domain>[_shard_<n>]/<url>/<id>/comments/<cid>  comment
//! deletions/<target soul>                                     deletion record
//! history/<target soul>/<timestamp>                           version history copy
//! peers/<peer key>                                            peer directory entry
//! ratelimits/<did>                                            rate-limit counter
//! profiles/<did>           user_<did>/profile                 author profile
//! ```
//!
//! The URL segment is escaped so it never contains a separator.

use crate::time::Timestamp;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Path separator inside a soul.
pub const SEPARATOR: char = '/';
/// Prefix shared by every shard name.
pub const SHARD_PREFIX: &str = "annotations_";
/// Root of the peer directory.
pub const PEERS_ROOT: &str = "peers";
/// Root of the rate-limit counters.
pub const RATE_LIMIT_ROOT: &str = "ratelimits";
/// Root of deletion records.
pub const DELETIONS_ROOT: &str = "deletions";
/// Root of version-history copies.
pub const HISTORY_ROOT: &str = "history";
/// Root of author profiles.
pub const PROFILES_ROOT: &str = "profiles";
/// Segment under an annotation that holds its comments.
pub const COMMENTS_SEGMENT: &str = "comments";

const LEGACY_PROFILE_PREFIX: &str = "user_";
const LEGACY_PROFILE_SUFFIX: &str = "/profile";

/// Address of a graph node.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Soul(String);

impl Soul {
    /// Wrap a raw soul string.
    pub fn new(soul: impl Into<String>) -> Self {
        Self(soul.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Append one path segment.
    #[must_use]
    pub fn child(&self, segment: &str) -> Soul {
        Soul(format!("{}{}{}", self.0, SEPARATOR, segment))
    }

    /// The soul one level up, if any.
    pub fn parent(&self) -> Option<Soul> {
        self.0
            .rsplit_once(SEPARATOR)
            .map(|(parent, _)| Soul(parent.to_string()))
    }

    /// Last path segment (the whole soul when it has no separator).
    pub fn last_segment(&self) -> &str {
        self.0
            .rsplit_once(SEPARATOR)
            .map_or(self.0.as_str(), |(_, last)| last)
    }

    /// Whether `self` sits directly below `parent`.
    pub fn is_child_of(&self, parent: &Soul) -> bool {
        self.0
            .strip_prefix(parent.as_str())
            .and_then(|rest| rest.strip_prefix(SEPARATOR))
            .is_some_and(|rest| !rest.is_empty() && !rest.contains(SEPARATOR))
    }

    /// Location node holding every annotation of one URL within one shard.
    pub fn location(shard: &str, normalized_url: &str) -> Soul {
        Soul(format!(
            "{}{}{}",
            shard,
            SEPARATOR,
            escape_segment(normalized_url)
        ))
    }

    pub fn annotation(location: &Soul, annotation_id: &str) -> Soul {
        location.child(annotation_id)
    }

    /// Index node under an annotation whose children are its comments.
    pub fn comments(annotation: &Soul) -> Soul {
        annotation.child(COMMENTS_SEGMENT)
    }

    pub fn comment(annotation: &Soul, comment_id: &str) -> Soul {
        Self::comments(annotation).child(comment_id)
    }

    /// Where the deletion record authorizing a delete of `target` lives.
    pub fn deletion_record(target: &Soul) -> Soul {
        Soul(format!("{}{}{}", DELETIONS_ROOT, SEPARATOR, target.0))
    }

    pub fn history(target: &Soul, timestamp: Timestamp) -> Soul {
        Soul(format!(
            "{}{}{}{}{}",
            HISTORY_ROOT, SEPARATOR, target.0, SEPARATOR, timestamp
        ))
    }

    pub fn peer(peer_key: &str) -> Soul {
        Soul(format!("{}{}{}", PEERS_ROOT, SEPARATOR, peer_key))
    }

    /// Parent of every peer entry.
    pub fn peers_root() -> Soul {
        Soul(PEERS_ROOT.to_string())
    }

    pub fn rate_limit(did: &str) -> Soul {
        Soul(format!("{}{}{}", RATE_LIMIT_ROOT, SEPARATOR, did))
    }

    pub fn profile(did: &str) -> Soul {
        Soul(format!("{}{}{}", PROFILES_ROOT, SEPARATOR, did))
    }

    /// Profile location used by older clients.
    pub fn legacy_profile(did: &str) -> Soul {
        Soul(format!(
            "{}{}{}",
            LEGACY_PROFILE_PREFIX, did, LEGACY_PROFILE_SUFFIX
        ))
    }

    /// Classify this soul by the family it belongs to.
    pub fn kind(&self) -> SoulKind {
        let s = self.0.as_str();

        if let Some(key) = strip_root(s, PEERS_ROOT) {
            return single_segment(key)
                .map(|key| SoulKind::Peer { key: key.to_string() })
                .unwrap_or(SoulKind::Other);
        }
        if let Some(did) = strip_root(s, RATE_LIMIT_ROOT) {
            return single_segment(did)
                .map(|did| SoulKind::RateLimit { did: did.to_string() })
                .unwrap_or(SoulKind::Other);
        }
        if let Some(target) = strip_root(s, DELETIONS_ROOT) {
            if target.is_empty() {
                return SoulKind::Other;
            }
            return SoulKind::DeletionRecord {
                target: Soul::new(target),
            };
        }
        if let Some(rest) = strip_root(s, HISTORY_ROOT) {
            return match rest.rsplit_once(SEPARATOR) {
                Some((target, ts)) if !target.is_empty() => match ts.parse::<Timestamp>() {
                    Ok(timestamp) => SoulKind::History {
                        target: Soul::new(target),
                        timestamp,
                    },
                    Err(_) => SoulKind::Other,
                },
                _ => SoulKind::Other,
            };
        }
        if let Some(did) = strip_root(s, PROFILES_ROOT) {
            return single_segment(did)
                .map(|did| SoulKind::Profile { did: did.to_string() })
                .unwrap_or(SoulKind::Other);
        }
        if let Some(did) = s
            .strip_prefix(LEGACY_PROFILE_PREFIX)
            .and_then(|rest| rest.strip_suffix(LEGACY_PROFILE_SUFFIX))
        {
            return single_segment(did)
                .map(|did| SoulKind::Profile { did: did.to_string() })
                .unwrap_or(SoulKind::Other);
        }
        if s.starts_with(SHARD_PREFIX) {
            return content_kind(s);
        }
        SoulKind::Other
    }
}

impl fmt::Display for Soul {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Soul {
    fn from(s: &str) -> Self {
        Soul::new(s)
    }
}

/// The family a soul belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SoulKind {
    /// Peer directory entry (control soul).
    Peer { key: String },
    /// Per-author rate-limit counter (control soul).
    RateLimit { did: String },
    DeletionRecord { target: Soul },
    History { target: Soul, timestamp: Timestamp },
    /// Primary or legacy profile location.
    Profile { did: String },
    Location { shard: String, url: String },
    Annotation { location: Soul, id: String },
    CommentIndex { annotation: Soul },
    Comment { annotation: Soul, id: String },
    Other,
}

impl SoulKind {
    /// Control souls bypass signature checks but must match a schema.
    pub fn is_control(&self) -> bool {
        matches!(self, SoulKind::Peer { .. } | SoulKind::RateLimit { .. })
    }
}

fn strip_root<'a>(soul: &'a str, root: &str) -> Option<&'a str> {
    soul.strip_prefix(root)?.strip_prefix(SEPARATOR)
}

fn single_segment(s: &str) -> Option<&str> {
    (!s.is_empty() && !s.contains(SEPARATOR)).then_some(s)
}

fn content_kind(s: &str) -> SoulKind {
    let segments: Vec<&str> = s.split(SEPARATOR).collect();
    if segments.iter().any(|seg| seg.is_empty()) {
        return SoulKind::Other;
    }
    let location = || Soul::new(format!("{}{}{}", segments[0], SEPARATOR, segments[1]));
    let annotation = || location().child(segments[2]);

    match segments.len() {
        2 => SoulKind::Location {
            shard: segments[0].to_string(),
            url: unescape_segment(segments[1]),
        },
        3 => SoulKind::Annotation {
            location: location(),
            id: segments[2].to_string(),
        },
        4 if segments[3] == COMMENTS_SEGMENT => SoulKind::CommentIndex {
            annotation: annotation(),
        },
        5 if segments[3] == COMMENTS_SEGMENT => SoulKind::Comment {
            annotation: annotation(),
            id: segments[4].to_string(),
        },
        _ => SoulKind::Other,
    }
}

/// Escape a value so it can be used as a single soul segment.
pub fn escape_segment(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '%' => out.push_str("%25"),
            SEPARATOR => out.push_str("%2F"),
            other => out.push(other),
        }
    }
    out
}

/// Inverse of [`escape_segment`].
pub fn unescape_segment(segment: &str) -> String {
    let mut out = String::with_capacity(segment.len());
    let mut rest = segment;
    while let Some(pos) = rest.find('%') {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos..];
        if let Some(after) = tail.strip_prefix("%2F") {
            out.push(SEPARATOR);
            rest = after;
        } else if let Some(after) = tail.strip_prefix("%25") {
            out.push('%');
            rest = after;
        } else {
            out.push('%');
            rest = &tail[1..];
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn location() -> Soul {
        Soul::location("annotations_example_com", "https://example.com/page")
    }

    #[test]
    fn test_location_has_no_inner_separator() {
        let loc = location();
        assert_eq!(loc.as_str().matches(SEPARATOR).count(), 1);
        assert_eq!(
            loc.kind(),
            SoulKind::Location {
                shard: "annotations_example_com".into(),
                url: "https://example.com/page".into(),
            }
        );
    }

    #[test]
    fn test_annotation_and_comment_kinds() {
        let ann = Soul::annotation(&location(), "did:key:z6Mk-1000");
        assert_eq!(
            ann.kind(),
            SoulKind::Annotation {
                location: location(),
                id: "did:key:z6Mk-1000".into(),
            }
        );
        assert!(ann.is_child_of(&location()));

        let comment = Soul::comment(&ann, "c1");
        assert_eq!(
            comment.kind(),
            SoulKind::Comment {
                annotation: ann.clone(),
                id: "c1".into(),
            }
        );
        assert!(comment.is_child_of(&Soul::comments(&ann)));
        assert!(!comment.is_child_of(&location()));
    }

    #[test]
    fn test_deletion_and_history_wrap_targets() {
        let ann = Soul::annotation(&location(), "a1");
        assert_eq!(
            Soul::deletion_record(&ann).kind(),
            SoulKind::DeletionRecord { target: ann.clone() }
        );
        assert_eq!(
            Soul::history(&ann, 1234).kind(),
            SoulKind::History {
                target: ann,
                timestamp: 1234,
            }
        );
    }

    #[test]
    fn test_control_souls() {
        assert!(Soul::peer("abc").kind().is_control());
        assert!(Soul::rate_limit("did:key:z1").kind().is_control());
        assert!(!location().kind().is_control());
        assert_eq!(Soul::new("peers/a/b").kind(), SoulKind::Other);
    }

    #[test]
    fn test_profile_locations() {
        let did = "did:key:z6MkAbc";
        let expected = SoulKind::Profile { did: did.into() };
        assert_eq!(Soul::profile(did).kind(), expected);
        assert_eq!(Soul::legacy_profile(did).kind(), expected);
    }

    #[test]
    fn test_escape_roundtrip_handles_percent_sequences() {
        for raw in ["https://a.com/x/y", "%2F", "100%/done", "plain"] {
            assert_eq!(unescape_segment(&escape_segment(raw)), raw);
            assert!(!escape_segment(raw).contains(SEPARATOR));
        }
    }

    #[test]
    fn test_parent_and_last_segment() {
        let ann = Soul::annotation(&location(), "a1");
        assert_eq!(ann.parent(), Some(location()));
        assert_eq!(ann.last_segment(), "a1");
        assert_eq!(Soul::new("root").parent(), None);
    }
}
