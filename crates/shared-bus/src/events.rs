//! # Graph Events
//!
//! Defines all event types that flow through the shared bus.

use serde::{Deserialize, Serialize};
use shared_types::{GraphPut, Node, Soul, WriteOrigin};

/// All events that can be published to the event bus.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum GraphEvent {
    // =========================================================================
    // GRAPH STORE
    // =========================================================================
    /// A put changed a node. `diff` holds only the fields that won the merge.
    /// Consumed by replication (relay), the read path (collection windows)
    /// and the recent-annotations cache.
    NodeUpdated {
        /// Merged node after the put.
        node: Node,
        /// Accepted part of the put, with states.
        diff: GraphPut,
        /// Where the put came from.
        origin: WriteOrigin,
    },

    // =========================================================================
    // WRITE VALIDATOR
    // =========================================================================
    /// The write hook refused a put. It was not stored and is not relayed.
    WriteRejected {
        /// Target soul of the refused put.
        soul: Soul,
        /// Rejection reason.
        reason: String,
        /// Short label for the reason, stable across releases.
        code: String,
        /// Acting DID, when the put named one.
        actor: Option<String>,
        /// Where the put came from.
        origin: WriteOrigin,
    },

    // =========================================================================
    // PEERS
    // =========================================================================
    /// A peer answered a request or sent us a message.
    PeerContacted {
        /// The peer's public graph endpoint.
        url: String,
    },

    /// A directory entry was tombstoned by a sweep.
    PeerPruned {
        /// Directory key of the pruned entry.
        key: String,
    },
}

impl GraphEvent {
    /// Get the topic for this event (for filtering).
    #[must_use]
    pub fn topic(&self) -> EventTopic {
        match self {
            Self::NodeUpdated { .. } => EventTopic::Graph,
            Self::WriteRejected { .. } => EventTopic::Security,
            Self::PeerContacted { .. } | Self::PeerPruned { .. } => EventTopic::Peers,
        }
    }

    /// Soul the event is about, if any.
    #[must_use]
    pub fn soul(&self) -> Option<&Soul> {
        match self {
            Self::NodeUpdated { node, .. } => Some(&node.soul),
            Self::WriteRejected { soul, .. } => Some(soul),
            Self::PeerContacted { .. } | Self::PeerPruned { .. } => None,
        }
    }
}

/// Event topics for subscription filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventTopic {
    /// Node updates.
    Graph,
    /// Peer liveness.
    Peers,
    /// Validation rejections.
    Security,
    /// All events (no filtering).
    All,
}

/// Filter for subscribing to specific events.
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    /// Topics to include. Empty means all topics.
    pub topics: Vec<EventTopic>,
    /// Only events whose soul sits directly below one of these. Empty means any.
    pub parents: Vec<Soul>,
    /// Only events whose soul starts with one of these. Empty means any.
    pub soul_prefixes: Vec<String>,
}

impl EventFilter {
    /// Create a filter that accepts all events.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Create a filter for specific topics.
    #[must_use]
    pub fn topics(topics: Vec<EventTopic>) -> Self {
        Self {
            topics,
            ..Self::default()
        }
    }

    /// Graph updates to direct children of any of `parents`.
    #[must_use]
    pub fn children_of(parents: Vec<Soul>) -> Self {
        Self {
            topics: vec![EventTopic::Graph],
            parents,
            soul_prefixes: Vec::new(),
        }
    }

    /// Graph updates to souls under any of `prefixes`.
    #[must_use]
    pub fn soul_prefixes(prefixes: Vec<String>) -> Self {
        Self {
            topics: vec![EventTopic::Graph],
            parents: Vec::new(),
            soul_prefixes: prefixes,
        }
    }

    /// Check if an event matches this filter.
    #[must_use]
    pub fn matches(&self, event: &GraphEvent) -> bool {
        let topic_match = self.topics.is_empty()
            || self.topics.contains(&EventTopic::All)
            || self.topics.contains(&event.topic());
        if !topic_match {
            return false;
        }

        if self.parents.is_empty() && self.soul_prefixes.is_empty() {
            return true;
        }
        let Some(soul) = event.soul() else {
            return false;
        };

        let parent_match =
            self.parents.is_empty() || self.parents.iter().any(|p| soul.is_child_of(p));
        let prefix_match = self.soul_prefixes.is_empty()
            || self
                .soul_prefixes
                .iter()
                .any(|p| soul.as_str().starts_with(p.as_str()));

        parent_match && prefix_match
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn updated(soul: &str) -> GraphEvent {
        let node = Node::new(Soul::new(soul));
        GraphEvent::NodeUpdated {
            diff: node.to_put(),
            node,
            origin: WriteOrigin::Local,
        }
    }

    #[test]
    fn test_event_topic_mapping() {
        assert_eq!(updated("a/b").topic(), EventTopic::Graph);
        let contacted = GraphEvent::PeerContacted { url: "http://p/graph".into() };
        assert_eq!(contacted.topic(), EventTopic::Peers);
    }

    #[test]
    fn test_filter_all() {
        assert!(EventFilter::all().matches(&updated("x")));
    }

    #[test]
    fn test_filter_by_topic() {
        let filter = EventFilter::topics(vec![EventTopic::Peers]);
        assert!(!filter.matches(&updated("x")));
        assert!(filter.matches(&GraphEvent::PeerPruned { key: "k".into() }));
    }

    #[test]
    fn test_filter_children_of() {
        let filter = EventFilter::children_of(vec![Soul::new("loc1"), Soul::new("loc2")]);
        assert!(filter.matches(&updated("loc1/a1")));
        assert!(filter.matches(&updated("loc2/a2")));
        assert!(!filter.matches(&updated("loc1/a1/comments/c1")));
        assert!(!filter.matches(&updated("loc3/a3")));
    }

    #[test]
    fn test_filter_soul_prefix_skips_peer_events() {
        let filter = EventFilter::soul_prefixes(vec!["annotations_".into()]);
        assert!(filter.matches(&updated("annotations_x/u/a")));
        assert!(!filter.matches(&updated("peers/k")));
        assert!(!filter.matches(&GraphEvent::PeerContacted { url: "u".into() }));
    }
}
