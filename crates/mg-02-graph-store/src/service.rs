//! # Graph Store Service
//!
//! Implements [`GraphApi`] over a [`KeyValueStore`].
//!
//! ## Write path
//!
//! ```text
//! put ──stamp──→ WriteHook::check ──rejected──→ WriteRejected event
//!                     │
//!                  accepted
//!                     ↓
//!               HAM merge (+ side writes) ──→ atomic batch ──→ NodeUpdated events
//! ```
//!
//! The hook, the merge and the batch run under one write lock, so two puts
//! to the same soul cannot interleave between validation and persistence.
//! Events are published after the lock is released.

use crate::domain::config::GraphStoreConfig;
use crate::domain::errors::GraphError;
use crate::domain::ham::merge;
use crate::ports::inbound::{GraphApi, PutOutcome};
use crate::ports::outbound::{
    BatchOperation, GraphReader, KeyValueStore, NodeSerializer, WriteContext, WriteHook,
    WriteVerdict,
};
use async_trait::async_trait;
use parking_lot::RwLock;
use shared_bus::{EventPublisher, GraphEvent};
use shared_types::{GraphPut, Node, Soul, TimeSource, WriteOrigin};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// The replicated graph.
pub struct GraphStore {
    kv: RwLock<Box<dyn KeyValueStore>>,
    serializer: Arc<dyn NodeSerializer>,
    hook: Option<Arc<dyn WriteHook>>,
    bus: Arc<dyn EventPublisher>,
    time: Arc<dyn TimeSource>,
    config: GraphStoreConfig,
}

/// Read view over the locked backend, handed to the hook.
struct LockedReader<'a> {
    kv: &'a dyn KeyValueStore,
    serializer: &'a dyn NodeSerializer,
}

impl GraphReader for LockedReader<'_> {
    fn node(&self, soul: &Soul) -> Result<Option<Node>, GraphError> {
        read_node(self.kv, self.serializer, soul)
    }
}

fn read_node(
    kv: &dyn KeyValueStore,
    serializer: &dyn NodeSerializer,
    soul: &Soul,
) -> Result<Option<Node>, GraphError> {
    match kv.get(soul.as_str().as_bytes())? {
        Some(bytes) => Ok(Some(serializer.deserialize(&bytes)?)),
        None => Ok(None),
    }
}

/// Overlay of nodes touched by the current write, on top of the backend.
///
/// Side writes may target the soul just written, so they must see the
/// merged result before it is persisted.
struct PendingNodes<'a> {
    base: LockedReader<'a>,
    pending: BTreeMap<Soul, Node>,
}

impl PendingNodes<'_> {
    fn current(&self, soul: &Soul) -> Result<Option<Node>, GraphError> {
        match self.pending.get(soul) {
            Some(node) => Ok(Some(node.clone())),
            None => self.base.node(soul),
        }
    }
}

/// Event to publish once the lock is gone.
type Announcement = (Node, GraphPut, WriteOrigin);

impl GraphStore {
    /// Create a store with no write hook. Every put is accepted.
    pub fn new(
        kv: Box<dyn KeyValueStore>,
        serializer: Arc<dyn NodeSerializer>,
        bus: Arc<dyn EventPublisher>,
        time: Arc<dyn TimeSource>,
        config: GraphStoreConfig,
    ) -> Self {
        Self {
            kv: RwLock::new(kv),
            serializer,
            hook: None,
            bus,
            time,
            config,
        }
    }

    /// Install the hook that vets every non-internal put.
    #[must_use]
    pub fn with_write_hook(mut self, hook: Arc<dyn WriteHook>) -> Self {
        self.hook = Some(hook);
        self
    }

    pub fn config(&self) -> &GraphStoreConfig {
        &self.config
    }

    /// Number of stored nodes (tombstoned included).
    pub fn node_count(&self) -> Result<usize, GraphError> {
        Ok(self.kv.read().prefix_scan(&[])?.len())
    }

    fn decode_all(&self, pairs: Vec<(Vec<u8>, Vec<u8>)>) -> Vec<Node> {
        pairs
            .into_iter()
            .filter_map(|(key, value)| match self.serializer.deserialize(&value) {
                Ok(node) => Some(node),
                Err(e) => {
                    warn!(
                        key = %String::from_utf8_lossy(&key),
                        error = %e,
                        "[mg-02] Skipping undecodable node"
                    );
                    None
                }
            })
            .collect()
    }

    /// Validate and merge under the write lock.
    fn apply(
        &self,
        mut put: GraphPut,
        origin: WriteOrigin,
    ) -> Result<(PutOutcome, Vec<Announcement>, Option<GraphEvent>), GraphError> {
        if put.soul.as_str().is_empty() {
            return Err(GraphError::EmptySoul);
        }

        let now = self.time.now_ms();
        let limit = now.saturating_add(self.config.max_drift_ms);
        put.stamp(now);

        let mut kv = self.kv.write();
        let base = LockedReader {
            kv: &**kv,
            serializer: self.serializer.as_ref(),
        };

        let side_writes = match (&self.hook, origin.is_validated()) {
            (Some(hook), true) => {
                let ctx = WriteContext { origin, now };
                match hook.check(&put, &ctx, &base) {
                    WriteVerdict::Accepted { side_writes } => side_writes,
                    WriteVerdict::Rejected { reason, code, actor } => {
                        debug!(soul = %put.soul, %reason, "[mg-02] Put rejected by write hook");
                        let event = GraphEvent::WriteRejected {
                            soul: put.soul.clone(),
                            reason: reason.clone(),
                            code: code.to_string(),
                            actor,
                            origin,
                        };
                        return Ok((PutOutcome::Rejected { reason }, Vec::new(), Some(event)));
                    }
                }
            }
            _ => Vec::new(),
        };

        let mut nodes = PendingNodes {
            base,
            pending: BTreeMap::new(),
        };
        let mut announcements = Vec::new();

        let current = nodes.current(&put.soul)?;
        let result = merge(current.as_ref(), &put, limit);
        let outcome = match result.diff {
            Some(diff) => {
                nodes.pending.insert(put.soul.clone(), result.node.clone());
                announcements.push((result.node.clone(), diff.clone(), origin));
                PutOutcome::Applied {
                    node: result.node,
                    diff,
                }
            }
            None => PutOutcome::Unchanged {
                deferred: result.deferred,
            },
        };

        // Side writes only follow a put that changed something.
        if outcome.is_applied() {
            for mut side in side_writes {
                side.stamp(now);
                let current = nodes.current(&side.soul)?;
                let result = merge(current.as_ref(), &side, limit);
                if let Some(diff) = result.diff {
                    nodes.pending.insert(side.soul.clone(), result.node.clone());
                    announcements.push((result.node, diff, WriteOrigin::Internal));
                }
            }
        }

        if !nodes.pending.is_empty() {
            let mut batch = Vec::with_capacity(nodes.pending.len());
            for (soul, node) in &nodes.pending {
                let bytes = self.serializer.serialize(node)?;
                batch.push(BatchOperation::put(soul.as_str().as_bytes().to_vec(), bytes));
            }
            drop(nodes);
            kv.atomic_batch_write(batch)?;
        }

        Ok((outcome, announcements, None))
    }
}

#[async_trait]
impl GraphApi for GraphStore {
    async fn put(&self, put: GraphPut, origin: WriteOrigin) -> Result<PutOutcome, GraphError> {
        let (outcome, announcements, rejection) = self.apply(put, origin)?;

        if let Some(event) = rejection {
            self.bus.publish(event).await;
        }
        for (node, diff, origin) in announcements {
            debug!(soul = %node.soul, ?origin, "[mg-02] Node updated");
            self.bus
                .publish(GraphEvent::NodeUpdated { node, diff, origin })
                .await;
        }

        Ok(outcome)
    }

    fn get(&self, soul: &Soul) -> Result<Option<Node>, GraphError> {
        let kv = self.kv.read();
        read_node(&**kv, self.serializer.as_ref(), soul)
    }

    fn children(&self, parent: &Soul) -> Result<Vec<Node>, GraphError> {
        let prefix = format!("{}/", parent.as_str());
        let pairs = self.kv.read().prefix_scan(prefix.as_bytes())?;
        Ok(self
            .decode_all(pairs)
            .into_iter()
            .filter(|node| node.soul.is_child_of(parent))
            .collect())
    }

    fn scan_prefix(&self, prefix: &str) -> Result<Vec<Node>, GraphError> {
        let pairs = self.kv.read().prefix_scan(prefix.as_bytes())?;
        Ok(self.decode_all(pairs))
    }
}
