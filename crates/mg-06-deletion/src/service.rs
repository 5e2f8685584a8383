//! # Deletion Service
//!
//! Soft deletes go through the local graph store like any other write, so
//! the write validator authorizes them and replication carries them.
//!
//! The [`GarbageCollector`] reclaims content that has been soft-deleted for
//! longer than `tombstone_after_ms` by writing a tombstone over it and over
//! its version history. Deletion records are kept so replicas that still
//! hold the soft-deleted content can verify it.

use crate::domain::{
    is_reclaimable, lifecycle_of, DeletionConfig, DeletionError, DeletionReceipt,
    DeletionRequest, GcReport, Lifecycle,
};
use crate::ports::DeletionApi;
use async_trait::async_trait;
use mg_02_graph_store::{GraphApi, PutOutcome};
use shared_crypto::Ed25519KeyPair;
use shared_types::souls::SHARD_PREFIX;
use shared_types::{fields, GraphPut, Soul, SoulKind, SweepThrottle, TimeSource, Timestamp, WriteOrigin};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Tombstones long-deleted content.
pub struct GarbageCollector {
    graph: Arc<dyn GraphApi>,
    config: DeletionConfig,
    throttle: SweepThrottle,
}

impl GarbageCollector {
    pub fn new(graph: Arc<dyn GraphApi>, config: DeletionConfig) -> Self {
        Self {
            throttle: SweepThrottle::new(config.sweep_min_interval_ms),
            graph,
            config,
        }
    }

    /// Tombstone every annotation and comment soft-deleted at least
    /// `tombstone_after_ms` before `now`. Idempotent; throttled.
    pub async fn sweep(&self, now: Timestamp) -> Result<GcReport, DeletionError> {
        let Some(_permit) = self.throttle.try_begin(now) else {
            debug!("[mg-06] GC sweep skipped, throttled");
            return Ok(GcReport::skipped());
        };

        let mut report = GcReport::default();
        for node in self.graph.scan_prefix(SHARD_PREFIX)? {
            if !matches!(
                node.soul.kind(),
                SoulKind::Annotation { .. } | SoulKind::Comment { .. }
            ) {
                continue;
            }
            report.examined += 1;
            if !is_reclaimable(&node, now, self.config.tombstone_after_ms) {
                continue;
            }
            if self.tombstone(&node.soul, now).await? {
                report.tombstoned += 1;
            }
            let history_root = Soul::history(&node.soul, 0).parent();
            for copy in history_root
                .map(|root| self.graph.children(&root))
                .transpose()?
                .unwrap_or_default()
            {
                if !copy.is_tombstoned() {
                    self.tombstone(&copy.soul, now).await?;
                }
            }
        }

        if report.tombstoned > 0 {
            info!(
                examined = report.examined,
                tombstoned = report.tombstoned,
                "[mg-06] 🪦 Reclaimed deleted content"
            );
        }
        Ok(report)
    }

    async fn tombstone(&self, soul: &Soul, now: Timestamp) -> Result<bool, DeletionError> {
        let mut put = GraphPut::tombstone(soul.clone());
        put.stamp(now);
        match self.graph.put(put, WriteOrigin::Local).await? {
            PutOutcome::Applied { .. } => Ok(true),
            PutOutcome::Unchanged { .. } => Ok(false),
            PutOutcome::Rejected { reason } => {
                warn!(soul = %soul, %reason, "[mg-06] Tombstone refused");
                Ok(false)
            }
        }
    }

    pub fn last_sweep(&self) -> Option<Timestamp> {
        self.throttle.last_started()
    }
}

pub struct DeletionService {
    graph: Arc<dyn GraphApi>,
    time: Arc<dyn TimeSource>,
    collector: GarbageCollector,
}

impl DeletionService {
    pub fn new(
        graph: Arc<dyn GraphApi>,
        time: Arc<dyn TimeSource>,
        config: DeletionConfig,
    ) -> Self {
        Self {
            collector: GarbageCollector::new(graph.clone(), config),
            graph,
            time,
        }
    }

    pub fn collector(&self) -> &GarbageCollector {
        &self.collector
    }

    async fn apply(&self, put: GraphPut) -> Result<(), DeletionError> {
        let soul = put.soul.to_string();
        match self.graph.put(put, WriteOrigin::Local).await? {
            PutOutcome::Rejected { reason } => Err(DeletionError::Rejected { soul, reason }),
            PutOutcome::Applied { .. } | PutOutcome::Unchanged { .. } => Ok(()),
        }
    }
}

#[async_trait]
impl DeletionApi for DeletionService {
    async fn soft_delete(
        &self,
        keypair: &Ed25519KeyPair,
        target: &Soul,
    ) -> Result<DeletionReceipt, DeletionError> {
        if !matches!(
            target.kind(),
            SoulKind::Annotation { .. } | SoulKind::Comment { .. }
        ) {
            return Err(DeletionError::NotDeletable(target.to_string()));
        }
        let node = self
            .graph
            .get(target)?
            .ok_or_else(|| DeletionError::NotFound(target.to_string()))?;

        match lifecycle_of(&node) {
            Lifecycle::Tombstoned => return Err(DeletionError::NotFound(target.to_string())),
            Lifecycle::SoftDeleted { .. } => {
                return Ok(DeletionReceipt {
                    target: target.clone(),
                    deleted_by: node.text(fields::DELETED_BY).unwrap_or_default().to_string(),
                    newly_deleted: false,
                });
            }
            Lifecycle::Active => {}
        }

        let nonce = uuid::Uuid::new_v4().to_string();
        let request = DeletionRequest::sign(keypair, target.clone(), self.time.now_ms(), &nonce);
        for put in request.puts() {
            self.apply(put).await?;
        }
        info!(target = %target, by = %request.record.author, "[mg-06] Soft-deleted");
        Ok(DeletionReceipt {
            target: target.clone(),
            deleted_by: request.record.author,
            newly_deleted: true,
        })
    }

    fn lifecycle(&self, target: &Soul) -> Result<Lifecycle, DeletionError> {
        self.graph
            .get(target)?
            .map(|node| lifecycle_of(&node))
            .ok_or_else(|| DeletionError::NotFound(target.to_string()))
    }

    async fn collect_garbage(&self) -> Result<GcReport, DeletionError> {
        self.collector.sweep(self.time.now_ms()).await
    }
}
