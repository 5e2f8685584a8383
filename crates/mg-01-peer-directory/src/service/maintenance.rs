use crate::domain::{EntryHealth, PeerDirectoryError, SweepReport};
use crate::service::PeerDirectory;
use mg_02_graph_store::PutOutcome;
use shared_bus::GraphEvent;
use shared_types::{GraphPut, Soul, WriteOrigin};
use tracing::{debug, info, warn};

impl PeerDirectory {
    /// Tombstone invalid entries and entries idle beyond `stale_after_ms`.
    ///
    /// Throttled: a sweep that overlaps another, or starts within the
    /// minimum interval of the last one, is skipped. Our own entry is never
    /// pruned here.
    pub(crate) async fn sweep(
        &self,
        stale_after_ms: u64,
        label: &'static str,
    ) -> Result<SweepReport, PeerDirectoryError> {
        let now = self.now();
        let Some(_permit) = self.throttle.try_begin(now) else {
            debug!(sweep = label, "[mg-01] Sweep skipped, throttled");
            return Ok(SweepReport::skipped());
        };

        let mut report = SweepReport::default();
        for (soul, health) in self.classified(now, stale_after_ms)? {
            report.examined += 1;
            match health {
                EntryHealth::Live(_) | EntryHealth::Gone => {}
                EntryHealth::Stale(entry) => {
                    if self.is_own(&entry.key) {
                        continue;
                    }
                    if self.prune(&soul).await? {
                        report.pruned_stale.push(entry.key);
                    }
                }
                EntryHealth::Invalid(reason) => {
                    warn!(soul = %soul, reason = %reason, "[mg-01] Invalid directory entry");
                    if self.prune(&soul).await? {
                        report.pruned_invalid.push(soul.last_segment().to_string());
                    }
                }
            }
        }

        if report.pruned() > 0 {
            info!(
                sweep = label,
                examined = report.examined,
                stale = report.pruned_stale.len(),
                invalid = report.pruned_invalid.len(),
                "[mg-01] 🧹 Pruned peer directory"
            );
        }
        Ok(report)
    }

    async fn prune(&self, soul: &Soul) -> Result<bool, PeerDirectoryError> {
        let outcome = self
            .graph
            .put(GraphPut::tombstone(soul.clone()), WriteOrigin::Local)
            .await?;
        match outcome {
            PutOutcome::Applied { .. } => {
                self.bus
                    .publish(GraphEvent::PeerPruned {
                        key: soul.last_segment().to_string(),
                    })
                    .await;
                Ok(true)
            }
            PutOutcome::Unchanged { .. } => Ok(false),
            PutOutcome::Rejected { reason } => Err(PeerDirectoryError::Rejected(reason)),
        }
    }
}
