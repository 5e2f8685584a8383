//! # Maintenance Loops
//!
//! | Task | Default period | Does |
//! |------|----------------|------|
//! | refresh | 5 min | bump `lastConnection` on our own directory entry |
//! | prune | 1 min | tombstone stale and invalid directory entries |
//! | gc | 1 h | tombstone long-deleted annotations and comments |
//! | caches | 1 min | drop idle rate-limit windows and expired profiles |
//!
//! Each one-shot function logs its own failures; the loops never stop on an
//! error, only on shutdown.

use marginalia_telemetry::{LIVE_PEERS, SWEEPS_RUN, TOMBSTONES_WRITTEN};
use mg_01_peer_directory::{PeerDirectoryApi, SweepReport};
use mg_04_write_validator::WriteValidator;
use mg_05_annotation_reads::ReadService;
use mg_06_deletion::{DeletionApi, GcReport};
use shared_types::Timestamp;
use std::future::Future;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

/// Run `task` every `period` until `shutdown` flips. The first run is one
/// period from now; startup work is done by the caller.
pub async fn run_periodic<F, Fut>(
    name: &'static str,
    period: Duration,
    mut shutdown: watch::Receiver<bool>,
    mut task: F,
) where
    F: FnMut() -> Fut,
    Fut: Future<Output = ()>,
{
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        tokio::select! {
            _ = ticker.tick() => task().await,
            _ = shutdown.changed() => break,
        }
    }
    debug!(task = name, "[runtime] Maintenance loop stopped");
}

pub async fn refresh_once(directory: &dyn PeerDirectoryApi) {
    if let Err(e) = directory.refresh_self().await {
        debug!(error = %e, "[mg-01] Own entry not refreshed");
    }
}

fn update_live_peers(directory: &dyn PeerDirectoryApi) {
    if let Ok(peers) = directory.live_peers() {
        LIVE_PEERS.set(peers.len() as f64);
    }
}

/// Periodic directory sweep.
pub async fn prune_once(directory: &dyn PeerDirectoryApi) -> Option<SweepReport> {
    let report = match directory.prune_stale().await {
        Ok(report) => report,
        Err(e) => {
            warn!(error = %e, "[mg-01] Directory sweep failed");
            return None;
        }
    };
    if !report.skipped {
        SWEEPS_RUN.with_label_values(&["prune"]).inc();
        TOMBSTONES_WRITTEN
            .with_label_values(&["peer"])
            .inc_by(report.pruned() as f64);
    }
    update_live_peers(directory);
    Some(report)
}

/// Startup sweep with the looser threshold.
pub async fn prune_at_startup(directory: &dyn PeerDirectoryApi) {
    match directory.prune_at_startup().await {
        Ok(report) => {
            info!(
                examined = report.examined,
                pruned = report.pruned(),
                "[mg-01] Startup sweep done"
            );
            TOMBSTONES_WRITTEN
                .with_label_values(&["peer"])
                .inc_by(report.pruned() as f64);
        }
        Err(e) => warn!(error = %e, "[mg-01] Startup sweep failed"),
    }
    update_live_peers(directory);
}

/// Garbage collection sweep.
pub async fn collect_once(deletion: &dyn DeletionApi) -> Option<GcReport> {
    match deletion.collect_garbage().await {
        Ok(report) => {
            if !report.skipped {
                SWEEPS_RUN.with_label_values(&["gc"]).inc();
                TOMBSTONES_WRITTEN
                    .with_label_values(&["content"])
                    .inc_by(report.tombstoned as f64);
            }
            Some(report)
        }
        Err(e) => {
            warn!(error = %e, "[mg-06] Garbage collection failed");
            None
        }
    }
}

/// Entries dropped by one cache sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CachePurge {
    pub rate_limit_windows: usize,
    pub profiles: usize,
}

/// Evict per-author state that has aged out. Both maps are keyed by DID, and
/// any fresh key pair adds an entry.
pub fn purge_caches_once(
    validator: &WriteValidator,
    reads: &ReadService,
    now: Timestamp,
) -> CachePurge {
    let purge = CachePurge {
        rate_limit_windows: validator.rate_limiter().purge_idle(now),
        profiles: reads.profiles().cache().purge_expired(now),
    };
    if purge != CachePurge::default() {
        debug!(
            rate_limit_windows = purge.rate_limit_windows,
            profiles = purge.profiles,
            "[runtime] Caches purged"
        );
    }
    purge
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::{NodeConfig, SubsystemContainer};
    use mg_05_annotation_reads::AuthorProfile;
    use mg_07_replication::LoopbackNetwork;
    use shared_types::ManualTimeSource;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[tokio::test(start_paused = true)]
    async fn test_periodic_runs_after_each_period_until_shutdown() {
        let runs = Arc::new(AtomicUsize::new(0));
        let (tx, rx) = watch::channel(false);
        let handle = {
            let runs = runs.clone();
            tokio::spawn(run_periodic("test", Duration::from_secs(60), rx, move || {
                let runs = runs.clone();
                async move {
                    runs.fetch_add(1, Ordering::SeqCst);
                }
            }))
        };

        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(runs.load(Ordering::SeqCst), 0);
        tokio::time::sleep(Duration::from_secs(100)).await;
        assert_eq!(runs.load(Ordering::SeqCst), 2);

        tx.send(true).unwrap();
        handle.await.unwrap();
        tokio::time::sleep(Duration::from_secs(600)).await;
        assert_eq!(runs.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_cache_sweep_drops_aged_entries() {
        const T0: Timestamp = 1_700_000_000_000;
        let mut config = NodeConfig::default();
        config.storage.in_memory = true;
        let window = config.validation.rate_limit_window_ms;
        let miss_ttl = config.reads.profile_miss_ttl_ms;
        let c = SubsystemContainer::with_parts(
            config,
            Arc::new(ManualTimeSource::new(T0)),
            LoopbackNetwork::new(),
        )
        .unwrap();

        let now = T0 + window.max(miss_ttl);
        let limiter = c.validator.rate_limiter();
        let cache = c.reads.profiles().cache();
        limiter.record("did:key:zOld", T0);
        limiter.record("did:key:zFresh", now - 1);
        let placeholder = AuthorProfile {
            display_name: "anonymous".into(),
            avatar: None,
        };
        cache.insert("did:key:zOld", placeholder.clone(), false, T0);
        cache.insert("did:key:zFresh", placeholder, true, now - 1);

        assert_eq!(
            purge_caches_once(&c.validator, &c.reads, now),
            CachePurge {
                rate_limit_windows: 1,
                profiles: 1,
            }
        );
        assert_eq!(limiter.tracked_authors(), 1);
        assert_eq!(cache.len(), 1);
        assert_eq!(
            purge_caches_once(&c.validator, &c.reads, now),
            CachePurge::default()
        );
    }
}
