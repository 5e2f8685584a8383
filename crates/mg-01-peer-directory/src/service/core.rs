use crate::domain::{classify, DirectoryConfig, EntryHealth, PeerDirectoryError, PeerEntry};
use mg_02_graph_store::{GraphApi, PutOutcome};
use shared_bus::EventPublisher;
use shared_crypto::peer_key;
use shared_types::{GraphPut, PeerRecord, Soul, SweepThrottle, TimeSource, Timestamp, WriteOrigin};
use std::sync::Arc;

/// Peer directory backed by the graph store.
pub struct PeerDirectory {
    pub(crate) graph: Arc<dyn GraphApi>,
    pub(crate) bus: Arc<dyn EventPublisher>,
    pub(crate) time: Arc<dyn TimeSource>,
    pub(crate) config: DirectoryConfig,
    pub(crate) own_key: Option<String>,
    pub(crate) throttle: SweepThrottle,
}

impl PeerDirectory {
    /// Create a directory. Fails if the configured public URL is not a
    /// valid peer endpoint.
    pub fn new(
        graph: Arc<dyn GraphApi>,
        bus: Arc<dyn EventPublisher>,
        time: Arc<dyn TimeSource>,
        config: DirectoryConfig,
    ) -> Result<Self, PeerDirectoryError> {
        let own_key = match &config.public_url {
            Some(url) => {
                check_peer_url(url, &config.url_suffix)?;
                Some(peer_key(url))
            }
            None => None,
        };
        let throttle = SweepThrottle::new(config.sweep_min_interval_ms);
        Ok(Self {
            graph,
            bus,
            time,
            config,
            own_key,
            throttle,
        })
    }

    pub(crate) fn now(&self) -> Timestamp {
        self.time.now_ms()
    }

    pub fn config(&self) -> &DirectoryConfig {
        &self.config
    }

    /// Directory key of this node, if it has a public URL.
    pub fn own_key(&self) -> Option<&str> {
        self.own_key.as_deref()
    }

    pub(crate) fn is_own(&self, key: &str) -> bool {
        self.own_key.as_deref() == Some(key)
    }

    /// Start time of the last sweep that ran.
    pub fn last_sweep(&self) -> Option<Timestamp> {
        self.throttle.last_started()
    }

    /// Write a full entry for `url`, keeping any first-seen timestamp.
    pub(crate) async fn upsert(&self, url: &str) -> Result<PeerEntry, PeerDirectoryError> {
        check_peer_url(url, &self.config.url_suffix)?;
        let key = peer_key(url);
        let soul = Soul::peer(&key);
        let now = self.now();

        let first_seen = match self.graph.get(&soul)? {
            Some(node) => match classify(&node, now, u64::MAX) {
                EntryHealth::Live(entry) | EntryHealth::Stale(entry) => entry.record.timestamp,
                EntryHealth::Invalid(_) | EntryHealth::Gone => now,
            },
            None => now,
        };
        let record = PeerRecord {
            url: url.to_string(),
            timestamp: first_seen,
            last_connection: now,
        };

        let put = GraphPut::fields(soul, record.to_fields());
        match self.graph.put(put, WriteOrigin::Local).await? {
            PutOutcome::Rejected { reason } => Err(PeerDirectoryError::Rejected(reason)),
            PutOutcome::Applied { .. } | PutOutcome::Unchanged { .. } => {
                Ok(PeerEntry { key, record })
            }
        }
    }

    /// Entries classified against `stale_after_ms`.
    pub(crate) fn classified(
        &self,
        now: Timestamp,
        stale_after_ms: u64,
    ) -> Result<Vec<(Soul, EntryHealth)>, PeerDirectoryError> {
        Ok(self
            .graph
            .children(&Soul::peers_root())?
            .into_iter()
            .map(|node| {
                let health = classify(&node, now, stale_after_ms);
                (node.soul, health)
            })
            .collect())
    }
}

/// Peer endpoints are http(s) URLs ending with the graph path.
pub(crate) fn check_peer_url(url: &str, suffix: &str) -> Result<(), PeerDirectoryError> {
    let scheme_ok = url.starts_with("http://") || url.starts_with("https://");
    if scheme_ok && url.ends_with(suffix) && !url.contains(char::is_whitespace) {
        Ok(())
    } else {
        Err(PeerDirectoryError::InvalidPeerUrl(url.to_string()))
    }
}
