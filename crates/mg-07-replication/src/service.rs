//! # Replicator
//!
//! Live replication is push gossip: every change this node accepts from a
//! client or a peer is relayed to up to `fanout` live peers. Peers that were
//! offline catch up by pulling a location on demand (the read path does this
//! before answering). All inbound data goes through the local graph store, so
//! the write validator sees every replicated put.
//!
//! Pulls fetch deletion records before the content they authorize, otherwise
//! the deletes would be refused for lack of a record.

use crate::domain::{
    select_relay_targets, BootstrapReport, Delivery, GraphMessage, PullReport, RelayReport,
    ReplicationConfig, ReplicationError, SeenMessageCache,
};
use crate::ports::{PeerTransport, ReplicationApi};
use async_trait::async_trait;
use futures::future::join_all;
use mg_01_peer_directory::PeerDirectoryApi;
use mg_02_graph_store::{GraphApi, PutOutcome};
use shared_bus::{EventPublisher, GraphEvent, Subscription};
use shared_types::{GraphPut, Node, Soul, WriteOrigin};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info, warn};

pub struct Replicator {
    graph: Arc<dyn GraphApi>,
    directory: Arc<dyn PeerDirectoryApi>,
    transport: Arc<dyn PeerTransport>,
    bus: Arc<dyn EventPublisher>,
    seen: SeenMessageCache,
    config: ReplicationConfig,
}

/// Per-peer tally of a pull.
#[derive(Debug, Default)]
struct PullCounts {
    received: usize,
    applied: usize,
    rejected: usize,
}

impl PullCounts {
    fn count(&mut self, outcome: &PutOutcome) {
        self.received += 1;
        match outcome {
            PutOutcome::Applied { .. } => self.applied += 1,
            PutOutcome::Rejected { .. } => self.rejected += 1,
            PutOutcome::Unchanged { .. } => {}
        }
    }
}

impl Replicator {
    pub fn new(
        graph: Arc<dyn GraphApi>,
        directory: Arc<dyn PeerDirectoryApi>,
        transport: Arc<dyn PeerTransport>,
        bus: Arc<dyn EventPublisher>,
        config: ReplicationConfig,
    ) -> Self {
        Self {
            seen: SeenMessageCache::new(config.seen_cache_size),
            graph,
            directory,
            transport,
            bus,
            config,
        }
    }

    pub fn config(&self) -> &ReplicationConfig {
        &self.config
    }

    pub fn seen_messages(&self) -> usize {
        self.seen.len()
    }

    async fn apply_synced(
        &self,
        nodes: Vec<Node>,
        counts: &mut PullCounts,
    ) -> Result<(), ReplicationError> {
        for node in nodes {
            let outcome = self.graph.put(node.to_put(), WriteOrigin::Sync).await?;
            if let PutOutcome::Rejected { reason } = &outcome {
                debug!(soul = %node.soul, %reason, "[mg-07] Pulled node refused");
            }
            counts.count(&outcome);
        }
        Ok(())
    }

    /// Deletion records under `parent`, then the nodes themselves.
    async fn pull_children(
        &self,
        peer: &str,
        parent: &Soul,
        counts: &mut PullCounts,
    ) -> Result<Vec<Node>, ReplicationError> {
        let records = self
            .transport
            .fetch_children(peer, &Soul::deletion_record(parent))
            .await?;
        self.apply_synced(records, counts).await?;

        let nodes = self.transport.fetch_children(peer, parent).await?;
        self.apply_synced(nodes.clone(), counts).await?;
        Ok(nodes)
    }

    async fn pull_from(&self, peer: &str, location: &Soul) -> Result<PullCounts, ReplicationError> {
        let mut counts = PullCounts::default();
        let annotations = self.pull_children(peer, location, &mut counts).await?;
        for annotation in annotations.iter().filter(|node| !node.is_tombstoned()) {
            self.pull_children(peer, &Soul::comments(&annotation.soul), &mut counts)
                .await?;
        }
        Ok(counts)
    }

    async fn contacted(&self, url: &str) {
        self.bus
            .publish(GraphEvent::PeerContacted {
                url: url.to_string(),
            })
            .await;
    }

    /// Relay every replicable change announced on `subscription` until the
    /// bus closes or `shutdown` flips.
    pub async fn run_relay_loop(
        self: Arc<Self>,
        mut subscription: Subscription,
        mut shutdown: watch::Receiver<bool>,
    ) {
        loop {
            tokio::select! {
                event = subscription.recv() => match event {
                    Some(GraphEvent::NodeUpdated { diff, origin, .. }) if origin.is_replicable() => {
                        let replicator = self.clone();
                        tokio::spawn(async move {
                            replicator.relay(&diff).await;
                        });
                    }
                    Some(_) => {}
                    None => break,
                },
                _ = shutdown.changed() => break,
            }
        }
        info!("[mg-07] Relay loop stopped");
    }
}

#[async_trait]
impl ReplicationApi for Replicator {
    async fn handle_message(&self, message: GraphMessage) -> Result<Delivery, ReplicationError> {
        let message = if message.has_valid_id() {
            message
        } else {
            GraphMessage::new(message.put, message.from)
        };
        if !self.seen.mark_seen(&message.id) {
            return Ok(Delivery::Duplicate);
        }
        if let Some(from) = &message.from {
            self.contacted(from).await;
        }
        let outcome = self.graph.put(message.put, WriteOrigin::Gossip).await?;
        Ok(Delivery::Delivered(outcome))
    }

    async fn relay(&self, put: &GraphPut) -> RelayReport {
        let peers = match self.directory.live_peers() {
            Ok(peers) => peers,
            Err(e) => {
                warn!(error = %e, "[mg-07] Cannot read peer directory, relay skipped");
                return RelayReport::default();
            }
        };
        let targets = select_relay_targets(&peers, None, self.config.fanout);
        if targets.is_empty() {
            return RelayReport::default();
        }

        let message = GraphMessage::new(put.clone(), self.config.public_url.clone());
        self.seen.mark_seen(&message.id);

        let sends = targets.iter().map(|peer| async {
            let url = peer.record.url.as_str();
            (url, self.transport.send(url, &message).await)
        });
        let mut report = RelayReport {
            attempted: targets.len(),
            ..RelayReport::default()
        };
        for (url, result) in join_all(sends).await {
            match result {
                Ok(()) => {
                    report.delivered += 1;
                    self.contacted(url).await;
                }
                Err(e) => {
                    debug!(peer = url, error = %e, "[mg-07] Relay failed");
                    report.failed.push(url.to_string());
                }
            }
        }
        debug!(
            soul = %put.soul,
            delivered = report.delivered,
            failed = report.failed.len(),
            "[mg-07] Relayed change"
        );
        report
    }

    async fn fetch_location(&self, location: &Soul) -> Result<PullReport, ReplicationError> {
        let peers = self.directory.live_peers()?;
        let pulls = peers.iter().map(|peer| async {
            let url = peer.record.url.as_str();
            (url, self.pull_from(url, location).await)
        });

        let mut report = PullReport {
            peers_queried: peers.len(),
            ..PullReport::default()
        };
        for (url, result) in join_all(pulls).await {
            match result {
                Ok(counts) => {
                    report.nodes_received += counts.received;
                    report.nodes_applied += counts.applied;
                    report.nodes_rejected += counts.rejected;
                    self.contacted(url).await;
                }
                Err(e) => {
                    debug!(peer = url, error = %e, "[mg-07] Pull failed");
                    report.peers_failed += 1;
                }
            }
        }
        Ok(report)
    }

    async fn fetch_node(&self, soul: &Soul) -> Result<PullReport, ReplicationError> {
        let peers = self.directory.live_peers()?;
        let fetches = peers.iter().map(|peer| async {
            let url = peer.record.url.as_str();
            (url, self.transport.fetch_node(url, soul).await)
        });

        let mut report = PullReport {
            peers_queried: peers.len(),
            ..PullReport::default()
        };
        let mut counts = PullCounts::default();
        for (url, result) in join_all(fetches).await {
            match result {
                Ok(node) => {
                    self.apply_synced(node.into_iter().collect(), &mut counts).await?;
                    self.contacted(url).await;
                }
                Err(e) => {
                    debug!(peer = url, error = %e, "[mg-07] Node fetch failed");
                    report.peers_failed += 1;
                }
            }
        }
        report.nodes_received = counts.received;
        report.nodes_applied = counts.applied;
        report.nodes_rejected = counts.rejected;
        Ok(report)
    }

    async fn bootstrap(&self) -> BootstrapReport {
        let mut report = BootstrapReport::default();
        for seed in &self.config.seed_peers {
            if self.config.public_url.as_deref() == Some(seed.as_str()) {
                continue;
            }
            let entries = match self.transport.fetch_children(seed, &Soul::peers_root()).await {
                Ok(entries) => entries,
                Err(e) => {
                    warn!(seed = %seed, error = %e, "[mg-07] Seed peer unreachable");
                    report.seeds_failed += 1;
                    continue;
                }
            };
            report.seeds_contacted += 1;
            if let Err(e) = self.directory.on_peer_connect(seed).await {
                warn!(seed = %seed, error = %e, "[mg-07] Seed peer not recorded");
            }
            let mut counts = PullCounts::default();
            if let Err(e) = self.apply_synced(entries, &mut counts).await {
                warn!(seed = %seed, error = %e, "[mg-07] Seed directory not applied");
            }
            report.peers_learned += counts.applied;
        }
        info!(
            contacted = report.seeds_contacted,
            failed = report.seeds_failed,
            learned = report.peers_learned,
            "[mg-07] 🌱 Bootstrap complete"
        );
        report
    }
}
