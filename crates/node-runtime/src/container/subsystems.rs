//! # Subsystem Container
//!
//! Builds every subsystem in dependency order:
//!
//! ```text
//! Level 0: event bus, clock, shard router (no dependencies)
//! Level 1: write validator (router) → graph store (bus, validator)
//! Level 2: peer directory (graph) → replicator (graph, directory, transport)
//! Level 3: read path (graph, bus, router, replicator), deletion (graph)
//! ```
//!
//! Everything is held in `Arc`s; subsystems talk to each other through the
//! port traits and the bus, never through this struct.

use crate::adapters::ReplicationSync;
use crate::container::config::NodeConfig;
use mg_01_peer_directory::{PeerDirectory, PeerDirectoryError};
use mg_02_graph_store::{
    BincodeNodeSerializer, FileBackedKVStore, GraphStore, InMemoryKVStore, KVStoreError,
    KeyValueStore,
};
use mg_03_shard_router::{ShardError, ShardRouter};
use mg_04_write_validator::WriteValidator;
use mg_05_annotation_reads::{LocationSync, ReadService};
use mg_06_deletion::DeletionService;
use mg_07_replication::{HttpPeerTransport, PeerTransport, ReplicationError, Replicator};
use shared_bus::InMemoryEventBus;
use shared_types::{SystemTimeSource, TimeSource};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum ContainerError {
    #[error("Shard router: {0}")]
    Shard(#[from] ShardError),

    #[error("Peer directory: {0}")]
    Directory(#[from] PeerDirectoryError),

    #[error("Replication: {0}")]
    Replication(#[from] ReplicationError),

    #[error("Cannot create data directory: {0}")]
    Storage(#[from] std::io::Error),

    #[error("Graph log: {0}")]
    GraphLog(#[from] KVStoreError),
}

/// Every subsystem of one node.
pub struct SubsystemContainer {
    pub config: NodeConfig,
    pub event_bus: Arc<InMemoryEventBus>,
    pub time: Arc<dyn TimeSource>,
    pub router: Arc<ShardRouter>,
    pub validator: Arc<WriteValidator>,
    pub graph: Arc<GraphStore>,
    pub directory: Arc<PeerDirectory>,
    pub replicator: Arc<Replicator>,
    pub reads: Arc<ReadService>,
    pub deletion: Arc<DeletionService>,
}

impl SubsystemContainer {
    /// Production wiring: system clock, HTTP transport.
    pub fn new(config: NodeConfig) -> Result<Self, ContainerError> {
        let timeout = Duration::from_millis(config.replication.request_timeout_ms);
        let transport = Arc::new(HttpPeerTransport::new(timeout)?);
        Self::with_parts(config, Arc::new(SystemTimeSource::new()), transport)
    }

    /// Wiring with an injected clock and peer transport.
    pub fn with_parts(
        config: NodeConfig,
        time: Arc<dyn TimeSource>,
        transport: Arc<dyn PeerTransport>,
    ) -> Result<Self, ContainerError> {
        info!("[runtime] Initializing subsystem container");

        // Level 0
        let event_bus = Arc::new(InMemoryEventBus::new());
        let router = Arc::new(ShardRouter::new(&config.shards)?);
        info!("  [03] Shard router ready");

        // Level 1
        let validator = Arc::new(WriteValidator::new(
            config.validation.clone(),
            router.clone(),
        ));
        info!(admins = config.validation.admins.len(), "  [04] Write validator ready");

        let kv: Box<dyn KeyValueStore> = if config.storage.in_memory {
            Box::new(InMemoryKVStore::new())
        } else {
            std::fs::create_dir_all(&config.storage.data_dir)?;
            Box::new(FileBackedKVStore::open(config.storage.graph_file())?)
        };
        let graph = Arc::new(
            GraphStore::new(
                kv,
                Arc::new(BincodeNodeSerializer),
                event_bus.clone(),
                time.clone(),
                config.graph.clone(),
            )
            .with_write_hook(validator.clone()),
        );
        info!(in_memory = config.storage.in_memory, "  [02] Graph store ready");

        // Level 2
        let directory = Arc::new(PeerDirectory::new(
            graph.clone(),
            event_bus.clone(),
            time.clone(),
            config.directory_config(),
        )?);
        info!("  [01] Peer directory ready");

        let replicator = Arc::new(Replicator::new(
            graph.clone(),
            directory.clone(),
            transport,
            event_bus.clone(),
            config.replication_config(),
        ));
        info!(seeds = config.network.seed_peers.len(), "  [07] Replicator ready");

        // Level 3
        let sync: Arc<dyn LocationSync> = Arc::new(ReplicationSync::new(replicator.clone()));
        let reads = Arc::new(ReadService::new(
            graph.clone(),
            event_bus.clone(),
            router.clone(),
            time.clone(),
            Some(sync),
            config.reads.clone(),
        ));
        info!("  [05] Read path ready");

        let deletion = Arc::new(DeletionService::new(
            graph.clone(),
            time.clone(),
            config.deletion.clone(),
        ));
        info!("  [06] Deletion ready");

        Ok(Self {
            config,
            event_bus,
            time,
            router,
            validator,
            graph,
            directory,
            replicator,
            reads,
            deletion,
        })
    }
}
