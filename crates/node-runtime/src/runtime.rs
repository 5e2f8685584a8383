//! # Node Runtime
//!
//! Owns the subsystem container and every background task of one node.
//!
//! ## Startup Sequence
//!
//! 1. Register our own directory entry (when a public URL is configured)
//! 2. Startup sweep of the peer directory
//! 3. Spawn bus listeners: relay, peer contacts, recent feed, metrics
//! 4. Spawn maintenance loops: refresh, prune, garbage collection
//! 5. Bootstrap from the seed peers in the background
//! 6. Bind and serve the HTTP gateway
//!
//! Shutdown flips one `watch` channel that every task selects on.

use crate::container::{ContainerError, NodeConfig, SubsystemContainer};
use crate::handlers::{self, MetricsHandler};
use mg_01_peer_directory::PeerDirectoryApi;
use mg_07_replication::ReplicationApi;
use mg_08_api_gateway::{ApiGatewayService, GatewayError};
use shared_bus::{EventFilter, EventTopic};
use shared_types::souls::SHARD_PREFIX;
use shared_types::TimeSource;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

/// How long shutdown waits for tasks before giving up on them.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error(transparent)]
    Container(#[from] ContainerError),

    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error("Runtime already started")]
    AlreadyStarted,
}

pub struct NodeRuntime {
    container: Arc<SubsystemContainer>,
    shutdown_tx: watch::Sender<bool>,
    shutdown_rx: watch::Receiver<bool>,
    tasks: Mutex<Vec<JoinHandle<()>>>,
    local_addr: Mutex<Option<SocketAddr>>,
}

impl NodeRuntime {
    /// Build all subsystems with production wiring.
    pub fn new(config: NodeConfig) -> Result<Self, RuntimeError> {
        Ok(Self::with_container(SubsystemContainer::new(config)?))
    }

    pub fn with_container(container: SubsystemContainer) -> Self {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        Self {
            container: Arc::new(container),
            shutdown_tx,
            shutdown_rx,
            tasks: Mutex::new(Vec::new()),
            local_addr: Mutex::new(None),
        }
    }

    pub fn container(&self) -> Arc<SubsystemContainer> {
        Arc::clone(&self.container)
    }

    /// Address the gateway is bound to, once started.
    pub async fn local_addr(&self) -> Option<SocketAddr> {
        *self.local_addr.lock().await
    }

    /// Start every task and the HTTP gateway. Returns the bound address.
    pub async fn start(&self) -> Result<SocketAddr, RuntimeError> {
        let mut tasks = self.tasks.lock().await;
        if !tasks.is_empty() {
            return Err(RuntimeError::AlreadyStarted);
        }

        let c = &self.container;
        info!("===========================================");
        info!("  Marginalia node v{}", crate::VERSION);
        info!("===========================================");

        if c.config.network.public_url.is_some() {
            if let Err(e) = c.directory.register_self().await {
                warn!(error = %e, "[mg-01] Could not register own entry");
            }
        } else {
            info!("[mg-01] No public URL; running as a client-only node");
        }
        handlers::prune_at_startup(c.directory.as_ref()).await;

        self.spawn_listeners(&mut tasks);
        self.spawn_maintenance(&mut tasks);

        let replicator = c.replicator.clone();
        tasks.push(tokio::spawn(async move {
            replicator.bootstrap().await;
        }));

        let gateway = ApiGatewayService::new(
            c.config.gateway_config(),
            c.reads.clone(),
            c.graph.clone(),
            c.replicator.clone(),
            c.directory.clone(),
        );
        let listener = gateway.bind().await?;
        let addr = listener.local_addr().map_err(GatewayError::from)?;
        *self.local_addr.lock().await = Some(addr);

        let shutdown = self.shutdown_rx.clone();
        tasks.push(tokio::spawn(async move {
            if let Err(e) = gateway.serve(listener, shutdown).await {
                error!(error = %e, "[mg-08] Gateway failed");
            }
        }));

        info!(
            addr = %addr,
            public_url = ?c.config.network.public_url,
            data_dir = ?c.config.storage.data_dir,
            "✅ Node running"
        );
        Ok(addr)
    }

    fn spawn_listeners(&self, tasks: &mut Vec<JoinHandle<()>>) {
        let c = &self.container;
        let bus = &c.event_bus;

        tasks.push(tokio::spawn(c.replicator.clone().run_relay_loop(
            bus.subscribe(EventFilter::topics(vec![EventTopic::Graph])),
            self.shutdown_rx.clone(),
        )));
        tasks.push(tokio::spawn(c.directory.clone().run_contact_listener(
            bus.subscribe(EventFilter::topics(vec![EventTopic::Peers])),
            self.shutdown_rx.clone(),
        )));
        tasks.push(tokio::spawn(c.reads.clone().run_recent_feed(
            bus.subscribe(EventFilter::soul_prefixes(vec![SHARD_PREFIX.to_string()])),
            self.shutdown_rx.clone(),
        )));
        tasks.push(tokio::spawn(MetricsHandler::run(
            bus.subscribe(EventFilter::topics(vec![
                EventTopic::Graph,
                EventTopic::Security,
            ])),
            self.shutdown_rx.clone(),
        )));
    }

    fn spawn_maintenance(&self, tasks: &mut Vec<JoinHandle<()>>) {
        let c = &self.container;
        let directory = &c.config.directory;

        let dir = c.directory.clone();
        tasks.push(tokio::spawn(handlers::run_periodic(
            "refresh",
            Duration::from_millis(directory.refresh_interval_ms),
            self.shutdown_rx.clone(),
            move || {
                let dir = dir.clone();
                async move { handlers::refresh_once(dir.as_ref()).await }
            },
        )));

        let dir = c.directory.clone();
        tasks.push(tokio::spawn(handlers::run_periodic(
            "prune",
            Duration::from_millis(directory.prune_interval_ms),
            self.shutdown_rx.clone(),
            move || {
                let dir = dir.clone();
                async move {
                    handlers::prune_once(dir.as_ref()).await;
                }
            },
        )));

        let (validator, reads, time) = (c.validator.clone(), c.reads.clone(), c.time.clone());
        tasks.push(tokio::spawn(handlers::run_periodic(
            "caches",
            Duration::from_millis(directory.prune_interval_ms),
            self.shutdown_rx.clone(),
            move || {
                handlers::purge_caches_once(&validator, &reads, time.now_ms());
                std::future::ready(())
            },
        )));

        let deletion = c.deletion.clone();
        tasks.push(tokio::spawn(handlers::run_periodic(
            "gc",
            Duration::from_millis(c.config.deletion.gc_interval_ms),
            self.shutdown_rx.clone(),
            move || {
                let deletion = deletion.clone();
                async move {
                    handlers::collect_once(deletion.as_ref()).await;
                }
            },
        )));
    }

    /// Signal every task to stop and wait for them, bounded by a grace
    /// period.
    pub async fn shutdown(&self) {
        info!("Initiating graceful shutdown...");
        if self.shutdown_tx.send(true).is_err() {
            warn!("No task was listening for shutdown");
        }

        let tasks: Vec<_> = self.tasks.lock().await.drain(..).collect();
        let joined = tokio::time::timeout(SHUTDOWN_GRACE, async {
            for task in tasks {
                let _ = task.await;
            }
        })
        .await;
        if joined.is_err() {
            warn!("Some tasks did not stop within {:?}", SHUTDOWN_GRACE);
        }
        info!("Shutdown complete");
    }
}
