//! # Gateway Service
//!
//! Binds the listener and serves [`build_router`] until the shutdown signal
//! flips.

use crate::domain::{GatewayConfig, GatewayError};
use crate::middleware::GatewayMetrics;
use crate::router::{build_router, AppState};
use axum::Router;
use mg_01_peer_directory::PeerDirectoryApi;
use mg_02_graph_store::GraphApi;
use mg_05_annotation_reads::AnnotationReadApi;
use mg_07_replication::ReplicationApi;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::info;

pub struct ApiGatewayService {
    config: GatewayConfig,
    state: AppState,
}

impl ApiGatewayService {
    pub fn new(
        config: GatewayConfig,
        reads: Arc<dyn AnnotationReadApi>,
        graph: Arc<dyn GraphApi>,
        replication: Arc<dyn ReplicationApi>,
        directory: Arc<dyn PeerDirectoryApi>,
    ) -> Self {
        let state = AppState {
            reads,
            graph,
            replication,
            directory,
            metrics: Arc::new(GatewayMetrics::new()),
            recent_limit: config.recent_limit,
        };
        Self { config, state }
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    pub fn metrics(&self) -> Arc<GatewayMetrics> {
        Arc::clone(&self.state.metrics)
    }

    pub fn router(&self) -> Router {
        build_router(self.state.clone(), &self.config)
    }

    /// Bind the configured address.
    pub async fn bind(&self) -> Result<TcpListener, GatewayError> {
        Ok(TcpListener::bind(self.config.listen_addr).await?)
    }

    /// Serve on an already bound listener until `shutdown` becomes `true`
    /// (or its sender is dropped). In-flight requests are allowed to finish.
    pub async fn serve(
        &self,
        listener: TcpListener,
        mut shutdown: watch::Receiver<bool>,
    ) -> Result<(), GatewayError> {
        let addr: Option<SocketAddr> = listener.local_addr().ok();
        info!(addr = ?addr, "[mg-08] 🌐 HTTP gateway listening");

        axum::serve(listener, self.router())
            .with_graceful_shutdown(async move {
                while !*shutdown.borrow() {
                    if shutdown.changed().await.is_err() {
                        break;
                    }
                }
            })
            .await?;

        info!("[mg-08] HTTP gateway stopped");
        Ok(())
    }
}
