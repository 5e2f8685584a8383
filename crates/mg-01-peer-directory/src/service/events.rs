use crate::ports::PeerDirectoryApi;
use crate::service::PeerDirectory;
use shared_bus::{GraphEvent, Subscription};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info};

impl PeerDirectory {
    /// Feed `PeerContacted` events into [`PeerDirectoryApi::on_peer_connect`]
    /// until the bus closes or `shutdown` flips.
    pub async fn run_contact_listener(
        self: Arc<Self>,
        mut subscription: Subscription,
        mut shutdown: watch::Receiver<bool>,
    ) {
        loop {
            tokio::select! {
                event = subscription.recv() => match event {
                    Some(GraphEvent::PeerContacted { url }) => {
                        if let Err(e) = self.on_peer_connect(&url).await {
                            debug!(url = %url, error = %e, "[mg-01] Ignoring peer contact");
                        }
                    }
                    Some(_) => {}
                    None => break,
                },
                _ = shutdown.changed() => break,
            }
        }
        info!("[mg-01] Contact listener stopped");
    }
}
