use crate::domain::{classify, EntryHealth, PeerDirectoryError, PeerEntry, SweepReport};
use crate::ports::PeerDirectoryApi;
use crate::service::core::check_peer_url;
use crate::service::PeerDirectory;
use async_trait::async_trait;
use shared_crypto::peer_key;
use shared_types::Soul;
use tracing::{debug, info};

#[async_trait]
impl PeerDirectoryApi for PeerDirectory {
    async fn register_self(&self) -> Result<PeerEntry, PeerDirectoryError> {
        let url = self
            .config
            .public_url
            .clone()
            .ok_or(PeerDirectoryError::NoPublicUrl)?;
        let entry = self.upsert(&url).await?;
        info!(key = %entry.key, url = %url, "[mg-01] 📡 Registered in peer directory");
        Ok(entry)
    }

    async fn on_peer_connect(&self, url: &str) -> Result<PeerEntry, PeerDirectoryError> {
        if self.config.public_url.as_deref() == Some(url) {
            return self.refresh_self().await;
        }
        check_peer_url(url, &self.config.url_suffix)?;

        // Relays record a contact on every delivery; without this each
        // delivery would be another directory write to gossip.
        let soul = Soul::peer(&peer_key(url));
        if let Some(node) = self.graph.get(&soul)? {
            if let EntryHealth::Live(entry) =
                classify(&node, self.now(), self.config.contact_debounce_ms)
            {
                return Ok(entry);
            }
        }

        let entry = self.upsert(url).await?;
        debug!(key = %entry.key, url = %url, "[mg-01] Peer contact recorded");
        Ok(entry)
    }

    async fn refresh_self(&self) -> Result<PeerEntry, PeerDirectoryError> {
        let url = self
            .config
            .public_url
            .clone()
            .ok_or(PeerDirectoryError::NoPublicUrl)?;
        let entry = self.upsert(&url).await?;
        debug!(key = %entry.key, "[mg-01] Own entry refreshed");
        Ok(entry)
    }

    async fn prune_stale(&self) -> Result<SweepReport, PeerDirectoryError> {
        self.sweep(self.config.stale_after_ms, "periodic").await
    }

    async fn prune_at_startup(&self) -> Result<SweepReport, PeerDirectoryError> {
        self.sweep(self.config.startup_stale_after_ms, "startup").await
    }

    fn live_peers(&self) -> Result<Vec<PeerEntry>, PeerDirectoryError> {
        let now = self.now();
        Ok(self
            .classified(now, self.config.stale_after_ms)?
            .into_iter()
            .filter_map(|(_, health)| match health {
                EntryHealth::Live(entry) if !self.is_own(&entry.key) => Some(entry),
                _ => None,
            })
            .collect())
    }

    fn all_peers(&self) -> Result<Vec<PeerEntry>, PeerDirectoryError> {
        let now = self.now();
        Ok(self
            .classified(now, self.config.stale_after_ms)?
            .into_iter()
            .filter_map(|(_, health)| match health {
                EntryHealth::Live(entry) | EntryHealth::Stale(entry) => Some(entry),
                EntryHealth::Invalid(_) | EntryHealth::Gone => None,
            })
            .collect())
    }
}
