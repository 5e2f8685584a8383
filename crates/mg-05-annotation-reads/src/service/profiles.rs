//! # Profile Resolution
//!
//! Display profiles live at `profiles/<did>`; older clients wrote them to
//! `user_<did>/profile`. A miss on both triggers a pull of both souls, then
//! a few local re-reads with exponential backoff while replicated data
//! arrives. Authors that stay unknown get a placeholder name.

use crate::domain::{AuthorProfile, ProfileCache, ReadPathConfig};
use crate::ports::LocationSync;
use mg_02_graph_store::GraphApi;
use shared_types::{Profile, Soul, TimeSource};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

pub struct ProfileResolver {
    graph: Arc<dyn GraphApi>,
    sync: Option<Arc<dyn LocationSync>>,
    time: Arc<dyn TimeSource>,
    cache: ProfileCache,
    retries: u32,
    backoff_ms: u64,
    default_name: String,
}

impl ProfileResolver {
    pub fn new(
        graph: Arc<dyn GraphApi>,
        sync: Option<Arc<dyn LocationSync>>,
        time: Arc<dyn TimeSource>,
        config: &ReadPathConfig,
    ) -> Self {
        Self {
            graph,
            sync,
            time,
            cache: ProfileCache::new(config.profile_ttl_ms, config.profile_miss_ttl_ms),
            retries: config.profile_retries,
            backoff_ms: config.profile_backoff_ms,
            default_name: config.default_display_name.clone(),
        }
    }

    pub fn cache(&self) -> &ProfileCache {
        &self.cache
    }

    fn stored(&self, soul: &Soul, did: &str) -> Option<Profile> {
        match self.graph.get(soul) {
            Ok(Some(node)) if !node.is_tombstoned() => Profile::from_fields(&node.fields)
                .ok()
                .filter(|profile| profile.author == did),
            Ok(_) => None,
            Err(e) => {
                debug!(soul = %soul, error = %e, "[mg-05] Profile read failed");
                None
            }
        }
    }

    fn lookup(&self, did: &str) -> Option<Profile> {
        self.stored(&Soul::profile(did), did)
            .or_else(|| self.stored(&Soul::legacy_profile(did), did))
    }

    /// Display profile of `did`. Never fails.
    pub async fn resolve(&self, did: &str) -> AuthorProfile {
        if let Some(profile) = self.cache.get(did, self.time.now_ms()) {
            return profile;
        }

        let mut found = self.lookup(did);
        if found.is_none() {
            if let Some(sync) = &self.sync {
                let primary = Soul::profile(did);
                let legacy = Soul::legacy_profile(did);
                futures::join!(sync.sync_node(&primary), sync.sync_node(&legacy));
            }
        }
        let mut attempt = 0;
        while found.is_none() && attempt < self.retries {
            let delay = self.backoff_ms.saturating_mul(1 << attempt.min(16));
            tokio::time::sleep(Duration::from_millis(delay)).await;
            found = self.lookup(did);
            attempt += 1;
        }

        let (profile, hit) = match found {
            Some(profile) => (AuthorProfile::from(profile), true),
            None => {
                debug!(did, attempts = attempt, "[mg-05] No profile, using placeholder");
                (AuthorProfile::placeholder(&self.default_name), false)
            }
        };
        self.cache.insert(did, profile.clone(), hit, self.time.now_ms());
        profile
    }
}
