//! TTL cache of resolved author profiles, shared by every read.

use crate::domain::view::AuthorProfile;
use parking_lot::RwLock;
use shared_types::Timestamp;
use std::collections::HashMap;

#[derive(Debug, Clone)]
struct CachedProfile {
    profile: AuthorProfile,
    expires_at: Timestamp,
}

#[derive(Debug)]
pub struct ProfileCache {
    ttl_ms: u64,
    miss_ttl_ms: u64,
    entries: RwLock<HashMap<String, CachedProfile>>,
}

impl ProfileCache {
    pub fn new(ttl_ms: u64, miss_ttl_ms: u64) -> Self {
        Self {
            ttl_ms,
            miss_ttl_ms,
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub fn get(&self, did: &str, now: Timestamp) -> Option<AuthorProfile> {
        self.entries
            .read()
            .get(did)
            .filter(|entry| entry.expires_at > now)
            .map(|entry| entry.profile.clone())
    }

    /// Cache a lookup result. `found` is false for the placeholder given to
    /// authors without a profile, which expires sooner.
    pub fn insert(&self, did: &str, profile: AuthorProfile, found: bool, now: Timestamp) {
        let ttl = if found { self.ttl_ms } else { self.miss_ttl_ms };
        self.entries.write().insert(
            did.to_string(),
            CachedProfile {
                profile,
                expires_at: now.saturating_add(ttl),
            },
        );
    }

    pub fn invalidate(&self, did: &str) {
        self.entries.write().remove(did);
    }

    /// Drop expired entries. Returns how many were removed.
    pub fn purge_expired(&self, now: Timestamp) -> usize {
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|_, entry| entry.expires_at > now);
        before - entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}
