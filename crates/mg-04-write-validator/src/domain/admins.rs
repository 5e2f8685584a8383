//! Identities allowed to delete content they did not author.

use parking_lot::RwLock;
use std::collections::HashSet;

#[derive(Debug, Default)]
pub struct AdminRegistry {
    admins: RwLock<HashSet<String>>,
}

impl AdminRegistry {
    pub fn new<I, S>(admins: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            admins: RwLock::new(admins.into_iter().map(Into::into).collect()),
        }
    }

    pub fn is_admin(&self, did: &str) -> bool {
        self.admins.read().contains(did)
    }

    /// Returns false if already present.
    pub fn grant(&self, did: impl Into<String>) -> bool {
        self.admins.write().insert(did.into())
    }

    pub fn revoke(&self, did: &str) -> bool {
        self.admins.write().remove(did)
    }

    pub fn list(&self) -> Vec<String> {
        let mut admins: Vec<String> = self.admins.read().iter().cloned().collect();
        admins.sort();
        admins
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grant_and_revoke() {
        let registry = AdminRegistry::new(["did:key:zRoot"]);
        assert!(registry.is_admin("did:key:zRoot"));
        assert!(registry.grant("did:key:zMod"));
        assert!(!registry.grant("did:key:zMod"));
        assert!(registry.revoke("did:key:zRoot"));
        assert_eq!(registry.list(), vec!["did:key:zMod".to_string()]);
    }
}
