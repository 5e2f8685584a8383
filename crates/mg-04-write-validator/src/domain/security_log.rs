//! # Security Log
//!
//! Bounded record of rejected writes that look like abuse: forged or stale
//! signatures, unauthorized deletions, rate-limit hits. Each entry is also
//! emitted on the `security` tracing target.

use crate::domain::errors::ValidationRejection;
use parking_lot::Mutex;
use shared_types::{Soul, Timestamp, WriteOrigin};
use std::collections::VecDeque;
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecurityEvent {
    pub at: Timestamp,
    pub soul: Soul,
    /// DID the put acted as, when known.
    pub actor: Option<String>,
    pub origin: WriteOrigin,
    pub rejection: ValidationRejection,
}

#[derive(Debug)]
pub struct SecurityLog {
    capacity: usize,
    events: Mutex<VecDeque<SecurityEvent>>,
}

impl SecurityLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            events: Mutex::new(VecDeque::new()),
        }
    }

    pub fn record(&self, event: SecurityEvent) {
        warn!(
            target: "security",
            soul = %event.soul,
            actor = event.actor.as_deref().unwrap_or("unknown"),
            origin = ?event.origin,
            reason = %event.rejection,
            "[mg-04] 🚨 Rejected write"
        );
        let mut events = self.events.lock();
        if events.len() == self.capacity {
            events.pop_front();
        }
        events.push_back(event);
    }

    /// Most recent first.
    pub fn recent(&self, limit: usize) -> Vec<SecurityEvent> {
        self.events.lock().iter().rev().take(limit).cloned().collect()
    }

    pub fn by_actor(&self, did: &str) -> Vec<SecurityEvent> {
        self.events
            .lock()
            .iter()
            .filter(|e| e.actor.as_deref() == Some(did))
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(n: u64, actor: &str) -> SecurityEvent {
        SecurityEvent {
            at: n,
            soul: Soul::new(format!("loc/a{n}")),
            actor: Some(actor.to_string()),
            origin: WriteOrigin::Gossip,
            rejection: ValidationRejection::InvalidSignature,
        }
    }

    #[test]
    fn test_bounded() {
        let log = SecurityLog::new(2);
        log.record(event(1, "did:key:zA"));
        log.record(event(2, "did:key:zA"));
        log.record(event(3, "did:key:zB"));
        assert_eq!(log.len(), 2);
        let recent = log.recent(10);
        assert_eq!(recent[0].at, 3);
        assert_eq!(recent[1].at, 2);
    }

    #[test]
    fn test_zero_capacity_keeps_latest() {
        let log = SecurityLog::new(0);
        for n in 1..=3 {
            log.record(event(n, "did:key:zA"));
        }
        assert_eq!(log.len(), 1);
        assert_eq!(log.recent(10)[0].at, 3);
    }

    #[test]
    fn test_filter_by_actor() {
        let log = SecurityLog::new(10);
        log.record(event(1, "did:key:zA"));
        log.record(event(2, "did:key:zB"));
        assert_eq!(log.by_actor("did:key:zB").len(), 1);
        assert!(log.by_actor("did:key:zC").is_empty());
    }
}
