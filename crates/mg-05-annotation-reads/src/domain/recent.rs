//! Bounded newest-first list of recently seen annotations.

use parking_lot::Mutex;
use shared_types::Annotation;
use std::collections::VecDeque;

#[derive(Debug)]
pub struct RecentAnnotationsCache {
    capacity: usize,
    entries: Mutex<VecDeque<Annotation>>,
}

impl RecentAnnotationsCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            entries: Mutex::new(VecDeque::new()),
        }
    }

    /// Insert or refresh an annotation. The newest timestamp sits at the
    /// front; the oldest entry falls off once the cache is full.
    pub fn record(&self, annotation: Annotation) {
        let mut entries = self.entries.lock();
        entries.retain(|held| held.id != annotation.id);
        let position = entries
            .iter()
            .position(|held| held.timestamp <= annotation.timestamp)
            .unwrap_or(entries.len());
        entries.insert(position, annotation);
        entries.truncate(self.capacity);
    }

    pub fn remove(&self, id: &str) -> bool {
        let mut entries = self.entries.lock();
        let before = entries.len();
        entries.retain(|held| held.id != id);
        entries.len() != before
    }

    /// Up to `limit` entries, newest first.
    pub fn snapshot(&self, limit: usize) -> Vec<Annotation> {
        self.entries.lock().iter().take(limit).cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}
