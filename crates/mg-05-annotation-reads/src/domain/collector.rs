//! # Record Collector
//!
//! Records for one URL may sit in several shards, and the same record may
//! arrive more than once (local store, then again from a peer). The
//! collector keys them by id. Deletion is sticky: once any copy of an id is
//! seen deleted, no other copy of it is returned.

use shared_types::{Annotation, Comment, Timestamp};
use std::collections::{BTreeMap, HashSet};

pub trait Collectable {
    fn id(&self) -> &str;
    fn timestamp(&self) -> Timestamp;
    fn is_deleted(&self) -> bool;
}

impl Collectable for Annotation {
    fn id(&self) -> &str {
        &self.id
    }
    fn timestamp(&self) -> Timestamp {
        self.timestamp
    }
    fn is_deleted(&self) -> bool {
        self.is_deleted
    }
}

impl Collectable for Comment {
    fn id(&self) -> &str {
        &self.id
    }
    fn timestamp(&self) -> Timestamp {
        self.timestamp
    }
    fn is_deleted(&self) -> bool {
        self.is_deleted
    }
}

#[derive(Debug)]
pub struct Collector<T> {
    live: BTreeMap<String, T>,
    deleted: HashSet<String>,
}

impl<T> Default for Collector<T> {
    fn default() -> Self {
        Self {
            live: BTreeMap::new(),
            deleted: HashSet::new(),
        }
    }
}

impl<T: Collectable> Collector<T> {
    /// Keep the newest live copy of each id.
    pub fn offer(&mut self, record: T) {
        if record.is_deleted() {
            self.mark_gone(record.id().to_string());
            return;
        }
        if self.deleted.contains(record.id()) {
            return;
        }
        match self.live.get(record.id()) {
            Some(held) if held.timestamp() >= record.timestamp() => {}
            _ => {
                self.live.insert(record.id().to_string(), record);
            }
        }
    }

    /// Record an id known to be deleted or reclaimed.
    pub fn mark_gone(&mut self, id: String) {
        self.live.remove(&id);
        self.deleted.insert(id);
    }

    pub fn len(&self) -> usize {
        self.live.len()
    }

    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    /// Newest first; ids break ties.
    pub fn into_newest_first(self) -> Vec<T> {
        let mut records: Vec<T> = self.live.into_values().collect();
        records.sort_by(|a, b| {
            b.timestamp()
                .cmp(&a.timestamp())
                .then_with(|| a.id().cmp(b.id()))
        });
        records
    }
}
