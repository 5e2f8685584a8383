//! Bounded cache of processed message ids, evicted oldest first.

use parking_lot::Mutex;
use std::collections::{HashSet, VecDeque};

#[derive(Debug, Default)]
struct SeenState {
    ids: HashSet<String>,
    order: VecDeque<String>,
}

#[derive(Debug)]
pub struct SeenMessageCache {
    max_size: usize,
    state: Mutex<SeenState>,
}

impl SeenMessageCache {
    pub fn new(max_size: usize) -> Self {
        Self {
            max_size: max_size.max(1),
            state: Mutex::new(SeenState::default()),
        }
    }

    pub fn has_seen(&self, id: &str) -> bool {
        self.state.lock().ids.contains(id)
    }

    /// Mark `id` as seen. Returns true if it was new.
    pub fn mark_seen(&self, id: &str) -> bool {
        let mut state = self.state.lock();
        if state.ids.contains(id) {
            return false;
        }
        if state.order.len() >= self.max_size {
            if let Some(oldest) = state.order.pop_front() {
                state.ids.remove(&oldest);
            }
        }
        state.ids.insert(id.to_string());
        state.order.push_back(id.to_string());
        true
    }

    pub fn len(&self) -> usize {
        self.state.lock().order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.lock().order.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mark_once() {
        let cache = SeenMessageCache::new(10);
        assert!(cache.mark_seen("a"));
        assert!(!cache.mark_seen("a"));
        assert!(cache.has_seen("a"));
    }

    #[test]
    fn test_eviction_is_fifo() {
        let cache = SeenMessageCache::new(2);
        cache.mark_seen("a");
        cache.mark_seen("b");
        cache.mark_seen("c");
        assert_eq!(cache.len(), 2);
        assert!(!cache.has_seen("a"));
        assert!(cache.has_seen("c"));
    }
}
