//! # Per-Author Rate Limiting
//!
//! Sliding window over the timestamps of each author's accepted actions.
//! Checking and recording are separate steps so a put that later fails
//! signature verification does not use up the named author's budget.

use parking_lot::Mutex;
use shared_types::Timestamp;
use std::collections::{HashMap, VecDeque};

/// Result of a rate limit check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitResult {
    /// Action allowed
    Allowed,
    /// Action rate limited
    Limited {
        /// Milliseconds until the oldest counted action leaves the window
        retry_after_ms: u64,
    },
}

impl RateLimitResult {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed)
    }
}

/// Sliding-window limiter keyed by author DID.
#[derive(Debug)]
pub struct AuthorRateLimiter {
    max_actions: u32,
    window_ms: u64,
    actions: Mutex<HashMap<String, VecDeque<Timestamp>>>,
}

impl AuthorRateLimiter {
    pub fn new(max_actions: u32, window_ms: u64) -> Self {
        Self {
            max_actions,
            window_ms,
            actions: Mutex::new(HashMap::new()),
        }
    }

    fn evict(window: &mut VecDeque<Timestamp>, now: Timestamp, window_ms: u64) {
        while window
            .front()
            .is_some_and(|&at| now.saturating_sub(at) >= window_ms)
        {
            window.pop_front();
        }
    }

    /// Would one more action by `did` at `now` stay within the limit?
    pub fn check(&self, did: &str, now: Timestamp) -> RateLimitResult {
        let mut actions = self.actions.lock();
        let Some(window) = actions.get_mut(did) else {
            return if self.max_actions == 0 {
                RateLimitResult::Limited {
                    retry_after_ms: self.window_ms,
                }
            } else {
                RateLimitResult::Allowed
            };
        };
        Self::evict(window, now, self.window_ms);

        if window.len() < self.max_actions as usize {
            return RateLimitResult::Allowed;
        }
        let oldest = window.front().copied().unwrap_or(now);
        RateLimitResult::Limited {
            retry_after_ms: (oldest + self.window_ms).saturating_sub(now),
        }
    }

    /// Count an accepted action.
    pub fn record(&self, did: &str, now: Timestamp) {
        let mut actions = self.actions.lock();
        let window = actions.entry(did.to_string()).or_default();
        Self::evict(window, now, self.window_ms);
        window.push_back(now);
    }

    /// Actions by `did` currently inside the window.
    pub fn count(&self, did: &str, now: Timestamp) -> usize {
        let mut actions = self.actions.lock();
        actions.get_mut(did).map_or(0, |window| {
            Self::evict(window, now, self.window_ms);
            window.len()
        })
    }

    /// Forget authors with nothing left in the window.
    pub fn purge_idle(&self, now: Timestamp) -> usize {
        let mut actions = self.actions.lock();
        let before = actions.len();
        actions.retain(|_, window| {
            Self::evict(window, now, self.window_ms);
            !window.is_empty()
        });
        before - actions.len()
    }

    pub fn tracked_authors(&self) -> usize {
        self.actions.lock().len()
    }
}
