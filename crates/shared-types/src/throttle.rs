//! # Sweep Throttle
//!
//! Periodic sweeps (peer pruning, tombstone GC) may be triggered from a timer
//! and from an API call at the same moment. A sweep only runs when no other
//! sweep holds the permit and the minimum interval since the last start has
//! passed; overlapping attempts return `None` instead of redoing the work.

use crate::time::Timestamp;
use parking_lot::Mutex;

#[derive(Debug, Default)]
struct ThrottleState {
    running: bool,
    last_started: Option<Timestamp>,
}

/// Guards a sweep against overlap and over-frequent runs.
#[derive(Debug)]
pub struct SweepThrottle {
    min_interval_ms: u64,
    state: Mutex<ThrottleState>,
}

impl SweepThrottle {
    pub fn new(min_interval_ms: u64) -> Self {
        Self {
            min_interval_ms,
            state: Mutex::new(ThrottleState::default()),
        }
    }

    /// Claim the sweep. The permit releases it on drop.
    pub fn try_begin(&self, now: Timestamp) -> Option<SweepPermit<'_>> {
        let mut state = self.state.lock();
        if state.running {
            return None;
        }
        if let Some(last) = state.last_started {
            if now.saturating_sub(last) < self.min_interval_ms {
                return None;
            }
        }
        state.running = true;
        state.last_started = Some(now);
        Some(SweepPermit { throttle: self })
    }

    /// Start time of the most recent sweep.
    pub fn last_started(&self) -> Option<Timestamp> {
        self.state.lock().last_started
    }
}

/// Held for the duration of one sweep.
#[derive(Debug)]
pub struct SweepPermit<'a> {
    throttle: &'a SweepThrottle,
}

impl Drop for SweepPermit<'_> {
    fn drop(&mut self) {
        self.throttle.state.lock().running = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlapping_sweep_is_refused() {
        let throttle = SweepThrottle::new(0);
        let permit = throttle.try_begin(100);
        assert!(permit.is_some());
        assert!(throttle.try_begin(100).is_none());
        drop(permit);
        assert!(throttle.try_begin(101).is_some());
    }

    #[test]
    fn test_min_interval_enforced() {
        let throttle = SweepThrottle::new(1_000);
        drop(throttle.try_begin(0));
        assert!(throttle.try_begin(500).is_none());
        assert!(throttle.try_begin(1_000).is_some());
        assert_eq!(throttle.last_started(), Some(1_000));
    }
}
