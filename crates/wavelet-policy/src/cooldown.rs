//! Keyed cooldown tracking.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use wavelet_core::clock::SharedClock;

/// Enforces a minimum interval between permitted occurrences of each key.
///
/// Only permits are recorded; a denied check leaves no trace, so asking
/// repeatedly cannot push the next permit further out.
pub struct CooldownTracker {
    interval: Duration,
    last_permit: HashMap<String, Instant>,
    clock: SharedClock,
}

impl CooldownTracker {
    pub fn new(interval: Duration, clock: SharedClock) -> Self {
        Self {
            interval,
            last_permit: HashMap::new(),
            clock,
        }
    }

    /// Permit the key if its cooldown has elapsed, recording the permit.
    pub fn allow(&mut self, key: &str) -> bool {
        let now = self.clock.now();
        if let Some(last) = self.last_permit.get(key) {
            if now.duration_since(*last) < self.interval {
                return false;
            }
        }
        self.last_permit.insert(key.to_string(), now);
        true
    }

    /// Number of keys with a recorded permit
    pub fn tracked_keys(&self) -> usize {
        self.last_permit.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use wavelet_core::clock::ManualClock;

    fn tracker(interval_secs: u64) -> (CooldownTracker, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new());
        let tracker = CooldownTracker::new(Duration::from_secs(interval_secs), clock.clone());
        (tracker, clock)
    }

    #[test]
    fn test_first_occurrence_allowed() {
        let (mut tracker, _clock) = tracker(5);
        assert!(tracker.allow("tg"));
    }

    #[test]
    fn test_repeat_within_interval_denied() {
        let (mut tracker, clock) = tracker(5);
        assert!(tracker.allow("tg"));
        clock.advance(Duration::from_secs(3));
        assert!(!tracker.allow("tg"));
    }

    #[test]
    fn test_repeat_after_interval_allowed() {
        let (mut tracker, clock) = tracker(5);
        assert!(tracker.allow("tg"));
        clock.advance(Duration::from_secs(5));
        assert!(tracker.allow("tg"));
    }

    #[test]
    fn test_keys_are_independent() {
        let (mut tracker, clock) = tracker(5);
        assert!(tracker.allow("tg"));
        clock.advance(Duration::from_secs(1));
        assert!(tracker.allow("viber"));
        assert_eq!(tracker.tracked_keys(), 2);
    }

    #[test]
    fn test_denied_check_leaves_no_trace() {
        let (mut tracker, clock) = tracker(5);
        assert!(tracker.allow("tg"));
        clock.advance(Duration::from_secs(4));
        assert!(!tracker.allow("tg"));
        // One more second reaches the interval measured from the permit,
        // not from the denied check.
        clock.advance(Duration::from_secs(1));
        assert!(tracker.allow("tg"));
    }
}
