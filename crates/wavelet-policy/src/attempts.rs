//! Deep-link attempt deduplication.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use tracing::trace;
use wavelet_core::clock::SharedClock;

/// Remembers recent external dispatch attempts keyed by exact URL string.
///
/// Embedded pages commonly fire the same deep link several times in quick
/// succession (redirect chains, retry timers); only the first attempt
/// inside the debounce window reaches the platform. Entries past the
/// retention age are pruned on every record, so the map stays bounded by
/// recent activity without a background task.
pub struct DeepLinkAttemptStore {
    debounce: Duration,
    retention: Duration,
    attempts: HashMap<String, Instant>,
    clock: SharedClock,
}

impl DeepLinkAttemptStore {
    pub fn new(debounce: Duration, retention: Duration, clock: SharedClock) -> Self {
        Self {
            debounce,
            retention,
            attempts: HashMap::new(),
            clock,
        }
    }

    /// True when the same URL was recorded strictly inside the debounce
    /// window. An attempt exactly at the boundary is not a duplicate.
    pub fn is_duplicate(&self, url: &str) -> bool {
        match self.attempts.get(url) {
            Some(at) => self.clock.now().duration_since(*at) < self.debounce,
            None => false,
        }
    }

    /// Record an attempt for the URL at the current time, then prune
    /// entries past retention.
    pub fn record(&mut self, url: &str) {
        let now = self.clock.now();
        self.attempts.insert(url.to_string(), now);
        self.prune(now);
    }

    fn prune(&mut self, now: Instant) {
        let retention = self.retention;
        let before = self.attempts.len();
        self.attempts
            .retain(|_, at| now.duration_since(*at) <= retention);
        let removed = before - self.attempts.len();
        if removed > 0 {
            trace!(
                removed,
                remaining = self.attempts.len(),
                "Pruned stale deep-link attempts"
            );
        }
    }

    pub fn len(&self) -> usize {
        self.attempts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attempts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use wavelet_core::clock::ManualClock;

    fn store() -> (DeepLinkAttemptStore, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new());
        let store = DeepLinkAttemptStore::new(
            Duration::from_secs(2),
            Duration::from_secs(10),
            clock.clone(),
        );
        (store, clock)
    }

    #[test]
    fn test_unseen_url_is_not_duplicate() {
        let (store, _clock) = store();
        assert!(!store.is_duplicate("tg://resolve?domain=x"));
    }

    #[test]
    fn test_repeat_within_window_is_duplicate() {
        let (mut store, clock) = store();
        store.record("tg://resolve?domain=x");
        clock.advance(Duration::from_millis(1500));
        assert!(store.is_duplicate("tg://resolve?domain=x"));
    }

    #[test]
    fn test_boundary_is_not_duplicate() {
        let (mut store, clock) = store();
        store.record("tg://resolve?domain=x");
        clock.advance(Duration::from_secs(2));
        assert!(!store.is_duplicate("tg://resolve?domain=x"));
    }

    #[test]
    fn test_different_urls_same_scheme_are_independent() {
        let (mut store, clock) = store();
        store.record("tg://resolve?domain=x");
        clock.advance(Duration::from_millis(100));
        assert!(!store.is_duplicate("tg://resolve?domain=y"));
    }

    #[test]
    fn test_record_refreshes_timestamp() {
        let (mut store, clock) = store();
        store.record("viber://pay");
        clock.advance(Duration::from_secs(2));
        store.record("viber://pay");
        clock.advance(Duration::from_millis(1900));
        assert!(store.is_duplicate("viber://pay"));
    }

    #[test]
    fn test_record_prunes_stale_entries() {
        let (mut store, clock) = store();
        for i in 0..100 {
            store.record(&format!("app{}://open", i));
        }
        assert_eq!(store.len(), 100);

        clock.advance(Duration::from_secs(11));
        store.record("fresh://open");
        assert_eq!(store.len(), 1);
        assert!(store.is_duplicate("fresh://open"));
    }

    #[test]
    fn test_entries_at_retention_boundary_survive() {
        let (mut store, clock) = store();
        store.record("tg://a");
        clock.advance(Duration::from_secs(10));
        store.record("tg://b");
        assert_eq!(store.len(), 2);
    }
}
