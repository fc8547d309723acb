//! Session persistence for embedded web shells.
//!
//! A session is the durable state behind one shell install: the cookie
//! snapshot, the URL to resume at, and the first-open flag. Everything
//! goes through a [`PreferenceStore`], so hosts can keep it in memory,
//! in a JSON file, or wherever the platform wants it.

pub mod cookies;
pub mod launch;
pub mod store;

use std::sync::Arc;

use tracing::debug;
use wavelet_core::WaveletResult;

use crate::store::keys;

pub use cookies::{CookieJar, CookieRecord};
pub use launch::{build_launch_plan, LaunchPlan};
pub use store::{JsonFileStore, MemoryStore, PreferenceStore};

/// Durable state for one shell install
pub struct Session {
    store: Arc<dyn PreferenceStore>,
}

impl Session {
    pub fn new(store: Arc<dyn PreferenceStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn PreferenceStore> {
        &self.store
    }

    /// Cookie snapshot; absent or unreadable restores as empty
    pub fn cookie_jar(&self) -> CookieJar {
        CookieJar::load(self.store.as_ref())
    }

    pub fn save_cookie_jar(&self, jar: &CookieJar) -> WaveletResult<()> {
        jar.save(self.store.as_ref())
    }

    /// URL a future launch should resume at, if one was persisted
    pub fn last_visited(&self) -> Option<String> {
        self.store.get(keys::LAST_VISITED)
    }

    pub fn set_last_visited(&self, url: &str) -> WaveletResult<()> {
        debug!(url, "Persisting resume URL");
        self.store.set(keys::LAST_VISITED, url)
    }

    /// True until the first complete launch is recorded
    pub fn is_first_open(&self) -> bool {
        match self.store.get(keys::FIRST_OPEN) {
            Some(value) => value != "false",
            None => true,
        }
    }

    /// Record that the first launch completed
    pub fn mark_opened(&self) -> WaveletResult<()> {
        self.store.set(keys::FIRST_OPEN, "false")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> Session {
        Session::new(Arc::new(MemoryStore::new()))
    }

    #[test]
    fn test_fresh_session_is_first_open() {
        let session = session();
        assert!(session.is_first_open());
        session.mark_opened().unwrap();
        assert!(!session.is_first_open());
    }

    #[test]
    fn test_last_visited_round_trip() {
        let session = session();
        assert_eq!(session.last_visited(), None);
        session
            .set_last_visited("https://example.com/lobby")
            .unwrap();
        assert_eq!(
            session.last_visited().as_deref(),
            Some("https://example.com/lobby")
        );
    }

    #[test]
    fn test_cookie_jar_round_trip_through_store() {
        let session = session();
        let mut jar = CookieJar::new();
        jar.upsert(CookieRecord {
            name: "sid".to_string(),
            value: "abc123".to_string(),
            domain: "example.com".to_string(),
            path: "/".to_string(),
            secure: true,
            http_only: true,
            expires: Some(1_900_000_000),
        });
        session.save_cookie_jar(&jar).unwrap();

        let restored = session.cookie_jar();
        assert_eq!(restored, jar);
    }

    #[test]
    fn test_missing_cookie_blob_restores_empty() {
        let session = session();
        assert!(session.cookie_jar().is_empty());
    }
}
