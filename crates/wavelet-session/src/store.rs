//! Session preference storage.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::warn;
use wavelet_core::WaveletResult;

/// Well-known preference keys
pub mod keys {
    /// Serialized cookie snapshot
    pub const COOKIES: &str = "cookies";
    /// Last successfully visited URL
    pub const LAST_VISITED: &str = "last_visited";
    /// Cleared once the first complete launch is recorded
    pub const FIRST_OPEN: &str = "first_open";
}

/// Flat string key/value store behind the session state.
///
/// Implementations must tolerate readers on any thread; the shell only
/// writes from its owner thread.
pub trait PreferenceStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> WaveletResult<()>;
    fn remove(&self, key: &str) -> WaveletResult<()>;
}

/// In-memory store for tests and ephemeral sessions
#[derive(Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PreferenceStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.lock().unwrap().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> WaveletResult<()> {
        self.values
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> WaveletResult<()> {
        self.values.lock().unwrap().remove(key);
        Ok(())
    }
}

/// Store persisted as one JSON file.
///
/// The whole map writes back on every mutation; a missing or corrupt
/// file reads as empty instead of failing the session.
pub struct JsonFileStore {
    path: PathBuf,
    values: Mutex<HashMap<String, String>>,
}

impl JsonFileStore {
    /// Open the store at `path`. Parent directories are created on the
    /// first save.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let values = match std::fs::read_to_string(&path) {
            Ok(contents) => serde_json::from_str(&contents).unwrap_or_else(|err| {
                warn!(path = %path.display(), %err, "Corrupt preference file, starting empty");
                HashMap::new()
            }),
            Err(_) => HashMap::new(),
        };
        Self {
            path,
            values: Mutex::new(values),
        }
    }

    /// Default location under the platform data directory
    pub fn default_path() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("wavelet")
            .join("session.json")
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, values: &HashMap<String, String>) -> WaveletResult<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_string_pretty(values)?;
        std::fs::write(&self.path, data)?;
        Ok(())
    }
}

impl PreferenceStore for JsonFileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.lock().unwrap().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> WaveletResult<()> {
        let mut values = self.values.lock().unwrap();
        values.insert(key.to_string(), value.to_string());
        self.persist(&values)
    }

    fn remove(&self, key: &str) -> WaveletResult<()> {
        let mut values = self.values.lock().unwrap();
        values.remove(key);
        self.persist(&values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_round_trip() {
        let store = MemoryStore::new();
        assert_eq!(store.get("k"), None);
        store.set("k", "v").unwrap();
        assert_eq!(store.get("k").as_deref(), Some("v"));
        store.remove("k").unwrap();
        assert_eq!(store.get("k"), None);
    }

    #[test]
    fn test_file_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");

        let store = JsonFileStore::open(&path);
        store.set(keys::LAST_VISITED, "https://example.com").unwrap();
        store.set(keys::FIRST_OPEN, "false").unwrap();
        drop(store);

        let store = JsonFileStore::open(&path);
        assert_eq!(
            store.get(keys::LAST_VISITED).as_deref(),
            Some("https://example.com")
        );
        assert_eq!(store.get(keys::FIRST_OPEN).as_deref(), Some("false"));
    }

    #[test]
    fn test_file_store_missing_file_reads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::open(dir.path().join("absent.json"));
        assert_eq!(store.get("anything"), None);
    }

    #[test]
    fn test_file_store_corrupt_file_reads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, "{not json").unwrap();

        let store = JsonFileStore::open(&path);
        assert_eq!(store.get("anything"), None);

        // A save replaces the corrupt file with a readable one
        store.set("k", "v").unwrap();
        let store = JsonFileStore::open(&path);
        assert_eq!(store.get("k").as_deref(), Some("v"));
    }

    #[test]
    fn test_file_store_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("deep").join("session.json");
        let store = JsonFileStore::open(&path);
        store.set("k", "v").unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_remove_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");

        let store = JsonFileStore::open(&path);
        store.set("k", "v").unwrap();
        store.remove("k").unwrap();
        drop(store);

        let store = JsonFileStore::open(&path);
        assert_eq!(store.get("k"), None);
    }
}
