//! Cookie snapshot persistence.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::{Deserialize, Serialize};
use tracing::warn;

use wavelet_core::WaveletResult;

use crate::store::{keys, PreferenceStore};

/// One cookie as restored into the content surface
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CookieRecord {
    pub name: String,
    pub value: String,
    pub domain: String,
    pub path: String,
    pub secure: bool,
    pub http_only: bool,
    /// Unix seconds; `None` for a session cookie
    pub expires: Option<u64>,
}

/// Snapshot of the content surface's cookies.
///
/// Serializes to an opaque base64 blob so the preference store only ever
/// holds a flat string. A blob that fails to decode restores as an empty
/// jar.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CookieJar {
    records: Vec<CookieRecord>,
}

impl CookieJar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace by (name, domain, path) identity.
    pub fn upsert(&mut self, record: CookieRecord) {
        if let Some(existing) = self.records.iter_mut().find(|r| {
            r.name == record.name && r.domain == record.domain && r.path == record.path
        }) {
            *existing = record;
        } else {
            self.records.push(record);
        }
    }

    pub fn records(&self) -> &[CookieRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Encode to the opaque blob format kept in preferences.
    pub fn to_blob(&self) -> WaveletResult<String> {
        let json = serde_json::to_vec(&self.records)?;
        Ok(BASE64.encode(json))
    }

    /// Decode a stored blob; anything unreadable restores as empty.
    pub fn from_blob(blob: &str) -> Self {
        let bytes = match BASE64.decode(blob) {
            Ok(bytes) => bytes,
            Err(err) => {
                warn!(%err, "Cookie blob is not valid base64, restoring empty");
                return Self::default();
            }
        };
        match serde_json::from_slice(&bytes) {
            Ok(records) => Self { records },
            Err(err) => {
                warn!(%err, "Cookie blob failed to parse, restoring empty");
                Self::default()
            }
        }
    }

    /// Persist into the preference store.
    pub fn save(&self, store: &dyn PreferenceStore) -> WaveletResult<()> {
        store.set(keys::COOKIES, &self.to_blob()?)
    }

    /// Restore from the preference store; absent means empty.
    pub fn load(store: &dyn PreferenceStore) -> Self {
        match store.get(keys::COOKIES) {
            Some(blob) => Self::from_blob(&blob),
            None => Self::default(),
        }
    }
}
