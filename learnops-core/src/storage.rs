//! Persistent key-value store
//!
//! Holds small values across runs: the access token, the current session
//! bundle, the diagnostics token. Strings are stored verbatim, anything else
//! as JSON text. Reads try JSON first and fall back to the raw string, so a
//! plain token and a structured bundle share one storage path.
//!
//! Storage is best-effort caching: every backend failure is logged and
//! swallowed, never returned to the caller.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

/// Well-known storage keys
pub mod keys {
    /// Raw bearer token for the backend
    pub const ACCESS_TOKEN: &str = "access_token";
    /// JSON session bundle written by the launch flow, read by the room view
    pub const CURRENT_SESSION: &str = "current_session";
    /// Token issued during a diagnostics run, removed when the run ends
    pub const TEST_TOKEN: &str = "test_token";
}

#[derive(Debug)]
enum Backend {
    Memory,
    File(PathBuf),
}

/// Key-value store with an in-memory or file-backed persistence layer
#[derive(Debug)]
pub struct Storage {
    backend: Backend,
    entries: Mutex<BTreeMap<String, String>>,
}

impl Storage {
    /// Ephemeral store, nothing survives the process
    pub fn in_memory() -> Self {
        Self {
            backend: Backend::Memory,
            entries: Mutex::new(BTreeMap::new()),
        }
    }

    /// Store persisted as a flat JSON object in `path`
    ///
    /// A missing file starts empty. An unreadable or corrupt file is logged
    /// and also starts empty; it is overwritten on the next write.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = load_file(&path);

        Self {
            backend: Backend::File(path),
            entries: Mutex::new(entries),
        }
    }

    /// Store a value: strings verbatim, everything else as JSON text
    pub fn set<V: Serialize + ?Sized>(&self, key: &str, value: &V) {
        let text = match serde_json::to_value(value) {
            Ok(Value::String(s)) => s,
            Ok(other) => other.to_string(),
            Err(e) => {
                tracing::error!("Failed to serialize value for {}: {}", key, e);
                return;
            }
        };

        let mut entries = self.lock();
        entries.insert(key.to_string(), text);
        self.persist(&entries);
    }

    /// Read a value, decoding JSON and falling back to the raw string
    pub fn get(&self, key: &str) -> Option<Value> {
        let raw = self.get_raw(key)?;
        Some(serde_json::from_str(&raw).unwrap_or(Value::String(raw)))
    }

    /// Read and deserialize a value; `None` if absent or of the wrong shape
    pub fn get_as<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let value = self.get(key)?;
        match serde_json::from_value(value) {
            Ok(v) => Some(v),
            Err(e) => {
                tracing::warn!("Stored value for {} has unexpected shape: {}", key, e);
                None
            }
        }
    }

    /// Read the stored text without any decoding
    pub fn get_raw(&self, key: &str) -> Option<String> {
        self.lock().get(key).filter(|v| !v.is_empty()).cloned()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get_raw(key).is_some()
    }

    pub fn remove(&self, key: &str) {
        let mut entries = self.lock();
        if entries.remove(key).is_some() {
            self.persist(&entries);
        }
    }

    pub fn clear(&self) {
        let mut entries = self.lock();
        entries.clear();
        self.persist(&entries);
    }

    // Private helpers

    fn lock(&self) -> MutexGuard<'_, BTreeMap<String, String>> {
        // A panic while holding the lock cannot leave the map half-written
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn persist(&self, entries: &BTreeMap<String, String>) {
        let Backend::File(path) = &self.backend else {
            return;
        };

        if let Err(e) = write_file(path, entries) {
            tracing::error!("Failed to save storage to {}: {}", path.display(), e);
        }
    }
}

fn load_file(path: &Path) -> BTreeMap<String, String> {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return BTreeMap::new(),
        Err(e) => {
            tracing::error!("Failed to read storage {}: {}", path.display(), e);
            return BTreeMap::new();
        }
    };

    serde_json::from_str(&content).unwrap_or_else(|e| {
        tracing::error!("Corrupt storage file {}: {}", path.display(), e);
        BTreeMap::new()
    })
}

fn write_file(path: &Path, entries: &BTreeMap<String, String>) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let content = serde_json::to_string_pretty(entries)?;
    std::fs::write(path, content)
}
