//! Key-value storage adapters.
//!
//! `FileStorageProvider` keeps tokens and the cached user in a JSON object on
//! disk, e.g. `~/.config/teammate/storage.json` on Linux.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use crate::ports::outbound::StorageProvider;

type Entries = HashMap<String, String>;

/// JSON-file storage with an in-memory copy.
///
/// Every change rewrites the whole file; the map only ever holds a handful of keys.
#[derive(Clone)]
pub struct FileStorageProvider {
    path: PathBuf,
    entries: Arc<RwLock<Entries>>,
}

impl FileStorageProvider {
    /// Open the storage file at `path`. A missing or unreadable file starts out empty.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = read_entries(&path);
        tracing::debug!(path = %path.display(), keys = entries.len(), "Opened storage");
        Self {
            path,
            entries: Arc::new(RwLock::new(entries)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Apply `change` and write the file if it reports a modification.
    fn update(&self, change: impl FnOnce(&mut Entries) -> bool) {
        let snapshot = match self.entries.write() {
            Ok(mut entries) => change(&mut *entries).then(|| entries.clone()),
            Err(e) => {
                tracing::error!("Storage lock poisoned: {}", e);
                None
            }
        };
        if let Some(snapshot) = snapshot {
            write_entries(&self.path, &snapshot);
        }
    }
}

fn read_entries(path: &Path) -> Entries {
    let data = match fs::read_to_string(path) {
        Ok(data) => data,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Entries::new(),
        Err(e) => {
            tracing::warn!(path = %path.display(), "Failed to read storage file: {}", e);
            return Entries::new();
        }
    };
    serde_json::from_str(&data).unwrap_or_else(|e| {
        tracing::warn!(path = %path.display(), "Ignoring corrupt storage file: {}", e);
        Entries::new()
    })
}

fn write_entries(path: &Path, entries: &Entries) {
    if let Some(dir) = path.parent() {
        if let Err(e) = fs::create_dir_all(dir) {
            tracing::error!(dir = %dir.display(), "Failed to create storage directory: {}", e);
            return;
        }
    }
    let result = serde_json::to_string_pretty(entries)
        .map_err(|e| e.to_string())
        .and_then(|json| fs::write(path, json).map_err(|e| e.to_string()));
    if let Err(e) = result {
        tracing::error!(path = %path.display(), "Failed to write storage file: {}", e);
    }
}

impl StorageProvider for FileStorageProvider {
    fn save(&self, key: &str, value: &str) {
        self.update(|entries| {
            entries.insert(key.to_string(), value.to_string());
            true
        });
    }

    fn load(&self, key: &str) -> Option<String> {
        match self.entries.read() {
            Ok(entries) => entries.get(key).cloned(),
            Err(e) => {
                tracing::error!("Storage lock poisoned: {}", e);
                None
            }
        }
    }

    fn remove(&self, key: &str) {
        self.update(|entries| entries.remove(key).is_some());
    }
}

/// Process-local storage; nothing survives a restart.
#[derive(Clone, Default)]
pub struct MemoryStorageProvider {
    values: Arc<RwLock<HashMap<String, String>>>,
}

impl MemoryStorageProvider {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StorageProvider for MemoryStorageProvider {
    fn save(&self, key: &str, value: &str) {
        if let Ok(mut guard) = self.values.write() {
            guard.insert(key.to_string(), value.to_string());
        }
    }

    fn load(&self, key: &str) -> Option<String> {
        self.values
            .read()
            .ok()
            .and_then(|guard| guard.get(key).cloned())
    }

    fn remove(&self, key: &str) {
        if let Ok(mut guard) = self.values.write() {
            guard.remove(key);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::outbound::storage_keys;

    #[test]
    fn file_storage_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("storage.json");

        let storage = FileStorageProvider::open(&path);
        storage.save(storage_keys::ACCESS_TOKEN, "abc");
        storage.save(storage_keys::REFRESH_TOKEN, "def");
        storage.remove(storage_keys::REFRESH_TOKEN);

        let reopened = FileStorageProvider::open(&path);
        assert_eq!(
            reopened.load(storage_keys::ACCESS_TOKEN).as_deref(),
            Some("abc")
        );
        assert_eq!(reopened.load(storage_keys::REFRESH_TOKEN), None);
    }

    #[test]
    fn corrupt_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");
        fs::write(&path, "not json").unwrap();

        let storage = FileStorageProvider::open(&path);
        assert_eq!(storage.load(storage_keys::USER), None);

        storage.save(storage_keys::USER, "{}");
        assert_eq!(
            FileStorageProvider::open(&path)
                .load(storage_keys::USER)
                .as_deref(),
            Some("{}")
        );
    }

    #[test]
    fn memory_storage_round_trips_and_removes() {
        let storage = MemoryStorageProvider::new();
        storage.save("k", "v");
        assert_eq!(storage.load("k").as_deref(), Some("v"));
        storage.remove("k");
        assert_eq!(storage.load("k"), None);
    }
}
