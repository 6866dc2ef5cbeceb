use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to open store root {path}: {source}")]
    Open { path: String, source: io::Error },
    #[error("failed to read key {key}: {source}")]
    Read { key: String, source: io::Error },
    #[error("failed to write key {key}: {source}")]
    Write { key: String, source: io::Error },
    #[error("failed to remove key {key}: {source}")]
    Remove { key: String, source: io::Error },
    #[error("key {key} holds malformed JSON: {source}")]
    Decode { key: String, source: serde_json::Error },
    #[error("failed to encode value for key {key}: {source}")]
    Encode { key: String, source: serde_json::Error },
}

/// Keyed JSON store over a local directory, one document per key.
///
/// Every collection read/write deserializes or overwrites the whole keyed
/// value; there are no partial updates and no indexes. Individual operations
/// are serialized by an internal mutex, but sequences of operations (check
/// then write, cascade steps) are not atomic across calls.
#[derive(Debug)]
pub struct LocalStore {
    root: PathBuf,
    lock: Mutex<()>,
}

impl LocalStore {
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        fs::create_dir_all(&root)
            .map_err(|source| StoreError::Open { path: root.display().to_string(), source })?;
        Ok(Self { root, lock: Mutex::new(()) })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn get_raw(&self, key: &str) -> Result<Option<String>, StoreError> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        metrics::counter!("store_reads_total").increment(1);
        match fs::read_to_string(self.key_path(key)) {
            Ok(value) => Ok(Some(value)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StoreError::Read { key: key.to_string(), source }),
        }
    }

    pub fn set_raw(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        metrics::counter!("store_writes_total").increment(1);
        fs::write(self.key_path(key), value)
            .map_err(|source| StoreError::Write { key: key.to_string(), source })
    }

    /// Returns whether the key existed.
    pub fn remove_raw(&self, key: &str) -> Result<bool, StoreError> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        match fs::remove_file(self.key_path(key)) {
            Ok(()) => Ok(true),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(source) => Err(StoreError::Remove { key: key.to_string(), source }),
        }
    }

    pub fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>, StoreError> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let entries = fs::read_dir(&self.root)
            .map_err(|source| StoreError::Read { key: prefix.to_string(), source })?;

        let mut keys = Vec::new();
        for entry in entries {
            let entry =
                entry.map_err(|source| StoreError::Read { key: prefix.to_string(), source })?;
            let name = entry.file_name();
            let Some(name) = name.to_str() else { continue };
            if let Some(key) = name.strip_suffix(".json") {
                if key.starts_with(prefix) {
                    keys.push(key.to_string());
                }
            }
        }
        keys.sort();
        Ok(keys)
    }

    /// Size in bytes of the serialized value, `None` if the key is absent.
    pub fn size_of(&self, key: &str) -> Result<Option<u64>, StoreError> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        match fs::metadata(self.key_path(key)) {
            Ok(meta) => Ok(Some(meta.len())),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StoreError::Read { key: key.to_string(), source }),
        }
    }

    /// Full collection under `key`; an absent key reads as an empty collection.
    pub fn read_collection<T: DeserializeOwned>(&self, key: &str) -> Result<Vec<T>, StoreError> {
        let Some(raw) = self.get_raw(key)? else {
            return Ok(Vec::new());
        };
        serde_json::from_str(&raw).map_err(|source| StoreError::Decode { key: key.to_string(), source })
    }

    /// Serializes and overwrites the entire keyed value.
    pub fn write_collection<T: Serialize>(&self, key: &str, items: &[T]) -> Result<(), StoreError> {
        let encoded = serde_json::to_string(items)
            .map_err(|source| StoreError::Encode { key: key.to_string(), source })?;
        self.set_raw(key, &encoded)
    }

    fn key_path(&self, key: &str) -> PathBuf {
        self.root.join(format!("{key}.json"))
    }
}

#[cfg(test)]
mod tests {
    use serde::{Deserialize, Serialize};

    use super::*;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Record {
        id: String,
        name: String,
    }

    fn open_temp_store() -> (tempfile::TempDir, LocalStore) {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = LocalStore::open(dir.path()).expect("open store");
        (dir, store)
    }

    #[test]
    fn absent_collection_reads_empty() {
        let (_dir, store) = open_temp_store();
        let records: Vec<Record> = store.read_collection("missing").expect("read");
        assert!(records.is_empty());
    }

    #[test]
    fn collection_roundtrip() {
        let (_dir, store) = open_temp_store();
        let records = vec![
            Record { id: "1".into(), name: "מתמטיקה".into() },
            Record { id: "2".into(), name: "פיזיקה".into() },
        ];
        store.write_collection("subjects", &records).expect("write");
        let loaded: Vec<Record> = store.read_collection("subjects").expect("read");
        assert_eq!(loaded, records);
    }

    #[test]
    fn raw_set_get_remove() {
        let (_dir, store) = open_temp_store();
        assert_eq!(store.get_raw("session").expect("get"), None);
        store.set_raw("session", "{\"id\":\"7\"}").expect("set");
        assert_eq!(store.get_raw("session").expect("get").as_deref(), Some("{\"id\":\"7\"}"));
        assert!(store.remove_raw("session").expect("remove"));
        assert!(!store.remove_raw("session").expect("remove again"));
    }

    #[test]
    fn keys_with_prefix_filters_and_sorts() {
        let (_dir, store) = open_temp_store();
        store.set_raw("blob_file_2_x", "b").expect("set");
        store.set_raw("blob_file_1_y", "a").expect("set");
        store.set_raw("users", "[]").expect("set");

        let keys = store.keys_with_prefix("blob_").expect("keys");
        assert_eq!(keys, vec!["blob_file_1_y".to_string(), "blob_file_2_x".to_string()]);
    }

    #[test]
    fn size_of_reports_value_bytes() {
        let (_dir, store) = open_temp_store();
        store.set_raw("blob_file_1_a", "12345").expect("set");
        assert_eq!(store.size_of("blob_file_1_a").expect("size"), Some(5));
        assert_eq!(store.size_of("blob_file_9_z").expect("size"), None);
    }

    #[test]
    fn malformed_value_surfaces_decode_error() {
        let (_dir, store) = open_temp_store();
        store.set_raw("subjects", "not json").expect("set");
        let result: Result<Vec<Record>, _> = store.read_collection("subjects");
        assert!(matches!(result, Err(StoreError::Decode { .. })));
    }
}
