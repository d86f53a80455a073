// Key-value storage backends for the session
// Decision: Mirror browser storage semantics (string keys, string values, no expiry)
// Decision: Use parking_lot for the in-memory backend

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use parking_lot::{Mutex, RwLock};
use serde_json::{Map, Value};

use crate::error::StorageError;

/// Persistent string key-value storage.
///
/// No atomicity is provided across keys: writing two keys is two operations.
pub trait KeyValueStorage: Send + Sync {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;

    fn remove_item(&self, key: &str) -> Result<(), StorageError>;
}

/// In-memory storage. All data is lost when dropped.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    items: RwLock<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys
    pub fn len(&self) -> usize {
        self.items.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.read().is_empty()
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.items.read().get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.items.write().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        self.items.write().remove(key);
        Ok(())
    }
}

/// Storage persisted as one JSON object in a file.
///
/// Every mutation rewrites the whole file through a temporary sibling and a
/// rename. Concurrent processes are not coordinated; the last writer wins.
///
/// Entries written by hand may hold any JSON value. A non-string value is
/// read back as its JSON text and left untouched until that key is written.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    // serializes read-modify-write within this process
    write_lock: Mutex<()>,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> StorageError {
        StorageError::Io {
            path: self.path.display().to_string(),
            source,
        }
    }

    fn load(&self) -> Result<Map<String, Value>, StorageError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Map::new()),
            Err(e) => return Err(self.io_error(e)),
        };
        if contents.trim().is_empty() {
            return Ok(Map::new());
        }
        serde_json::from_str(&contents).map_err(|source| StorageError::Corrupt {
            path: self.path.display().to_string(),
            source,
        })
    }

    fn save(&self, items: &Map<String, Value>) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }
        let contents =
            serde_json::to_string_pretty(items).map_err(|source| StorageError::Serialize {
                key: self.path.display().to_string(),
                source,
            })?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, contents).map_err(|e| self.io_error(e))?;
        fs::rename(&tmp, &self.path).map_err(|e| self.io_error(e))?;
        tracing::trace!(path = %self.path.display(), keys = items.len(), "session file written");
        Ok(())
    }
}

impl KeyValueStorage for FileStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(match self.load()?.remove(key) {
            None | Some(Value::Null) => None,
            Some(Value::String(value)) => Some(value),
            Some(other) => Some(other.to_string()),
        })
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let _guard = self.write_lock.lock();
        let mut items = self.load()?;
        items.insert(key.to_string(), Value::String(value.to_string()));
        self.save(&items)
    }

    /// A file that is not a JSON object cannot hold anything worth keeping;
    /// removing from it starts over with an empty object.
    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        let _guard = self.write_lock.lock();
        let mut items = match self.load() {
            Ok(items) => items,
            Err(err @ StorageError::Corrupt { .. }) => {
                tracing::warn!(error = %err, "resetting unreadable session file");
                return self.save(&Map::new());
            }
            Err(err) => return Err(err),
        };
        if items.remove(key).is_some() {
            self.save(&items)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_storage_roundtrip() {
        let storage = MemoryStorage::new();
        assert_eq!(storage.get_item("token").unwrap(), None);

        storage.set_item("token", "abc").unwrap();
        storage.set_item("token", "def").unwrap();
        assert_eq!(storage.get_item("token").unwrap().as_deref(), Some("def"));
        assert_eq!(storage.len(), 1);

        storage.remove_item("token").unwrap();
        storage.remove_item("token").unwrap();
        assert!(storage.is_empty());
    }

    #[test]
    fn test_file_storage_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path().join("nested").join("session.json"));
        assert_eq!(storage.get_item("user").unwrap(), None);
        // removing from a missing file does not create it
        storage.remove_item("user").unwrap();
        assert!(!storage.path().exists());
    }

    #[test]
    fn test_file_storage_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path().join("nested").join("session.json"));
        storage.set_item("token", "abc").unwrap();
        assert!(storage.path().exists());
        assert_eq!(storage.get_item("token").unwrap().as_deref(), Some("abc"));
    }

    #[test]
    fn test_file_storage_rejects_non_object_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, "[1, 2, 3]").unwrap();
        let storage = FileStorage::new(&path);
        assert!(matches!(
            storage.get_item("token"),
            Err(StorageError::Corrupt { .. })
        ));
        assert!(matches!(
            storage.set_item("token", "abc"),
            Err(StorageError::Corrupt { .. })
        ));

        // removal recovers the file
        storage.remove_item("token").unwrap();
        assert_eq!(storage.get_item("token").unwrap(), None);
        storage.set_item("token", "abc").unwrap();
        assert_eq!(storage.get_item("token").unwrap().as_deref(), Some("abc"));
    }

    #[test]
    fn test_file_storage_reads_non_string_values_as_json_text() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(
            &path,
            r#"{"token": 42, "user": {"name": "Ada"}, "rememberedEmail": null}"#,
        )
        .unwrap();
        let storage = FileStorage::new(&path);

        assert_eq!(storage.get_item("token").unwrap().as_deref(), Some("42"));
        assert_eq!(
            storage.get_item("user").unwrap().as_deref(),
            Some(r#"{"name":"Ada"}"#)
        );
        assert_eq!(storage.get_item("rememberedEmail").unwrap(), None);

        // untouched keys keep their original JSON type
        storage.remove_item("token").unwrap();
        let raw: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw["user"], serde_json::json!({ "name": "Ada" }));
        assert!(raw.get("token").is_none());
    }
}
