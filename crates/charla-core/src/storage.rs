//! Key-value persistence port
//!
//! History survives restarts through a small string key-value
//! interface, so the message store can run against real files in the
//! app and against a hash map in tests.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Key holding the serialized message history.
pub const HISTORY_KEY: &str = "chat_history";

/// Key reserved for a stored display name. Nothing writes or reads it
/// anymore; it is still removed together with the history on clear.
pub const NAME_KEY: &str = "user_name";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    #[error("storage io error: {0}")]
    Io(#[from] io::Error),
}

/// Whole-value key-value store. Reads and writes replace the full
/// value for a key; there are no partial updates.
pub trait Storage: Send {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;
}

/// File-backed storage: one `<key>.json` file per key under a root
/// directory.
pub struct FileStorage {
    root: PathBuf,
}

impl FileStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Opens storage under the platform data directory.
    pub fn open_default() -> Result<Self, StorageError> {
        let data_dir = dirs::data_dir()
            .ok_or_else(|| StorageError::Unavailable("no data directory".to_string()))?;
        Ok(Self::new(data_dir.join("charla")))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn key_path(&self, key: &str) -> PathBuf {
        self.root.join(format!("{key}.json"))
    }
}

impl Storage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(self.key_path(key)) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        fs::create_dir_all(&self.root)?;
        fs::write(self.key_path(key), value)?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        match fs::remove_file(self.key_path(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-memory storage. Used as the fallback when no data directory
/// exists and as the test double for the store.
#[derive(Default)]
pub struct MemoryStorage {
    values: HashMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.values.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_storage_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let mut storage = FileStorage::new(dir.path().join("charla"));

        assert!(storage.get(HISTORY_KEY).unwrap().is_none());

        storage.set(HISTORY_KEY, "[1,2,3]").unwrap();
        assert_eq!(storage.get(HISTORY_KEY).unwrap().unwrap(), "[1,2,3]");

        storage.remove(HISTORY_KEY).unwrap();
        assert!(storage.get(HISTORY_KEY).unwrap().is_none());
    }

    #[test]
    fn file_storage_remove_of_absent_key_is_a_noop() {
        let dir = tempfile::tempdir().unwrap();
        let mut storage = FileStorage::new(dir.path());
        storage.remove("never_written").unwrap();
    }

    #[test]
    fn file_storage_overwrites_whole_value() {
        let dir = tempfile::tempdir().unwrap();
        let mut storage = FileStorage::new(dir.path());
        storage.set("k", "first").unwrap();
        storage.set("k", "second").unwrap();
        assert_eq!(storage.get("k").unwrap().unwrap(), "second");
    }

    #[test]
    fn memory_storage_round_trip() {
        let mut storage = MemoryStorage::new();
        storage.set(NAME_KEY, "ada").unwrap();
        assert_eq!(storage.get(NAME_KEY).unwrap().unwrap(), "ada");
        storage.remove(NAME_KEY).unwrap();
        assert!(storage.get(NAME_KEY).unwrap().is_none());
    }
}
