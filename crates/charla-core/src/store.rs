//! In-memory message history mirrored to persistent storage
//!
//! The in-memory sequence is the source of truth for a running
//! session; every mutation is mirrored to the storage port on a
//! best-effort basis.

use thiserror::Error;
use tracing::warn;

use crate::message::Message;
use crate::storage::{Storage, HISTORY_KEY, NAME_KEY};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("message content is empty")]
    InvalidMessage,
}

pub struct MessageStore {
    messages: Vec<Message>,
    storage: Box<dyn Storage>,
}

impl MessageStore {
    /// An empty store over the given storage, ignoring any persisted
    /// snapshot.
    pub fn new(storage: Box<dyn Storage>) -> Self {
        Self {
            messages: Vec::new(),
            storage,
        }
    }

    /// Hydrates the store from the persisted snapshot. An absent or
    /// unparsable snapshot yields an empty store; the failure is
    /// logged, never fatal.
    pub fn load(storage: Box<dyn Storage>) -> Self {
        let messages = match storage.get(HISTORY_KEY) {
            Ok(Some(json)) => match serde_json::from_str(&json) {
                Ok(messages) => messages,
                Err(e) => {
                    warn!(error = %e, "failed to parse chat history, starting empty");
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!(error = %e, "failed to load chat history, starting empty");
                Vec::new()
            }
        };
        Self { messages, storage }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Appends one message, trimming its content first. Blank content
    /// is rejected before any state change.
    pub fn append(&mut self, message: Message) -> Result<(), StoreError> {
        let content = message.content.trim();
        if content.is_empty() {
            return Err(StoreError::InvalidMessage);
        }
        let message = Message {
            content: content.to_string(),
            ..message
        };
        self.messages.push(message);
        self.persist();
        Ok(())
    }

    /// Empties the history and removes both persisted keys. Clearing
    /// an already-empty store only repeats the removals.
    pub fn clear(&mut self) {
        self.messages.clear();
        if let Err(e) = self.storage.remove(HISTORY_KEY) {
            warn!(error = %e, "failed to remove persisted chat history");
        }
        if let Err(e) = self.storage.remove(NAME_KEY) {
            warn!(error = %e, "failed to remove persisted display name");
        }
    }

    /// Mirrors the full sequence to storage. A failed write keeps the
    /// in-memory state authoritative.
    fn persist(&mut self) {
        match serde_json::to_string(&self.messages) {
            Ok(json) => {
                if let Err(e) = self.storage.set(HISTORY_KEY, &json) {
                    warn!(error = %e, "failed to save chat history");
                }
            }
            Err(e) => warn!(error = %e, "failed to serialize chat history"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::Sender;
    use crate::storage::{FileStorage, MemoryStorage, StorageError};

    fn memory_store() -> MessageStore {
        MessageStore::new(Box::new(MemoryStorage::new()))
    }

    #[test]
    fn append_trims_content() {
        let mut store = memory_store();
        store.append(Message::user("  hello  ")).unwrap();
        assert_eq!(store.messages()[0].content, "hello");
    }

    #[test]
    fn append_rejects_blank_content() {
        let mut store = memory_store();
        assert!(matches!(
            store.append(Message::user("   \t\n")),
            Err(StoreError::InvalidMessage)
        ));
        assert!(store.is_empty());
    }

    #[test]
    fn persists_and_reloads_the_same_sequence() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("charla");

        let mut store = MessageStore::new(Box::new(FileStorage::new(&root)));
        store.append(Message::user("Hello")).unwrap();
        store.append(Message::bot("Hi there")).unwrap();
        store.append(Message::bot_error("fallback")).unwrap();
        let before: Vec<Message> = store.messages().to_vec();

        let reloaded = MessageStore::load(Box::new(FileStorage::new(&root)));
        assert_eq!(reloaded.messages(), before.as_slice());
        assert_eq!(reloaded.messages()[2].sender, Sender::Bot);
        assert!(reloaded.messages()[2].is_error);
    }

    #[test]
    fn clear_then_reload_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("charla");

        let mut store = MessageStore::new(Box::new(FileStorage::new(&root)));
        store.append(Message::user("Hello")).unwrap();
        store.clear();
        assert!(store.is_empty());

        let reloaded = MessageStore::load(Box::new(FileStorage::new(&root)));
        assert!(reloaded.is_empty());
    }

    #[test]
    fn clear_removes_both_keys() {
        let dir = tempfile::tempdir().unwrap();
        let mut storage = FileStorage::new(dir.path());
        storage.set(HISTORY_KEY, "[]").unwrap();
        storage.set(NAME_KEY, "\"ada\"").unwrap();

        let mut store = MessageStore::load(Box::new(FileStorage::new(dir.path())));
        store.clear();

        let storage = FileStorage::new(dir.path());
        assert!(storage.get(HISTORY_KEY).unwrap().is_none());
        assert!(storage.get(NAME_KEY).unwrap().is_none());
    }

    #[test]
    fn clear_is_idempotent() {
        let mut store = memory_store();
        store.clear();
        store.clear();
        assert!(store.is_empty());
    }

    #[test]
    fn corrupt_snapshot_loads_as_empty() {
        let mut storage = MemoryStorage::new();
        storage.set(HISTORY_KEY, "{not json").unwrap();
        let store = MessageStore::load(Box::new(storage));
        assert!(store.is_empty());
    }

    #[test]
    fn stored_json_is_an_array_of_records() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = MessageStore::new(Box::new(FileStorage::new(dir.path())));
        store.append(Message::user("Hello")).unwrap();

        let storage = FileStorage::new(dir.path());
        let json = storage.get(HISTORY_KEY).unwrap().unwrap();
        let records: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(records[0]["sender"], "user");
        assert_eq!(records[0]["content"], "Hello");
    }

    struct FailingStorage;

    impl Storage for FailingStorage {
        fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
            Err(StorageError::Unavailable("read failed".to_string()))
        }

        fn set(&mut self, _key: &str, _value: &str) -> Result<(), StorageError> {
            Err(StorageError::Unavailable("write failed".to_string()))
        }

        fn remove(&mut self, _key: &str) -> Result<(), StorageError> {
            Err(StorageError::Unavailable("remove failed".to_string()))
        }
    }

    #[test]
    fn failed_persist_keeps_in_memory_state() {
        let mut store = MessageStore::new(Box::new(FailingStorage));
        store.append(Message::user("Hello")).unwrap();
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn failed_read_at_startup_loads_as_empty() {
        let store = MessageStore::load(Box::new(FailingStorage));
        assert!(store.is_empty());
    }

    #[test]
    fn failed_clear_still_empties_memory() {
        let mut store = MessageStore::new(Box::new(FailingStorage));
        store.append(Message::user("Hello")).unwrap();
        store.clear();
        assert!(store.is_empty());
    }
}
