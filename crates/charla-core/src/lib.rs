pub mod config;
pub mod conversation;
pub mod llm;
pub mod message;
pub mod storage;
pub mod store;

// Re-export main types for convenience
pub use config::Config;
pub use conversation::{Conversation, Phase, ERROR_REPLY};
pub use llm::{LlmClient, LlmError, DEFAULT_API_URL};
pub use message::{Message, Sender};
pub use storage::{FileStorage, MemoryStorage, Storage, StorageError, HISTORY_KEY, NAME_KEY};
pub use store::{MessageStore, StoreError};
