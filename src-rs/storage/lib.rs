pub mod file;
pub mod memory;

use serde_json::{Map, Value};
use thiserror::Error;

pub use file::FileStore;
pub use memory::MemoryStore;

pub const CREDENTIAL_KEY: &str = "openaiApiKey";
pub const HISTORY_KEY: &str = "resultHistory";
pub const CURRENT_RESULT_KEY: &str = "currentResult";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store lock poisoned")]
    Poisoned,

    #[error("store io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("store contents are not valid JSON: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// Small persisted key-value store. Values round-trip as opaque JSON.
pub trait KeyValueStore: Send + Sync {
    /// Returns the entries that exist; missing keys are simply absent.
    fn get(&self, keys: &[&str]) -> Result<Map<String, Value>, StoreError>;
    fn set(&self, entries: Map<String, Value>) -> Result<(), StoreError>;
    fn remove(&self, keys: &[&str]) -> Result<(), StoreError>;

    fn get_one(&self, key: &str) -> Result<Option<Value>, StoreError> {
        Ok(self.get(&[key])?.remove(key))
    }

    fn set_one(&self, key: &str, value: Value) -> Result<(), StoreError> {
        let mut entries = Map::new();
        entries.insert(key.to_string(), value);
        self.set(entries)
    }
}
