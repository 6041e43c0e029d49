use std::collections::HashMap;
use std::sync::RwLock;

use serde_json::{Map, Value};

use super::{KeyValueStore, StoreError};

#[derive(Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, keys: &[&str]) -> Result<Map<String, Value>, StoreError> {
        let map = self.entries.read().map_err(|_| StoreError::Poisoned)?;
        Ok(keys
            .iter()
            .filter_map(|key| map.get(*key).map(|value| (key.to_string(), value.clone())))
            .collect())
    }

    fn set(&self, entries: Map<String, Value>) -> Result<(), StoreError> {
        let mut map = self.entries.write().map_err(|_| StoreError::Poisoned)?;
        map.extend(entries);
        Ok(())
    }

    fn remove(&self, keys: &[&str]) -> Result<(), StoreError> {
        let mut map = self.entries.write().map_err(|_| StoreError::Poisoned)?;
        for key in keys {
            map.remove(*key);
        }
        Ok(())
    }
}
