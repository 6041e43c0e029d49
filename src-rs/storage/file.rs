use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use serde_json::{Map, Value};
use tracing::warn;

use super::{KeyValueStore, StoreError};

/// Keeps every entry in one pretty-printed JSON object, rewritten on each
/// mutation.
pub struct FileStore {
    path: PathBuf,
    entries: RwLock<Map<String, Value>>,
}

impl FileStore {
    /// Opens `path`, starting empty when the file does not exist yet.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let entries = match fs::read_to_string(&path) {
            Ok(data) if data.trim().is_empty() => Map::new(),
            Ok(data) => serde_json::from_str::<Map<String, Value>>(&data)?,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Map::new(),
            Err(err) => return Err(err.into()),
        };
        Ok(Self {
            path,
            entries: RwLock::new(entries),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn save(&self, entries: &Map<String, Value>) -> Result<(), StoreError> {
        if let Some(dir) = self.path.parent() {
            if !dir.as_os_str().is_empty() {
                fs::create_dir_all(dir)?;
            }
        }
        let serialized = serde_json::to_string_pretty(entries)?;
        fs::write(&self.path, serialized).map_err(|err| {
            warn!(path = %self.path.display(), error = %err, "failed to persist store");
            StoreError::Io(err)
        })
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, keys: &[&str]) -> Result<Map<String, Value>, StoreError> {
        let map = self.entries.read().map_err(|_| StoreError::Poisoned)?;
        Ok(keys
            .iter()
            .filter_map(|key| map.get(*key).map(|value| (key.to_string(), value.clone())))
            .collect())
    }

    fn set(&self, entries: Map<String, Value>) -> Result<(), StoreError> {
        let mut map = self.entries.write().map_err(|_| StoreError::Poisoned)?;
        let mut next = map.clone();
        next.extend(entries);
        self.save(&next)?;
        *map = next;
        Ok(())
    }

    fn remove(&self, keys: &[&str]) -> Result<(), StoreError> {
        let mut map = self.entries.write().map_err(|_| StoreError::Poisoned)?;
        let mut next = map.clone();
        for key in keys {
            next.remove(*key);
        }
        self.save(&next)?;
        *map = next;
        Ok(())
    }
}
