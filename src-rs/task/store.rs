use std::sync::Arc;

use tracing::warn;

use super::types::{ConversionRecord, GeneratedTask};
use crate::storage::{KeyValueStore, StoreError, CURRENT_RESULT_KEY, HISTORY_KEY};

pub const DEFAULT_HISTORY_LIMIT: usize = 10;

/// Most-recent-first conversion history, deduplicated by source text and
/// capped at `limit` records. Every mutation is written back to the store.
pub struct HistoryStore {
    store: Arc<dyn KeyValueStore>,
    limit: usize,
}

impl HistoryStore {
    pub fn new(store: Arc<dyn KeyValueStore>, limit: usize) -> Self {
        let limit = if limit == 0 { DEFAULT_HISTORY_LIMIT } else { limit };
        Self { store, limit }
    }

    pub fn list(&self) -> Result<Vec<ConversionRecord>, StoreError> {
        let raw = match self.store.get_one(HISTORY_KEY)? {
            Some(raw) => raw,
            None => return Ok(Vec::new()),
        };
        match serde_json::from_value::<Vec<ConversionRecord>>(raw) {
            Ok(records) => Ok(records),
            Err(err) => {
                warn!(error = %err, "discarding unreadable history");
                Ok(Vec::new())
            }
        }
    }

    pub fn record(&self, record: ConversionRecord) -> Result<Vec<ConversionRecord>, StoreError> {
        let mut items = self.list()?;
        items.retain(|item| item.source_text != record.source_text);
        items.insert(0, record);
        items.truncate(self.limit);
        self.save(&items)?;
        Ok(items)
    }

    pub fn clear(&self) -> Result<(), StoreError> {
        self.save(&[])
    }

    fn save(&self, items: &[ConversionRecord]) -> Result<(), StoreError> {
        self.store.set_one(HISTORY_KEY, serde_json::to_value(items)?)
    }

    /// The result last shown to the user.
    pub fn current(&self) -> Result<Option<ConversionRecord>, StoreError> {
        Ok(self
            .store
            .get_one(CURRENT_RESULT_KEY)?
            .and_then(|raw| serde_json::from_value(raw).ok()))
    }

    pub fn set_current(&self, record: &ConversionRecord) -> Result<(), StoreError> {
        self.store.set_one(CURRENT_RESULT_KEY, serde_json::to_value(record)?)
    }

    pub fn clear_current(&self) -> Result<(), StoreError> {
        self.store.remove(&[CURRENT_RESULT_KEY])
    }

    /// Re-displays a history entry as the current result.
    pub fn select(&self, index: usize) -> Result<Option<ConversionRecord>, StoreError> {
        let record = match self.list()?.into_iter().nth(index) {
            Some(record) => record,
            None => return Ok(None),
        };
        self.set_current(&record)?;
        Ok(Some(record))
    }
}

pub fn current_task(store: &HistoryStore) -> Result<Option<GeneratedTask>, StoreError> {
    Ok(store.current()?.map(|record| record.generated_task))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    fn record(source: &str) -> ConversionRecord {
        ConversionRecord::new(
            source,
            GeneratedTask {
                title: format!("Task: {}", source),
                ..GeneratedTask::default()
            },
        )
    }

    fn history() -> HistoryStore {
        HistoryStore::new(Arc::new(MemoryStore::new()), DEFAULT_HISTORY_LIMIT)
    }

    #[test]
    fn cap_evicts_oldest() {
        let history = history();
        for idx in 0..11 {
            history.record(record(&format!("item {}", idx))).unwrap();
        }
        let items = history.list().unwrap();
        assert_eq!(items.len(), 10);
        assert_eq!(items[0].source_text, "item 10");
        assert!(items.iter().all(|item| item.source_text != "item 0"));
    }

    #[test]
    fn same_source_replaces_and_moves_first() {
        let history = history();
        history.record(record("a")).unwrap();
        history.record(record("b")).unwrap();
        history.record(record("a")).unwrap();

        let sources: Vec<String> = history
            .list()
            .unwrap()
            .into_iter()
            .map(|item| item.source_text)
            .collect();
        assert_eq!(sources, vec!["a", "b"]);
    }

    #[test]
    fn select_sets_current() {
        let history = history();
        history.record(record("a")).unwrap();
        history.record(record("b")).unwrap();

        let picked = history.select(1).unwrap().unwrap();
        assert_eq!(picked.source_text, "a");
        assert_eq!(current_task(&history).unwrap().unwrap().title, "Task: a");
        assert!(history.select(5).unwrap().is_none());

        history.clear_current().unwrap();
        assert!(history.current().unwrap().is_none());
    }
}
