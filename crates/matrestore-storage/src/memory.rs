use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use anyhow::anyhow;
use matrestore_core::{ContentUpdate, PersistedRecord, RecordId, RecordSummary, UpdatedAt};

use crate::traits::RecordStore;

/// In-memory record store for tests. Counts applied writes so callers can
/// assert how many updates a run performed.
#[derive(Default)]
pub struct InMemoryRecordStore {
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    records: HashMap<i64, PersistedRecord>,
    update_calls: usize,
}

impl InMemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_record(record: PersistedRecord) -> Self {
        let store = Self::default();
        if let Ok(mut inner) = store.inner.lock() {
            inner.records.insert(record.id.get(), record);
        }
        store
    }

    /// Number of `apply_update` calls, whether or not they matched a row.
    pub fn update_calls(&self) -> usize {
        self.lock().map(|i| i.update_calls).unwrap_or_default()
    }

    pub fn get(&self, id: RecordId) -> Option<PersistedRecord> {
        self.lock().ok().and_then(|i| i.records.get(&id.get()).cloned())
    }

    /// Simulate another writer touching the record.
    pub fn overwrite(&self, record: PersistedRecord) {
        if let Ok(mut inner) = self.lock() {
            inner.records.insert(record.id.get(), record);
        }
    }

    pub fn remove(&self, id: RecordId) {
        if let Ok(mut inner) = self.lock() {
            inner.records.remove(&id.get());
        }
    }

    /// Fixture seeding; fails if the id is taken.
    pub fn insert_record(&self, record: &PersistedRecord) -> anyhow::Result<()> {
        let mut inner = self.lock()?;
        if inner.records.contains_key(&record.id.get()) {
            return Err(anyhow!("record {} already exists", record.id));
        }
        inner.records.insert(record.id.get(), record.clone());
        Ok(())
    }

    fn lock(&self) -> anyhow::Result<MutexGuard<'_, Inner>> {
        self.inner.lock().map_err(|_| anyhow!("in-memory record store lock poisoned"))
    }
}

impl RecordStore for InMemoryRecordStore {
    fn fetch_summary(&self, id: RecordId) -> anyhow::Result<Option<RecordSummary>> {
        let inner = self.lock()?;
        Ok(inner.records.get(&id.get()).map(PersistedRecord::summary))
    }

    fn apply_update(&self, id: RecordId, update: &ContentUpdate, expected: Option<&RecordSummary>) -> anyhow::Result<usize> {
        let mut inner = self.lock()?;
        inner.update_calls += 1;
        let Some(record) = inner.records.get_mut(&id.get()) else {
            return Ok(0);
        };
        if let Some(expected) = expected {
            let current = record.summary();
            if current.content_length != expected.content_length || current.updated_at != expected.updated_at {
                return Ok(0);
            }
        }
        record.title = update.title.clone();
        record.content = update.content.clone();
        record.updated_at = Some(UpdatedAt::Unix(update.updated_at_unix));
        Ok(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: i64, content: &str, updated: i64) -> PersistedRecord {
        PersistedRecord {
            id: RecordId(id),
            title: "Old".into(),
            content: content.into(),
            updated_at: Some(UpdatedAt::Unix(updated)),
        }
    }

    fn update(content: &str) -> ContentUpdate {
        ContentUpdate {
            title: "New".into(),
            content: content.into(),
            updated_at_unix: 500,
        }
    }

    #[test]
    fn test_new_creates_empty_store() {
        let store = InMemoryRecordStore::new();
        assert!(store.fetch_summary(RecordId(2)).unwrap().is_none());
        assert_eq!(store.update_calls(), 0);
    }

    #[test]
    fn test_insert_and_fetch_summary() {
        let store = InMemoryRecordStore::new();
        store.insert_record(&record(2, "abc", 100)).unwrap();
        let s = store.fetch_summary(RecordId(2)).unwrap().unwrap();
        assert_eq!(s.content_length, 3);
        assert_eq!(s.title, "Old");
        assert!(store.insert_record(&record(2, "x", 1)).is_err());
    }

    #[test]
    fn test_update_missing_record_affects_nothing() {
        let store = InMemoryRecordStore::new();
        assert_eq!(store.apply_update(RecordId(2), &update("body"), None).unwrap(), 0);
        assert_eq!(store.update_calls(), 1);
    }

    #[test]
    fn test_guarded_update_applies_when_token_matches() {
        let store = InMemoryRecordStore::with_record(record(2, "abc", 100));
        let before = store.fetch_summary(RecordId(2)).unwrap().unwrap();
        assert_eq!(store.apply_update(RecordId(2), &update("restored"), Some(&before)).unwrap(), 1);
        let after = store.get(RecordId(2)).unwrap();
        assert_eq!(after.content, "restored");
        assert_eq!(after.title, "New");
        assert_eq!(after.updated_at, Some(UpdatedAt::Unix(500)));
    }

    #[test]
    fn test_guarded_update_rejects_stale_token() {
        let store = InMemoryRecordStore::with_record(record(2, "abc", 100));
        let before = store.fetch_summary(RecordId(2)).unwrap().unwrap();
        store.overwrite(record(2, "someone else", 101));
        assert_eq!(store.apply_update(RecordId(2), &update("restored"), Some(&before)).unwrap(), 0);
        assert_eq!(store.get(RecordId(2)).unwrap().content, "someone else");
    }
}
