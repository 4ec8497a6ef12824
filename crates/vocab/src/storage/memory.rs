//! In-memory storage implementation
//!
//! Used for testing and for running without an on-disk cache.

use anyhow::Result;
use std::collections::HashMap;
use std::sync::RwLock;

use super::VocabStore;
use crate::models::{SyncMetadata, VocabId, VocabularyEntry};

/// In-memory implementation of VocabStore
///
/// Uses HashMaps protected by RwLocks for thread-safe access.
pub struct InMemoryVocabStore {
    entries: RwLock<HashMap<String, VocabularyEntry>>,
    sync_metadata: RwLock<HashMap<String, SyncMetadata>>,
}

impl InMemoryVocabStore {
    /// Create a new empty in-memory store
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            sync_metadata: RwLock::new(HashMap::new()),
        }
    }

    fn sorted_by_updated_desc(mut entries: Vec<VocabularyEntry>) -> Vec<VocabularyEntry> {
        // Tie-break on id so pagination is stable
        entries.sort_by(|a, b| {
            b.updated_at
                .cmp(&a.updated_at)
                .then_with(|| a.id.cmp(&b.id))
        });
        entries
    }
}

impl Default for InMemoryVocabStore {
    fn default() -> Self {
        Self::new()
    }
}

impl VocabStore for InMemoryVocabStore {
    fn upsert_entry(&self, entry: VocabularyEntry) -> Result<()> {
        let mut entries = self.entries.write().unwrap();
        entries.insert(entry.id.0.clone(), entry);
        Ok(())
    }

    fn bulk_upsert(&self, batch: Vec<VocabularyEntry>) -> Result<usize> {
        let count = batch.len();
        let mut entries = self.entries.write().unwrap();
        for entry in batch {
            entries.insert(entry.id.0.clone(), entry);
        }
        Ok(count)
    }

    fn get_entry(&self, id: &VocabId) -> Result<Option<VocabularyEntry>> {
        let entries = self.entries.read().unwrap();
        Ok(entries.get(&id.0).cloned())
    }

    fn delete_entry(&self, id: &VocabId) -> Result<bool> {
        let mut entries = self.entries.write().unwrap();
        Ok(entries.remove(&id.0).is_some())
    }

    fn get_all(&self) -> Result<Vec<VocabularyEntry>> {
        let entries = self.entries.read().unwrap();
        Ok(entries.values().cloned().collect())
    }

    fn list_entries(&self, limit: usize, offset: usize) -> Result<Vec<VocabularyEntry>> {
        let all = self.get_all()?;
        Ok(Self::sorted_by_updated_desc(all)
            .into_iter()
            .skip(offset)
            .take(limit)
            .collect())
    }

    fn list_by_part_of_speech(
        &self,
        part_of_speech: &str,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<VocabularyEntry>> {
        let wanted = part_of_speech.trim().to_lowercase();
        let matching: Vec<VocabularyEntry> = {
            let entries = self.entries.read().unwrap();
            entries
                .values()
                .filter(|e| e.part_of_speech.trim().to_lowercase() == wanted)
                .cloned()
                .collect()
        };
        Ok(Self::sorted_by_updated_desc(matching)
            .into_iter()
            .skip(offset)
            .take(limit)
            .collect())
    }

    fn count_entries(&self) -> Result<usize> {
        let entries = self.entries.read().unwrap();
        Ok(entries.len())
    }

    fn clear(&self) -> Result<()> {
        self.entries.write().unwrap().clear();
        self.sync_metadata.write().unwrap().clear();
        Ok(())
    }

    fn clear_entries(&self) -> Result<()> {
        self.entries.write().unwrap().clear();
        Ok(())
    }

    fn get_sync_metadata(&self, key: &str) -> Result<Option<SyncMetadata>> {
        let metadata = self.sync_metadata.read().unwrap();
        Ok(metadata.get(key).cloned())
    }

    fn save_sync_metadata(&self, metadata: SyncMetadata) -> Result<()> {
        let mut all = self.sync_metadata.write().unwrap();
        all.insert(metadata.key.clone(), metadata);
        Ok(())
    }

    fn delete_sync_metadata(&self, key: &str) -> Result<()> {
        self.sync_metadata.write().unwrap().remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn make_entry(id: &str, english: &str, pos: &str, age_hours: i64) -> VocabularyEntry {
        VocabularyEntry::builder(VocabId::new(id), english, pos)
            .bangla("অর্থ")
            .updated_at(Utc::now() - Duration::hours(age_hours))
            .build()
    }

    #[test]
    fn test_upsert_and_get() {
        let store = InMemoryVocabStore::new();
        store.upsert_entry(make_entry("1", "run", "Verb", 1)).unwrap();

        let entry = store.get_entry(&VocabId::new("1")).unwrap().unwrap();
        assert_eq!(entry.english, "run");
        assert!(store.has_entry(&VocabId::new("1")).unwrap());
        assert!(!store.has_entry(&VocabId::new("2")).unwrap());
    }

    #[test]
    fn test_bulk_upsert_last_write_wins() {
        let store = InMemoryVocabStore::new();
        let first = make_entry("1", "run", "Verb", 2);
        let mut second = make_entry("1", "run", "Verb", 1);
        second.bangla = "ছোটা".to_string();

        store.bulk_upsert(vec![first.clone()]).unwrap();
        store.bulk_upsert(vec![second]).unwrap();

        assert_eq!(store.count_entries().unwrap(), 1);
        let stored = store.get_entry(&VocabId::new("1")).unwrap().unwrap();
        assert_eq!(stored.bangla, "ছোটা");

        // Same id twice within one batch: later one wins
        let mut third = first.clone();
        third.bangla = "দৌড়".to_string();
        store.bulk_upsert(vec![first, third]).unwrap();
        let stored = store.get_entry(&VocabId::new("1")).unwrap().unwrap();
        assert_eq!(stored.bangla, "দৌড়");
    }

    #[test]
    fn test_list_entries_newest_first() {
        let store = InMemoryVocabStore::new();
        store.upsert_entry(make_entry("old", "book", "Noun", 5)).unwrap();
        store.upsert_entry(make_entry("new", "run", "Verb", 1)).unwrap();
        store.upsert_entry(make_entry("mid", "walk", "Verb", 3)).unwrap();

        let listed = store.list_entries(10, 0).unwrap();
        let ids: Vec<&str> = listed.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["new", "mid", "old"]);

        let page = store.list_entries(1, 1).unwrap();
        assert_eq!(page[0].id.as_str(), "mid");
    }

    #[test]
    fn test_list_by_part_of_speech_case_insensitive() {
        let store = InMemoryVocabStore::new();
        store.upsert_entry(make_entry("1", "run", "Verb", 1)).unwrap();
        store.upsert_entry(make_entry("2", "walk", "verb ", 2)).unwrap();
        store.upsert_entry(make_entry("3", "book", "Noun", 3)).unwrap();

        let verbs = store.list_by_part_of_speech("VERB", 10, 0).unwrap();
        assert_eq!(verbs.len(), 2);
        assert_eq!(verbs[0].id.as_str(), "1");
    }

    #[test]
    fn test_sync_metadata_lifecycle() {
        let store = InMemoryVocabStore::new();
        assert!(store.get_sync_metadata("vocabularies").unwrap().is_none());

        let saved = store.touch_sync_metadata("vocabularies").unwrap();
        let loaded = store.get_sync_metadata("vocabularies").unwrap().unwrap();
        assert_eq!(saved, loaded);

        store.clear_entries().unwrap();
        assert!(store.get_sync_metadata("vocabularies").unwrap().is_some());

        store.clear().unwrap();
        assert!(store.get_sync_metadata("vocabularies").unwrap().is_none());
    }

    #[test]
    fn test_delete_entry() {
        let store = InMemoryVocabStore::new();
        store.upsert_entry(make_entry("1", "run", "Verb", 1)).unwrap();
        assert!(store.delete_entry(&VocabId::new("1")).unwrap());
        assert!(!store.delete_entry(&VocabId::new("1")).unwrap());
        assert_eq!(store.count_entries().unwrap(), 0);
    }
}
