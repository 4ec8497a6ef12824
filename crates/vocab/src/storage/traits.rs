//! Storage trait definitions

use crate::models::{SyncMetadata, VocabId, VocabularyEntry};
use anyhow::Result;

/// Trait for local vocabulary storage
///
/// This trait abstracts over the offline cache backends (in-memory, SQLite)
/// and provides the operations the sync engine and UI queries need.
/// Writes are keyed by entry id: the last write for an id wins.
pub trait VocabStore: Send + Sync {
    /// Insert or overwrite an entry by id
    fn upsert_entry(&self, entry: VocabularyEntry) -> Result<()>;

    /// Insert or overwrite many entries, in iteration order
    ///
    /// If the same id appears twice, the later entry wins.
    /// Returns the number of entries written.
    fn bulk_upsert(&self, entries: Vec<VocabularyEntry>) -> Result<usize> {
        let count = entries.len();
        for entry in entries {
            self.upsert_entry(entry)?;
        }
        Ok(count)
    }

    /// Get an entry by ID
    fn get_entry(&self, id: &VocabId) -> Result<Option<VocabularyEntry>>;

    /// Check if an entry exists
    fn has_entry(&self, id: &VocabId) -> Result<bool> {
        Ok(self.get_entry(id)?.is_some())
    }

    /// Delete an entry, returning whether it existed
    fn delete_entry(&self, id: &VocabId) -> Result<bool>;

    /// All entries, in no particular order
    fn get_all(&self) -> Result<Vec<VocabularyEntry>>;

    /// List entries, ordered by updated_at descending
    fn list_entries(&self, limit: usize, offset: usize) -> Result<Vec<VocabularyEntry>>;

    /// List entries with the given part of speech (case-insensitive),
    /// ordered by updated_at descending
    fn list_by_part_of_speech(
        &self,
        part_of_speech: &str,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<VocabularyEntry>>;

    /// Count stored entries
    fn count_entries(&self) -> Result<usize>;

    /// Clear all data including sync metadata
    fn clear(&self) -> Result<()>;

    /// Clear entries but preserve sync metadata
    fn clear_entries(&self) -> Result<()>;

    // === Sync metadata ===

    /// Get sync metadata for a collection key
    fn get_sync_metadata(&self, key: &str) -> Result<Option<SyncMetadata>>;

    /// Save sync metadata (upsert)
    fn save_sync_metadata(&self, metadata: SyncMetadata) -> Result<()>;

    /// Record "now" as the last successful sync for a key
    fn touch_sync_metadata(&self, key: &str) -> Result<SyncMetadata> {
        let metadata = SyncMetadata::now(key);
        self.save_sync_metadata(metadata.clone())?;
        Ok(metadata)
    }

    /// Delete sync metadata, forcing the next sync to start over
    fn delete_sync_metadata(&self, key: &str) -> Result<()>;
}
