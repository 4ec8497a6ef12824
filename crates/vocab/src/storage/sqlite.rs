//! SQLite-based offline vocabulary cache

use std::path::Path;
use std::sync::Mutex;

use anyhow::{Context, Result};
use rusqlite::{Connection, OptionalExtension, params};
use rusqlite_migration::{M, Migrations};

use super::traits::VocabStore;
use crate::models::timestamp::{format_timestamp, parse_timestamp};
use crate::models::{SyncMetadata, VocabId, VocabularyEntry};

/// Database migrations
///
/// Each migration is applied in order. The user_version pragma tracks which
/// migrations have been applied.
fn migrations() -> Migrations<'static> {
    Migrations::new(vec![
        // Migration 1: Initial schema
        M::up(
            r#"
            -- Last successful sync per collection
            CREATE TABLE sync_metadata (
                key TEXT PRIMARY KEY,
                last_synced_at TEXT NOT NULL
            );

            -- Entries; the full record is kept as JSON, with the columns
            -- needed for ordering and lookups split out
            CREATE TABLE vocabularies (
                id TEXT PRIMARY KEY,
                english TEXT NOT NULL,
                english_norm TEXT NOT NULL,
                part_of_speech TEXT NOT NULL,
                pos_norm TEXT NOT NULL,
                updated_at_ms INTEGER NOT NULL,
                data TEXT NOT NULL
            );

            CREATE INDEX idx_vocabularies_updated_at
                ON vocabularies(updated_at_ms DESC);
            CREATE INDEX idx_vocabularies_headword
                ON vocabularies(english_norm, pos_norm);
            "#,
        ),
    ])
}

fn normalize(s: &str) -> String {
    s.trim().to_lowercase()
}

/// SQLite-based vocabulary storage
pub struct SqliteVocabStore {
    conn: Mutex<Connection>,
}

impl SqliteVocabStore {
    /// Open (or create) a store at the given database path
    pub fn new(db_path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(db_path.as_ref())
            .with_context(|| format!("Failed to open database at {:?}", db_path.as_ref()))?;
        Self::from_connection(conn)
    }

    /// Open a throwaway in-memory database
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("Failed to open in-memory database")?;
        Self::from_connection(conn)
    }

    fn from_connection(mut conn: Connection) -> Result<Self> {
        // WAL lets the UI read while a sync cycle writes
        conn.execute_batch(
            r#"
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;
            "#,
        )?;

        migrations()
            .to_latest(&mut conn)
            .context("Failed to run database migrations")?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn write_entry(conn: &Connection, entry: &VocabularyEntry) -> Result<()> {
        let data = serde_json::to_string(entry)
            .with_context(|| format!("Failed to serialize entry {}", entry.id))?;
        conn.execute(
            "INSERT OR REPLACE INTO vocabularies
             (id, english, english_norm, part_of_speech, pos_norm, updated_at_ms, data)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
            params![
                entry.id.as_str(),
                entry.english,
                normalize(&entry.english),
                entry.part_of_speech,
                normalize(&entry.part_of_speech),
                entry.updated_at.timestamp_millis(),
                data,
            ],
        )?;
        Ok(())
    }

    fn parse_entry(data: &str) -> Result<VocabularyEntry> {
        serde_json::from_str(data).context("Failed to parse stored entry")
    }

    fn query_entries(
        conn: &Connection,
        sql: &str,
        params: impl rusqlite::Params,
    ) -> Result<Vec<VocabularyEntry>> {
        let mut stmt = conn.prepare(sql)?;
        let rows = stmt
            .query_map(params, |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        rows.iter().map(|data| Self::parse_entry(data)).collect()
    }
}

impl VocabStore for SqliteVocabStore {
    fn upsert_entry(&self, entry: VocabularyEntry) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        Self::write_entry(&conn, &entry)
    }

    fn bulk_upsert(&self, entries: Vec<VocabularyEntry>) -> Result<usize> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction()?;
        for entry in &entries {
            Self::write_entry(&tx, entry)?;
        }
        tx.commit().context("Failed to commit vocabulary batch")?;
        Ok(entries.len())
    }

    fn get_entry(&self, id: &VocabId) -> Result<Option<VocabularyEntry>> {
        let conn = self.conn.lock().unwrap();
        let data: Option<String> = conn
            .query_row(
                "SELECT data FROM vocabularies WHERE id = ?",
                [id.as_str()],
                |row| row.get(0),
            )
            .optional()?;
        data.map(|d| Self::parse_entry(&d)).transpose()
    }

    fn has_entry(&self, id: &VocabId) -> Result<bool> {
        let conn = self.conn.lock().unwrap();
        let exists: bool = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM vocabularies WHERE id = ?)",
            [id.as_str()],
            |row| row.get(0),
        )?;
        Ok(exists)
    }

    fn delete_entry(&self, id: &VocabId) -> Result<bool> {
        let conn = self.conn.lock().unwrap();
        let deleted = conn.execute("DELETE FROM vocabularies WHERE id = ?", [id.as_str()])?;
        Ok(deleted > 0)
    }

    fn get_all(&self) -> Result<Vec<VocabularyEntry>> {
        let conn = self.conn.lock().unwrap();
        Self::query_entries(&conn, "SELECT data FROM vocabularies", [])
    }

    fn list_entries(&self, limit: usize, offset: usize) -> Result<Vec<VocabularyEntry>> {
        let conn = self.conn.lock().unwrap();
        Self::query_entries(
            &conn,
            "SELECT data FROM vocabularies
             ORDER BY updated_at_ms DESC, id ASC
             LIMIT ? OFFSET ?",
            params![limit as i64, offset as i64],
        )
    }

    fn list_by_part_of_speech(
        &self,
        part_of_speech: &str,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<VocabularyEntry>> {
        let conn = self.conn.lock().unwrap();
        Self::query_entries(
            &conn,
            "SELECT data FROM vocabularies
             WHERE pos_norm = ?
             ORDER BY updated_at_ms DESC, id ASC
             LIMIT ? OFFSET ?",
            params![normalize(part_of_speech), limit as i64, offset as i64],
        )
    }

    fn count_entries(&self) -> Result<usize> {
        let conn = self.conn.lock().unwrap();
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM vocabularies", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    fn clear(&self) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute_batch(
            "DELETE FROM vocabularies;
             DELETE FROM sync_metadata;",
        )?;
        Ok(())
    }

    fn clear_entries(&self) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute("DELETE FROM vocabularies", [])?;
        Ok(())
    }

    fn get_sync_metadata(&self, key: &str) -> Result<Option<SyncMetadata>> {
        let conn = self.conn.lock().unwrap();
        let row: Option<String> = conn
            .query_row(
                "SELECT last_synced_at FROM sync_metadata WHERE key = ?",
                [key],
                |row| row.get(0),
            )
            .optional()?;

        let Some(last_synced_at) = row else {
            return Ok(None);
        };

        let last_synced_at = parse_timestamp(&last_synced_at)
            .with_context(|| format!("Corrupt sync timestamp for {}: {}", key, last_synced_at))?;

        Ok(Some(SyncMetadata::new(key, last_synced_at)))
    }

    fn save_sync_metadata(&self, metadata: SyncMetadata) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT OR REPLACE INTO sync_metadata (key, last_synced_at) VALUES (?, ?)",
            params![metadata.key, format_timestamp(&metadata.last_synced_at)],
        )?;
        Ok(())
    }

    fn delete_sync_metadata(&self, key: &str) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute("DELETE FROM sync_metadata WHERE key = ?", [key])?;
        Ok(())
    }
}
