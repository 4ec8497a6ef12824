//! Vocab crate - Business logic for the vocabulary cache
//!
//! This crate provides platform-independent vocabulary functionality including:
//! - Domain models (VocabularyEntry, SyncMetadata)
//! - Firestore REST client
//! - Storage trait abstractions (in-memory and SQLite)
//! - Incremental sync engine with a missing-index fallback
//! - Duplicate detection on (headword, part of speech)
//! - Query API for UI consumption
//! - Bulk import planning, pasted-text cleanup and enrichment gap analysis

pub mod config;
pub mod dedup;
pub mod enrich;
pub mod firestore;
pub mod import;
pub mod models;
pub mod query;
pub mod storage;
pub mod sync;
pub mod text;

pub use config::{FirebaseConfig, SyncSettings};
pub use dedup::{
    Candidate, DuplicateCheck, DuplicateMatcher, DuplicateStats, Headword, MatchOutcome,
    check_many, check_one, duplicate_stats, filter_non_duplicates,
};
pub use enrich::{EnrichmentField, EnrichmentGap, enrichment_gaps, missing_enrichment};
pub use firestore::FirestoreClient;
pub use import::{ImportPlan, ImportRow, parse_json_rows, plan_import};
pub use models::{Example, SyncMetadata, VocabId, VocabularyEntry};
pub use query::{
    VocabSummary, VocabularyDetail, get_vocabulary_detail, list_by_part_of_speech,
    list_vocabularies, part_of_speech_counts, search_vocabularies,
};
pub use storage::{InMemoryVocabStore, SqliteVocabStore, VocabStore};
pub use sync::{
    // Sync execution
    SyncCoordinator, SyncMode, SyncOptions, SyncOutcome, SyncStats, SkipReason,
    // Background triggers
    AlwaysOnline, Connectivity, ConnectivityMonitor, SyncManager,
    // Remote store seam
    MissingIndexError, QueryOrder, RemoteStore, UnreachableError, is_missing_index,
    is_unreachable, VOCABULARY_COLLECTION,
};
pub use text::{clean_text_content, strip_markdown};
