//! Domain models for vocabulary entities

mod entry;
mod sync_metadata;
pub mod timestamp;

pub use entry::{Example, VocabId, VocabularyEntry};
pub use sync_metadata::SyncMetadata;
