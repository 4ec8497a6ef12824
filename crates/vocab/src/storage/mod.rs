//! Storage traits and implementations
//!
//! This module defines the local offline-cache abstraction for vocabulary
//! entries and sync metadata. The trait-based design allows swapping between
//! in-memory and persistent storage implementations.

mod memory;
mod sqlite;
mod traits;

pub use memory::InMemoryVocabStore;
pub use sqlite::SqliteVocabStore;
pub use traits::VocabStore;
