//! Query API for UI consumption
//!
//! Read-only views over the local cache, shaped for list, search and
//! detail screens.

mod vocabulary;

pub use vocabulary::{
    VocabSummary, VocabularyDetail, get_vocabulary_detail, list_by_part_of_speech,
    list_vocabularies, part_of_speech_counts, search_vocabularies,
};
