//! Duplicate detection for new vocabulary
//!
//! Advisory only: results tell callers what already exists, they never
//! block a write.

mod matcher;

pub use matcher::{
    Candidate, DuplicateCheck, DuplicateMatcher, DuplicateStats, Headword, MatchOutcome,
    check_many, check_one, duplicate_stats, filter_non_duplicates, normalize_key,
};
