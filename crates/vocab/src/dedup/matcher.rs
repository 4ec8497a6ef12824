//! Duplicate detection keyed on (headword, part of speech)

use std::collections::HashMap;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::models::VocabularyEntry;

/// The two fields duplicate detection looks at
///
/// Anything with a headword and a part of speech can be checked; all other
/// vocabulary fields are irrelevant to matching.
pub trait Headword {
    fn english(&self) -> Option<&str>;
    fn part_of_speech(&self) -> Option<&str>;
}

impl Headword for VocabularyEntry {
    fn english(&self) -> Option<&str> {
        Some(&self.english)
    }

    fn part_of_speech(&self) -> Option<&str> {
        Some(&self.part_of_speech)
    }
}

impl<T: Headword + ?Sized> Headword for &T {
    fn english(&self) -> Option<&str> {
        (**self).english()
    }

    fn part_of_speech(&self) -> Option<&str> {
        (**self).part_of_speech()
    }
}

/// A candidate for a new entry; either field may be missing
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    #[serde(default)]
    pub english: Option<String>,
    #[serde(default)]
    pub part_of_speech: Option<String>,
}

impl Candidate {
    pub fn new(english: impl Into<String>, part_of_speech: impl Into<String>) -> Self {
        Self {
            english: Some(english.into()),
            part_of_speech: Some(part_of_speech.into()),
        }
    }
}

impl Headword for Candidate {
    fn english(&self) -> Option<&str> {
        self.english.as_deref()
    }

    fn part_of_speech(&self) -> Option<&str> {
        self.part_of_speech.as_deref()
    }
}

/// Trim and lowercase; blank counts as missing
pub fn normalize_key(s: Option<&str>) -> Option<String> {
    let trimmed = s?.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_lowercase())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchOutcome {
    /// Same headword and part of speech
    ExactDuplicate,
    /// Same headword, only under other parts of speech
    SameWordDifferentPos,
    NoMatch,
}

/// Result of checking one candidate against the corpus
#[derive(Debug, Clone)]
pub struct DuplicateCheck {
    pub is_duplicate: bool,
    pub outcome: MatchOutcome,
    /// Every corpus entry sharing the normalized headword, whatever its POS
    pub matches: Vec<VocabularyEntry>,
    pub message: String,
    candidate_pos: Option<String>,
}

impl DuplicateCheck {
    /// Matches with the candidate's part of speech
    pub fn exact_matches(&self) -> Vec<&VocabularyEntry> {
        self.matches
            .iter()
            .filter(|e| self.same_pos(e))
            .collect()
    }

    /// Matches under a different part of speech
    pub fn other_pos_matches(&self) -> Vec<&VocabularyEntry> {
        self.matches
            .iter()
            .filter(|e| !self.same_pos(e))
            .collect()
    }

    fn same_pos(&self, entry: &VocabularyEntry) -> bool {
        self.candidate_pos.is_some()
            && normalize_key(Some(&entry.part_of_speech)) == self.candidate_pos
    }
}

/// Aggregate counts over a batch of checks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DuplicateStats {
    pub total: usize,
    pub duplicates: usize,
    pub unique: usize,
    pub same_word_different_pos: usize,
}

/// Corpus indexed by normalized headword, for repeated checks
pub struct DuplicateMatcher<'a> {
    by_word: HashMap<String, Vec<&'a VocabularyEntry>>,
}

impl<'a> DuplicateMatcher<'a> {
    pub fn new(corpus: &'a [VocabularyEntry]) -> Self {
        let mut by_word: HashMap<String, Vec<&'a VocabularyEntry>> = HashMap::new();
        for entry in corpus {
            if let Some(word) = normalize_key(Some(&entry.english)) {
                by_word.entry(word).or_default().push(entry);
            }
        }
        Self { by_word }
    }

    /// Check one candidate. Never fails; malformed input is a non-match.
    pub fn check<T: Headword + ?Sized>(&self, candidate: &T) -> DuplicateCheck {
        let Some(word) = normalize_key(candidate.english()) else {
            return DuplicateCheck {
                is_duplicate: false,
                outcome: MatchOutcome::NoMatch,
                matches: Vec::new(),
                message: "Missing English word, cannot check for duplicates".to_string(),
                candidate_pos: None,
            };
        };
        let pos = normalize_key(candidate.part_of_speech());
        let display_word = candidate.english().unwrap_or_default().trim();

        let matches: Vec<VocabularyEntry> = self
            .by_word
            .get(&word)
            .map(|entries| entries.iter().map(|e| (*e).clone()).collect())
            .unwrap_or_default();

        let exact = pos.as_ref().and_then(|pos| {
            matches
                .iter()
                .find(|e| normalize_key(Some(&e.part_of_speech)).as_ref() == Some(pos))
        });

        let (outcome, message) = if let Some(existing) = exact {
            (
                MatchOutcome::ExactDuplicate,
                format!(
                    "\"{}\" ({}) already exists in the vocabulary",
                    existing.english, existing.part_of_speech
                ),
            )
        } else if !matches.is_empty() {
            let mut labels: Vec<&str> = Vec::new();
            for entry in &matches {
                if !labels.contains(&entry.part_of_speech.as_str()) {
                    labels.push(&entry.part_of_speech);
                }
            }
            let adding_as = candidate
                .part_of_speech()
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .unwrap_or("an unspecified part of speech");
            (
                MatchOutcome::SameWordDifferentPos,
                format!(
                    "\"{}\" already exists as {}; adding it as {} creates a separate entry",
                    display_word,
                    labels.join(", "),
                    adding_as
                ),
            )
        } else {
            (
                MatchOutcome::NoMatch,
                format!("No existing entry for \"{}\"", display_word),
            )
        };

        DuplicateCheck {
            is_duplicate: outcome == MatchOutcome::ExactDuplicate,
            outcome,
            matches,
            message,
            candidate_pos: pos,
        }
    }

    /// Check each candidate independently against the corpus
    ///
    /// Candidates are not compared with each other. Results are in input order.
    pub fn check_many<T: Headword + Sync>(&self, candidates: &[T]) -> Vec<DuplicateCheck> {
        candidates.par_iter().map(|c| self.check(c)).collect()
    }
}

/// Check one candidate against a corpus
pub fn check_one<T: Headword + ?Sized>(candidate: &T, corpus: &[VocabularyEntry]) -> DuplicateCheck {
    DuplicateMatcher::new(corpus).check(candidate)
}

/// Check a batch of candidates against a corpus
pub fn check_many<T: Headword + Sync>(
    candidates: &[T],
    corpus: &[VocabularyEntry],
) -> Vec<DuplicateCheck> {
    DuplicateMatcher::new(corpus).check_many(candidates)
}

/// Count outcomes across a batch
pub fn duplicate_stats(results: &[DuplicateCheck]) -> DuplicateStats {
    let duplicates = results.iter().filter(|r| r.is_duplicate).count();
    let same_word_different_pos = results
        .iter()
        .filter(|r| r.outcome == MatchOutcome::SameWordDifferentPos)
        .count();

    DuplicateStats {
        total: results.len(),
        duplicates,
        unique: results.len() - duplicates,
        same_word_different_pos,
    }
}

/// Keep the candidates whose check did not find a duplicate, in order
///
/// A candidate with no corresponding result is kept.
pub fn filter_non_duplicates<T: Clone>(candidates: &[T], results: &[DuplicateCheck]) -> Vec<T> {
    candidates
        .iter()
        .enumerate()
        .filter(|(i, _)| !results.get(*i).is_some_and(|r| r.is_duplicate))
        .map(|(_, c)| c.clone())
        .collect()
}
