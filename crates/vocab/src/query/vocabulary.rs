//! Vocabulary query functions

use std::collections::HashMap;

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::dedup::normalize_key;
use crate::models::{VocabId, VocabularyEntry};
use crate::storage::VocabStore;
use crate::text::strip_markdown;

/// Summary information for displaying an entry in a list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VocabSummary {
    pub id: VocabId,
    pub english: String,
    pub bangla: String,
    pub part_of_speech: String,
    pub pronunciation: Option<String>,
    /// First example sentence, if any
    pub example: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl From<VocabularyEntry> for VocabSummary {
    fn from(entry: VocabularyEntry) -> Self {
        Self {
            example: entry
                .examples
                .first()
                .map(|e| strip_markdown(&e.en))
                .filter(|text| !text.is_empty()),
            id: entry.id,
            english: entry.english,
            bangla: entry.bangla,
            part_of_speech: entry.part_of_speech,
            pronunciation: entry.pronunciation,
            updated_at: entry.updated_at,
        }
    }
}

/// An entry together with the other senses of the same headword
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VocabularyDetail {
    pub entry: VocabularyEntry,
    /// Entries with the same headword under other parts of speech
    pub other_senses: Vec<VocabSummary>,
}

/// List entries with pagination, newest update first
pub fn list_vocabularies(
    store: &dyn VocabStore,
    limit: usize,
    offset: usize,
) -> Result<Vec<VocabSummary>> {
    let entries = store.list_entries(limit, offset)?;
    Ok(entries.into_iter().map(VocabSummary::from).collect())
}

/// List entries with one part of speech, newest update first
///
/// The label is matched case-insensitively, ignoring surrounding whitespace.
pub fn list_by_part_of_speech(
    store: &dyn VocabStore,
    part_of_speech: &str,
    limit: usize,
    offset: usize,
) -> Result<Vec<VocabSummary>> {
    let entries = store.list_by_part_of_speech(part_of_speech, limit, offset)?;
    Ok(entries.into_iter().map(VocabSummary::from).collect())
}

/// Count entries per part of speech
///
/// Labels that differ only in case are grouped under the first spelling
/// seen. Sorted by count descending, then label.
pub fn part_of_speech_counts(store: &dyn VocabStore) -> Result<Vec<(String, usize)>> {
    let mut counts: HashMap<String, (String, usize)> = HashMap::new();
    for entry in store.get_all()? {
        let key = normalize_key(Some(&entry.part_of_speech)).unwrap_or_default();
        counts
            .entry(key)
            .or_insert_with(|| (entry.part_of_speech.trim().to_string(), 0))
            .1 += 1;
    }

    let mut counts: Vec<(String, usize)> = counts.into_values().collect();
    counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    Ok(counts)
}

/// Rank of a search hit; lower sorts first
fn match_rank(entry: &VocabularyEntry, needle: &str) -> Option<u8> {
    [&entry.english, &entry.bangla]
        .into_iter()
        .filter_map(|field| {
            let haystack = field.trim().to_lowercase();
            if haystack == needle {
                Some(0)
            } else if haystack.starts_with(needle) {
                Some(1)
            } else if haystack.contains(needle) {
                Some(2)
            } else {
                None
            }
        })
        .min()
}

/// Search headwords and translations
///
/// Case-insensitive substring match on `english` or `bangla`. Exact matches
/// come first, then prefix matches, then the rest; ties are broken
/// alphabetically by headword. A blank query returns nothing.
pub fn search_vocabularies(
    store: &dyn VocabStore,
    text: &str,
    limit: usize,
) -> Result<Vec<VocabSummary>> {
    let Some(needle) = normalize_key(Some(text)) else {
        return Ok(Vec::new());
    };

    let mut hits: Vec<(u8, VocabularyEntry)> = store
        .get_all()?
        .into_iter()
        .filter_map(|entry| match_rank(&entry, &needle).map(|rank| (rank, entry)))
        .collect();

    hits.sort_by(|(ra, a), (rb, b)| {
        ra.cmp(rb)
            .then_with(|| a.english.to_lowercase().cmp(&b.english.to_lowercase()))
            .then_with(|| a.id.cmp(&b.id))
    });

    Ok(hits
        .into_iter()
        .take(limit)
        .map(|(_, entry)| VocabSummary::from(entry))
        .collect())
}

/// Get an entry with the other senses of its headword
pub fn get_vocabulary_detail(
    store: &dyn VocabStore,
    id: &VocabId,
) -> Result<Option<VocabularyDetail>> {
    let entry = match store.get_entry(id)? {
        Some(e) => e,
        None => return Ok(None),
    };

    let word = normalize_key(Some(&entry.english));
    let other_senses = store
        .get_all()?
        .into_iter()
        .filter(|e| e.id != entry.id && normalize_key(Some(&e.english)) == word)
        .map(VocabSummary::from)
        .collect();

    Ok(Some(VocabularyDetail {
        entry,
        other_senses,
    }))
}
