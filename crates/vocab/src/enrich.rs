//! Find entries whose optional fields are thin enough to be worth enriching
//!
//! Only the analysis lives here; filling the fields in is up to the caller.

use std::fmt;
use std::str::FromStr;

use anyhow::anyhow;
use serde::{Deserialize, Serialize};

use crate::dedup::normalize_key;
use crate::models::{VocabId, VocabularyEntry};

/// Fewer synonyms or antonyms than this counts as missing
pub const MIN_WORD_LIST_LEN: usize = 3;

/// Explanations shorter than this many characters count as missing
pub const MIN_EXPLANATION_CHARS: usize = 50;

/// An optional field that can be enriched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EnrichmentField {
    VerbForms,
    Synonyms,
    Antonyms,
    Examples,
    RelatedWords,
    Pronunciation,
    Explanation,
}

impl EnrichmentField {
    pub const ALL: [EnrichmentField; 7] = [
        EnrichmentField::VerbForms,
        EnrichmentField::Synonyms,
        EnrichmentField::Antonyms,
        EnrichmentField::Examples,
        EnrichmentField::RelatedWords,
        EnrichmentField::Pronunciation,
        EnrichmentField::Explanation,
    ];

    /// Field name as stored on the remote record
    pub fn as_str(&self) -> &'static str {
        match self {
            EnrichmentField::VerbForms => "verbForms",
            EnrichmentField::Synonyms => "synonyms",
            EnrichmentField::Antonyms => "antonyms",
            EnrichmentField::Examples => "examples",
            EnrichmentField::RelatedWords => "relatedWords",
            EnrichmentField::Pronunciation => "pronunciation",
            EnrichmentField::Explanation => "explanation",
        }
    }

    fn is_missing(&self, entry: &VocabularyEntry) -> bool {
        match self {
            EnrichmentField::VerbForms => {
                normalize_key(Some(&entry.part_of_speech)).as_deref() == Some("verb")
                    && is_blank_json(entry.verb_forms.as_ref())
            }
            EnrichmentField::Synonyms => entry.synonyms.len() < MIN_WORD_LIST_LEN,
            EnrichmentField::Antonyms => entry.antonyms.len() < MIN_WORD_LIST_LEN,
            EnrichmentField::Examples => entry.examples.is_empty(),
            EnrichmentField::RelatedWords => is_blank_json(entry.related_words.as_ref()),
            EnrichmentField::Pronunciation => entry
                .pronunciation
                .as_deref()
                .is_none_or(|p| p.trim().is_empty()),
            EnrichmentField::Explanation => entry
                .explanation
                .as_deref()
                .is_none_or(|e| e.chars().count() < MIN_EXPLANATION_CHARS),
        }
    }
}

impl fmt::Display for EnrichmentField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EnrichmentField {
    type Err = anyhow::Error;

    /// Accepts the record name in any case, with or without `-`/`_`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted: String = s
            .chars()
            .filter(|c| *c != '-' && *c != '_')
            .collect::<String>()
            .to_lowercase();
        EnrichmentField::ALL
            .into_iter()
            .find(|field| field.as_str().to_lowercase() == wanted)
            .ok_or_else(|| anyhow!("Unknown enrichment field: {}", s))
    }
}

/// Null, absent, or an empty array
fn is_blank_json(value: Option<&serde_json::Value>) -> bool {
    match value {
        None | Some(serde_json::Value::Null) => true,
        Some(serde_json::Value::Array(items)) => items.is_empty(),
        Some(_) => false,
    }
}

/// Fields of `entry` that need enrichment, in [`EnrichmentField::ALL`] order
///
/// An empty `only` checks every field; otherwise only the listed ones.
pub fn missing_enrichment(entry: &VocabularyEntry, only: &[EnrichmentField]) -> Vec<EnrichmentField> {
    EnrichmentField::ALL
        .into_iter()
        .filter(|field| only.is_empty() || only.contains(field))
        .filter(|field| field.is_missing(entry))
        .collect()
}

/// One entry and the fields it lacks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichmentGap {
    pub id: VocabId,
    pub english: String,
    pub part_of_speech: String,
    pub missing: Vec<EnrichmentField>,
}

/// Every entry with at least one missing field, ordered by headword then id
pub fn enrichment_gaps(entries: &[VocabularyEntry], only: &[EnrichmentField]) -> Vec<EnrichmentGap> {
    let mut gaps: Vec<EnrichmentGap> = entries
        .iter()
        .filter_map(|entry| {
            let missing = missing_enrichment(entry, only);
            (!missing.is_empty()).then(|| EnrichmentGap {
                id: entry.id.clone(),
                english: entry.english.clone(),
                part_of_speech: entry.part_of_speech.clone(),
                missing,
            })
        })
        .collect();

    gaps.sort_by(|a, b| {
        a.english
            .to_lowercase()
            .cmp(&b.english.to_lowercase())
            .then_with(|| a.id.cmp(&b.id))
    });
    gaps
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Example;
    use serde_json::json;

    fn words(list: &[&str]) -> Vec<String> {
        list.iter().map(|w| w.to_string()).collect()
    }

    fn complete_verb() -> VocabularyEntry {
        VocabularyEntry::builder(VocabId::new("1"), "mitigate", "Verb")
            .bangla("প্রশমিত করা")
            .pronunciation("us: /ˈmɪt.ɪ.ɡeɪt/")
            .explanation("এই শব্দটি তখন ব্যবহার করা হয় যখন কোনো ক্ষতি বা ঝুঁকি কমানোর কথা বলা হয়, যেমন দুর্যোগের প্রভাব।")
            .examples(vec![Example::new("Trees mitigate flooding.", "গাছ বন্যা কমায়।")])
            .synonyms(words(&["alleviate", "reduce", "ease"]))
            .antonyms(words(&["aggravate", "worsen", "intensify"]))
            .verb_forms(Some(json!({ "base": "mitigate", "v2": "mitigated" })))
            .related_words(Some(json!([{ "word": "mitigation" }])))
            .build()
    }

    #[test]
    fn test_complete_entry_needs_nothing() {
        assert!(missing_enrichment(&complete_verb(), &[]).is_empty());
    }

    #[test]
    fn test_bare_entry_needs_everything_but_verb_forms() {
        let entry = VocabularyEntry::builder(VocabId::new("2"), "book", "Noun").build();
        assert_eq!(
            missing_enrichment(&entry, &[]),
            vec![
                EnrichmentField::Synonyms,
                EnrichmentField::Antonyms,
                EnrichmentField::Examples,
                EnrichmentField::RelatedWords,
                EnrichmentField::Pronunciation,
                EnrichmentField::Explanation,
            ]
        );
    }

    #[test]
    fn test_thresholds() {
        let mut entry = complete_verb();
        entry.synonyms.pop();
        entry.explanation = Some("Short.".to_string());
        entry.pronunciation = Some("   ".to_string());
        entry.verb_forms = Some(serde_json::Value::Null);
        entry.related_words = Some(json!([]));

        assert_eq!(
            missing_enrichment(&entry, &[]),
            vec![
                EnrichmentField::VerbForms,
                EnrichmentField::Synonyms,
                EnrichmentField::RelatedWords,
                EnrichmentField::Pronunciation,
                EnrichmentField::Explanation,
            ]
        );
    }

    #[test]
    fn test_verb_label_is_case_insensitive() {
        let mut entry = complete_verb();
        entry.part_of_speech = " verb ".to_string();
        entry.verb_forms = None;
        assert_eq!(
            missing_enrichment(&entry, &[]),
            vec![EnrichmentField::VerbForms]
        );
    }

    #[test]
    fn test_field_filter() {
        let entry = VocabularyEntry::builder(VocabId::new("3"), "run", "Verb").build();
        assert_eq!(
            missing_enrichment(&entry, &[EnrichmentField::Examples, EnrichmentField::VerbForms]),
            vec![EnrichmentField::VerbForms, EnrichmentField::Examples]
        );
        assert!(missing_enrichment(&complete_verb(), &[EnrichmentField::Synonyms]).is_empty());
    }

    #[test]
    fn test_parse_field_names() {
        assert_eq!("verbForms".parse::<EnrichmentField>().unwrap(), EnrichmentField::VerbForms);
        assert_eq!("related-words".parse::<EnrichmentField>().unwrap(), EnrichmentField::RelatedWords);
        assert_eq!("SYNONYMS".parse::<EnrichmentField>().unwrap(), EnrichmentField::Synonyms);
        assert!("bangla".parse::<EnrichmentField>().is_err());
    }

    #[test]
    fn test_gaps_sorted_and_complete_entries_skipped() {
        let entries = vec![
            VocabularyEntry::builder(VocabId::new("b"), "Zeal", "Noun").build(),
            complete_verb(),
            VocabularyEntry::builder(VocabId::new("a"), "apple", "Noun").build(),
        ];

        let gaps = enrichment_gaps(&entries, &[EnrichmentField::Examples]);
        assert_eq!(gaps.len(), 2);
        assert_eq!(gaps[0].english, "apple");
        assert_eq!(gaps[1].english, "Zeal");
        assert_eq!(gaps[1].missing, vec![EnrichmentField::Examples]);
    }
}
