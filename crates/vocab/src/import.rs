//! Bulk import of vocabulary rows
//!
//! Rows follow the upload template: list fields may be given as
//! comma-separated text, nested values as JSON strings, and flags as
//! `"true"`/`"false"`. Native JSON values are accepted too.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as Json;

use crate::dedup::{DuplicateCheck, DuplicateMatcher, DuplicateStats, Headword, duplicate_stats};
use crate::models::{Example, VocabId, VocabularyEntry};
use crate::text::clean_text_content;

/// Part of speech used when a row leaves it blank
pub const DEFAULT_PART_OF_SPEECH: &str = "Unknown";

/// Attribution for imported rows that don't name a user
pub const IMPORT_USER_ID: &str = "bulk-import";

/// A list given either as one comma-separated string or as an array
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ListField {
    Text(String),
    Items(Vec<String>),
}

impl ListField {
    fn into_items(self) -> Vec<String> {
        let items = match self {
            ListField::Text(text) => text.split(',').map(str::to_string).collect(),
            ListField::Items(items) => items,
        };
        items
            .iter()
            .map(|s| clean_text_content(s))
            .filter(|s| !s.is_empty())
            .collect()
    }
}

/// A boolean given natively or as text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FlagField {
    Bool(bool),
    Text(String),
}

impl FlagField {
    fn is_set(&self) -> bool {
        match self {
            FlagField::Bool(b) => *b,
            FlagField::Text(s) => s.trim() == "true",
        }
    }
}

/// One row of an import file
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ImportRow {
    pub english: Option<String>,
    pub bangla: Option<String>,
    pub part_of_speech: Option<String>,
    pub pronunciation: Option<String>,
    pub explanation: Option<String>,
    /// JSON array text, a plain sentence, or an array
    pub examples: Option<Json>,
    pub synonyms: Option<ListField>,
    pub antonyms: Option<ListField>,
    pub origin: Option<String>,
    pub audio_url: Option<String>,
    #[serde(rename = "isFromAPI")]
    pub is_from_api: Option<FlagField>,
    pub is_online: Option<FlagField>,
    /// JSON text or a JSON value
    pub verb_forms: Option<Json>,
    pub related_words: Option<Json>,
    pub user_id: Option<String>,
}

impl Headword for ImportRow {
    fn english(&self) -> Option<&str> {
        self.english.as_deref()
    }

    fn part_of_speech(&self) -> Option<&str> {
        Some(
            self.part_of_speech
                .as_deref()
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .unwrap_or(DEFAULT_PART_OF_SPEECH),
        )
    }
}

impl ImportRow {
    /// Convert into a vocabulary entry stamped with `now`
    ///
    /// Text fields are run through [`clean_text_content`]. Blank optional
    /// fields are dropped. Fails if a JSON-string field doesn't parse.
    pub fn into_entry(
        self,
        id: VocabId,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> Result<VocabularyEntry> {
        let english = clean(self.english).unwrap_or_default();
        let part_of_speech = clean(self.part_of_speech)
            .unwrap_or_else(|| DEFAULT_PART_OF_SPEECH.to_string());

        let examples = match self.examples {
            Some(value) => parse_examples(value)
                .with_context(|| format!("Invalid examples for \"{}\"", english))?,
            None => Vec::new(),
        };
        let verb_forms = parse_embedded_json(self.verb_forms)
            .with_context(|| format!("Invalid verbForms for \"{}\"", english))?;
        let related_words = parse_embedded_json(self.related_words)
            .with_context(|| format!("Invalid relatedWords for \"{}\"", english))?;

        let mut builder = VocabularyEntry::builder(id, english, part_of_speech)
            .bangla(clean(self.bangla).unwrap_or_default())
            .examples(examples)
            .synonyms(self.synonyms.map(ListField::into_items).unwrap_or_default())
            .antonyms(self.antonyms.map(ListField::into_items).unwrap_or_default())
            .verb_forms(verb_forms)
            .related_words(related_words)
            .is_from_api(self.is_from_api.is_some_and(|f| f.is_set()))
            .is_online(self.is_online.is_some_and(|f| f.is_set()))
            .created_at(now)
            .updated_at(now)
            .user_id(clean(self.user_id).unwrap_or_else(|| user_id.to_string()));

        if let Some(pronunciation) = clean(self.pronunciation) {
            builder = builder.pronunciation(pronunciation);
        }
        if let Some(explanation) = clean(self.explanation) {
            builder = builder.explanation(explanation);
        }
        if let Some(origin) = clean(self.origin) {
            builder = builder.origin(origin);
        }
        if let Some(audio_url) = clean(self.audio_url) {
            builder = builder.audio_url(audio_url);
        }

        Ok(builder.build())
    }
}

fn clean(field: Option<String>) -> Option<String> {
    field
        .map(|s| clean_text_content(&s))
        .filter(|s| !s.is_empty())
}

/// Examples may be a JSON array (or its text form) of `{en, bn}` objects or
/// plain sentences; anything else is a single English sentence.
fn parse_examples(value: Json) -> Result<Vec<Example>> {
    let value = match value {
        Json::String(s) if s.trim_start().starts_with('[') => {
            serde_json::from_str(&s).context("Failed to parse examples JSON")?
        }
        other => other,
    };

    let items = match value {
        Json::Array(items) => items,
        Json::Null => Vec::new(),
        other => vec![other],
    };

    let mut examples = Vec::with_capacity(items.len());
    for item in items {
        match item {
            Json::String(s) => {
                let en = clean_text_content(&s);
                if !en.is_empty() {
                    examples.push(Example::new(en, ""));
                }
            }
            Json::Object(_) => {
                let example: Example =
                    serde_json::from_value(item).context("Example must have en and bn")?;
                examples.push(Example::new(
                    clean_text_content(&example.en),
                    clean_text_content(&example.bn),
                ));
            }
            other => anyhow::bail!("Unsupported example value: {}", other),
        }
    }
    Ok(examples)
}

/// Parse a field that holds JSON, possibly encoded as a string
fn parse_embedded_json(value: Option<Json>) -> Result<Option<Json>> {
    match value {
        None | Some(Json::Null) => Ok(None),
        Some(Json::String(s)) if s.trim().is_empty() => Ok(None),
        Some(Json::String(s)) => serde_json::from_str(&s)
            .map(Some)
            .context("Failed to parse embedded JSON"),
        Some(other) => Ok(Some(other)),
    }
}

/// Parse an import file holding either an array of rows or a single row
pub fn parse_json_rows(json: &str) -> Result<Vec<ImportRow>> {
    let value: Json = serde_json::from_str(json).context("Failed to parse import JSON")?;
    match value {
        Json::Array(_) => serde_json::from_value(value).context("Invalid import rows"),
        _ => Ok(vec![
            serde_json::from_value(value).context("Invalid import row")?,
        ]),
    }
}

/// Which rows of an import would be written, and why the rest would not
#[derive(Debug, Clone)]
pub struct ImportPlan {
    /// Rows with no exact duplicate in the corpus, in input order
    pub accepted: Vec<ImportRow>,
    /// Rows matching an existing entry's word and part of speech
    pub skipped: Vec<ImportRow>,
    /// One check per input row, in input order
    pub checks: Vec<DuplicateCheck>,
    pub stats: DuplicateStats,
}

/// Check every row against the corpus and split off exact duplicates
pub fn plan_import(rows: Vec<ImportRow>, corpus: &[VocabularyEntry]) -> ImportPlan {
    let checks = DuplicateMatcher::new(corpus).check_many(&rows);
    let stats = duplicate_stats(&checks);

    let (skipped, accepted): (Vec<_>, Vec<_>) = rows
        .into_iter()
        .zip(&checks)
        .partition(|(_, check)| check.is_duplicate);

    ImportPlan {
        accepted: accepted.into_iter().map(|(row, _)| row).collect(),
        skipped: skipped.into_iter().map(|(row, _)| row).collect(),
        checks,
        stats,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dedup::MatchOutcome;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_parse_array_and_single_object() {
        let rows = parse_json_rows(r#"[{"english": "run"}, {"english": "walk"}]"#).unwrap();
        assert_eq!(rows.len(), 2);

        let rows = parse_json_rows(r#"{"english": "run", "partOfSpeech": "Verb"}"#).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].part_of_speech.as_deref(), Some("Verb"));

        assert!(parse_json_rows("not json").is_err());
    }

    #[test]
    fn test_template_row_into_entry() {
        let row: ImportRow = serde_json::from_str(
            r#"{
                "english": "run\u200b ",
                "bangla": "দৌড়ানো",
                "partOfSpeech": "Verb",
                "pronunciation": "",
                "examples": "[{\"en\": \"I run\", \"bn\": \"আমি দৌড়াই\"}]",
                "synonyms": "sprint, jog ,",
                "antonyms": "",
                "isFromAPI": "true",
                "isOnline": "false",
                "verbForms": "{\"past\": \"ran\"}"
            }"#,
        )
        .unwrap();

        let entry = row
            .into_entry(VocabId::new("v1"), IMPORT_USER_ID, now())
            .unwrap();
        assert_eq!(entry.english, "run");
        assert_eq!(entry.part_of_speech, "Verb");
        assert!(entry.pronunciation.is_none());
        assert_eq!(entry.examples, vec![Example::new("I run", "আমি দৌড়াই")]);
        assert_eq!(entry.synonyms, vec!["sprint", "jog"]);
        assert!(entry.antonyms.is_empty());
        assert!(entry.is_from_api);
        assert!(!entry.is_online);
        assert_eq!(entry.verb_forms, Some(serde_json::json!({"past": "ran"})));
        assert_eq!(entry.user_id, "bulk-import");
        assert_eq!(entry.created_at, now());
        assert_eq!(entry.updated_at, now());
    }

    #[test]
    fn test_native_json_row_into_entry() {
        let row: ImportRow = serde_json::from_str(
            r#"{
                "english": "book",
                "examples": ["Read a book"],
                "synonyms": ["volume"],
                "isFromAPI": true,
                "relatedWords": {"noun": ["library"]},
                "userId": "user7"
            }"#,
        )
        .unwrap();

        let entry = row.into_entry(VocabId::new("v2"), IMPORT_USER_ID, now()).unwrap();
        assert_eq!(entry.part_of_speech, DEFAULT_PART_OF_SPEECH);
        assert_eq!(entry.examples[0].en, "Read a book");
        assert_eq!(entry.examples[0].bn, "");
        assert_eq!(entry.synonyms, vec!["volume"]);
        assert!(entry.is_from_api);
        assert!(entry.related_words.is_some());
        assert_eq!(entry.user_id, "user7");
    }

    #[test]
    fn test_plain_example_string() {
        let row = ImportRow {
            english: Some("walk".into()),
            examples: Some(Json::String("We walk to school".into())),
            ..Default::default()
        };
        let entry = row.into_entry(VocabId::new("v3"), IMPORT_USER_ID, now()).unwrap();
        assert_eq!(entry.examples, vec![Example::new("We walk to school", "")]);
    }

    #[test]
    fn test_bad_embedded_json_is_error() {
        let row = ImportRow {
            english: Some("run".into()),
            verb_forms: Some(Json::String("{not json".into())),
            ..Default::default()
        };
        let err = row
            .into_entry(VocabId::new("v4"), IMPORT_USER_ID, now())
            .unwrap_err();
        assert!(format!("{:#}", err).contains("verbForms"));
    }

    #[test]
    fn test_plan_import() {
        let corpus = vec![
            VocabularyEntry::builder(VocabId::new("1"), "run", "Verb").build(),
            VocabularyEntry::builder(VocabId::new("2"), "book", "Noun").build(),
        ];
        let rows = parse_json_rows(
            r#"[
                {"english": "Run", "partOfSpeech": "verb"},
                {"english": "book", "partOfSpeech": "Verb"},
                {"english": "swim"}
            ]"#,
        )
        .unwrap();

        let plan = plan_import(rows, &corpus);
        assert_eq!(plan.stats.total, 3);
        assert_eq!(plan.stats.duplicates, 1);
        assert_eq!(plan.skipped.len(), 1);
        assert_eq!(plan.skipped[0].english.as_deref(), Some("Run"));

        let accepted: Vec<_> = plan
            .accepted
            .iter()
            .filter_map(|r| r.english.as_deref())
            .collect();
        assert_eq!(accepted, vec!["book", "swim"]);
        assert_eq!(plan.checks[1].outcome, MatchOutcome::SameWordDifferentPos);
    }

    #[test]
    fn test_blank_pos_checks_as_unknown() {
        let corpus = vec![VocabularyEntry::builder(VocabId::new("1"), "thing", "Unknown").build()];
        let rows = vec![ImportRow {
            english: Some("thing".into()),
            part_of_speech: Some("  ".into()),
            ..Default::default()
        }];
        let plan = plan_import(rows, &corpus);
        assert_eq!(plan.stats.duplicates, 1);
    }
}
