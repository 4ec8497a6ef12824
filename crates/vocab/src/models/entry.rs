//! Vocabulary entry model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Unique identifier for a vocabulary entry (remote document ID)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VocabId(pub String);

impl VocabId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for VocabId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for VocabId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl std::fmt::Display for VocabId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A usage example in both languages
///
/// Bulk uploads store examples as bare English strings; those deserialize
/// with an empty `bn`.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Example {
    pub en: String,
    pub bn: String,
}

impl<'de> Deserialize<'de> for Example {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Text(String),
            Pair {
                #[serde(default)]
                en: String,
                #[serde(default)]
                bn: String,
            },
        }

        Ok(match Repr::deserialize(deserializer)? {
            Repr::Text(en) => Example { en, bn: String::new() },
            Repr::Pair { en, bn } => Example { en, bn },
        })
    }
}

impl Example {
    pub fn new(en: impl Into<String>, bn: impl Into<String>) -> Self {
        Self {
            en: en.into(),
            bn: bn.into(),
        }
    }
}

/// A single vocabulary entry, the unit of sync and duplicate detection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VocabularyEntry {
    pub id: VocabId,
    /// Headword
    pub english: String,
    pub bangla: String,
    /// Free-text label such as "Noun" or "Verb"
    pub part_of_speech: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pronunciation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
    #[serde(default)]
    pub examples: Vec<Example>,
    #[serde(default)]
    pub synonyms: Vec<String>,
    #[serde(default)]
    pub antonyms: Vec<String>,
    /// Conjugation table; shape varies between entries, kept opaque
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verb_forms: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub related_words: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,
    #[serde(default, rename = "isFromAPI")]
    pub is_from_api: bool,
    #[serde(default)]
    pub is_online: bool,
    #[serde(with = "super::timestamp")]
    pub created_at: DateTime<Utc>,
    /// Sync cursor field
    #[serde(with = "super::timestamp")]
    pub updated_at: DateTime<Utc>,
    /// Attribution only
    #[serde(default)]
    pub user_id: String,
}

impl VocabularyEntry {
    /// Create a new entry builder
    pub fn builder(
        id: VocabId,
        english: impl Into<String>,
        part_of_speech: impl Into<String>,
    ) -> VocabularyEntryBuilder {
        VocabularyEntryBuilder::new(id, english.into(), part_of_speech.into())
    }
}

/// Builder for creating VocabularyEntry instances
pub struct VocabularyEntryBuilder {
    id: VocabId,
    english: String,
    bangla: String,
    part_of_speech: String,
    pronunciation: Option<String>,
    explanation: Option<String>,
    examples: Vec<Example>,
    synonyms: Vec<String>,
    antonyms: Vec<String>,
    verb_forms: Option<serde_json::Value>,
    related_words: Option<serde_json::Value>,
    audio_url: Option<String>,
    origin: Option<String>,
    is_from_api: bool,
    is_online: bool,
    created_at: Option<DateTime<Utc>>,
    updated_at: Option<DateTime<Utc>>,
    user_id: String,
}

impl VocabularyEntryBuilder {
    fn new(id: VocabId, english: String, part_of_speech: String) -> Self {
        Self {
            id,
            english,
            bangla: String::new(),
            part_of_speech,
            pronunciation: None,
            explanation: None,
            examples: Vec::new(),
            synonyms: Vec::new(),
            antonyms: Vec::new(),
            verb_forms: None,
            related_words: None,
            audio_url: None,
            origin: None,
            is_from_api: false,
            is_online: false,
            created_at: None,
            updated_at: None,
            user_id: String::new(),
        }
    }

    pub fn bangla(mut self, bangla: impl Into<String>) -> Self {
        self.bangla = bangla.into();
        self
    }

    pub fn pronunciation(mut self, pronunciation: impl Into<String>) -> Self {
        self.pronunciation = Some(pronunciation.into());
        self
    }

    pub fn explanation(mut self, explanation: impl Into<String>) -> Self {
        self.explanation = Some(explanation.into());
        self
    }

    pub fn examples(mut self, examples: Vec<Example>) -> Self {
        self.examples = examples;
        self
    }

    pub fn synonyms(mut self, synonyms: Vec<String>) -> Self {
        self.synonyms = synonyms;
        self
    }

    pub fn antonyms(mut self, antonyms: Vec<String>) -> Self {
        self.antonyms = antonyms;
        self
    }

    pub fn verb_forms(mut self, verb_forms: Option<serde_json::Value>) -> Self {
        self.verb_forms = verb_forms;
        self
    }

    pub fn related_words(mut self, related_words: Option<serde_json::Value>) -> Self {
        self.related_words = related_words;
        self
    }

    pub fn audio_url(mut self, audio_url: impl Into<String>) -> Self {
        self.audio_url = Some(audio_url.into());
        self
    }

    pub fn origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = Some(origin.into());
        self
    }

    pub fn is_from_api(mut self, is_from_api: bool) -> Self {
        self.is_from_api = is_from_api;
        self
    }

    pub fn is_online(mut self, is_online: bool) -> Self {
        self.is_online = is_online;
        self
    }

    pub fn created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = Some(created_at);
        self
    }

    pub fn updated_at(mut self, updated_at: DateTime<Utc>) -> Self {
        self.updated_at = Some(updated_at);
        self
    }

    pub fn user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = user_id.into();
        self
    }

    pub fn build(self) -> VocabularyEntry {
        let updated_at = self.updated_at.unwrap_or_else(Utc::now);
        VocabularyEntry {
            id: self.id,
            english: self.english,
            bangla: self.bangla,
            part_of_speech: self.part_of_speech,
            pronunciation: self.pronunciation,
            explanation: self.explanation,
            examples: self.examples,
            synonyms: self.synonyms,
            antonyms: self.antonyms,
            verb_forms: self.verb_forms,
            related_words: self.related_words,
            audio_url: self.audio_url,
            origin: self.origin,
            is_from_api: self.is_from_api,
            is_online: self.is_online,
            created_at: self.created_at.unwrap_or(updated_at),
            updated_at,
            user_id: self.user_id,
        }
    }
}
