//! Normalize Firestore documents to domain models

use anyhow::{Context, Result};
use serde_json::{Map, Number, Value as Json};

use super::api::{Document, Value};
use crate::models::VocabularyEntry;

/// Convert a typed Firestore value to plain JSON
///
/// Integers that don't fit i64 and non-finite doubles become strings and
/// null respectively.
pub fn value_to_json(value: Value) -> Json {
    match value {
        Value::NullValue(()) => Json::Null,
        Value::BooleanValue(b) => Json::Bool(b),
        Value::IntegerValue(s) => match s.parse::<i64>() {
            Ok(n) => Json::Number(n.into()),
            Err(_) => Json::String(s),
        },
        Value::DoubleValue(f) => Number::from_f64(f).map(Json::Number).unwrap_or(Json::Null),
        Value::TimestampValue(s)
        | Value::StringValue(s)
        | Value::BytesValue(s)
        | Value::ReferenceValue(s) => Json::String(s),
        Value::GeoPointValue(p) => serde_json::json!({
            "latitude": p.latitude,
            "longitude": p.longitude,
        }),
        Value::ArrayValue(array) => {
            Json::Array(array.values.into_iter().map(value_to_json).collect())
        }
        Value::MapValue(map) => Json::Object(
            map.fields
                .into_iter()
                .map(|(k, v)| (k, value_to_json(v)))
                .collect(),
        ),
    }
}

/// Extract the document ID from a resource name
fn document_id(name: &str) -> &str {
    name.rsplit('/').next().unwrap_or(name)
}

/// Convert a Firestore document to a VocabularyEntry
///
/// The ID comes from the document name. Documents written without
/// `updatedAt`/`createdAt` fall back to the server's update/create time.
pub fn normalize_document(doc: Document) -> Result<VocabularyEntry> {
    let id = document_id(&doc.name).to_string();

    let mut fields: Map<String, Json> = doc
        .fields
        .into_iter()
        .map(|(k, v)| (k, value_to_json(v)))
        .collect();

    fields.insert("id".to_string(), Json::String(id.clone()));

    if !fields.get("updatedAt").is_some_and(Json::is_string)
        && let Some(update_time) = &doc.update_time
    {
        fields.insert("updatedAt".to_string(), Json::String(update_time.clone()));
    }

    if !fields.get("createdAt").is_some_and(Json::is_string) {
        let fallback = doc
            .create_time
            .clone()
            .or_else(|| fields.get("updatedAt").and_then(Json::as_str).map(str::to_string));
        if let Some(created) = fallback {
            fields.insert("createdAt".to_string(), Json::String(created));
        }
    }

    // Optional text fields stored as null are treated as absent
    fields.retain(|_, v| !v.is_null());

    serde_json::from_value(Json::Object(fields))
        .with_context(|| format!("Failed to normalize vocabulary document {}", id))
}
