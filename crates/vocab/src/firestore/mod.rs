//! Firestore integration
//!
//! This module provides:
//! - Firestore REST client implementing the sync engine's remote store
//! - Response normalization to domain models

mod client;
mod normalize;

pub use client::FirestoreClient;
pub use normalize::{normalize_document, value_to_json};

/// Firestore REST API request and response types
pub mod api {
    use std::collections::HashMap;

    use serde::{Deserialize, Serialize};

    /// Body of a `documents:runQuery` request
    #[derive(Debug, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct RunQueryRequest {
        pub structured_query: StructuredQuery,
    }

    #[derive(Debug, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct StructuredQuery {
        pub from: Vec<CollectionSelector>,
        #[serde(rename = "where", skip_serializing_if = "Option::is_none")]
        pub filter: Option<Filter>,
        #[serde(skip_serializing_if = "Vec::is_empty")]
        pub order_by: Vec<OrderBy>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub limit: Option<i32>,
    }

    #[derive(Debug, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct CollectionSelector {
        pub collection_id: String,
    }

    #[derive(Debug, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Filter {
        pub field_filter: FieldFilter,
    }

    #[derive(Debug, Serialize)]
    pub struct FieldFilter {
        pub field: FieldReference,
        /// e.g. "GREATER_THAN"
        pub op: String,
        pub value: Value,
    }

    #[derive(Debug, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct FieldReference {
        pub field_path: String,
    }

    #[derive(Debug, Serialize)]
    pub struct OrderBy {
        pub field: FieldReference,
        /// "ASCENDING" or "DESCENDING"
        pub direction: String,
    }

    /// One element of the streamed `runQuery` response array
    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct RunQueryResponseItem {
        pub document: Option<Document>,
        pub read_time: Option<String>,
    }

    /// A stored document
    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Document {
        /// Full resource name; the last segment is the document ID
        pub name: String,
        #[serde(default)]
        pub fields: HashMap<String, Value>,
        pub create_time: Option<String>,
        pub update_time: Option<String>,
    }

    /// A typed Firestore value; exactly one variant key is present
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub enum Value {
        NullValue(()),
        BooleanValue(bool),
        /// int64 encoded as a decimal string
        IntegerValue(String),
        DoubleValue(f64),
        TimestampValue(String),
        StringValue(String),
        BytesValue(String),
        ReferenceValue(String),
        GeoPointValue(GeoPoint),
        ArrayValue(ArrayValue),
        MapValue(MapValue),
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct GeoPoint {
        #[serde(default)]
        pub latitude: f64,
        #[serde(default)]
        pub longitude: f64,
    }

    #[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
    pub struct ArrayValue {
        /// Omitted by the API for empty arrays
        #[serde(default)]
        pub values: Vec<Value>,
    }

    #[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
    pub struct MapValue {
        #[serde(default)]
        pub fields: HashMap<String, Value>,
    }

    /// Google API error envelope
    #[derive(Debug, Deserialize)]
    pub struct ErrorResponse {
        pub error: ErrorStatus,
    }

    #[derive(Debug, Deserialize)]
    pub struct ErrorStatus {
        #[serde(default)]
        pub code: u16,
        #[serde(default)]
        pub message: String,
        /// Canonical code such as "FAILED_PRECONDITION"
        #[serde(default)]
        pub status: String,
    }
}
