//! Firestore REST client
//!
//! Runs structured queries against the `documents:runQuery` endpoint.
//! Uses synchronous HTTP (ureq) to be executor-agnostic.

use anyhow::{Context, Result, anyhow};
use chrono::{DateTime, Utc};
use log::{debug, warn};
use std::time::Duration;
use url::Url;

use super::api::{
    CollectionSelector, ErrorResponse, ErrorStatus, FieldFilter, FieldReference, Filter, OrderBy,
    RunQueryRequest, RunQueryResponseItem, StructuredQuery, Value,
};
use super::normalize_document;
use crate::config::FirebaseConfig;
use crate::models::VocabularyEntry;
use crate::models::timestamp::format_timestamp;
use crate::sync::{MissingIndexError, QueryOrder, RemoteStore, UnreachableError};

/// Field every sync query filters and orders on
const UPDATED_AT_FIELD: &str = "updatedAt";

/// Firestore client for one collection
pub struct FirestoreClient {
    agent: ureq::Agent,
    base_url: String,
    project_id: String,
    database: String,
    collection: String,
    api_key: Option<String>,
    id_token: Option<String>,
}

impl FirestoreClient {
    /// Firestore REST base URL
    const BASE_URL: &'static str = "https://firestore.googleapis.com/v1";

    /// Create a client for `collection` using the given project config
    pub fn new(config: &FirebaseConfig, collection: impl Into<String>, timeout: Duration) -> Self {
        let agent_config = ureq::Agent::config_builder()
            .timeout_global(Some(timeout))
            // Error bodies carry the status we need to detect missing indexes
            .http_status_as_error(false)
            .build();

        Self {
            agent: ureq::Agent::new_with_config(agent_config),
            base_url: config
                .base_url
                .clone()
                .unwrap_or_else(|| Self::BASE_URL.to_string()),
            project_id: config.project_id.clone(),
            database: config.database.clone(),
            collection: collection.into(),
            api_key: config.api_key.clone(),
            id_token: config.id_token.clone(),
        }
    }

    /// Build the runQuery URL for this project
    fn run_query_url(&self) -> Result<Url> {
        let mut url = Url::parse(&self.base_url)
            .with_context(|| format!("Invalid Firestore base URL: {}", self.base_url))?;
        url.path_segments_mut()
            .map_err(|_| anyhow!("Firestore base URL cannot have a path: {}", self.base_url))?
            .pop_if_empty()
            .extend([
                "projects",
                self.project_id.as_str(),
                "databases",
                self.database.as_str(),
                "documents:runQuery",
            ]);
        if let Some(key) = &self.api_key {
            url.query_pairs_mut().append_pair("key", key);
        }
        Ok(url)
    }

    /// Execute a structured query and normalize the returned documents
    ///
    /// Documents that fail to normalize are logged and skipped.
    fn run_query(&self, query: StructuredQuery) -> Result<Vec<VocabularyEntry>> {
        let url = self.run_query_url()?;
        let body = RunQueryRequest {
            structured_query: query,
        };

        let mut request = self.agent.post(url.as_str());
        if let Some(token) = &self.id_token {
            request = request.header("Authorization", &format!("Bearer {}", token));
        }

        let mut response = request
            .send_json(&body)
            .map_err(classify_transport_error)
            .context("Failed to send runQuery request")?;

        let status = response.status().as_u16();
        if !(200..300).contains(&status) {
            let text = response.body_mut().read_to_string().unwrap_or_default();
            return Err(classify_error(status, &text));
        }

        let items: Vec<RunQueryResponseItem> = response
            .body_mut()
            .read_json()
            .context("Failed to parse runQuery response")?;

        let mut entries = Vec::with_capacity(items.len());
        let mut skipped = 0;
        for doc in items.into_iter().filter_map(|item| item.document) {
            match normalize_document(doc) {
                Ok(entry) => entries.push(entry),
                Err(e) => {
                    warn!("Skipping remote document: {:#}", e);
                    skipped += 1;
                }
            }
        }

        debug!(
            "runQuery on {} returned {} entries ({} skipped)",
            self.collection,
            entries.len(),
            skipped
        );
        Ok(entries)
    }
}

impl RemoteStore for FirestoreClient {
    fn query_updated_since(
        &self,
        since: DateTime<Utc>,
        order: QueryOrder,
    ) -> Result<Vec<VocabularyEntry>> {
        self.run_query(build_query(&self.collection, Some(since), None, order))
    }

    fn query_most_recent(&self, limit: usize, order: QueryOrder) -> Result<Vec<VocabularyEntry>> {
        self.run_query(build_query(&self.collection, None, Some(limit), order))
    }

    fn query_all(&self, limit: usize, order: QueryOrder) -> Result<Vec<VocabularyEntry>> {
        self.run_query(build_query(&self.collection, None, Some(limit), order))
    }

    fn is_reachable(&self) -> bool {
        match self.agent.get(&self.base_url).call() {
            Ok(_) => true,
            Err(e) => {
                debug!("Firestore endpoint {} unreachable: {}", self.base_url, e);
                false
            }
        }
    }
}

/// Mark connection-level failures so the sync engine can go offline
fn classify_transport_error(err: ureq::Error) -> anyhow::Error {
    match err {
        ureq::Error::Io(_)
        | ureq::Error::Timeout(_)
        | ureq::Error::HostNotFound
        | ureq::Error::ConnectionFailed => UnreachableError::new(err.to_string()).into(),
        other => anyhow!(other),
    }
}

/// Build a structured query over `updatedAt`
///
/// The cursor is sent as the same ISO string form the records store, so the
/// server-side string comparison matches chronological order.
pub(crate) fn build_query(
    collection: &str,
    updated_after: Option<DateTime<Utc>>,
    limit: Option<usize>,
    order: QueryOrder,
) -> StructuredQuery {
    let field = || FieldReference {
        field_path: UPDATED_AT_FIELD.to_string(),
    };

    let filter = updated_after.map(|since| Filter {
        field_filter: FieldFilter {
            field: field(),
            op: "GREATER_THAN".to_string(),
            value: Value::StringValue(format_timestamp(&since)),
        },
    });

    let direction = match order {
        QueryOrder::Ascending => "ASCENDING",
        QueryOrder::Descending => "DESCENDING",
    };

    StructuredQuery {
        from: vec![CollectionSelector {
            collection_id: collection.to_string(),
        }],
        filter,
        order_by: vec![OrderBy {
            field: field(),
            direction: direction.to_string(),
        }],
        limit: limit.map(|l| l.min(i32::MAX as usize) as i32),
    }
}

/// Turn an error response into an error, marking missing-index failures
///
/// runQuery reports errors either as a bare envelope or wrapped in a
/// one-element array.
pub(crate) fn classify_error(status: u16, body: &str) -> anyhow::Error {
    let parsed = serde_json::from_str::<ErrorResponse>(body)
        .map(|r| r.error)
        .or_else(|_| {
            serde_json::from_str::<Vec<ErrorResponse>>(body)
                .map_err(|e| anyhow!(e))
                .and_then(|v| {
                    v.into_iter()
                        .next()
                        .map(|r| r.error)
                        .ok_or_else(|| anyhow!("empty error array"))
                })
        });

    let error = match parsed {
        Ok(error) => error,
        Err(_) => ErrorStatus {
            code: status,
            message: body.trim().to_string(),
            status: String::new(),
        },
    };

    if error.status == "FAILED_PRECONDITION" || error.message.to_lowercase().contains("index") {
        return MissingIndexError::new(error.message).into();
    }

    anyhow!(
        "Firestore query failed with HTTP {} {}: {}",
        status,
        error.status,
        error.message
    )
}
