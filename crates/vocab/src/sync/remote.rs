//! Remote store abstraction consumed by the sync engine

use anyhow::Result;
use chrono::{DateTime, Utc};

use crate::models::VocabularyEntry;

/// Sort direction on the `updatedAt` field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryOrder {
    Ascending,
    Descending,
}

/// Error indicating the query needs a backing index the remote doesn't have
///
/// Firestore reports this as `FAILED_PRECONDITION`. The sync engine treats it
/// as recoverable and retries with a simpler query.
#[derive(Debug, thiserror::Error)]
#[error("Query requires a missing index: {message}")]
pub struct MissingIndexError {
    pub message: String,
}

impl MissingIndexError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Check whether a query failure is consistent with a missing backing index
///
/// True if the chain contains a [`MissingIndexError`], or if any message in
/// the chain mentions an index.
pub fn is_missing_index(err: &anyhow::Error) -> bool {
    if err.downcast_ref::<MissingIndexError>().is_some() {
        return true;
    }
    err.chain()
        .any(|cause| cause.to_string().to_lowercase().contains("index"))
}

/// Error indicating the remote could not be reached at all
///
/// Raised for transport failures (DNS, refused connection, timeout), as
/// opposed to the server answering with an error status.
#[derive(Debug, thiserror::Error)]
#[error("Remote unreachable: {message}")]
pub struct UnreachableError {
    pub message: String,
}

impl UnreachableError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Check whether a failure means the remote was unreachable
pub fn is_unreachable(err: &anyhow::Error) -> bool {
    err.chain().any(|cause| cause.is::<UnreachableError>())
}

/// Authoritative remote store of vocabulary entries
///
/// All queries order by the entry's `updatedAt` field.
pub trait RemoteStore: Send + Sync {
    /// Entries whose `updatedAt` is strictly greater than `since`
    fn query_updated_since(
        &self,
        since: DateTime<Utc>,
        order: QueryOrder,
    ) -> Result<Vec<VocabularyEntry>>;

    /// The `limit` most recently updated entries (fallback path)
    fn query_most_recent(&self, limit: usize, order: QueryOrder) -> Result<Vec<VocabularyEntry>>;

    /// All entries, capped at `limit` (initial sync)
    fn query_all(&self, limit: usize, order: QueryOrder) -> Result<Vec<VocabularyEntry>>;

    /// Cheap check that the remote answers at all
    ///
    /// Any response, including an error status, counts as reachable.
    fn is_reachable(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{Context, anyhow};

    #[test]
    fn test_typed_missing_index() {
        let err: anyhow::Error = MissingIndexError::new("FAILED_PRECONDITION").into();
        assert!(is_missing_index(&err));
    }

    #[test]
    fn test_missing_index_through_context() {
        let err = Err::<(), _>(MissingIndexError::new("needs composite"))
            .context("Failed to run query")
            .unwrap_err();
        assert!(is_missing_index(&err));
    }

    #[test]
    fn test_message_mentions_index() {
        let err = anyhow!("The query requires an Index. You can create it here: ...");
        assert!(is_missing_index(&err));
    }

    #[test]
    fn test_unreachable_through_context() {
        let err = Err::<(), _>(UnreachableError::new("connection refused"))
            .context("Failed to send runQuery request")
            .context("Failed to query remote vocabularies")
            .unwrap_err();
        assert!(is_unreachable(&err));
        assert!(!is_missing_index(&err));
        assert!(!is_unreachable(&anyhow!("HTTP 503 UNAVAILABLE")));
    }

    #[test]
    fn test_other_failures() {
        assert!(!is_missing_index(&anyhow!("PERMISSION_DENIED: Missing or insufficient permissions")));
        assert!(!is_missing_index(&anyhow!("connection reset by peer")));
    }
}
