//! Sync cursor tracking for incremental vocabulary sync

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Record of the last successful sync for one collection
///
/// Persisted separately from entries. Absent until the first successful
/// sync; only ever moves forward.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncMetadata {
    /// Collection key, e.g. "vocabularies"
    pub key: String,
    /// When the last successful sync completed
    #[serde(with = "super::timestamp")]
    pub last_synced_at: DateTime<Utc>,
}

impl SyncMetadata {
    pub fn new(key: impl Into<String>, last_synced_at: DateTime<Utc>) -> Self {
        Self {
            key: key.into(),
            last_synced_at,
        }
    }

    /// Metadata stamped with the current time
    pub fn now(key: impl Into<String>) -> Self {
        Self::new(key, Utc::now())
    }

    /// Age of the cursor relative to now
    pub fn age(&self) -> chrono::Duration {
        Utc::now() - self.last_synced_at
    }
}
