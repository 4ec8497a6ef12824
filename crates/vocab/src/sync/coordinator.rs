//! Incremental pull of remote vocabulary into the local cache

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use log::{debug, error, info, warn};

use super::connectivity::Connectivity;
use super::remote::{QueryOrder, RemoteStore, is_missing_index, is_unreachable};
use crate::storage::VocabStore;

/// Collection key for vocabulary sync metadata
pub const VOCABULARY_COLLECTION: &str = "vocabularies";

/// Options for the sync engine
#[derive(Debug, Clone)]
pub struct SyncOptions {
    /// Sync metadata key (and remote collection name)
    pub collection: String,
    /// Cap on the first-ever pull
    pub initial_limit: usize,
    /// Cap on the most-recent query used when the incremental query fails
    pub fallback_limit: usize,
    /// Period of the background sync timer
    pub interval: Duration,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            collection: VOCABULARY_COLLECTION.to_string(),
            initial_limit: 500,
            fallback_limit: 50,
            interval: Duration::from_secs(10 * 60),
        }
    }
}

/// Which query a sync cycle ended up using
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncMode {
    /// No cursor yet: bounded pull of everything
    Initial,
    /// Entries updated since the stored cursor
    Incremental,
    /// Most-recent entries after the planned query hit a missing index
    Fallback,
}

/// Statistics from a completed sync cycle
#[derive(Debug, Clone)]
pub struct SyncStats {
    pub mode: SyncMode,
    /// Number of records returned by the remote
    pub records_fetched: usize,
    /// Number of records written to the local store
    pub records_stored: usize,
    /// New cursor, if this cycle advanced it
    pub cursor: Option<DateTime<Utc>>,
    /// Duration of the sync cycle
    pub duration_ms: u64,
}

impl SyncStats {
    fn new(mode: SyncMode) -> Self {
        Self {
            mode,
            records_fetched: 0,
            records_stored: 0,
            cursor: None,
            duration_ms: 0,
        }
    }
}

/// Why a sync request did nothing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    Offline,
    AlreadySyncing,
}

/// Result of one sync request
///
/// Sync never returns `Err` to its caller; failures are reported here so the
/// UI can keep showing cached data.
#[derive(Debug)]
pub enum SyncOutcome {
    Skipped(SkipReason),
    Completed(SyncStats),
    Failed(anyhow::Error),
}

impl SyncOutcome {
    /// True only when the cycle ran and merged (or confirmed) remote state
    pub fn succeeded(&self) -> bool {
        matches!(self, SyncOutcome::Completed(_))
    }

    pub fn stats(&self) -> Option<&SyncStats> {
        match self {
            SyncOutcome::Completed(stats) => Some(stats),
            _ => None,
        }
    }

    /// One-line status suitable for showing to the user
    pub fn user_message(&self) -> String {
        match self {
            SyncOutcome::Completed(stats) if stats.records_stored == 0 => {
                "Vocabulary is up to date".to_string()
            }
            SyncOutcome::Completed(stats) => {
                format!("Updated {} vocabularies", stats.records_stored)
            }
            SyncOutcome::Skipped(SkipReason::Offline) => "Offline, showing cached data".to_string(),
            SyncOutcome::Skipped(SkipReason::AlreadySyncing) => "Sync already in progress".to_string(),
            SyncOutcome::Failed(_) => "Could not refresh, showing cached data".to_string(),
        }
    }
}

/// Holds the in-flight flag for one cycle; clears it on drop, including unwind
struct InFlightGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> InFlightGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self { flag })
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

/// Keeps the local cache eventually consistent with the remote store
///
/// Sync is a one-directional pull: remote records overwrite local records
/// with the same id, and local-only records are left alone. At most one
/// cycle runs at a time; concurrent requests are dropped, not queued.
pub struct SyncCoordinator {
    local: Arc<dyn VocabStore>,
    remote: Arc<dyn RemoteStore>,
    connectivity: Arc<dyn Connectivity>,
    options: SyncOptions,
    in_flight: AtomicBool,
}

impl SyncCoordinator {
    pub fn new(
        local: Arc<dyn VocabStore>,
        remote: Arc<dyn RemoteStore>,
        connectivity: Arc<dyn Connectivity>,
        options: SyncOptions,
    ) -> Self {
        Self {
            local,
            remote,
            connectivity,
            options,
            in_flight: AtomicBool::new(false),
        }
    }

    pub fn options(&self) -> &SyncOptions {
        &self.options
    }

    /// Whether a cycle is currently running
    pub fn is_syncing(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Run one sync cycle
    ///
    /// Blocking: performs remote and local I/O on the calling thread.
    pub fn sync_vocabularies(&self) -> SyncOutcome {
        if !self.connectivity.is_online() {
            debug!("Skipping vocabulary sync: offline");
            return SyncOutcome::Skipped(SkipReason::Offline);
        }

        let Some(_guard) = InFlightGuard::acquire(&self.in_flight) else {
            debug!("Skipping vocabulary sync: a cycle is already running");
            return SyncOutcome::Skipped(SkipReason::AlreadySyncing);
        };

        let start = Instant::now();
        match self.run_cycle() {
            Ok(mut stats) => {
                stats.duration_ms = start.elapsed().as_millis() as u64;
                info!(
                    "Vocabulary sync complete ({:?}): {} fetched, {} stored in {}ms",
                    stats.mode, stats.records_fetched, stats.records_stored, stats.duration_ms
                );
                SyncOutcome::Completed(stats)
            }
            Err(e) => {
                error!("Vocabulary synchronization failed: {:#}", e);
                if is_unreachable(&e) {
                    self.connectivity.report_unreachable();
                }
                SyncOutcome::Failed(e)
            }
        }
    }

    fn run_cycle(&self) -> Result<SyncStats> {
        let collection = &self.options.collection;
        let cursor = self
            .local
            .get_sync_metadata(collection)
            .context("Failed to read sync metadata")?;

        let (mode, result) = match &cursor {
            Some(meta) => {
                debug!("Incremental sync since {}", meta.last_synced_at);
                (
                    SyncMode::Incremental,
                    self.remote
                        .query_updated_since(meta.last_synced_at, QueryOrder::Descending),
                )
            }
            None => {
                info!(
                    "No sync cursor for {}, pulling up to {} records",
                    collection, self.options.initial_limit
                );
                (
                    SyncMode::Initial,
                    self.remote
                        .query_all(self.options.initial_limit, QueryOrder::Descending),
                )
            }
        };

        let records = match result {
            Ok(records) => records,
            Err(e) if is_missing_index(&e) => return self.run_fallback(e),
            Err(e) => return Err(e.context("Failed to query remote vocabularies")),
        };

        let mut stats = SyncStats::new(mode);
        stats.records_fetched = records.len();

        if records.is_empty() {
            info!("No new vocabulary changes found");
        } else {
            info!("Found {} new/updated vocabularies", records.len());
            stats.records_stored = self
                .local
                .bulk_upsert(records)
                .context("Failed to merge remote vocabularies")?;
        }

        // Advance even when nothing changed, so the next cycle stays incremental
        let meta = self
            .local
            .touch_sync_metadata(collection)
            .context("Failed to advance sync cursor")?;
        stats.cursor = Some(meta.last_synced_at);

        Ok(stats)
    }

    /// One bounded most-recent query after the planned query failed
    ///
    /// The cursor is left where it was. Records updated between the old
    /// cursor and the fallback's cutoff are not fetched until the incremental
    /// query succeeds again; while it keeps failing, each cycle only sees the
    /// newest `fallback_limit` changes.
    // TODO: confirm with product whether the fallback should page back to the old cursor
    fn run_fallback(&self, cause: anyhow::Error) -> Result<SyncStats> {
        warn!(
            "Falling back to most-recent query due to index issues: {:#}",
            cause
        );

        let records = match self
            .remote
            .query_most_recent(self.options.fallback_limit, QueryOrder::Descending)
        {
            Ok(records) => records,
            Err(fallback_err) => {
                error!("Fallback query failed: {:#}", fallback_err);
                return Err(cause.context("Incremental and fallback queries both failed"));
            }
        };

        if records.is_empty() {
            return Err(cause.context("Fallback query returned no records"));
        }

        let mut stats = SyncStats::new(SyncMode::Fallback);
        stats.records_fetched = records.len();
        stats.records_stored = self
            .local
            .bulk_upsert(records)
            .context("Failed to merge fallback vocabularies")?;

        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{SyncMetadata, VocabId, VocabularyEntry};
    use crate::storage::InMemoryVocabStore;
    use crate::sync::AlwaysOnline;
    use crate::sync::ConnectivityMonitor;
    use crate::sync::remote::{MissingIndexError, UnreachableError};
    use anyhow::anyhow;
    use chrono::Duration as ChronoDuration;
    use std::sync::Mutex;
    use std::sync::mpsc;

    #[derive(Default)]
    struct Calls {
        updated_since: Vec<DateTime<Utc>>,
        most_recent: Vec<usize>,
        all: Vec<usize>,
    }

    enum Failure {
        None,
        MissingIndex,
        Unreachable,
        Other,
    }

    struct MockRemote {
        records: Vec<VocabularyEntry>,
        primary_failure: Failure,
        fallback_fails: bool,
        calls: Mutex<Calls>,
    }

    impl MockRemote {
        fn with_records(records: Vec<VocabularyEntry>) -> Self {
            Self {
                records,
                primary_failure: Failure::None,
                fallback_fails: false,
                calls: Mutex::new(Calls::default()),
            }
        }

        fn failing(failure: Failure, records: Vec<VocabularyEntry>) -> Self {
            Self {
                primary_failure: failure,
                ..Self::with_records(records)
            }
        }

        fn primary_result(&self) -> Result<Vec<VocabularyEntry>> {
            match self.primary_failure {
                Failure::None => Ok(self.records.clone()),
                Failure::MissingIndex => {
                    Err(MissingIndexError::new("FAILED_PRECONDITION: requires an index").into())
                }
                Failure::Unreachable => Err(UnreachableError::new("connection refused").into()),
                Failure::Other => Err(anyhow!("PERMISSION_DENIED")),
            }
        }

        fn total_calls(&self) -> usize {
            let calls = self.calls.lock().unwrap();
            calls.updated_since.len() + calls.most_recent.len() + calls.all.len()
        }
    }

    impl RemoteStore for MockRemote {
        fn query_updated_since(
            &self,
            since: DateTime<Utc>,
            order: QueryOrder,
        ) -> Result<Vec<VocabularyEntry>> {
            assert_eq!(order, QueryOrder::Descending);
            self.calls.lock().unwrap().updated_since.push(since);
            self.primary_result()
        }

        fn query_most_recent(&self, limit: usize, _order: QueryOrder) -> Result<Vec<VocabularyEntry>> {
            self.calls.lock().unwrap().most_recent.push(limit);
            if self.fallback_fails {
                return Err(anyhow!("UNAVAILABLE"));
            }
            Ok(self.records.iter().take(limit).cloned().collect())
        }

        fn query_all(&self, limit: usize, _order: QueryOrder) -> Result<Vec<VocabularyEntry>> {
            self.calls.lock().unwrap().all.push(limit);
            self.primary_result()
        }
    }

    struct Offline;

    impl Connectivity for Offline {
        fn is_online(&self) -> bool {
            false
        }
    }

    fn entry(id: &str, english: &str) -> VocabularyEntry {
        VocabularyEntry::builder(VocabId::new(id), english, "Verb")
            .bangla("অর্থ")
            .build()
    }

    fn coordinator(
        local: Arc<InMemoryVocabStore>,
        remote: Arc<MockRemote>,
    ) -> SyncCoordinator {
        SyncCoordinator::new(
            local,
            remote,
            Arc::new(AlwaysOnline),
            SyncOptions::default(),
        )
    }

    fn seed_cursor(local: &InMemoryVocabStore, age: ChronoDuration) -> DateTime<Utc> {
        let at = Utc::now() - age;
        local
            .save_sync_metadata(SyncMetadata::new(VOCABULARY_COLLECTION, at))
            .unwrap();
        at
    }

    #[test]
    fn test_offline_is_noop() {
        let local = Arc::new(InMemoryVocabStore::new());
        let remote = Arc::new(MockRemote::with_records(vec![entry("1", "run")]));
        let sync = SyncCoordinator::new(
            local.clone(),
            remote.clone(),
            Arc::new(Offline),
            SyncOptions::default(),
        );

        let outcome = sync.sync_vocabularies();
        assert!(matches!(outcome, SyncOutcome::Skipped(SkipReason::Offline)));
        assert!(!outcome.succeeded());
        assert_eq!(remote.total_calls(), 0);
        assert!(local.get_sync_metadata(VOCABULARY_COLLECTION).unwrap().is_none());
    }

    #[test]
    fn test_initial_sync_is_bounded_and_writes_cursor() {
        let local = Arc::new(InMemoryVocabStore::new());
        let remote = Arc::new(MockRemote::with_records(vec![entry("1", "run"), entry("2", "walk")]));
        let sync = coordinator(local.clone(), remote.clone());

        let outcome = sync.sync_vocabularies();
        assert!(outcome.succeeded());
        let stats = outcome.stats().unwrap();
        assert_eq!(stats.mode, SyncMode::Initial);
        assert_eq!(stats.records_stored, 2);

        assert_eq!(remote.calls.lock().unwrap().all, vec![500]);
        assert_eq!(local.count_entries().unwrap(), 2);
        assert!(local.get_sync_metadata(VOCABULARY_COLLECTION).unwrap().is_some());
    }

    #[test]
    fn test_incremental_uses_cursor() {
        let local = Arc::new(InMemoryVocabStore::new());
        let cursor = seed_cursor(&local, ChronoDuration::hours(1));
        let remote = Arc::new(MockRemote::with_records(vec![entry("3", "jump")]));
        let sync = coordinator(local.clone(), remote.clone());

        let outcome = sync.sync_vocabularies();
        assert_eq!(outcome.stats().unwrap().mode, SyncMode::Incremental);
        assert_eq!(remote.calls.lock().unwrap().updated_since, vec![cursor]);
        assert!(remote.calls.lock().unwrap().all.is_empty());
    }

    #[test]
    fn test_empty_result_still_advances_cursor() {
        let local = Arc::new(InMemoryVocabStore::new());
        let before = seed_cursor(&local, ChronoDuration::minutes(5));
        let remote = Arc::new(MockRemote::with_records(Vec::new()));
        let sync = coordinator(local.clone(), remote);

        let outcome = sync.sync_vocabularies();
        assert!(outcome.succeeded());
        let after = local
            .get_sync_metadata(VOCABULARY_COLLECTION)
            .unwrap()
            .unwrap()
            .last_synced_at;
        assert!(after > before);
    }

    #[test]
    fn test_merge_keeps_local_only_records() {
        let local = Arc::new(InMemoryVocabStore::new());
        local.upsert_entry(entry("local", "draft")).unwrap();
        let mut stale = entry("1", "run");
        stale.bangla = "পুরনো".to_string();
        local.upsert_entry(stale).unwrap();

        let remote = Arc::new(MockRemote::with_records(vec![entry("1", "run")]));
        let sync = coordinator(local.clone(), remote);
        assert!(sync.sync_vocabularies().succeeded());

        assert!(local.has_entry(&VocabId::new("local")).unwrap());
        let merged = local.get_entry(&VocabId::new("1")).unwrap().unwrap();
        assert_eq!(merged.bangla, "অর্থ");
    }

    #[test]
    fn test_missing_index_triggers_single_fallback() {
        let local = Arc::new(InMemoryVocabStore::new());
        let before = seed_cursor(&local, ChronoDuration::hours(1));
        let remote = Arc::new(MockRemote::failing(
            Failure::MissingIndex,
            vec![entry("1", "run"), entry("2", "walk")],
        ));
        let sync = coordinator(local.clone(), remote.clone());

        let outcome = sync.sync_vocabularies();
        assert!(outcome.succeeded());
        assert_eq!(outcome.stats().unwrap().mode, SyncMode::Fallback);
        assert_eq!(remote.calls.lock().unwrap().most_recent, vec![50]);
        assert_eq!(local.count_entries().unwrap(), 2);

        // Fallback does not move the cursor
        let meta = local.get_sync_metadata(VOCABULARY_COLLECTION).unwrap().unwrap();
        assert_eq!(meta.last_synced_at, before);
    }

    #[test]
    fn test_empty_fallback_fails() {
        let local = Arc::new(InMemoryVocabStore::new());
        let remote = Arc::new(MockRemote::failing(Failure::MissingIndex, Vec::new()));
        let sync = coordinator(local, remote.clone());

        assert!(matches!(sync.sync_vocabularies(), SyncOutcome::Failed(_)));
        assert_eq!(remote.calls.lock().unwrap().most_recent.len(), 1);
    }

    #[test]
    fn test_failed_fallback_fails() {
        let local = Arc::new(InMemoryVocabStore::new());
        let mut remote = MockRemote::failing(Failure::MissingIndex, vec![entry("1", "run")]);
        remote.fallback_fails = true;
        let remote = Arc::new(remote);
        let sync = coordinator(local.clone(), remote.clone());

        assert!(!sync.sync_vocabularies().succeeded());
        assert_eq!(remote.calls.lock().unwrap().most_recent.len(), 1);
        assert_eq!(local.count_entries().unwrap(), 0);
    }

    #[test]
    fn test_other_failure_has_no_fallback() {
        let local = Arc::new(InMemoryVocabStore::new());
        let before = seed_cursor(&local, ChronoDuration::hours(1));
        let remote = Arc::new(MockRemote::failing(Failure::Other, vec![entry("1", "run")]));
        let sync = coordinator(local.clone(), remote.clone());

        let outcome = sync.sync_vocabularies();
        assert!(matches!(outcome, SyncOutcome::Failed(_)));
        assert_eq!(outcome.user_message(), "Could not refresh, showing cached data");
        assert!(remote.calls.lock().unwrap().most_recent.is_empty());

        let meta = local.get_sync_metadata(VOCABULARY_COLLECTION).unwrap().unwrap();
        assert_eq!(meta.last_synced_at, before);
        assert!(!sync.is_syncing());
    }

    /// Remote whose query blocks until the test releases it
    #[test]
    fn test_unreachable_remote_marks_offline() {
        let local = Arc::new(InMemoryVocabStore::new());
        let remote = Arc::new(MockRemote::failing(Failure::Unreachable, Vec::new()));
        let monitor = Arc::new(ConnectivityMonitor::new(true));
        let sync = SyncCoordinator::new(
            local,
            remote.clone(),
            monitor.clone(),
            SyncOptions::default(),
        );

        assert!(matches!(sync.sync_vocabularies(), SyncOutcome::Failed(_)));
        assert!(!monitor.is_online());

        // Further cycles are skipped until connectivity returns
        let outcome = sync.sync_vocabularies();
        assert!(matches!(outcome, SyncOutcome::Skipped(SkipReason::Offline)));
        assert_eq!(remote.total_calls(), 1);
    }

    #[test]
    fn test_server_error_keeps_online() {
        let remote = Arc::new(MockRemote::failing(Failure::Other, Vec::new()));
        let monitor = Arc::new(ConnectivityMonitor::new(true));
        let sync = SyncCoordinator::new(
            Arc::new(InMemoryVocabStore::new()),
            remote,
            monitor.clone(),
            SyncOptions::default(),
        );

        assert!(matches!(sync.sync_vocabularies(), SyncOutcome::Failed(_)));
        assert!(monitor.is_online());
    }

    /// Store whose entry writes always fail, backed by an in-memory store
    struct ReadOnlyStore {
        inner: InMemoryVocabStore,
    }

    impl VocabStore for ReadOnlyStore {
        fn upsert_entry(&self, _entry: VocabularyEntry) -> Result<()> {
            Err(anyhow!("database is locked"))
        }

        fn bulk_upsert(&self, _entries: Vec<VocabularyEntry>) -> Result<usize> {
            Err(anyhow!("database is locked"))
        }

        fn get_entry(&self, id: &VocabId) -> Result<Option<VocabularyEntry>> {
            self.inner.get_entry(id)
        }

        fn delete_entry(&self, id: &VocabId) -> Result<bool> {
            self.inner.delete_entry(id)
        }

        fn get_all(&self) -> Result<Vec<VocabularyEntry>> {
            self.inner.get_all()
        }

        fn list_entries(&self, limit: usize, offset: usize) -> Result<Vec<VocabularyEntry>> {
            self.inner.list_entries(limit, offset)
        }

        fn list_by_part_of_speech(
            &self,
            part_of_speech: &str,
            limit: usize,
            offset: usize,
        ) -> Result<Vec<VocabularyEntry>> {
            self.inner.list_by_part_of_speech(part_of_speech, limit, offset)
        }

        fn count_entries(&self) -> Result<usize> {
            self.inner.count_entries()
        }

        fn clear(&self) -> Result<()> {
            self.inner.clear()
        }

        fn clear_entries(&self) -> Result<()> {
            self.inner.clear_entries()
        }

        fn get_sync_metadata(&self, key: &str) -> Result<Option<SyncMetadata>> {
            self.inner.get_sync_metadata(key)
        }

        fn save_sync_metadata(&self, metadata: SyncMetadata) -> Result<()> {
            self.inner.save_sync_metadata(metadata)
        }

        fn delete_sync_metadata(&self, key: &str) -> Result<()> {
            self.inner.delete_sync_metadata(key)
        }
    }

    #[test]
    fn test_local_write_failure_keeps_cursor() {
        let local = Arc::new(ReadOnlyStore {
            inner: InMemoryVocabStore::new(),
        });
        let before = seed_cursor(&local.inner, ChronoDuration::hours(1));
        let remote = Arc::new(MockRemote::with_records(vec![entry("1", "run")]));
        let sync = SyncCoordinator::new(
            local.clone(),
            remote,
            Arc::new(AlwaysOnline),
            SyncOptions::default(),
        );

        let outcome = sync.sync_vocabularies();
        assert!(!outcome.succeeded());
        match &outcome {
            SyncOutcome::Failed(e) => assert!(format!("{:#}", e).contains("database is locked")),
            other => panic!("expected failure, got {:?}", other),
        }

        let meta = local.get_sync_metadata(VOCABULARY_COLLECTION).unwrap().unwrap();
        assert_eq!(meta.last_synced_at, before);
        assert!(!sync.is_syncing());
    }

    #[test]
    fn test_initial_write_failure_leaves_no_cursor() {
        let local = Arc::new(ReadOnlyStore {
            inner: InMemoryVocabStore::new(),
        });
        let remote = Arc::new(MockRemote::with_records(vec![entry("1", "run")]));
        let sync = SyncCoordinator::new(
            local.clone(),
            remote,
            Arc::new(AlwaysOnline),
            SyncOptions::default(),
        );

        assert!(matches!(sync.sync_vocabularies(), SyncOutcome::Failed(_)));
        assert!(local.get_sync_metadata(VOCABULARY_COLLECTION).unwrap().is_none());
        assert!(!sync.is_syncing());
    }

    struct BlockingRemote {
        entered: Mutex<mpsc::Sender<()>>,
        release: Mutex<mpsc::Receiver<()>>,
        calls: Mutex<usize>,
    }

    impl RemoteStore for BlockingRemote {
        fn query_updated_since(&self, _: DateTime<Utc>, _: QueryOrder) -> Result<Vec<VocabularyEntry>> {
            unreachable!("no cursor in this test")
        }

        fn query_most_recent(&self, _: usize, _: QueryOrder) -> Result<Vec<VocabularyEntry>> {
            unreachable!("no fallback in this test")
        }

        fn query_all(&self, _: usize, _: QueryOrder) -> Result<Vec<VocabularyEntry>> {
            *self.calls.lock().unwrap() += 1;
            self.entered.lock().unwrap().send(()).unwrap();
            self.release.lock().unwrap().recv().unwrap();
            Ok(Vec::new())
        }
    }

    #[test]
    fn test_concurrent_request_is_dropped() {
        let (entered_tx, entered_rx) = mpsc::channel();
        let (release_tx, release_rx) = mpsc::channel();
        let remote = Arc::new(BlockingRemote {
            entered: Mutex::new(entered_tx),
            release: Mutex::new(release_rx),
            calls: Mutex::new(0),
        });
        let sync = SyncCoordinator::new(
            Arc::new(InMemoryVocabStore::new()),
            remote.clone(),
            Arc::new(AlwaysOnline),
            SyncOptions::default(),
        );

        std::thread::scope(|s| {
            let first = s.spawn(|| sync.sync_vocabularies());

            entered_rx.recv().unwrap();
            assert!(sync.is_syncing());
            let second = sync.sync_vocabularies();
            assert!(matches!(second, SyncOutcome::Skipped(SkipReason::AlreadySyncing)));

            release_tx.send(()).unwrap();
            assert!(first.join().unwrap().succeeded());
        });

        assert_eq!(*remote.calls.lock().unwrap(), 1);
        assert!(!sync.is_syncing());
    }
}
