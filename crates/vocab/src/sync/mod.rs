//! Sync engine for pulling vocabulary into the local cache
//!
//! Provides the incremental sync cycle, the remote store abstraction it
//! consumes, and the background triggers that drive it.

mod connectivity;
mod coordinator;
mod manager;
mod remote;

pub use connectivity::{AlwaysOnline, Connectivity, ConnectivityMonitor};
pub use coordinator::{
    SkipReason, SyncCoordinator, SyncMode, SyncOptions, SyncOutcome, SyncStats,
    VOCABULARY_COLLECTION,
};
pub use manager::SyncManager;
pub use remote::{
    MissingIndexError, QueryOrder, RemoteStore, UnreachableError, is_missing_index, is_unreachable,
};
