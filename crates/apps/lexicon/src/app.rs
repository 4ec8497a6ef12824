//! Wiring between the local cache, the Firestore client and the sync engine

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use log::{debug, warn};
use vocab::{
    Connectivity, FirebaseConfig, FirestoreClient, RemoteStore, SqliteVocabStore,
    SyncCoordinator, SyncSettings, VocabStore,
};

/// Database filename in the Lexicon config directory
const DB_FILE: &str = "vocab.sqlite";

/// Shared state for one CLI invocation
pub struct LexiconApp {
    pub store: Arc<dyn VocabStore>,
    pub settings: SyncSettings,
    pub db_path: PathBuf,
    /// Explicit Firebase config file, bypassing the usual lookup
    pub firebase_config: Option<PathBuf>,
}

impl LexiconApp {
    /// Open the local cache and load sync settings
    pub fn open(db_override: Option<&Path>, firebase_config: Option<&Path>) -> Result<Self> {
        let db_path = match db_override {
            Some(path) => path.to_path_buf(),
            None => Self::default_db_path()?,
        };

        let store = SqliteVocabStore::new(&db_path)
            .with_context(|| format!("Failed to open vocabulary cache at {}", db_path.display()))?;
        debug!("Opened vocabulary cache at {}", db_path.display());

        let settings = SyncSettings::load().unwrap_or_else(|e| {
            warn!("Invalid sync settings, using defaults: {:#}", e);
            SyncSettings::default()
        });

        Ok(Self {
            store: Arc::new(store),
            settings,
            db_path,
            firebase_config: firebase_config.map(Path::to_path_buf),
        })
    }

    fn default_db_path() -> Result<PathBuf> {
        Ok(config::init()?.path(DB_FILE))
    }

    /// Load the Firebase project settings
    pub fn load_firebase_config(&self) -> Result<FirebaseConfig> {
        if let Some(path) = &self.firebase_config {
            return FirebaseConfig::from_file(path);
        }

        FirebaseConfig::load().map_err(|e| {
            if let Some(path) = FirebaseConfig::default_config_path() {
                warn!(
                    "To configure Firestore access, either:\n\
                     1. Place your Firebase web config at: {}\n\
                     2. Or set environment variables: FIREBASE_PROJECT_ID and FIREBASE_API_KEY",
                    path.display()
                );
            }
            e.context("Firebase project not configured")
        })
    }

    /// Whether a Firebase project can be loaded
    pub fn firebase_available(&self) -> bool {
        match &self.firebase_config {
            Some(path) => path.exists(),
            None => FirebaseConfig::is_available(),
        }
    }

    /// Build a client for the configured collection
    pub fn firestore_client(&self) -> Result<Arc<FirestoreClient>> {
        let firebase = self.load_firebase_config()?;
        Ok(Arc::new(FirestoreClient::new(
            &firebase,
            self.settings.collection.clone(),
            self.settings.request_timeout(),
        )))
    }

    /// Build a coordinator that merges `remote` into the local cache
    pub fn coordinator(
        &self,
        remote: Arc<dyn RemoteStore>,
        connectivity: Arc<dyn Connectivity>,
    ) -> SyncCoordinator {
        SyncCoordinator::new(
            self.store.clone(),
            remote,
            connectivity,
            self.settings.sync_options(),
        )
    }
}
