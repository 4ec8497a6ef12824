//! Configuration loading for vocabulary services
//!
//! Firebase project settings are loaded from (in order of priority):
//! 1. Compile-time embedded values (for production builds)
//! 2. JSON file (Firebase console web-app config format)
//! 3. Runtime environment variables (fallback)
//!
//! Sync tuning lives in a separate optional `sync.json`.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::sync::{SyncOptions, VOCABULARY_COLLECTION};

/// Firebase config filename in the Lexicon config directory
const FIREBASE_FILE: &str = "firebase.json";

/// Sync settings filename in the Lexicon config directory
const SYNC_FILE: &str = "sync.json";

const DEFAULT_DATABASE: &str = "(default)";

/// Connection settings for the remote Firestore project
#[derive(Debug, Clone)]
pub struct FirebaseConfig {
    pub project_id: String,
    /// Web API key, sent as `?key=`
    pub api_key: Option<String>,
    /// Firebase Auth ID token, sent as a bearer token
    pub id_token: Option<String>,
    /// Database ID, usually "(default)"
    pub database: String,
    /// Override for the REST endpoint (emulator)
    pub base_url: Option<String>,
}

/// Firebase console web-app config format
///
/// Unknown console fields (authDomain, storageBucket, ...) are ignored.
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FirebaseConfigFile {
    project_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    api_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    id_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    database: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    emulator_host: Option<String>,
    /// Full REST base URL; wins over `emulatorHost`
    #[serde(skip_serializing_if = "Option::is_none")]
    base_url: Option<String>,
}

impl FirebaseConfig {
    /// Load config using the following priority:
    /// 1. Compile-time embedded values
    /// 2. JSON file (~/.config/lexicon/firebase.json)
    /// 3. Runtime environment variables
    pub fn load() -> Result<Self> {
        if let Some(config) = Self::from_compile_time() {
            return Ok(config);
        }

        if config::config_exists(FIREBASE_FILE) {
            let file: FirebaseConfigFile = config::load_json(FIREBASE_FILE)?;
            return Ok(Self::from_config_file(file));
        }

        Self::from_env()
    }

    /// Load values embedded at compile time via environment variables.
    /// Build with: FIREBASE_PROJECT_ID=xxx FIREBASE_API_KEY=yyy cargo build --release
    pub fn from_compile_time() -> Option<Self> {
        let project_id = option_env!("FIREBASE_PROJECT_ID")?;
        if project_id.is_empty() {
            return None;
        }

        Some(Self {
            project_id: project_id.to_string(),
            api_key: option_env!("FIREBASE_API_KEY")
                .filter(|k| !k.is_empty())
                .map(str::to_string),
            id_token: None,
            database: DEFAULT_DATABASE.to_string(),
            base_url: None,
        })
    }

    /// Load config from a specific JSON file
    pub fn from_file(path: &Path) -> Result<Self> {
        let file: FirebaseConfigFile = config::load_json_file(path)?;
        Ok(Self::from_config_file(file))
    }

    /// Parse config from a JSON string (Firebase console format)
    pub fn from_json(json: &str) -> Result<Self> {
        let file: FirebaseConfigFile =
            serde_json::from_str(json).context("Failed to parse Firebase config JSON")?;
        Ok(Self::from_config_file(file))
    }

    fn from_config_file(file: FirebaseConfigFile) -> Self {
        Self {
            project_id: file.project_id,
            api_key: file.api_key,
            id_token: file.id_token,
            database: file.database.unwrap_or_else(|| DEFAULT_DATABASE.to_string()),
            base_url: file.base_url.or(file.emulator_host.map(emulator_base_url)),
        }
    }

    /// Write this config to ~/.config/lexicon/firebase.json
    pub fn save(&self) -> Result<PathBuf> {
        let file = FirebaseConfigFile {
            project_id: self.project_id.clone(),
            api_key: self.api_key.clone(),
            id_token: self.id_token.clone(),
            database: Some(self.database.clone()),
            emulator_host: None,
            base_url: self.base_url.clone(),
        };
        config::save_json(FIREBASE_FILE, &file)
    }

    /// Config for a project with default database and endpoint
    pub fn new(project_id: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            api_key: None,
            id_token: None,
            database: DEFAULT_DATABASE.to_string(),
            base_url: None,
        }
    }

    /// Point at a local Firestore emulator ("host:port")
    pub fn with_emulator(mut self, host: impl Into<String>) -> Self {
        self.base_url = Some(emulator_base_url(host.into()));
        self
    }

    /// Load config from environment variables
    ///
    /// Honors `FIRESTORE_EMULATOR_HOST` the way the Firebase SDKs do.
    pub fn from_env() -> Result<Self> {
        let project_id = std::env::var("FIREBASE_PROJECT_ID")
            .context("FIREBASE_PROJECT_ID environment variable not set")?;

        Ok(Self {
            project_id,
            api_key: std::env::var("FIREBASE_API_KEY").ok(),
            id_token: std::env::var("FIREBASE_ID_TOKEN").ok(),
            database: std::env::var("FIREBASE_DATABASE")
                .unwrap_or_else(|_| DEFAULT_DATABASE.to_string()),
            base_url: std::env::var("FIRESTORE_EMULATOR_HOST")
                .ok()
                .map(emulator_base_url),
        })
    }

    /// Get the default config file path (~/.config/lexicon/firebase.json)
    pub fn default_config_path() -> Option<PathBuf> {
        config::config_path(FIREBASE_FILE)
    }

    /// Check if a Firebase project is configured (compile-time, file, or env vars)
    pub fn is_available() -> bool {
        if Self::from_compile_time().is_some() {
            return true;
        }
        if config::config_exists(FIREBASE_FILE) {
            return true;
        }
        std::env::var("FIREBASE_PROJECT_ID").is_ok()
    }
}

fn emulator_base_url(host: String) -> String {
    format!("http://{}/v1", host.trim_end_matches('/'))
}

/// Tunables for the sync engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SyncSettings {
    pub collection: String,
    pub interval_minutes: u64,
    pub initial_limit: usize,
    pub fallback_limit: usize,
    pub request_timeout_secs: u64,
    /// Seconds between reachability checks while watching
    pub reachability_check_secs: u64,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            collection: VOCABULARY_COLLECTION.to_string(),
            interval_minutes: 10,
            initial_limit: 500,
            fallback_limit: 50,
            request_timeout_secs: 30,
            reachability_check_secs: 30,
        }
    }
}

impl SyncSettings {
    /// Load settings from ~/.config/lexicon/sync.json, or defaults if absent
    pub fn load() -> Result<Self> {
        config::load_json_or_default(SYNC_FILE)
    }

    /// Write settings to ~/.config/lexicon/sync.json
    pub fn save(&self) -> Result<PathBuf> {
        config::save_json(SYNC_FILE, self)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn reachability_check_interval(&self) -> Duration {
        Duration::from_secs(self.reachability_check_secs)
    }

    pub fn sync_options(&self) -> SyncOptions {
        SyncOptions {
            collection: self.collection.clone(),
            initial_limit: self.initial_limit,
            fallback_limit: self.fallback_limit,
            interval: Duration::from_secs(self.interval_minutes * 60),
        }
    }
}
