//! Lexicon configuration directory
//!
//! Every Lexicon file (Firebase project settings, sync tuning, the local
//! vocabulary cache) lives in one directory: `$LEXICON_CONFIG_DIR` when set,
//! otherwise `~/.config/lexicon/`.
//!
//! Call [`init`] at application startup to bootstrap the directory.

use anyhow::{Context, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};

/// Environment variable that relocates the config directory
pub const CONFIG_DIR_ENV: &str = "LEXICON_CONFIG_DIR";

/// Name of the application directory inside the platform config dir
const APP_DIR: &str = "lexicon";

/// A directory of JSON settings files
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigDir {
    root: PathBuf,
}

impl ConfigDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The Lexicon directory, honoring [`CONFIG_DIR_ENV`]
    pub fn locate() -> Option<Self> {
        if let Some(root) = std::env::var_os(CONFIG_DIR_ENV).filter(|v| !v.is_empty()) {
            return Some(Self::new(root));
        }
        dirs::config_dir().map(|p| Self::new(p.join(APP_DIR)))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path(&self, filename: &str) -> PathBuf {
        self.root.join(filename)
    }

    pub fn exists(&self, filename: &str) -> bool {
        self.path(filename).exists()
    }

    /// Create the directory (and parents) if missing
    pub fn ensure(&self) -> Result<()> {
        std::fs::create_dir_all(&self.root)
            .with_context(|| format!("Failed to create config directory: {}", self.root.display()))
    }

    pub fn load<T: DeserializeOwned>(&self, filename: &str) -> Result<T> {
        load_json_file(&self.path(filename))
    }

    /// Load `filename`, or `T::default()` when it doesn't exist
    pub fn load_or_default<T: DeserializeOwned + Default>(&self, filename: &str) -> Result<T> {
        if self.exists(filename) {
            self.load(filename)
        } else {
            Ok(T::default())
        }
    }

    /// Write `value` as pretty JSON, replacing any existing file
    ///
    /// Writes to a sibling temp file first so readers never see a partial file.
    pub fn save<T: Serialize>(&self, filename: &str, value: &T) -> Result<PathBuf> {
        self.ensure()?;
        let path = self.path(filename);
        let tmp = self.path(&format!(".{}.tmp", filename));

        let content = serde_json::to_string_pretty(value)
            .with_context(|| format!("Failed to serialize {}", filename))?;
        std::fs::write(&tmp, content)
            .with_context(|| format!("Failed to write config file: {}", tmp.display()))?;
        std::fs::rename(&tmp, &path)
            .with_context(|| format!("Failed to replace config file: {}", path.display()))?;
        Ok(path)
    }
}

/// Create the Lexicon config directory if needed and return it
pub fn init() -> Result<ConfigDir> {
    let dir = ConfigDir::locate().context("Could not determine config directory")?;
    dir.ensure()?;
    Ok(dir)
}

/// Get the Lexicon config directory
pub fn config_dir() -> Option<PathBuf> {
    ConfigDir::locate().map(|d| d.root)
}

/// Get the path to a file within the Lexicon config directory
pub fn config_path(filename: &str) -> Option<PathBuf> {
    ConfigDir::locate().map(|d| d.path(filename))
}

/// Check if a file exists in the Lexicon config directory
pub fn config_exists(filename: &str) -> bool {
    ConfigDir::locate().is_some_and(|d| d.exists(filename))
}

/// Load and parse a JSON file from the Lexicon config directory
pub fn load_json<T: DeserializeOwned>(filename: &str) -> Result<T> {
    ConfigDir::locate()
        .context("Could not determine config directory")?
        .load(filename)
}

/// Load a JSON file from the Lexicon config directory, or `T::default()`
pub fn load_json_or_default<T: DeserializeOwned + Default>(filename: &str) -> Result<T> {
    match ConfigDir::locate() {
        Some(dir) => dir.load_or_default(filename),
        None => Ok(T::default()),
    }
}

/// Save a value as JSON in the Lexicon config directory
pub fn save_json<T: Serialize>(filename: &str, value: &T) -> Result<PathBuf> {
    init()?.save(filename, value)
}

/// Load and parse a JSON file from an arbitrary path
pub fn load_json_file<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Default, Serialize, Deserialize, PartialEq)]
    struct Sample {
        #[serde(default)]
        interval: u32,
    }

    #[test]
    fn test_paths() {
        let dir = ConfigDir::new("/tmp/lexicon-test");
        assert_eq!(dir.root(), Path::new("/tmp/lexicon-test"));
        assert!(dir.path("sync.json").ends_with("lexicon-test/sync.json"));
    }

    #[test]
    fn test_save_and_load() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = ConfigDir::new(tmp.path().join("nested"));

        assert!(!dir.exists("sample.json"));
        let path = dir.save("sample.json", &Sample { interval: 15 }).unwrap();
        assert!(path.exists());
        assert!(!dir.exists(".sample.json.tmp"));

        let sample: Sample = dir.load("sample.json").unwrap();
        assert_eq!(sample, Sample { interval: 15 });
    }

    #[test]
    fn test_load_or_default() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = ConfigDir::new(tmp.path());

        let sample: Sample = dir.load_or_default("missing.json").unwrap();
        assert_eq!(sample, Sample::default());

        std::fs::write(dir.path("bad.json"), "{ not json").unwrap();
        assert!(dir.load_or_default::<Sample>("bad.json").is_err());
    }

    #[test]
    fn test_load_json_file_missing() {
        let tmp = tempfile::tempdir().unwrap();
        let result: Result<Sample> = load_json_file(&tmp.path().join("missing.json"));
        assert!(result.is_err());
    }
}
