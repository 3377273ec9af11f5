//! TOML-based settings for a [`ConfigStore`](crate::ConfigStore).
//!
//! Settings describe *where* the store keeps its files and *how* it writes
//! them; they are separate from the config documents the store manages.
//!
//! ```toml
//! config_dir = "/var/www/app/config"
//! file_name = "config.php"
//! cache_ttl_secs = 600
//! tab_width = 4
//! read_protected_keys = ["db"]
//! write_protected_keys = ["db", "settings"]
//! ```
//!
//! # Serde default values
//!
//! Every field carries `#[serde(default = "some_fn")]`, so an empty TOML file
//! (or no file at all) yields the same values as [`StoreSettings::default`].

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error type for settings file operations.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// A file system I/O error occurred.
    #[error("I/O error reading settings at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The TOML content could not be parsed.
    #[error("failed to parse settings TOML: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Store configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoreSettings {
    /// Directory the config files live in.
    #[serde(default = "default_config_dir")]
    pub config_dir: PathBuf,
    /// File loaded at construction and written by `save()`.
    #[serde(default = "default_file_name")]
    pub file_name: String,
    /// Lifetime of cached documents, in seconds.
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,
    /// Width of one tab stop used to align `=>` columns.
    #[serde(default = "default_tab_width")]
    pub tab_width: usize,
    /// Top-level keys callers must not read.
    #[serde(default)]
    pub read_protected_keys: Vec<String>,
    /// Top-level keys callers must not modify.
    #[serde(default)]
    pub write_protected_keys: Vec<String>,
}

// ── Default helpers ───────────────────────────────────────────────────────────

fn default_config_dir() -> PathBuf {
    PathBuf::from("config")
}
fn default_file_name() -> String {
    "config.php".to_string()
}
fn default_cache_ttl_secs() -> u64 {
    3600
}
fn default_tab_width() -> usize {
    cfgstore_core::DEFAULT_TAB_WIDTH
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            config_dir: default_config_dir(),
            file_name: default_file_name(),
            cache_ttl_secs: default_cache_ttl_secs(),
            tab_width: default_tab_width(),
            read_protected_keys: Vec::new(),
            write_protected_keys: Vec::new(),
        }
    }
}

impl StoreSettings {
    /// Settings for `config_dir` with every other field at its default.
    pub fn for_dir(config_dir: impl Into<PathBuf>) -> Self {
        Self {
            config_dir: config_dir.into(),
            ..Self::default()
        }
    }

    /// Parses settings from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::Parse`] if the TOML is malformed.
    pub fn from_toml_str(text: &str) -> Result<Self, SettingsError> {
        Ok(toml::from_str(text)?)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }
}

/// Loads settings from `path`, returning [`StoreSettings::default`] if the
/// file does not exist.
///
/// # Errors
///
/// Returns [`SettingsError::Io`] for file-system errors other than "not found",
/// and [`SettingsError::Parse`] if the TOML is malformed.
pub fn load_settings(path: &Path) -> Result<StoreSettings, SettingsError> {
    match std::fs::read_to_string(path) {
        Ok(content) => StoreSettings::from_toml_str(&content),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(StoreSettings::default()),
        Err(e) => Err(SettingsError::Io {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
