//! ConfigStore: a config document bound to a file, a backend and a cache.
//!
//! # Cache-aside (for beginners)
//!
//! Reading a file and parsing it is far slower than a memory lookup, so the
//! store keeps parsed documents in an optional [`ConfigCache`]:
//!
//! ```text
//! load(name):  cache hit? ──yes──► return cached document
//!                  │no
//!                  ▼
//!              read + parse config_dir/name ──► non-empty? ──► cache it
//!
//! save(name):  delete cache entry ──► fix permissions ──► render ──► write
//! ```
//!
//! The cache is invalidated *before* the write, so a reader can never be
//! served the old document after the file has changed.  Cache keys are the
//! lower-cased file names.
//!
//! # Keys and paths
//!
//! `get`, `set`, `remove` and `has` accept either a top-level key or a
//! dot-separated path such as `"db.host"`.  An exact top-level key wins over
//! path traversal, so a key literally named `"a.b"` stays reachable.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use cfgstore_core::{parse_document, ConfigDocument, ConfigValue, FormatError, Serializer};
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::infrastructure::cache::ConfigCache;
use crate::infrastructure::file_backend::{FileBackend, FsBackend};
use crate::infrastructure::settings::StoreSettings;

/// Errors returned when persisting a document.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The document contains a value with no literal form.
    #[error("failed to render config document: {0}")]
    Format(#[from] FormatError),

    /// The backend refused or failed the write.
    #[error("failed to write config file {path}: {source}")]
    FileWriteFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Comments registered on every new store.
const DEFAULT_COMMENTS: [(&str, &str); 2] = [
    ("db", "database settings"),
    ("settings", "application settings"),
];

/// A named config file loaded into memory.
pub struct ConfigStore {
    settings: StoreSettings,
    cache: Option<Arc<dyn ConfigCache>>,
    files: Arc<dyn FileBackend>,
    serializer: Serializer,
    document: ConfigDocument,
}

impl ConfigStore {
    /// Creates a store for `settings.file_name` in `settings.config_dir` and
    /// loads it immediately (through the cache when one is given).
    pub fn new(
        settings: StoreSettings,
        cache: Option<Arc<dyn ConfigCache>>,
        files: Arc<dyn FileBackend>,
    ) -> Self {
        let mut serializer = Serializer::new().with_tab_width(settings.tab_width);
        for (key, comment) in DEFAULT_COMMENTS {
            serializer.comments_mut().set(key, comment);
        }

        let mut store = Self {
            settings,
            cache,
            files,
            serializer,
            document: ConfigDocument::new(),
        };
        store.document = store.load(&store.settings.file_name, true);
        store
    }

    /// Loads `file_name` from `config_dir` on the real file system, without a
    /// cache.
    pub fn read(file_name: &str, config_dir: impl Into<PathBuf>) -> Self {
        let settings = StoreSettings {
            file_name: file_name.to_string(),
            ..StoreSettings::for_dir(config_dir)
        };
        Self::new(settings, None, Arc::new(FsBackend::new()))
    }

    // ── Locations ────────────────────────────────────────────────────────────

    pub fn file_name(&self) -> &str {
        &self.settings.file_name
    }

    pub fn config_dir(&self) -> &Path {
        &self.settings.config_dir
    }

    /// Full path of the store's own file.
    pub fn config_file(&self) -> PathBuf {
        self.path_for(&self.settings.file_name)
    }

    /// Changes the directory used by subsequent loads and saves.  The current
    /// document is kept as is.
    pub fn set_config_dir(&mut self, dir: impl Into<PathBuf>) {
        self.settings.config_dir = dir.into();
    }

    pub fn has_file(&self, file_name: &str) -> bool {
        self.files.exists(&self.path_for(file_name))
    }

    fn path_for(&self, file_name: &str) -> PathBuf {
        self.settings.config_dir.join(file_name)
    }

    // ── Loading ──────────────────────────────────────────────────────────────

    /// Loads `file_name` and returns its document.  The store's own document
    /// is not changed.
    ///
    /// A missing, unreadable or unparseable file yields an empty document.
    /// With `use_cache` a cached document short-circuits the read; a freshly
    /// read non-empty document is cached whenever a cache is present.
    pub fn load(&self, file_name: &str, use_cache: bool) -> ConfigDocument {
        let cache_key = cache_key(file_name);

        if let Some(cache) = self.cache.as_deref().filter(|_| use_cache) {
            if let Some(document) = cache.fetch(&cache_key) {
                debug!(key = %cache_key, "config cache hit");
                return document;
            }
            debug!(key = %cache_key, "config cache miss");
        }

        let document = self.read_file(&self.path_for(file_name));

        if let Some(cache) = self.cache.as_deref() {
            if !document.is_empty() {
                cache.save(&cache_key, &document, self.settings.cache_ttl());
                debug!(key = %cache_key, entries = document.len(), "config cache populated");
            }
        }
        document
    }

    /// Drops the cached copy of the store's file and loads it again.
    pub fn reload(&mut self, use_cache: bool) {
        self.invalidate(&self.settings.file_name);
        self.document = self.load(&self.settings.file_name, use_cache);
    }

    /// Loads a JSON file from the config directory.  Anything but a JSON
    /// object yields an empty document.
    pub fn load_json_file(&self, file_name: &str) -> ConfigDocument {
        let path = self.path_for(file_name);
        let bytes = match self.files.read(&path) {
            Ok(bytes) => bytes,
            Err(e) => {
                debug!(file = %path.display(), error = %e, "JSON config file unreadable");
                return ConfigDocument::new();
            }
        };
        match serde_json::from_slice(&bytes) {
            Ok(value) => ConfigDocument::from_json(value).unwrap_or_default(),
            Err(e) => {
                warn!(file = %path.display(), error = %e, "JSON config file could not be parsed");
                ConfigDocument::new()
            }
        }
    }

    fn read_file(&self, path: &Path) -> ConfigDocument {
        if !self.files.exists(path) {
            debug!(file = %path.display(), "config file not found; using an empty document");
            return ConfigDocument::new();
        }
        let bytes = match self.files.read(path) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(file = %path.display(), error = %e, "config file unreadable");
                return ConfigDocument::new();
            }
        };
        let text = match String::from_utf8(bytes) {
            Ok(text) => text,
            Err(e) => {
                warn!(file = %path.display(), error = %e, "config file is not valid UTF-8");
                return ConfigDocument::new();
            }
        };
        match parse_document(&text) {
            Ok(document) => document,
            Err(e) => {
                warn!(file = %path.display(), error = %e, "config file could not be parsed");
                ConfigDocument::new()
            }
        }
    }

    // ── Values ───────────────────────────────────────────────────────────────

    pub fn get(&self, key: &str) -> Option<&ConfigValue> {
        self.document.get_path(key)
    }

    /// Returns the value at `key`, or `default` when absent.
    pub fn get_or(&self, key: &str, default: impl Into<ConfigValue>) -> ConfigValue {
        self.get(key).cloned().unwrap_or_else(|| default.into())
    }

    pub fn has(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Sets `key` (or a dotted path) to `value`, returning the previous value.
    /// Missing intermediate documents are created.
    pub fn set(&mut self, key: &str, value: impl Into<ConfigValue>) -> Option<ConfigValue> {
        self.document.set_path(key, value)
    }

    pub fn remove(&mut self, key: &str) -> Option<ConfigValue> {
        self.document.remove_path(key)
    }

    pub fn document(&self) -> &ConfigDocument {
        &self.document
    }

    pub fn document_mut(&mut self) -> &mut ConfigDocument {
        &mut self.document
    }

    pub fn into_document(self) -> ConfigDocument {
        self.document
    }

    // ── Access lists ─────────────────────────────────────────────────────────

    /// Replaces the list of keys callers should not read.
    pub fn set_read_protected_keys(&mut self, keys: Vec<String>) {
        self.settings.read_protected_keys = keys;
    }

    /// Replaces the list of keys callers should not modify.
    pub fn set_write_protected_keys(&mut self, keys: Vec<String>) {
        self.settings.write_protected_keys = keys;
    }

    pub fn has_read_access(&self, key: &str) -> bool {
        !self.settings.read_protected_keys.iter().any(|k| k == key)
    }

    pub fn has_write_access(&self, key: &str) -> bool {
        !self.settings.write_protected_keys.iter().any(|k| k == key)
    }

    // ── Comments ─────────────────────────────────────────────────────────────

    /// Attaches a one-line comment to the top-level `key`, written above it
    /// on the next save.
    pub fn set_comment(&mut self, comment: &str, key: &str) {
        self.serializer.comments_mut().set(key, comment);
    }

    pub fn comment(&self, key: &str) -> Option<&str> {
        self.serializer.comments().get(key)
    }

    // ── Saving ───────────────────────────────────────────────────────────────

    /// Writes the current document to the store's own file.
    ///
    /// # Errors
    ///
    /// See [`save_with`](Self::save_with).
    pub fn save(&self) -> Result<(), StoreError> {
        self.save_with(&self.settings.file_name, &self.document)
    }

    /// Writes `document` to `file_name` in the config directory.
    ///
    /// The cache entry for `file_name` is deleted first.  A file that is not
    /// writable gets one attempt at fixing its permissions; if that fails the
    /// write is attempted anyway.
    ///
    /// # Errors
    ///
    /// - [`StoreError::Format`] if the document holds a value with no literal
    ///   form.  Nothing is written.
    /// - [`StoreError::FileWriteFailed`] if the backend write fails.
    pub fn save_with(&self, file_name: &str, document: &ConfigDocument) -> Result<(), StoreError> {
        self.invalidate(file_name);

        let path = self.path_for(file_name);
        if !self.files.is_writable(&path) {
            if let Err(e) = self.files.set_writable(&path) {
                warn!(file = %path.display(), error = %e, "could not make config file writable");
            }
        }

        let text = self.serializer.render(document)?;
        self.files.write(&path, &text).map_err(|source| {
            error!(file = %path.display(), error = %source, "config file write failed");
            StoreError::FileWriteFailed {
                path: path.clone(),
                source,
            }
        })?;

        info!(file = %path.display(), entries = document.len(), "config file saved");
        Ok(())
    }

    fn invalidate(&self, file_name: &str) {
        if let Some(cache) = self.cache.as_deref() {
            let cache_key = cache_key(file_name);
            cache.delete(&cache_key);
            debug!(key = %cache_key, "config cache entry invalidated");
        }
    }
}

fn cache_key(file_name: &str) -> String {
    file_name.to_lowercase()
}

// ── Tests ─────────────────────────────────────────────────────────────────────
