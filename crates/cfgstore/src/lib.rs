//! # cfgstore
//!
//! A configuration store that keeps nested key/value documents in PHP array
//! source files (`<?php return [...];`), with an optional cache in front of
//! the file system.
//!
//! # Architecture
//!
//! ```text
//! cfgstore
//! ├── application
//! │   └── config_store      – ConfigStore: load, get/set, save, reload
//! └── infrastructure
//!     ├── cache             – ConfigCache seam + MemoryCache
//!     ├── file_backend      – FileBackend seam + FsBackend / MemoryBackend
//!     └── settings          – StoreSettings loaded from TOML
//! ```
//!
//! The document model and the source-form codec live in `cfgstore-core`
//! and are re-exported here.
//!
//! # Quick start
//!
//! ```rust,no_run
//! use cfgstore::ConfigStore;
//!
//! let mut store = ConfigStore::read("config.php", "config");
//! store.set("db.host", "localhost");
//! store.set("db.port", 5432);
//! store.save().expect("config directory must be writable");
//! ```

pub mod application;
pub mod infrastructure;

pub use application::config_store::{ConfigStore, StoreError};
pub use cfgstore_core::{ConfigDocument, ConfigValue, FormatError, Key, ParseError};
pub use infrastructure::cache::{ConfigCache, MemoryCache};
pub use infrastructure::file_backend::{FileBackend, FsBackend, MemoryBackend};
pub use infrastructure::settings::{load_settings, SettingsError, StoreSettings};
