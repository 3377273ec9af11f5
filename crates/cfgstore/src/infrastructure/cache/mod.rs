//! Document cache seam.
//!
//! A [`ConfigStore`](crate::ConfigStore) consults its cache before touching the
//! file system (cache-aside) and invalidates the entry before every write.
//! Keys are lower-cased file names; the store performs the lower-casing.

use std::time::Duration;

use cfgstore_core::ConfigDocument;

pub mod memory;

pub use memory::MemoryCache;

/// Key/value cache for parsed documents.
///
/// Implementations must be safe to share between threads; all methods take
/// `&self`.
pub trait ConfigCache: Send + Sync {
    /// Returns the cached document for `key`, or `None` on a miss or an
    /// expired entry.
    fn fetch(&self, key: &str) -> Option<ConfigDocument>;

    /// Stores `document` under `key` for `ttl`.
    fn save(&self, key: &str, document: &ConfigDocument, ttl: Duration);

    /// Removes `key`.  Deleting an absent key is not an error.
    fn delete(&self, key: &str);
}
