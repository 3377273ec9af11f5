//! In-process [`ConfigCache`] with per-entry expiry.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use cfgstore_core::ConfigDocument;
use tracing::warn;

use super::ConfigCache;

struct Entry {
    document: ConfigDocument,
    expires_at: Instant,
}

/// Thread-safe in-memory cache.  Expired entries are dropped lazily when
/// they are next fetched.
#[derive(Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<String, Entry>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries, including ones that have expired but not
    /// yet been fetched.
    pub fn len(&self) -> usize {
        self.with_entries(|entries| entries.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, key: &str) -> bool {
        self.with_entries(|entries| entries.contains_key(key))
            .unwrap_or(false)
    }

    /// Runs `f` under the lock.  A poisoned lock is logged and treated as an
    /// unavailable cache.
    fn with_entries<R>(&self, f: impl FnOnce(&mut HashMap<String, Entry>) -> R) -> Option<R> {
        match self.entries.lock() {
            Ok(mut guard) => Some(f(&mut guard)),
            Err(_) => {
                warn!("memory cache lock poisoned; treating cache as empty");
                None
            }
        }
    }
}

impl ConfigCache for MemoryCache {
    fn fetch(&self, key: &str) -> Option<ConfigDocument> {
        self.with_entries(|entries| {
            let now = Instant::now();
            match entries.get(key) {
                Some(entry) if entry.expires_at > now => Some(entry.document.clone()),
                Some(_) => {
                    entries.remove(key);
                    None
                }
                None => None,
            }
        })
        .flatten()
    }

    fn save(&self, key: &str, document: &ConfigDocument, ttl: Duration) {
        let expires_at = Instant::now() + ttl;
        self.with_entries(|entries| {
            entries.insert(
                key.to_string(),
                Entry {
                    document: document.clone(),
                    expires_at,
                },
            );
        });
    }

    fn delete(&self, key: &str) {
        self.with_entries(|entries| {
            entries.remove(key);
        });
    }
}
