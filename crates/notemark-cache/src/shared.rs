//! Thread-safe wrapper around [`ParseCache`].

use std::sync::{Mutex, MutexGuard, PoisonError};

use serde::Serialize;

use crate::RenderCache;
use crate::hash::ContentHash;
use crate::key::CacheKey;
use crate::parse::ParseCache;

/// [`ParseCache`] behind a mutex, shareable across threads.
///
/// A poisoned lock is recovered: the cache only holds derived data, so a
/// panic mid-update at worst loses an entry.
#[derive(Debug, Default)]
pub struct SharedParseCache<V> {
    inner: Mutex<ParseCache<V>>,
}

impl<V: Clone> SharedParseCache<V> {
    /// Create a shared cache holding at most `capacity` entries.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self::with_hash(capacity, ContentHash::default())
    }

    /// Create a shared cache using a specific content hash.
    #[must_use]
    pub fn with_hash(capacity: usize, hasher: ContentHash) -> Self {
        Self {
            inner: Mutex::new(ParseCache::with_hash(capacity, hasher)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, ParseCache<V>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Build the key for a lookup. `None` if `options` cannot be serialized.
    pub fn key<O: Serialize + ?Sized>(&self, content: &str, language: &str, options: &O) -> Option<CacheKey> {
        self.lock().key(content, language, options)
    }

    /// Retrieve a cached result.
    pub fn get<O: Serialize + ?Sized>(&self, content: &str, language: &str, options: &O) -> Option<V> {
        self.lock().get(content, language, options).cloned()
    }

    /// Store a result.
    pub fn set<O: Serialize + ?Sized>(&self, content: &str, language: &str, value: V, options: &O) {
        self.lock().set(content, language, value, options);
    }

    /// Return the cached value for `key`, computing and storing it on a miss.
    ///
    /// `compute` runs with the lock released, so misses on different keys
    /// compute in parallel. Two callers racing on the same key may both
    /// compute; the first value stored wins and is returned to both.
    pub fn get_or_insert_with<F: FnOnce() -> V>(&self, key: CacheKey, compute: F) -> V {
        if let Some(value) = self.lock().get_by_key(&key) {
            return value.clone();
        }
        let value = compute();

        let mut cache = self.lock();
        if let Some(existing) = cache.get_by_key(&key) {
            return existing.clone();
        }
        cache.set_by_key(key, value.clone());
        value
    }

    /// Drop every entry.
    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Number of cached entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether the cache is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Maximum number of entries.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.lock().capacity()
    }
}

impl RenderCache for SharedParseCache<String> {
    fn get(&self, key: &CacheKey) -> Option<String> {
        self.lock().get_by_key(key).cloned()
    }

    fn set(&self, key: CacheKey, value: String) {
        self.lock().set_by_key(key, value);
    }

    fn get_or_insert_with(&self, key: CacheKey, render: &mut dyn FnMut() -> String) -> String {
        SharedParseCache::get_or_insert_with(self, key, render)
    }

    fn clear(&self) {
        SharedParseCache::clear(self);
    }
}
