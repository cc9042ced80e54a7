//! Single-owner LRU parse cache.

use std::num::NonZeroUsize;

use lru::LruCache;
use serde::Serialize;

use crate::hash::ContentHash;
use crate::key::CacheKey;

/// Capacity used by [`ParseCache::default`].
pub const DEFAULT_CAPACITY: usize = 50;

/// Bounded LRU cache from `(content, language, options)` to a render result.
///
/// `get` promotes the entry to most recently used. `set` on a full cache
/// evicts exactly one entry, the least recently used, and only when the
/// key is new.
#[derive(Debug)]
pub struct ParseCache<V> {
    entries: LruCache<CacheKey, V>,
    hasher: ContentHash,
}

impl<V> ParseCache<V> {
    /// Create a cache holding at most `capacity` entries.
    ///
    /// A capacity of zero is treated as one.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self::with_hash(capacity, ContentHash::default())
    }

    /// Create a cache using a specific content hash.
    #[must_use]
    pub fn with_hash(capacity: usize, hasher: ContentHash) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: LruCache::new(capacity),
            hasher,
        }
    }

    /// Build the key for a lookup, logging serialization failures.
    pub fn key<O: Serialize + ?Sized>(&self, content: &str, language: &str, options: &O) -> Option<CacheKey> {
        match CacheKey::new(self.hasher, content, language, options) {
            Ok(key) => Some(key),
            Err(e) => {
                tracing::debug!(error = %e, "Failed to serialize cache key options");
                None
            }
        }
    }

    /// Retrieve a cached result.
    ///
    /// Returns `None` on a miss or when `options` cannot be serialized.
    pub fn get<O: Serialize + ?Sized>(&mut self, content: &str, language: &str, options: &O) -> Option<&V> {
        let key = self.key(content, language, options)?;
        self.get_by_key(&key)
    }

    /// Store a result.
    ///
    /// Does nothing when `options` cannot be serialized.
    pub fn set<O: Serialize + ?Sized>(&mut self, content: &str, language: &str, value: V, options: &O) {
        if let Some(key) = self.key(content, language, options) {
            self.set_by_key(key, value);
        }
    }

    /// Retrieve a cached result by prebuilt key.
    pub fn get_by_key(&mut self, key: &CacheKey) -> Option<&V> {
        let value = self.entries.get(key);
        tracing::trace!(%key, hit = value.is_some(), "Parse cache lookup");
        value
    }

    /// Store a result by prebuilt key.
    pub fn set_by_key(&mut self, key: CacheKey, value: V) {
        if let Some((evicted, _)) = self.entries.push(key.clone(), value)
            && evicted != key
        {
            tracing::debug!(key = %evicted, "Evicted parse cache entry");
        }
    }

    /// Drop every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Number of cached entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Maximum number of entries.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.entries.cap().get()
    }

    /// Hash used for content fingerprints.
    #[must_use]
    pub fn hasher(&self) -> ContentHash {
        self.hasher
    }
}

impl<V> Default for ParseCache<V> {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[derive(Serialize)]
    struct Flags {
        tags: bool,
    }

    fn cache(capacity: usize) -> ParseCache<String> {
        ParseCache::new(capacity)
    }

    #[test]
    fn test_default_capacity() {
        let cache: ParseCache<String> = ParseCache::default();
        assert_eq!(cache.capacity(), 50);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_zero_capacity_clamped() {
        let mut cache = cache(0);
        assert_eq!(cache.capacity(), 1);
        cache.set("a", "markdown", "A".to_owned(), &());
        assert_eq!(cache.get("a", "markdown", &()).map(String::as_str), Some("A"));
    }

    #[test]
    fn test_set_then_get() {
        let mut cache = cache(4);
        cache.set("# Hi", "markdown", "<h1>Hi</h1>".to_owned(), &());
        assert_eq!(cache.get("# Hi", "markdown", &()).map(String::as_str), Some("<h1>Hi</h1>"));
        assert_eq!(cache.get("# Ho", "markdown", &()), None);
    }

    #[test]
    fn test_evicts_least_recently_used() {
        let mut cache = cache(2);
        cache.set("A", "markdown", "a".to_owned(), &());
        cache.set("B", "markdown", "b".to_owned(), &());
        cache.set("C", "markdown", "c".to_owned(), &());

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get("A", "markdown", &()), None);
        assert_eq!(cache.get("B", "markdown", &()).map(String::as_str), Some("b"));
        assert_eq!(cache.get("C", "markdown", &()).map(String::as_str), Some("c"));
    }

    #[test]
    fn test_get_promotes_entry() {
        let mut cache = cache(2);
        cache.set("A", "markdown", "a".to_owned(), &());
        cache.set("B", "markdown", "b".to_owned(), &());
        assert!(cache.get("A", "markdown", &()).is_some());
        cache.set("C", "markdown", "c".to_owned(), &());

        assert_eq!(cache.get("B", "markdown", &()), None);
        assert_eq!(cache.get("A", "markdown", &()).map(String::as_str), Some("a"));
        assert_eq!(cache.get("C", "markdown", &()).map(String::as_str), Some("c"));
    }

    #[test]
    fn test_overwrite_existing_key_does_not_evict() {
        let mut cache = cache(2);
        cache.set("A", "markdown", "a".to_owned(), &());
        cache.set("B", "markdown", "b".to_owned(), &());
        cache.set("A", "markdown", "a2".to_owned(), &());

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get("A", "markdown", &()).map(String::as_str), Some("a2"));
        assert_eq!(cache.get("B", "markdown", &()).map(String::as_str), Some("b"));
    }

    #[test]
    fn test_options_are_part_of_key() {
        let mut cache = cache(4);
        cache.set("#x", "markdown", "tagged".to_owned(), &Flags { tags: true });

        assert_eq!(cache.get("#x", "markdown", &Flags { tags: false }), None);
        assert_eq!(
            cache.get("#x", "markdown", &Flags { tags: true }).map(String::as_str),
            Some("tagged")
        );
    }

    #[test]
    fn test_clear() {
        let mut cache = cache(4);
        cache.set("A", "markdown", "a".to_owned(), &());
        cache.set("B", "markdown", "b".to_owned(), &());
        cache.clear();

        assert!(cache.is_empty());
        assert_eq!(cache.get("A", "markdown", &()), None);
        assert_eq!(cache.capacity(), 4);
    }

    #[test]
    fn test_sha256_cache() {
        let mut cache: ParseCache<String> = ParseCache::with_hash(2, ContentHash::Sha256);
        assert_eq!(cache.hasher(), ContentHash::Sha256);
        cache.set("body", "markdown", "html".to_owned(), &());
        assert_eq!(cache.get("body", "markdown", &()).map(String::as_str), Some("html"));

        let key = cache.key("body", "markdown", &()).unwrap();
        assert_eq!(key.hash().len(), 64);
    }
}
