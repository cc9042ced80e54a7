//! Parse cache for rendered previews.
//!
//! This crate provides a bounded least-recently-used cache that maps
//! `(content hash, language, options)` to a previously computed render, so
//! unchanged notes are not rendered twice.
//!
//! - [`ParseCache`]: Single-owner LRU cache
//! - [`SharedParseCache`]: Mutex-guarded cache for concurrent callers
//! - [`RenderCache`]: Object-safe trait over string caches
//! - [`NullCache`]: No-op implementation (always misses)
//!
//! # Example
//!
//! ```
//! use notemark_cache::ParseCache;
//!
//! let mut cache = ParseCache::new(2);
//! cache.set("# Hi", "markdown", "<h1>Hi</h1>".to_owned(), &());
//! assert_eq!(cache.get("# Hi", "markdown", &()).map(String::as_str), Some("<h1>Hi</h1>"));
//! assert_eq!(cache.get("# Hi", "html", &()), None);
//! ```

mod hash;
mod key;
mod parse;
mod shared;

pub use hash::{ContentHash, rolling_hash};
pub use key::CacheKey;
pub use parse::{DEFAULT_CAPACITY, ParseCache};
pub use shared::SharedParseCache;

/// Object-safe cache of rendered HTML keyed by [`CacheKey`].
///
/// Lets callers switch between a real cache and [`NullCache`] at runtime.
pub trait RenderCache: Send + Sync {
    /// Retrieve a cached value, marking it most recently used.
    fn get(&self, key: &CacheKey) -> Option<String>;

    /// Store a value, evicting the least recently used entry if full.
    fn set(&self, key: CacheKey, value: String);

    /// Return the cached value for `key`, rendering and storing it on a miss.
    ///
    /// `render` runs without holding any lock, so misses on different keys
    /// render in parallel. If another caller stored the same key meanwhile,
    /// its value is returned and the fresh render is dropped.
    fn get_or_insert_with(&self, key: CacheKey, render: &mut dyn FnMut() -> String) -> String;

    /// Drop every entry.
    fn clear(&self);
}

/// No-op [`RenderCache`] that never stores or retrieves data.
///
/// Use when caching is disabled. Every lookup misses and
/// `get_or_insert_with` always renders.
#[derive(Debug, Default)]
pub struct NullCache;

impl RenderCache for NullCache {
    fn get(&self, _key: &CacheKey) -> Option<String> {
        None
    }

    fn set(&self, _key: CacheKey, _value: String) {}

    fn get_or_insert_with(&self, _key: CacheKey, render: &mut dyn FnMut() -> String) -> String {
        render()
    }

    fn clear(&self) {}
}
