use std::sync::Arc;

use notemark_cache::{CacheKey, ContentHash, DEFAULT_CAPACITY, NullCache, RenderCache, SharedParseCache};
use notemark_renderer::{FastRenderer, KnownTitles, RenderOptions};

/// Language recorded in cache keys for markdown previews.
pub const PREVIEW_LANGUAGE: &str = "markdown";

/// Renderer with a parse cache in front of it.
///
/// The cache key covers the text, [`PREVIEW_LANGUAGE`] and the render
/// options. Known titles are not part of the key, so replacing them clears
/// the cache.
#[derive(Clone)]
pub struct PreviewService {
    renderer: FastRenderer,
    cache: Arc<dyn RenderCache>,
    hasher: ContentHash,
}

impl PreviewService {
    /// Create a service with a default-sized cache.
    #[must_use]
    pub fn new(renderer: FastRenderer) -> Self {
        Self {
            renderer,
            cache: Arc::new(SharedParseCache::<String>::new(DEFAULT_CAPACITY)),
            hasher: ContentHash::default(),
        }
    }

    /// Create a service that renders every request.
    #[must_use]
    pub fn uncached(renderer: FastRenderer) -> Self {
        Self {
            renderer,
            cache: Arc::new(NullCache),
            hasher: ContentHash::default(),
        }
    }

    /// Use a specific cache and key hash.
    #[must_use]
    pub fn with_cache(mut self, cache: Arc<dyn RenderCache>, hasher: ContentHash) -> Self {
        self.cache = cache;
        self.hasher = hasher;
        self
    }

    /// Render text to HTML, reusing a cached result when available.
    #[must_use]
    pub fn render(&self, text: &str) -> String {
        let options = self.renderer.options();
        match CacheKey::new(self.hasher, text, PREVIEW_LANGUAGE, &options) {
            Ok(key) => self
                .cache
                .get_or_insert_with(key, &mut || self.renderer.render(text)),
            Err(e) => {
                tracing::debug!(error = %e, "Failed to build cache key, rendering uncached");
                self.renderer.render(text)
            }
        }
    }

    /// Replace the known titles and drop cached renders.
    pub fn set_known_titles(&mut self, known_titles: KnownTitles) {
        tracing::debug!(count = known_titles.len(), "Updated known titles");
        self.renderer.set_known_titles(known_titles);
        self.cache.clear();
    }

    /// Replace the render options.
    ///
    /// Options are part of the cache key, so cached entries stay valid.
    pub fn set_options(&mut self, options: RenderOptions) {
        self.renderer = std::mem::take(&mut self.renderer).with_options(options);
    }

    /// Underlying renderer.
    #[must_use]
    pub fn renderer(&self) -> &FastRenderer {
        &self.renderer
    }
}

impl Default for PreviewService {
    fn default() -> Self {
        Self::new(FastRenderer::new())
    }
}

impl std::fmt::Debug for PreviewService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PreviewService")
            .field("renderer", &self.renderer)
            .field("hasher", &self.hasher)
            .finish_non_exhaustive()
    }
}
