//! Render feature switches.

/// Feature switches for optional pipeline stages.
///
/// Every switch defaults to `true`. Disabled stages pass their input through
/// unchanged. With the `serde` feature the options serialize to a stable JSON
/// object, which parse caches use as part of their key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RenderOptions {
    /// Convert GFM pipe tables.
    pub tables: bool,
    /// Convert `[!NOTE]`-style alert blocks.
    pub alerts: bool,
    /// Convert `[[Title]]` wiki-links.
    pub wiki_links: bool,
    /// Convert `#tag` and `@mention` tokens.
    pub tags: bool,
    /// Convert `- [ ]` / `- [x]` task list items.
    pub task_lists: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            tables: true,
            alerts: true,
            wiki_links: true,
            tags: true,
            task_lists: true,
        }
    }
}
