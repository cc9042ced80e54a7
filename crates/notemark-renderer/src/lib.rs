//! Fast markdown preview renderer.
//!
//! This crate converts note text to HTML with a fixed pipeline of
//! pattern-based stages. It is meant for large documents where a full
//! `CommonMark` parse is too slow for live preview.
//!
//! # Architecture
//!
//! Rendering runs the ordered [`PIPELINE`] of [`Stage`]s over the text:
//!
//! 1. Multi-line and order-sensitive regions (fenced code, tables, inline
//!    code) are rendered immediately and swapped for placeholder tokens.
//! 2. Line-oriented passes (headings, emphasis, links, alerts, quotes,
//!    wiki-links, tags, rules, task lists, lists, paragraphs) rewrite the
//!    remaining text without touching protected regions.
//! 3. Placeholder tokens are substituted back as the final stage.
//!
//! The output uses consumer-facing class names (`code-block-wrapper`,
//! `mermaid-diagram`, `preview-quicklink`, `is-ghost`, `preview-tag`, ...)
//! that a host page is expected to style and post-process.
//!
//! # Example
//!
//! ```
//! use notemark_renderer::{FastRenderer, KnownTitles};
//!
//! let renderer = FastRenderer::new()
//!     .with_known_titles(KnownTitles::from_iter(["Inbox"]));
//!
//! let html = renderer.render("# Today\n\nSee [[Inbox]] and [[Archive]].");
//! assert!(html.contains("<h1>Today</h1>"));
//! assert!(html.contains(r#"<span class="preview-quicklink" data-title="Inbox">Inbox</span>"#));
//! assert!(html.contains("is-ghost"));
//! ```

mod escape;
mod fence;
mod options;
mod pipeline;
mod placeholder;
mod stages;
mod titles;

pub use escape::{escape_attr, escape_html};
pub use options::RenderOptions;
pub use pipeline::{FastRenderer, PIPELINE, RenderContext, Stage, render};
pub use placeholder::{PlaceholderKind, Placeholders};
pub use titles::KnownTitles;
