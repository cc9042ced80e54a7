//! Ordered render pipeline.

use std::borrow::Cow;

use crate::options::RenderOptions;
use crate::placeholder::Placeholders;
use crate::stages::{block, code, inline, list, table};
use crate::titles::KnownTitles;

/// Per-call render state shared by all stages.
///
/// Holds the placeholder table for protected regions. Nothing in here
/// outlives a single render call.
#[derive(Debug)]
pub struct RenderContext<'a> {
    pub(crate) placeholders: Placeholders,
    pub(crate) known_titles: &'a KnownTitles,
    pub(crate) options: RenderOptions,
}

impl<'a> RenderContext<'a> {
    /// Create a fresh context for one render call.
    #[must_use]
    pub fn new(known_titles: &'a KnownTitles, options: RenderOptions) -> Self {
        Self {
            placeholders: Placeholders::new(),
            known_titles,
            options,
        }
    }

    /// Placeholder table built so far.
    #[must_use]
    pub fn placeholders(&self) -> &Placeholders {
        &self.placeholders
    }
}

/// A named text-to-text pipeline stage.
#[derive(Clone, Copy)]
pub struct Stage {
    /// Stage name, used in trace logs.
    pub name: &'static str,
    /// Stage function.
    pub run: fn(&str, &mut RenderContext<'_>) -> String,
}

impl std::fmt::Debug for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Stage").field("name", &self.name).finish()
    }
}

/// The render pipeline, in execution order.
///
/// Order is load-bearing:
/// - `fenced_code`, `tables` and `inline_code` run first so no later stage
///   sees `#`, `*`, backticks or pipes inside protected regions.
/// - `headings` run before `emphasis`; `images` before `links` because image
///   syntax contains link syntax.
/// - `alerts` run before `blockquotes`, which would otherwise claim their
///   `>` lines.
/// - `task_lists` run before `lists` so checkbox items keep their markup.
/// - `restore` must be last.
pub const PIPELINE: &[Stage] = &[
    Stage {
        name: "fenced_code",
        run: code::fenced_code,
    },
    Stage {
        name: "tables",
        run: table::tables,
    },
    Stage {
        name: "inline_code",
        run: code::inline_code,
    },
    Stage {
        name: "headings",
        run: inline::headings,
    },
    Stage {
        name: "emphasis",
        run: inline::emphasis,
    },
    Stage {
        name: "images",
        run: inline::images,
    },
    Stage {
        name: "links",
        run: inline::links,
    },
    Stage {
        name: "alerts",
        run: block::alerts,
    },
    Stage {
        name: "blockquotes",
        run: block::blockquotes,
    },
    Stage {
        name: "wiki_links",
        run: inline::wiki_links,
    },
    Stage {
        name: "tags",
        run: inline::tags,
    },
    Stage {
        name: "rules",
        run: block::rules,
    },
    Stage {
        name: "task_lists",
        run: list::task_lists,
    },
    Stage {
        name: "lists",
        run: list::lists,
    },
    Stage {
        name: "paragraphs",
        run: block::paragraphs,
    },
    Stage {
        name: "restore",
        run: restore,
    },
];

/// Substitute all placeholder tokens back to their HTML.
fn restore(text: &str, ctx: &mut RenderContext<'_>) -> String {
    ctx.placeholders.restore(text)
}

/// Configurable fast markdown renderer.
///
/// Rendering is a pure function of the input text, the known titles and
/// the options. The renderer holds no per-call state and can be shared
/// across threads.
///
/// # Example
///
/// ```
/// use notemark_renderer::{FastRenderer, RenderOptions};
///
/// let renderer = FastRenderer::new().with_options(RenderOptions {
///     tags: false,
///     ..RenderOptions::default()
/// });
///
/// assert_eq!(renderer.render("#idea"), "<p>#idea</p>");
/// ```
#[derive(Clone, Debug, Default)]
pub struct FastRenderer {
    known_titles: KnownTitles,
    options: RenderOptions,
}

impl FastRenderer {
    /// Create a renderer with default options and no known titles.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the titles used to resolve wiki-links.
    #[must_use]
    pub fn with_known_titles(mut self, known_titles: KnownTitles) -> Self {
        self.known_titles = known_titles;
        self
    }

    /// Set feature switches.
    #[must_use]
    pub fn with_options(mut self, options: RenderOptions) -> Self {
        self.options = options;
        self
    }

    /// Replace the known titles in place.
    pub fn set_known_titles(&mut self, known_titles: KnownTitles) {
        self.known_titles = known_titles;
    }

    /// Titles used to resolve wiki-links.
    #[must_use]
    pub fn known_titles(&self) -> &KnownTitles {
        &self.known_titles
    }

    /// Feature switches.
    #[must_use]
    pub fn options(&self) -> RenderOptions {
        self.options
    }

    /// Render markdown text to HTML.
    ///
    /// Never fails: malformed markdown produces degraded HTML. Empty input
    /// (or input made only of line breaks) produces an empty string.
    #[must_use]
    pub fn render(&self, text: &str) -> String {
        let text = normalize(text);
        if text.is_empty() {
            return String::new();
        }

        let mut ctx = RenderContext::new(&self.known_titles, self.options);
        let mut current = text.into_owned();
        for stage in PIPELINE {
            current = (stage.run)(&current, &mut ctx);
            tracing::trace!(stage = stage.name, len = current.len(), "Stage complete");
        }

        tracing::debug!(
            output_len = current.len(),
            placeholders = ctx.placeholders.len(),
            "Rendered fast preview"
        );
        current
    }
}

/// Render markdown text with the default options.
///
/// Convenience wrapper around [`FastRenderer`] for one-off calls.
///
/// # Examples
///
/// ```
/// use notemark_renderer::render;
///
/// assert_eq!(render::<&str>("", &[]), "");
/// assert!(render("[[Foo]]", &["foo"]).contains(r#"class="preview-quicklink""#));
/// ```
#[must_use]
pub fn render<S: AsRef<str>>(text: &str, known_titles: &[S]) -> String {
    FastRenderer::new()
        .with_known_titles(known_titles.iter().collect())
        .render(text)
}

/// Prepare raw input for the pipeline.
///
/// Strips placeholder sentinels, converts line endings to `\n` and drops
/// trailing line breaks.
fn normalize(input: &str) -> Cow<'_, str> {
    let mut text = Placeholders::sanitize(input);
    if text.contains('\r') {
        text = Cow::Owned(text.replace("\r\n", "\n").replace('\r', "\n"));
    }
    let trimmed_len = text.trim_end_matches('\n').len();
    if trimmed_len < text.len() {
        text.to_mut().truncate(trimmed_len);
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    static_assertions::assert_impl_all!(super::FastRenderer: Send, Sync);

    #[test]
    fn test_empty_input_renders_empty() {
        assert_eq!(render::<&str>("", &[]), "");
        assert_eq!(render::<&str>("\n\n", &[]), "");
    }

    #[test]
    fn test_restore_is_last_stage() {
        assert_eq!(PIPELINE.last().map(|stage| stage.name), Some("restore"));
        assert_eq!(PIPELINE.first().map(|stage| stage.name), Some("fenced_code"));
    }

    #[test]
    fn test_stage_order() {
        let position = |name: &str| PIPELINE.iter().position(|s| s.name == name).unwrap();
        assert!(position("headings") < position("emphasis"));
        assert!(position("images") < position("links"));
        assert!(position("inline_code") < position("emphasis"));
        assert!(position("alerts") < position("blockquotes"));
        assert!(position("task_lists") < position("lists"));
        assert!(position("lists") < position("paragraphs"));
        assert!(position("emphasis") < position("wiki_links"));
    }

    #[test]
    fn test_normalize_line_endings() {
        assert_eq!(normalize("a\r\nb\rc\n\n"), "a\nb\nc");
    }

    #[test]
    fn test_crlf_input_renders_like_lf() {
        let renderer = FastRenderer::new();
        assert_eq!(
            renderer.render("# Title\r\nbody\r\n"),
            renderer.render("# Title\nbody\n")
        );
    }

    #[test]
    fn test_plain_paragraphs() {
        assert_eq!(
            render::<&str>("first line\n\nsecond line", &[]),
            "<p>first line</p>\n<br/>\n<p>second line</p>"
        );
    }

    #[test]
    fn test_no_nested_paragraphs() {
        let inputs = [
            "plain",
            "<p>already html</p>",
            "# heading\ntext",
            "```\ncode\n```\nafter",
            "| a |\n|---|\n| 1 |",
            "> quote",
        ];
        for input in inputs {
            let html = render::<&str>(input, &[]);
            assert!(!html.contains("<p><p>"), "nested paragraph for {input:?}: {html}");
        }
    }

    #[test]
    fn test_wiki_link_resolution() {
        let titles = ["Foo"];
        let resolved = render("[[Foo]]", &titles);
        assert!(resolved.contains("preview-quicklink"));
        assert!(!resolved.contains("is-ghost"));

        assert!(render("[[Bar]]", &titles).contains("is-ghost"));
        assert!(!render("[[foo]]", &titles).contains("is-ghost"));
    }

    #[test]
    fn test_emphasis_inside_wiki_link_breaks_lookup() {
        // Emphasis runs first, so the lookup sees the converted markup.
        let html = render("[[my *notes* page]]", &["my notes page"]);
        assert!(html.contains("is-ghost"), "{html}");
    }

    #[test]
    fn test_wiki_link_title_with_hash_not_tagged() {
        let html = render::<&str>("[[Plan #2]]", &[]);
        assert_eq!(
            html,
            r#"<p><span class="preview-quicklink is-ghost" data-title="Plan #2">Plan #2</span></p>"#
        );
    }

    #[test]
    fn test_mixed_document() {
        let input = "# Weekly\n\nShip **v2** with @ana #release\n\n1. plan\n2. build\n\n---\n> done soon";
        let html = render::<&str>(input, &[]);
        assert_eq!(
            html,
            "<h1>Weekly</h1>\n<br/>\n<p>Ship <strong>v2</strong> with <span class=\"preview-mention\">@ana</span> <span class=\"preview-tag\">#release</span></p>\n<br/>\n<ol><li>plan</li><li>build</li></ol>\n<br/>\n<hr>\n<blockquote>done soon</blockquote>"
        );
    }

    #[test]
    fn test_sentinel_characters_in_input_do_not_leak() {
        let html = render::<&str>("a \u{E000}I0\u{E001} b", &[]);
        assert_eq!(html, "<p>a \u{FFFD}I0\u{FFFD} b</p>");
    }

    #[test]
    fn test_no_tokens_left_after_render() {
        let input = "# T\n\n```js\nlet a = 1;\n```\n\n| a | b |\n|---|---|\n| `x` | [l](u) |\n\nSee `code` and [[Page]] #tag";
        let html = render(input, &["Page"]);
        assert!(!html.contains('\u{E000}'));
        assert!(!html.contains('\u{E001}'));
    }
}
