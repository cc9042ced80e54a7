//! Line-level inline passes: headings, emphasis, images, links, wiki-links
//! and tags.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::escape::escape_attr;
use crate::pipeline::RenderContext;
use crate::placeholder::PlaceholderKind;

static HEADING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^(#{1,6})[ \t]+([^\n]*?)[ \t]*$").unwrap());

// Delimited text may not start or end with whitespace, so `* item` bullets
// and `2 * 3 * 4` survive.
static BOLD_ITALIC_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*\*\*([^\s*](?:[^\n]*?[^\s*])?)\*\*\*").unwrap());
static BOLD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*\*([^\s*](?:[^\n]*?[^\s*])?)\*\*").unwrap());
static ITALIC_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*([^\s*](?:[^\n*]*?[^\s*])?)\*").unwrap());
static STRIKE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"~~([^\s~](?:[^\n]*?[^\s~])?)~~").unwrap());

static IMAGE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"!\[([^\]\n]*)\]\(([^)\s]+)(?:[ \t]+"([^"\n]*)")?\)"#).unwrap()
});
static LINK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\[([^\]\n]+)\]\(([^)\s]+)(?:[ \t]+"([^"\n]*)")?\)"#).unwrap()
});

static WIKI_LINK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[\[([^\[\]\n]+)\]\]").unwrap());

// `>` counts as a boundary so tags directly inside a converted block
// (`<h1>#tag</h1>`, `<blockquote>@name`) still match.
static TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(^|[\s>])([#@])([\p{L}\p{N}_][\p{L}\p{N}_/-]*)").unwrap());

/// Convert ATX headings (`#` to `######` followed by a space) to `<hN>`.
pub(crate) fn headings(text: &str, _ctx: &mut RenderContext<'_>) -> String {
    if !text.contains('#') {
        return text.to_owned();
    }
    HEADING_RE
        .replace_all(text, |caps: &Captures<'_>| {
            let level = caps[1].len();
            format!("<h{level}>{}</h{level}>", &caps[2])
        })
        .into_owned()
}

/// Convert emphasis: `***x***`, then `**x**`, then `*x*`, then `~~x~~`.
///
/// Matching is non-greedy and never crosses a line. Overlapping or nested
/// delimiters beyond this fixed order are not handled.
pub(crate) fn emphasis(text: &str, _ctx: &mut RenderContext<'_>) -> String {
    let mut out = text.to_owned();
    if out.contains('*') {
        out = BOLD_ITALIC_RE
            .replace_all(&out, "<strong><em>$1</em></strong>")
            .into_owned();
        out = BOLD_RE.replace_all(&out, "<strong>$1</strong>").into_owned();
        out = ITALIC_RE.replace_all(&out, "<em>$1</em>").into_owned();
    }
    if out.contains("~~") {
        out = STRIKE_RE.replace_all(&out, "<del>$1</del>").into_owned();
    }
    out
}

/// Convert `![alt](url "title")` to inline `<img>` placeholders.
pub(crate) fn images(text: &str, ctx: &mut RenderContext<'_>) -> String {
    if !text.contains("![") {
        return text.to_owned();
    }
    IMAGE_RE
        .replace_all(text, |caps: &Captures<'_>| {
            let title = caps
                .get(3)
                .map(|m| format!(r#" title="{}""#, escape_attr(m.as_str())))
                .unwrap_or_default();
            let html = format!(
                r#"<img src="{}" alt="{}"{title}>"#,
                escape_attr(safe_url(&caps[2])),
                escape_attr(&caps[1])
            );
            ctx.placeholders.insert(PlaceholderKind::Inline, html)
        })
        .into_owned()
}

/// Convert `[text](url "title")` to inline `<a target="_blank">` placeholders.
pub(crate) fn links(text: &str, ctx: &mut RenderContext<'_>) -> String {
    if !text.contains("](") {
        return text.to_owned();
    }
    LINK_RE
        .replace_all(text, |caps: &Captures<'_>| {
            let title = caps
                .get(3)
                .map(|m| format!(r#" title="{}""#, escape_attr(m.as_str())))
                .unwrap_or_default();
            let html = format!(
                r#"<a href="{}"{title} target="_blank" rel="noopener">{}</a>"#,
                escape_attr(safe_url(&caps[2])),
                &caps[1]
            );
            ctx.placeholders.insert(PlaceholderKind::Inline, html)
        })
        .into_owned()
}

/// Convert `[[Title]]` and `[[Title|Alias]]` to quicklink spans.
///
/// The title before `|` is looked up in the known titles; unknown titles
/// get the `is-ghost` class. The alias, when present and non-empty, is the
/// displayed label.
pub(crate) fn wiki_links(text: &str, ctx: &mut RenderContext<'_>) -> String {
    if !ctx.options.wiki_links || !text.contains("[[") {
        return text.to_owned();
    }
    WIKI_LINK_RE
        .replace_all(text, |caps: &Captures<'_>| {
            let inner = &caps[1];
            let (title, label) = match inner.split_once('|') {
                Some((title, alias)) if !alias.trim().is_empty() => (title.trim(), alias.trim()),
                Some((title, _)) => (title.trim(), title.trim()),
                None => (inner.trim(), inner.trim()),
            };
            let class = if ctx.known_titles.contains(title) {
                "preview-quicklink"
            } else {
                "preview-quicklink is-ghost"
            };
            let html = format!(
                r#"<span class="{class}" data-title="{}">{label}</span>"#,
                escape_attr(title)
            );
            ctx.placeholders.insert(PlaceholderKind::Inline, html)
        })
        .into_owned()
}

/// Convert `#tag` and `@mention` tokens that follow a line start,
/// whitespace or a tag close.
pub(crate) fn tags(text: &str, ctx: &mut RenderContext<'_>) -> String {
    if !ctx.options.tags || !text.contains(['#', '@']) {
        return text.to_owned();
    }
    TAG_RE
        .replace_all(text, |caps: &Captures<'_>| {
            let class = if &caps[2] == "#" {
                "preview-tag"
            } else {
                "preview-mention"
            };
            format!(
                r#"{}<span class="{class}">{}{}</span>"#,
                &caps[1], &caps[2], &caps[3]
            )
        })
        .into_owned()
}

/// Neutralize script URLs; the preview surface never executes them.
fn safe_url(url: &str) -> &str {
    let lowered = url.trim_start().to_ascii_lowercase();
    if lowered.starts_with("javascript:") || lowered.starts_with("vbscript:") {
        "#"
    } else {
        url
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{KnownTitles, RenderOptions};
    use pretty_assertions::assert_eq;

    fn run_with(
        stage: fn(&str, &mut RenderContext<'_>) -> String,
        titles: &KnownTitles,
        text: &str,
    ) -> String {
        let mut ctx = RenderContext::new(titles, RenderOptions::default());
        let out = stage(text, &mut ctx);
        ctx.placeholders.restore(&out)
    }

    fn run(stage: fn(&str, &mut RenderContext<'_>) -> String, text: &str) -> String {
        run_with(stage, &KnownTitles::new(), text)
    }

    #[test]
    fn test_heading_levels() {
        assert_eq!(
            run(headings, "# One\n## Two\n### Three\n###### Six"),
            "<h1>One</h1>\n<h2>Two</h2>\n<h3>Three</h3>\n<h6>Six</h6>"
        );
    }

    #[test]
    fn test_heading_requires_space() {
        assert_eq!(run(headings, "#tag\n####### seven"), "#tag\n####### seven");
    }

    #[test]
    fn test_heading_only_at_line_start() {
        assert_eq!(run(headings, "text # not"), "text # not");
    }

    #[test]
    fn test_emphasis_order() {
        assert_eq!(
            run(emphasis, "***both*** **bold** *em* ~~gone~~"),
            "<strong><em>both</em></strong> <strong>bold</strong> <em>em</em> <del>gone</del>"
        );
    }

    #[test]
    fn test_emphasis_is_non_greedy() {
        assert_eq!(
            run(emphasis, "**a** and **b**"),
            "<strong>a</strong> and <strong>b</strong>"
        );
    }

    #[test]
    fn test_emphasis_ignores_spaced_asterisks() {
        assert_eq!(run(emphasis, "* item\n2 * 3 * 4"), "* item\n2 * 3 * 4");
    }

    #[test]
    fn test_emphasis_does_not_cross_lines() {
        assert_eq!(run(emphasis, "*start\nend*"), "*start\nend*");
    }

    #[test]
    fn test_image() {
        assert_eq!(
            run(images, r#"![a cat](cat.png "Tom")"#),
            r#"<img src="cat.png" alt="a cat" title="Tom">"#
        );
    }

    #[test]
    fn test_link_opens_new_tab() {
        assert_eq!(
            run(links, "see [docs](https://example.com)"),
            r#"see <a href="https://example.com" target="_blank" rel="noopener">docs</a>"#
        );
    }

    #[test]
    fn test_image_before_link() {
        let titles = KnownTitles::new();
        let mut ctx = RenderContext::new(&titles, RenderOptions::default());
        let out = images("![i](a.png)", &mut ctx);
        let out = links(&out, &mut ctx);
        assert_eq!(ctx.placeholders.restore(&out), r#"<img src="a.png" alt="i">"#);
    }

    #[test]
    fn test_script_url_neutralized() {
        assert_eq!(
            run(links, "[x](javascript:alert(1))"),
            r##"<a href="#" target="_blank" rel="noopener">x</a>)"##
        );
    }

    #[test]
    fn test_wiki_link_resolved_and_ghost() {
        let titles = KnownTitles::from_iter(["Foo"]);
        assert_eq!(
            run_with(wiki_links, &titles, "[[Foo]]"),
            r#"<span class="preview-quicklink" data-title="Foo">Foo</span>"#
        );
        assert_eq!(
            run_with(wiki_links, &titles, "[[Bar]]"),
            r#"<span class="preview-quicklink is-ghost" data-title="Bar">Bar</span>"#
        );
    }

    #[test]
    fn test_wiki_link_case_insensitive() {
        let titles = KnownTitles::from_iter(["Foo"]);
        let out = run_with(wiki_links, &titles, "[[ foo ]]");
        assert_eq!(
            out,
            r#"<span class="preview-quicklink" data-title="foo">foo</span>"#
        );
    }

    #[test]
    fn test_wiki_link_alias() {
        let titles = KnownTitles::from_iter(["Project Plan"]);
        assert_eq!(
            run_with(wiki_links, &titles, "[[Project Plan|the plan]]"),
            r#"<span class="preview-quicklink" data-title="Project Plan">the plan</span>"#
        );
    }

    #[test]
    fn test_wiki_link_empty_alias_uses_title() {
        let out = run(wiki_links, "[[Plan|]]");
        assert_eq!(
            out,
            r#"<span class="preview-quicklink is-ghost" data-title="Plan">Plan</span>"#
        );
    }

    #[test]
    fn test_wiki_link_title_escaped() {
        let out = run(wiki_links, r#"[[say "hi"]]"#);
        assert!(out.contains(r#"data-title="say &quot;hi&quot;""#));
    }

    #[test]
    fn test_tags_and_mentions() {
        assert_eq!(
            run(tags, "#idea for @sam"),
            r#"<span class="preview-tag">#idea</span> for <span class="preview-mention">@sam</span>"#
        );
    }

    #[test]
    fn test_tag_needs_boundary() {
        assert_eq!(run(tags, "mail me@example.com or issue#4"), "mail me@example.com or issue#4");
    }

    #[test]
    fn test_tag_after_block_tag() {
        assert_eq!(
            run(tags, "<h2>#todo</h2>"),
            r#"<h2><span class="preview-tag">#todo</span></h2>"#
        );
    }

    #[test]
    fn test_consecutive_tags() {
        assert_eq!(
            run(tags, "#a #b"),
            r#"<span class="preview-tag">#a</span> <span class="preview-tag">#b</span>"#
        );
    }

    #[test]
    fn test_disabled_stages_pass_through() {
        let titles = KnownTitles::new();
        let options = RenderOptions {
            wiki_links: false,
            tags: false,
            ..RenderOptions::default()
        };
        let mut ctx = RenderContext::new(&titles, options);
        assert_eq!(wiki_links("[[A]]", &mut ctx), "[[A]]");
        assert_eq!(tags("#a", &mut ctx), "#a");
    }
}
