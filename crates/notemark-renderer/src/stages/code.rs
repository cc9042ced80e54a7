//! Fenced code blocks and inline code spans.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::escape::{escape_attr, escape_html};
use crate::fence::detect_fence;
use crate::pipeline::RenderContext;
use crate::placeholder::PlaceholderKind;

static INLINE_CODE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"`([^`\n]+)`").unwrap());

/// Language tag that renders as a diagram container instead of code.
const MERMAID_LANG: &str = "mermaid";

/// Replace closed fenced code blocks with block placeholders.
///
/// Pre: raw text. Post: every closed fence (opening line, body, closing line)
/// is a single line holding one block token. Unclosed fences stay as text.
pub(crate) fn fenced_code(text: &str, ctx: &mut RenderContext<'_>) -> String {
    if !text.contains("```") && !text.contains("~~~") {
        return text.to_owned();
    }

    let lines: Vec<&str> = text.split('\n').collect();
    let mut out: Vec<Cow<'_, str>> = Vec::with_capacity(lines.len());
    let mut idx = 0;

    while idx < lines.len() {
        if let Some(open) = detect_fence(lines[idx]) {
            let close = (idx + 1..lines.len()).find(|&j| open.is_closed_by(lines[j]));
            if let Some(close) = close {
                let body = lines[idx + 1..close].join("\n");
                let html = code_block_html(open.lang, &body);
                out.push(Cow::Owned(ctx.placeholders.insert(PlaceholderKind::Block, html)));
                idx = close + 1;
                continue;
            }
        }
        out.push(Cow::Borrowed(lines[idx]));
        idx += 1;
    }

    out.join("\n")
}

/// Replace single-backtick code spans with inline placeholders.
///
/// Pre: fenced code and tables already protected. Post: no backtick span
/// remains for emphasis or link stages to reinterpret.
pub(crate) fn inline_code(text: &str, ctx: &mut RenderContext<'_>) -> String {
    if !text.contains('`') {
        return text.to_owned();
    }
    INLINE_CODE_RE
        .replace_all(text, |caps: &Captures<'_>| {
            ctx.placeholders
                .insert(PlaceholderKind::Inline, code_span_html(&caps[1]))
        })
        .into_owned()
}

fn code_span_html(code: &str) -> String {
    format!("<code>{}</code>", escape_html(code))
}

/// Render a fenced block body.
///
/// `mermaid` blocks become a diagram container for the host page to
/// post-process; everything else gets a header with the language label and
/// a copy button.
fn code_block_html(lang: Option<&str>, body: &str) -> String {
    let body = escape_html(body);
    match lang {
        Some(lang) if lang.eq_ignore_ascii_case(MERMAID_LANG) => {
            format!(r#"<div class="mermaid-diagram">{body}</div>"#)
        }
        _ => {
            let lang = escape_attr(lang.unwrap_or("text"));
            format!(
                r#"<div class="code-block-wrapper"><div class="code-block-header"><span class="code-block-lang">{lang}</span><button class="code-block-copy" type="button">Copy</button></div><pre><code class="language-{lang}">{body}</code></pre></div>"#
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{KnownTitles, RenderOptions, render};
    use pretty_assertions::assert_eq;

    fn run(stage: fn(&str, &mut RenderContext<'_>) -> String, text: &str) -> String {
        let titles = KnownTitles::new();
        let mut ctx = RenderContext::new(&titles, RenderOptions::default());
        let out = stage(text, &mut ctx);
        ctx.placeholders.restore(&out)
    }

    #[test]
    fn test_code_block_with_language() {
        assert_eq!(
            code_block_html(Some("rust"), "fn main() {}"),
            r#"<div class="code-block-wrapper"><div class="code-block-header"><span class="code-block-lang">rust</span><button class="code-block-copy" type="button">Copy</button></div><pre><code class="language-rust">fn main() {}</code></pre></div>"#
        );
    }

    #[test]
    fn test_code_block_without_language() {
        let html = code_block_html(None, "plain");
        assert!(html.contains(r#"<code class="language-text">plain</code>"#));
    }

    #[test]
    fn test_mermaid_block() {
        assert_eq!(
            code_block_html(Some("mermaid"), "graph TD\nA-->B"),
            "<div class=\"mermaid-diagram\">graph TD\nA--&gt;B</div>"
        );
    }

    #[test]
    fn test_fenced_body_is_escaped() {
        let out = run(fenced_code, "```html\n<b>&</b>\n```");
        assert!(out.contains("&lt;b&gt;&amp;&lt;/b&gt;"));
    }

    #[test]
    fn test_fenced_block_becomes_single_token_line() {
        let titles = KnownTitles::new();
        let mut ctx = RenderContext::new(&titles, RenderOptions::default());
        let out = fenced_code("before\n```js\na\nb\n```\nafter", &mut ctx);
        let lines: Vec<&str> = out.split('\n').collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "before");
        assert_eq!(lines[2], "after");
        assert_eq!(ctx.placeholders.len(), 1);
    }

    #[test]
    fn test_empty_fenced_block() {
        let out = run(fenced_code, "```\n```");
        assert!(out.contains(r#"<code class="language-text"></code>"#));
    }

    #[test]
    fn test_unclosed_fence_left_alone() {
        assert_eq!(run(fenced_code, "```js\nno end"), "```js\nno end");
    }

    #[test]
    fn test_fence_content_not_formatted() {
        let html = render::<&str>("```js\n# not a heading\n**not bold**\n| a |\n```", &[]);
        assert_eq!(html.matches("code-block-wrapper").count(), 1);
        assert!(!html.contains("<h1>"));
        assert!(!html.contains("<strong>"));
        assert!(html.contains("# not a heading\n**not bold**\n| a |"));
    }

    #[test]
    fn test_mermaid_fence_rendered_once() {
        let html = render::<&str>("```mermaid\ngraph TD\n```", &[]);
        assert_eq!(html.matches("mermaid-diagram").count(), 1);
        assert!(!html.contains("code-block-wrapper"));
    }

    #[test]
    fn test_inline_code_escaped() {
        assert_eq!(run(inline_code, "use `a<b` here"), "use <code>a&lt;b</code> here");
    }

    #[test]
    fn test_inline_code_protects_emphasis() {
        let html = render::<&str>("run `*args*` now", &[]);
        assert_eq!(html, "<p>run <code>*args*</code> now</p>");
    }

    #[test]
    fn test_lone_backtick_untouched() {
        assert_eq!(run(inline_code, "it`s fine"), "it`s fine");
    }
}
