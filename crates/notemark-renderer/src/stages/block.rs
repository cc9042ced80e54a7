//! Block passes: alerts, blockquotes, horizontal rules and paragraphs.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::pipeline::RenderContext;
use crate::placeholder::Placeholders;

static ALERT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?im)^(?:>[ \t]?)?\[!(note|tip|important|warning|caution)\][ \t]*([^\n]*)((?:\n>[^\n]*)*)",
    )
    .unwrap()
});

static BLOCKQUOTE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^>[ \t]?([^\n]*)$").unwrap());

static RULE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^[ \t]*(?:-{3,}|\*{3,}|_{3,})[ \t]*$").unwrap());

static BLOCK_TAG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^</?(?:h[1-6]|hr|p|blockquote|div|pre|ul|ol|li|table)(?:[\s>/]|$)").unwrap()
});

/// GitHub-style alert type.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum AlertKind {
    Note,
    Tip,
    Important,
    Warning,
    Caution,
}

impl AlertKind {
    /// Parse an alert marker name, ignoring case.
    fn parse(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "note" => Some(Self::Note),
            "tip" => Some(Self::Tip),
            "important" => Some(Self::Important),
            "warning" => Some(Self::Warning),
            "caution" => Some(Self::Caution),
            _ => None,
        }
    }

    /// CSS class suffix, icon glyph and display title.
    fn parts(self) -> (&'static str, &'static str, &'static str) {
        match self {
            Self::Note => ("note", "\u{2139}\u{FE0F}", "Note"),
            Self::Tip => ("tip", "\u{1F4A1}", "Tip"),
            Self::Important => ("important", "\u{2757}", "Important"),
            Self::Warning => ("warning", "\u{26A0}\u{FE0F}", "Warning"),
            Self::Caution => ("caution", "\u{1F6D1}", "Caution"),
        }
    }
}

/// Convert `[!NOTE]`-style alert blocks into one-line alert `<div>`s.
///
/// The marker line may be blockquoted. Same-line text and following `>`
/// continuation lines (with `> ` stripped) are joined with `<br>`.
pub(crate) fn alerts(text: &str, ctx: &mut RenderContext<'_>) -> String {
    if !ctx.options.alerts || !text.contains("[!") {
        return text.to_owned();
    }
    ALERT_RE
        .replace_all(text, |caps: &Captures<'_>| {
            let Some(kind) = AlertKind::parse(&caps[1]) else {
                return caps[0].to_owned();
            };
            let (class, icon, title) = kind.parts();

            let same_line = caps[2].trim();
            let continuation = caps[3]
                .split('\n')
                .filter_map(|line| line.strip_prefix('>'))
                .map(str::trim)
                .filter(|line| !line.is_empty());
            let body: Vec<&str> = std::iter::once(same_line)
                .filter(|line| !line.is_empty())
                .chain(continuation)
                .collect();

            let mut html = format!(
                r#"<div class="markdown-alert markdown-alert-{class}"><p class="markdown-alert-title"><span class="markdown-alert-icon">{icon}</span>{title}</p>"#
            );
            if !body.is_empty() {
                html.push_str("<p>");
                html.push_str(&body.join("<br>"));
                html.push_str("</p>");
            }
            html.push_str("</div>");
            html
        })
        .into_owned()
}

/// Convert remaining `>` lines to `<blockquote>`.
///
/// Contiguous quote lines merge into one blockquote joined with `<br>`.
pub(crate) fn blockquotes(text: &str, _ctx: &mut RenderContext<'_>) -> String {
    if !text.contains('>') {
        return text.to_owned();
    }
    let quoted = BLOCKQUOTE_RE.replace_all(text, "<blockquote>$1</blockquote>");
    quoted.replace("</blockquote>\n<blockquote>", "<br>")
}

/// Convert lines made only of `---`, `***` or `___` to `<hr>`.
pub(crate) fn rules(text: &str, _ctx: &mut RenderContext<'_>) -> String {
    RULE_RE.replace_all(text, "<hr>").into_owned()
}

/// Wrap loose lines in `<p>`.
///
/// Block tokens and lines already starting with a block-level tag pass
/// through; blank lines become `<br/>`.
pub(crate) fn paragraphs(text: &str, _ctx: &mut RenderContext<'_>) -> String {
    text.split('\n')
        .map(|line| {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                "<br/>".to_owned()
            } else if Placeholders::is_block_token(trimmed) || BLOCK_TAG_RE.is_match(trimmed) {
                trimmed.to_owned()
            } else {
                format!("<p>{trimmed}</p>")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}
