//! Task list items and list grouping.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::pipeline::RenderContext;

static TASK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^[ \t]*[-*+][ \t]+\[( |x)\](?:[ \t]+([^\n]*))?[ \t]*$").unwrap()
});

static BULLET_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[ \t]*[-*+][ \t]+(.*)$").unwrap());

static ORDERED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[ \t]*(\d{1,9})[.)][ \t]+(.*)$").unwrap());

/// Convert `- [ ]` and `- [x]` lines to `<li>` with a disabled checkbox.
///
/// Only lowercase `x` marks an item as done.
pub(crate) fn task_lists(text: &str, ctx: &mut RenderContext<'_>) -> String {
    if !ctx.options.task_lists || !text.contains('[') {
        return text.to_owned();
    }
    TASK_RE
        .replace_all(text, |caps: &Captures<'_>| {
            let checked = if &caps[1] == "x" { " checked" } else { "" };
            let label = caps.get(2).map_or("", |m| m.as_str().trim_end());
            format!(
                r#"<li class="task-list-item"><input type="checkbox" disabled{checked}> {label}</li>"#
            )
        })
        .into_owned()
}

/// List flavor of a run of items.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ListKind {
    Unordered,
    /// Ordered list with the number of its first item.
    Ordered(u32),
}

/// Convert bullet and numbered lines to `<li>` and group contiguous items
/// into one `<ul>` or `<ol>` line.
///
/// The wrapper is chosen from the first item of each run: a numeric marker
/// gives `<ol>`, anything else (including task items) gives `<ul>`.
pub(crate) fn lists(text: &str, _ctx: &mut RenderContext<'_>) -> String {
    let mut out: Vec<String> = Vec::new();
    let mut run: Option<(ListKind, String)> = None;

    for line in text.split('\n') {
        match classify(line) {
            Some((kind, item)) => {
                if let Some((_, items)) = run.as_mut() {
                    items.push_str(&item);
                } else {
                    run = Some((kind, item));
                }
            }
            None => {
                if let Some(finished) = run.take() {
                    out.push(wrap(finished));
                }
                out.push(line.to_owned());
            }
        }
    }
    if let Some(finished) = run.take() {
        out.push(wrap(finished));
    }

    out.join("\n")
}

/// Classify a line as a list item, returning its flavor and `<li>` markup.
fn classify(line: &str) -> Option<(ListKind, String)> {
    let trimmed = line.trim_start();
    let is_item = trimmed
        .strip_prefix("<li")
        .is_some_and(|rest| rest.starts_with('>') || rest.starts_with(char::is_whitespace));
    if is_item {
        return Some((ListKind::Unordered, trimmed.trim_end().to_owned()));
    }
    if let Some(caps) = ORDERED_RE.captures(line) {
        let start = caps[1].parse().unwrap_or(1);
        return Some((ListKind::Ordered(start), format!("<li>{}</li>", caps[2].trim_end())));
    }
    BULLET_RE
        .captures(line)
        .map(|caps| (ListKind::Unordered, format!("<li>{}</li>", caps[1].trim_end())))
}

fn wrap((kind, items): (ListKind, String)) -> String {
    match kind {
        ListKind::Unordered => format!("<ul>{items}</ul>"),
        ListKind::Ordered(1) => format!("<ol>{items}</ol>"),
        ListKind::Ordered(start) => format!(r#"<ol start="{start}">{items}</ol>"#),
    }
}
