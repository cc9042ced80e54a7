//! GFM pipe tables.

use std::borrow::Cow;
use std::fmt::Write;
use std::sync::LazyLock;

use regex::Regex;

use crate::pipeline::RenderContext;
use crate::placeholder::PlaceholderKind;
use crate::stages::{code, inline};

static SEPARATOR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\|[-| :]+\|$").unwrap());

/// Inline stages applied to each cell, in pipeline order.
const CELL_STAGES: &[fn(&str, &mut RenderContext<'_>) -> String] = &[
    code::inline_code,
    inline::emphasis,
    inline::images,
    inline::links,
    inline::wiki_links,
    inline::tags,
];

/// Column alignment from the separator row.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Alignment {
    Default,
    Left,
    Center,
    Right,
}

impl Alignment {
    fn from_separator(cell: &str) -> Self {
        match (cell.starts_with(':'), cell.ends_with(':')) {
            (true, true) => Self::Center,
            (true, false) => Self::Left,
            (false, true) => Self::Right,
            (false, false) => Self::Default,
        }
    }

    fn style_attr(self) -> &'static str {
        match self {
            Self::Default => "",
            Self::Left => r#" style="text-align: left""#,
            Self::Center => r#" style="text-align: center""#,
            Self::Right => r#" style="text-align: right""#,
        }
    }
}

/// Replace GFM tables with block placeholders.
///
/// A table is a `|...|` header row, a separator row of `-`, `|`, `:` and
/// spaces, then any number of `|...|` body rows.
pub(crate) fn tables(text: &str, ctx: &mut RenderContext<'_>) -> String {
    if !ctx.options.tables || !text.contains('|') {
        return text.to_owned();
    }

    let lines: Vec<&str> = text.split('\n').collect();
    let mut out: Vec<Cow<'_, str>> = Vec::with_capacity(lines.len());
    let mut idx = 0;

    while idx < lines.len() {
        let starts_table = is_row(lines[idx])
            && lines
                .get(idx + 1)
                .is_some_and(|line| SEPARATOR_RE.is_match(line.trim()));
        if starts_table {
            let mut end = idx + 2;
            while end < lines.len() && is_row(lines[end]) {
                end += 1;
            }
            let html = render_table(lines[idx], lines[idx + 1], &lines[idx + 2..end], ctx);
            out.push(Cow::Owned(ctx.placeholders.insert(PlaceholderKind::Block, html)));
            idx = end;
        } else {
            out.push(Cow::Borrowed(lines[idx]));
            idx += 1;
        }
    }

    out.join("\n")
}

fn is_row(line: &str) -> bool {
    let line = line.trim();
    line.len() >= 2 && line.starts_with('|') && line.ends_with('|')
}

fn render_table(header: &str, separator: &str, rows: &[&str], ctx: &RenderContext<'_>) -> String {
    let header = split_row(header);
    let aligns: Vec<Alignment> = split_row(separator)
        .into_iter()
        .map(Alignment::from_separator)
        .collect();
    let align = |col: usize| aligns.get(col).copied().unwrap_or(Alignment::Default);

    let mut html = String::from("<table><thead><tr>");
    for (col, cell) in header.iter().enumerate() {
        let _ = write!(html, "<th{}>{}</th>", align(col).style_attr(), format_cell(cell, ctx));
    }
    html.push_str("</tr></thead><tbody>");

    for row in rows {
        let cells = split_row(row);
        html.push_str("<tr>");
        // Rows are padded or truncated to the header width.
        for col in 0..header.len() {
            let cell = cells.get(col).copied().unwrap_or("");
            let _ = write!(html, "<td{}>{}</td>", align(col).style_attr(), format_cell(cell, ctx));
        }
        html.push_str("</tr>");
    }

    html.push_str("</tbody></table>");
    html
}

/// Split a row on `|` and trim each cell.
///
/// The empty pieces before the first and after the last pipe are dropped;
/// empty cells in between are kept. Pipes inside `[[...]]` do not split.
fn split_row(line: &str) -> Vec<&str> {
    let line = line.trim();
    let bytes = line.as_bytes();
    let mut cells = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    let mut idx = 0;

    while idx < bytes.len() {
        match bytes[idx] {
            b'[' if bytes.get(idx + 1) == Some(&b'[') => {
                depth += 1;
                idx += 2;
                continue;
            }
            b']' if depth > 0 && bytes.get(idx + 1) == Some(&b']') => {
                depth -= 1;
                idx += 2;
                continue;
            }
            b'|' if depth == 0 => {
                cells.push(&line[start..idx]);
                start = idx + 1;
            }
            _ => {}
        }
        idx += 1;
    }
    cells.push(&line[start..]);

    if cells.first().is_some_and(|cell| cell.trim().is_empty()) {
        cells.remove(0);
    }
    if cells.last().is_some_and(|cell| cell.trim().is_empty()) {
        cells.pop();
    }
    cells.into_iter().map(str::trim).collect()
}

/// Apply inline formatting to one cell with its own placeholder table.
fn format_cell(cell: &str, ctx: &RenderContext<'_>) -> String {
    if cell.is_empty() {
        return String::new();
    }
    let mut cell_ctx = RenderContext::new(ctx.known_titles, ctx.options);
    let mut out = cell.to_owned();
    for stage in CELL_STAGES {
        out = stage(&out, &mut cell_ctx);
    }
    cell_ctx.placeholders.restore(&out)
}
