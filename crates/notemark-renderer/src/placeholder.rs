//! Placeholder table for protected regions.
//!
//! Regions whose content must not be re-read by later stages (fenced code,
//! tables, inline code, links) are rendered early and replaced by a token.
//! Tokens are restored as the last pipeline stage.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::{Captures, Regex};

/// Opening sentinel of a placeholder token (Unicode private use area).
const TOKEN_OPEN: char = '\u{E000}';
/// Closing sentinel of a placeholder token.
const TOKEN_CLOSE: char = '\u{E001}';

static TOKEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\x{E000}([BI])(\d+)\x{E001}").unwrap());

/// Kind of protected region behind a placeholder.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlaceholderKind {
    /// Block region (fenced code, table). A line holding only a block token
    /// is not wrapped in a paragraph.
    Block,
    /// Inline region (inline code, link, image, wiki-link).
    Inline,
}

impl PlaceholderKind {
    fn letter(self) -> char {
        match self {
            Self::Block => 'B',
            Self::Inline => 'I',
        }
    }
}

/// Ordered table of `(token, html)` pairs built during one render call.
///
/// Token format is `U+E000 <B|I> <index> U+E001`. Input text is passed
/// through [`sanitize`](Self::sanitize) before any token is emitted, so a
/// token can never be confused with document content.
///
/// # Example
///
/// ```
/// use notemark_renderer::{PlaceholderKind, Placeholders};
///
/// let mut placeholders = Placeholders::new();
/// let token = placeholders.insert(PlaceholderKind::Inline, "<code>x</code>");
/// let text = format!("before {token} after");
///
/// assert_eq!(placeholders.restore(&text), "before <code>x</code> after");
/// ```
#[derive(Debug, Default)]
pub struct Placeholders {
    items: Vec<(PlaceholderKind, String)>,
}

impl Placeholders {
    /// Create an empty placeholder table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace sentinel characters in raw input with `U+FFFD`.
    ///
    /// Borrows the input when it holds no sentinel characters.
    pub fn sanitize(input: &str) -> Cow<'_, str> {
        if input.contains([TOKEN_OPEN, TOKEN_CLOSE]) {
            Cow::Owned(input.replace([TOKEN_OPEN, TOKEN_CLOSE], "\u{FFFD}"))
        } else {
            Cow::Borrowed(input)
        }
    }

    /// Register rendered HTML and return the token that stands for it.
    ///
    /// The HTML may itself contain tokens returned by earlier calls.
    pub fn insert(&mut self, kind: PlaceholderKind, html: impl Into<String>) -> String {
        let index = self.items.len();
        self.items.push((kind, html.into()));
        format!("{TOKEN_OPEN}{}{index}{TOKEN_CLOSE}", kind.letter())
    }

    /// Check whether `line` (ignoring surrounding whitespace) is exactly one
    /// block token.
    #[must_use]
    pub fn is_block_token(line: &str) -> bool {
        let line = line.trim();
        TOKEN_RE
            .captures(line)
            .is_some_and(|caps| caps.get(0).is_some_and(|m| m.len() == line.len()) && &caps[1] == "B")
    }

    /// Substitute every token in `text` with its HTML.
    ///
    /// Tokens nested inside stored HTML are expanded too. A token only
    /// expands tokens registered before it, so expansion always terminates.
    #[must_use]
    pub fn restore(&self, text: &str) -> String {
        self.expand(text, self.items.len())
    }

    /// Number of registered regions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if no region has been registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn expand(&self, text: &str, limit: usize) -> String {
        if !text.contains(TOKEN_OPEN) {
            return text.to_owned();
        }
        TOKEN_RE
            .replace_all(text, |caps: &Captures<'_>| {
                let entry = caps[2]
                    .parse::<usize>()
                    .ok()
                    .filter(|&index| index < limit)
                    .and_then(|index| self.items.get(index).map(|item| (index, item)));
                match entry {
                    Some((index, (kind, html))) if kind.letter().to_string() == caps[1] => {
                        self.expand(html, index)
                    }
                    _ => caps[0].to_owned(),
                }
            })
            .into_owned()
    }
}
