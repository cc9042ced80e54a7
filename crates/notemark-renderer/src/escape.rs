//! HTML escaping helpers.

use std::borrow::Cow;

/// Escape text for use inside an HTML element body.
///
/// Replaces `&`, `<` and `>`. Returns the input unchanged (borrowed) when
/// nothing needs escaping.
///
/// # Examples
///
/// ```
/// use notemark_renderer::escape_html;
///
/// assert_eq!(escape_html("a < b && c"), "a &lt; b &amp;&amp; c");
/// assert_eq!(escape_html("plain"), "plain");
/// ```
pub fn escape_html(text: &str) -> Cow<'_, str> {
    escape_with(text, false)
}

/// Escape text for use inside a double-quoted HTML attribute.
///
/// Same as [`escape_html`], plus `"` becomes `&quot;`.
pub fn escape_attr(text: &str) -> Cow<'_, str> {
    escape_with(text, true)
}

fn escape_with(text: &str, quotes: bool) -> Cow<'_, str> {
    let needs_escape = |c: char| matches!(c, '&' | '<' | '>') || (quotes && c == '"');
    if !text.contains(needs_escape) {
        return Cow::Borrowed(text);
    }

    let mut out = String::with_capacity(text.len() + 16);
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' if quotes => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    Cow::Owned(out)
}
