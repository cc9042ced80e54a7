//! Code fence detection.
//!
//! Code fences use backticks or tildes (three or more). The closing fence
//! must use the same character and be at least as long as the opening fence.

/// An opening fence line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct FenceOpen<'a> {
    /// Character used for the fence (backtick or tilde).
    pub(crate) fence_char: char,
    /// Length of the opening fence (minimum length for closing).
    pub(crate) fence_len: usize,
    /// Language tag: first word of the info string, if any.
    pub(crate) lang: Option<&'a str>,
}

impl FenceOpen<'_> {
    /// Check if a line closes this fence.
    pub(crate) fn is_closed_by(&self, line: &str) -> bool {
        is_fence_line(line.trim_start(), self.fence_char, self.fence_len)
    }
}

/// Detect if a line starts a code fence.
///
/// A backtick fence whose info string contains another backtick is inline
/// code, not a fence.
pub(crate) fn detect_fence(line: &str) -> Option<FenceOpen<'_>> {
    let trimmed = line.trim_start();
    let first = trimmed.chars().next()?;
    if first != '`' && first != '~' {
        return None;
    }

    let count = trimmed.chars().take_while(|&c| c == first).count();
    if count < 3 {
        return None;
    }

    let info = trimmed[count..].trim();
    if first == '`' && info.contains('`') {
        return None;
    }

    Some(FenceOpen {
        fence_char: first,
        fence_len: count,
        lang: info.split_whitespace().next(),
    })
}

/// Check if a line is a valid closing fence.
///
/// The closing fence must:
/// - Use the same character as opening
/// - Be at least as long as opening
/// - Contain only fence characters (optionally followed by whitespace)
fn is_fence_line(trimmed: &str, expected_char: char, min_len: usize) -> bool {
    let first = match trimmed.chars().next() {
        Some(c) if c == expected_char => c,
        _ => return false,
    };

    let count = trimmed.chars().take_while(|&c| c == first).count();
    if count < min_len {
        return false;
    }

    // After fence chars, only whitespace is allowed
    trimmed[count..].chars().all(char::is_whitespace)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backtick_fence_with_lang() {
        let open = detect_fence("```rust").unwrap();
        assert_eq!(open.fence_char, '`');
        assert_eq!(open.fence_len, 3);
        assert_eq!(open.lang, Some("rust"));
        assert!(open.is_closed_by("```"));
    }

    #[test]
    fn test_info_string_takes_first_word() {
        let open = detect_fence("~~~ python title=demo").unwrap();
        assert_eq!(open.lang, Some("python"));
    }

    #[test]
    fn test_no_lang() {
        let open = detect_fence("```").unwrap();
        assert_eq!(open.lang, None);
    }

    #[test]
    fn test_two_backticks_not_fence() {
        assert!(detect_fence("``inline code``").is_none());
    }

    #[test]
    fn test_backticks_in_info_not_fence() {
        assert!(detect_fence("```inline```").is_none());
    }

    #[test]
    fn test_shorter_fence_not_closing() {
        let open = detect_fence("````").unwrap();
        assert!(!open.is_closed_by("```"));
        assert!(open.is_closed_by("````"));
        assert!(open.is_closed_by("`````"));
    }

    #[test]
    fn test_mixed_fence_chars() {
        let open = detect_fence("```").unwrap();
        assert!(!open.is_closed_by("~~~"));
    }

    #[test]
    fn test_closing_fence_with_text_not_closing() {
        let open = detect_fence("```").unwrap();
        assert!(!open.is_closed_by("```js"));
        assert!(open.is_closed_by("  ```  "));
    }
}
