//! Case-insensitive set of known document titles.

use std::collections::HashSet;

/// Titles of the other documents in the library.
///
/// Lookups trim surrounding whitespace and ignore case, so `" foo "` matches
/// a stored `"Foo"`. Used to tell resolved wiki-links from ghost links.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct KnownTitles {
    titles: HashSet<String>,
}

impl KnownTitles {
    /// Create an empty title set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a title to the set.
    pub fn insert(&mut self, title: &str) {
        let key = normalize(title);
        if !key.is_empty() {
            self.titles.insert(key);
        }
    }

    /// Check whether a title is known.
    #[must_use]
    pub fn contains(&self, title: &str) -> bool {
        self.titles.contains(&normalize(title))
    }

    /// Number of distinct titles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.titles.len()
    }

    /// Check if the set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.titles.is_empty()
    }
}

impl<S: AsRef<str>> FromIterator<S> for KnownTitles {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = Self::new();
        set.extend(iter);
        set
    }
}

impl<S: AsRef<str>> Extend<S> for KnownTitles {
    fn extend<I: IntoIterator<Item = S>>(&mut self, iter: I) {
        for title in iter {
            self.insert(title.as_ref());
        }
    }
}

fn normalize(title: &str) -> String {
    title.trim().to_lowercase()
}
