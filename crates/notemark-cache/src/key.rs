//! Cache key construction.

use std::fmt;

use serde::Serialize;

use crate::hash::ContentHash;

/// Identity of one cached render.
///
/// Two renders share a key only when the content fingerprint, the
/// language and the serialized options all match.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CacheKey {
    hash: String,
    language: String,
    options: String,
}

impl CacheKey {
    /// Build a key from content, language and render options.
    ///
    /// # Errors
    ///
    /// Returns an error if `options` cannot be serialized to JSON.
    pub fn new<O: Serialize + ?Sized>(
        hasher: ContentHash,
        content: &str,
        language: &str,
        options: &O,
    ) -> Result<Self, serde_json::Error> {
        Ok(Self {
            hash: hasher.digest(content),
            language: language.to_owned(),
            options: serde_json::to_string(options)?,
        })
    }

    /// Content fingerprint.
    #[must_use]
    pub fn hash(&self) -> &str {
        &self.hash
    }

    /// Language the content was rendered as.
    #[must_use]
    pub fn language(&self) -> &str {
        &self.language
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.hash, self.language, self.options)
    }
}
