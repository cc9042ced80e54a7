//! Content hashing for cache keys.

use serde::Deserialize;
use sha2::{Digest, Sha256};

/// Hash function used to fingerprint cached content.
///
/// `Rolling` is fast but only 32 bits wide: two different notes can
/// collide and return each other's render. `Sha256` removes that risk at
/// the cost of hashing speed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentHash {
    /// 32-bit rolling hash (`h * 31 + unit` over UTF-16 code units).
    #[default]
    Rolling,
    /// SHA-256 digest.
    Sha256,
}

impl ContentHash {
    /// Compute the hex fingerprint of `content`.
    #[must_use]
    pub fn digest(self, content: &str) -> String {
        match self {
            Self::Rolling => format!("{:08x}", rolling_hash(content)),
            Self::Sha256 => hex::encode(Sha256::digest(content.as_bytes())),
        }
    }
}

/// 32-bit rolling string hash over UTF-16 code units.
///
/// Each step computes `h = h * 31 + unit` with wrapping arithmetic, matching
/// the classic string hash used by browser-side caches.
///
/// # Examples
///
/// ```
/// use notemark_cache::rolling_hash;
///
/// assert_eq!(rolling_hash(""), 0);
/// assert_eq!(rolling_hash("a"), 97);
/// assert_eq!(rolling_hash("ab"), 97 * 31 + 98);
/// ```
#[must_use]
pub fn rolling_hash(content: &str) -> u32 {
    content
        .encode_utf16()
        .fold(0u32, |hash, unit| hash.wrapping_mul(31).wrapping_add(u32::from(unit)))
}
