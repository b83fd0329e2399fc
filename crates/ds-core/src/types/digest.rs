//! Hex-encoded content digests.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A finalized content digest, encoded as lowercase hexadecimal.
///
/// Uses a newtype over `String` so that a free-form string can never end up
/// in the digest column of a report. The only ways to obtain one are
/// [`from_bytes`](Self::from_bytes), which encodes raw digest output, and
/// [`parse`](Self::parse), which validates an existing hex string.
///
/// # Examples
///
/// ```
/// use ds_core::HexDigest;
///
/// let digest = HexDigest::from_bytes(&[0xde, 0xad, 0xbe, 0xef]);
/// assert_eq!(digest.as_str(), "deadbeef");
/// assert_eq!(digest.len(), 8);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HexDigest(String);

impl HexDigest {
    /// Encodes raw digest bytes as lowercase hex.
    #[must_use]
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self(hex::encode(bytes))
    }

    /// Validates and wraps an existing hex string.
    ///
    /// Returns `None` unless the input is non-empty, of even length, and
    /// made only of `0-9a-f`. Uppercase hex is rejected rather than folded.
    ///
    /// # Examples
    ///
    /// ```
    /// use ds_core::HexDigest;
    ///
    /// assert!(HexDigest::parse("d41d8cd98f00b204e9800998ecf8427e").is_some());
    /// assert!(HexDigest::parse("D41D8CD98F00B204E9800998ECF8427E").is_none());
    /// assert!(HexDigest::parse("N/A").is_none());
    /// ```
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        let valid = !value.is_empty()
            && value.len() % 2 == 0
            && value.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'));
        valid.then(|| Self(value.to_owned()))
    }

    /// Returns the digest as a hex string slice.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the number of hex characters.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always `false`: a digest is never empty.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for HexDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for HexDigest {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
