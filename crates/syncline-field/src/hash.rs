//! Stable identifier hashing
//!
//! Provides [`StableHash`], the deterministic 32-bit hash rendered as an
//! 8-character lowercase hex string that identifies fields and items
//! across sync sessions.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// A stable 32-bit content hash rendered as 8 lowercase hex digits
///
/// Computed with a djb2-style rolling hash over the input's UTF-16 code
/// units (`h = 5381; h = h * 33 ^ unit`, wrapping). The same input always
/// produces the same hash, which is what makes repeated syncs update
/// existing records instead of duplicating them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StableHash(u32);

impl StableHash {
    /// Compute the hash of a string
    #[inline]
    #[must_use]
    pub fn of(input: &str) -> Self {
        let mut hash: u32 = 5381;
        for unit in input.encode_utf16() {
            hash = hash.wrapping_mul(33) ^ u32::from(unit);
        }
        Self(hash)
    }

    /// Wrap a raw 32-bit value
    #[inline]
    #[must_use]
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    /// Get the raw 32-bit value
    #[inline]
    #[must_use]
    pub const fn as_u32(&self) -> u32 {
        self.0
    }
}

impl Display for StableHash {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{:08x}", self.0)
    }
}

impl FromStr for StableHash {
    type Err = HashError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != 8 {
            return Err(HashError::InvalidLength {
                expected: 8,
                actual: s.len(),
            });
        }
        let raw = u32::from_str_radix(s, 16).map_err(|_| HashError::InvalidHex(s.to_string()))?;
        Ok(Self(raw))
    }
}

impl Serialize for StableHash {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        if serializer.is_human_readable() {
            serializer.serialize_str(&self.to_string())
        } else {
            serializer.serialize_u32(self.0)
        }
    }
}

impl<'de> Deserialize<'de> for StableHash {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        if deserializer.is_human_readable() {
            let s = String::deserialize(deserializer)?;
            s.parse().map_err(serde::de::Error::custom)
        } else {
            u32::deserialize(deserializer).map(Self)
        }
    }
}

/// Identifier of a field, hashed from the field's display name
///
/// Renaming a mapped field in the UI must never change its id, so the id
/// is always derived from the *source* field name, not the override.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct FieldId(StableHash);

impl FieldId {
    /// Derive the id from a source field name
    #[inline]
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        Self(StableHash::of(name))
    }

    /// Get the underlying hash
    #[inline]
    #[must_use]
    pub const fn hash(&self) -> StableHash {
        self.0
    }
}

impl Display for FieldId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.0, f)
    }
}

impl FromStr for FieldId {
    type Err = HashError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse().map(Self)
    }
}

/// Identifier of a synced item, hashed from its resolved slug
///
/// Two syncs of the same logical record resolve the same slug and
/// therefore the same id, turning `add_items` into an idempotent upsert.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct ItemId(StableHash);

impl ItemId {
    /// Derive the id from a resolved slug
    #[inline]
    #[must_use]
    pub fn from_slug(slug: &str) -> Self {
        Self(StableHash::of(slug))
    }

    /// Get the underlying hash
    #[inline]
    #[must_use]
    pub const fn hash(&self) -> StableHash {
        self.0
    }
}

impl Display for ItemId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.0, f)
    }
}

impl FromStr for ItemId {
    type Err = HashError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse().map(Self)
    }
}

/// Errors that can occur when parsing stable hashes
#[derive(Debug, thiserror::Error)]
pub enum HashError {
    /// Wrong number of hex digits
    #[error("invalid hash length: expected {expected}, got {actual}")]
    InvalidLength {
        /// Expected digit count
        expected: usize,
        /// Actual digit count
        actual: usize,
    },

    /// Not a hex string
    #[error("invalid hex digits: {0}")]
    InvalidHex(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_is_deterministic() {
        assert_eq!(StableHash::of("title"), StableHash::of("title"));
        assert_eq!(
            StableHash::of("title").to_string(),
            StableHash::of("title").to_string()
        );
    }

    #[test]
    fn hash_renders_eight_lowercase_hex_digits() {
        for input in ["", "a", "title", "Hello World", "日本語", "🙂"] {
            let rendered = StableHash::of(input).to_string();
            assert_eq!(rendered.len(), 8, "input {input:?}");
            assert!(rendered
                .chars()
                .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
        }
    }

    #[test]
    fn hash_known_vectors() {
        // Empty input leaves the djb2 seed untouched.
        assert_eq!(StableHash::of("").to_string(), "00001505");
        // 5381 * 33 ^ 'a' = 0x2b5a5 ^ 0x61
        assert_eq!(StableHash::of("a").to_string(), "0002b5c4");
    }

    #[test]
    fn hash_distinguishes_inputs() {
        assert_ne!(StableHash::of("title"), StableHash::of("Title"));
    }

    #[test]
    fn hash_display_and_parse_round_trip() {
        let hash = StableHash::of("body");
        let parsed: StableHash = hash.to_string().parse().unwrap();
        assert_eq!(hash, parsed);
    }

    #[test]
    fn hash_parse_rejects_bad_input() {
        assert!(matches!(
            "123".parse::<StableHash>(),
            Err(HashError::InvalidLength {
                expected: 8,
                actual: 3
            })
        ));
        assert!(matches!(
            "zzzzzzzz".parse::<StableHash>(),
            Err(HashError::InvalidHex(_))
        ));
    }

    #[test]
    fn field_id_tracks_name_hash() {
        assert_eq!(
            FieldId::from_name("Title").to_string(),
            StableHash::of("Title").to_string()
        );
    }

    #[test]
    fn item_id_tracks_slug_hash() {
        assert_eq!(
            ItemId::from_slug("hello-world").to_string(),
            StableHash::of("hello-world").to_string()
        );
    }

    #[test]
    fn hash_serde_human_readable_is_hex_string() {
        let json = serde_json::to_string(&StableHash::of("title")).unwrap();
        assert!(json.starts_with('"'));
        let decoded: StableHash = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, StableHash::of("title"));
    }
}
