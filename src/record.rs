//! Resolved keys and the records they are parsed from.

use std::{fmt, str::FromStr};

/// Length, in hex characters, of a resolved key.
pub const KEY_LEN: usize = 64;

/// TTL (in seconds) used when a record does not carry a usable one.
pub const DEFAULT_TTL: u64 = 3600;

/// Upper bound (in seconds) on any TTL taken from a record: one week.
pub const MAX_TTL: u64 = 3600 * 24 * 7;

/// Largest integer a record's TTL may hold before it is considered garbage.
pub(crate) const MAX_SAFE_INTEGER: u64 = (1 << 53) - 1;

/// A 32-byte key rendered as exactly 64 hexadecimal characters.
///
/// The case of the hex digits is preserved as received.
///
/// ```
/// use dweb_dns::Key;
/// let key: Key = "14bc77d788fdaf07b89b28e9d276e47f2e44011f4adb981921056e1b3b40e99e"
///     .parse()
///     .unwrap();
/// assert_eq!(key.as_str().len(), 64);
/// assert!("not a key".parse::<Key>().is_err());
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Key(String);

/// Error produced when text is not a valid [`Key`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("expected {KEY_LEN} hex characters, got {0:?}")]
pub struct KeyParseError(String);

impl Key {
    /// Gets the key's hex representation.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for Key {
    type Err = KeyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() == KEY_LEN && s.bytes().all(|b| b.is_ascii_hexdigit()) {
            Ok(Self(s.to_owned()))
        } else {
            Err(KeyParseError(s.to_owned()))
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Key {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<Key> for String {
    fn from(key: Key) -> Self {
        key.0
    }
}

/// A key discovered by one of the resolution protocols, along with how long
/// (in seconds) it may be cached.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyRecord {
    /// The discovered key.
    pub key: Key,
    /// Seconds the key may be cached for. `0` disables in-memory caching.
    pub ttl: u64,
}

impl KeyRecord {
    /// Creates a record, sanitizing a raw TTL with [`sanitize_ttl`].
    pub fn new(key: Key, ttl: Option<u64>) -> Self {
        Self {
            key,
            ttl: sanitize_ttl(ttl),
        }
    }
}

/// Substitutes [`DEFAULT_TTL`] for missing or out-of-range TTLs and clamps
/// the result to [`MAX_TTL`].
pub fn sanitize_ttl(ttl: Option<u64>) -> u64 {
    match ttl {
        Some(ttl) if ttl <= MAX_SAFE_INTEGER => ttl.min(MAX_TTL),
        _ => DEFAULT_TTL,
    }
}
