//! Normalization of caller-supplied names.

use crate::{
    client::Error,
    record::{Key, KEY_LEN},
};
use regex::Regex;
use std::sync::OnceLock;
use url::{ParseError, Url};

/// Result of normalizing a name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NormalizedName {
    /// The name already was a key; nothing remains to be resolved.
    Key(Key),
    /// A hostname (or path) that still has to be resolved to a key.
    Name(String),
}

/// Key-detection pattern used unless one is configured: 64 hex characters,
/// tolerating a single trailing character.
pub fn default_hash_regex() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(?i)^[0-9a-f]{64}.?$").unwrap())
}

/// Trailing `+<version>` suffix, e.g. `example.com+5`.
fn version_suffix() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\+[^/]+$").unwrap())
}

/// Reduces a name, URL, or key to either a [`Key`] or the hostname to resolve.
///
/// ```
/// use dweb_dns::{normalize, NormalizedName};
/// let hash_regex = dweb_dns::default_hash_regex();
/// assert_eq!(
///     normalize("dweb://example.com+5/index.html?x=1", hash_regex).unwrap(),
///     NormalizedName::Name(String::from("example.com")),
/// );
/// ```
pub fn normalize(raw: &str, hash_regex: &Regex) -> Result<NormalizedName, Error> {
    let invalid = |reason| Error::InvalidName {
        name: raw.to_owned(),
        reason,
    };

    let name = host_or_path(raw).ok_or_else(|| invalid("no hostname or path"))?;
    let name = version_suffix().replace(&name, "");
    if name.is_empty() {
        return Err(invalid("nothing left after removing the version"));
    }

    if hash_regex.is_match(&name) {
        let key = name.chars().take(KEY_LEN).collect::<String>();
        return key
            .parse()
            .map(NormalizedName::Key)
            .map_err(|_| invalid("matched the key pattern but is not a key"));
    }
    Ok(NormalizedName::Name(name.into_owned()))
}

/// Extracts the hostname of an absolute URL, falling back to its path. Names
/// that are not absolute URLs are treated as a bare path.
fn host_or_path(raw: &str) -> Option<String> {
    let non_empty = |s: &str| (!s.is_empty()).then(|| s.to_owned());
    match Url::parse(raw) {
        Ok(url) => url
            .host_str()
            .and_then(non_empty)
            .or_else(|| non_empty(url.path())),
        Err(ParseError::RelativeUrlWithoutBase) => {
            raw.split(['?', '#']).next().and_then(non_empty)
        }
        Err(_) => None,
    }
}
