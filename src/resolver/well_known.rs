//! Key resolution from `https://<name>/.well-known/<record>` documents.
//!
//! The document's first line is a URL holding the key, e.g.
//! `dweb://<64 hex characters>`, and its optional second line is `ttl=<seconds>`.

use super::{KeyResolver, Method};
use crate::{
    events::{Event, Events},
    record::{Key, KeyRecord},
    transport::{Response, Transport},
};
use async_trait::async_trait;
use http::{HeaderMap, StatusCode};
use regex::Regex;
use std::sync::OnceLock;
use url::Url;

/// Record name used unless one is configured.
pub const DEFAULT_RECORD_NAME: &str = "dweb";

/// Errors encountered by [`WellKnown`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WellKnownError {
    /// The host could not be reached (status `0`) or has no such document
    /// (status `404`). This is a definitive "not found".
    #[error("HTTP code {status} {reason}")]
    Unreachable {
        /// Status of the response, or `0` if none was received.
        status: u16,
        /// Description of the failure.
        reason: String,
    },
    /// The host answered with a status other than 200 or 404.
    #[error("HTTP code {0}")]
    UnexpectedStatus(u16),
    /// The host answered 200 with an empty document.
    #[error("Empty response")]
    EmptyResponse,
    /// The document's first line did not hold a key.
    #[error("Record did not conform to {pattern}")]
    NonConforming {
        /// Pattern the first line was matched against.
        pattern: String,
    },
}

impl WellKnownError {
    /// Determines whether the error proves the name has no record, as opposed
    /// to the record being temporarily unavailable or malformed.
    pub fn is_definitive_miss(&self) -> bool {
        matches!(self, Self::Unreachable { .. })
    }
}

/// Default pattern extracting a key from a document's first line.
pub(crate) fn default_protocol_regex() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(?i)^dweb://([0-9a-f]{64})").unwrap())
}

fn ttl_line() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(?i)^ttl=(\d+)$").unwrap())
}

/// Resolves names by fetching `/.well-known/<record name>` from the name's
/// own host.
#[derive(Clone, Debug)]
pub struct WellKnown {
    record_name: String,
    protocol_regex: Regex,
}

impl WellKnown {
    /// Sets the record name, i.e. the final path segment of the document.
    pub fn record_name(self, record_name: impl ToString) -> Self {
        Self {
            record_name: record_name.to_string(),
            ..self
        }
    }

    /// Sets the pattern extracting a key (capture group 1) from the first line.
    pub fn protocol_regex(self, protocol_regex: Regex) -> Self {
        Self {
            protocol_regex,
            ..self
        }
    }
}

impl Default for WellKnown {
    fn default() -> Self {
        Self {
            record_name: String::from(DEFAULT_RECORD_NAME),
            protocol_regex: default_protocol_regex().clone(),
        }
    }
}

#[async_trait]
impl KeyResolver for WellKnown {
    const METHOD: Method = Method::WellKnown;
    type Error = WellKnownError;

    async fn resolve_key<T: Transport + ?Sized>(
        &self,
        transport: &T,
        name: &str,
        events: &Events,
    ) -> Result<KeyRecord, Self::Error> {
        #[cfg(feature = "log")]
        tracing::debug!(%name, record = %self.record_name, "well-known lookup");
        let response = match self.document_url(name) {
            Ok(url) => transport.get(&url, &HeaderMap::new()).await,
            Err(err) => Response::Failed {
                reason: err.to_string(),
            },
        };

        match response {
            Response::Received { status, body } if status == StatusCode::OK => {
                self.parse_record(name, &body, events)
            }
            Response::Received { status, .. } if status == StatusCode::NOT_FOUND => {
                Err(WellKnownError::Unreachable {
                    status: status.as_u16(),
                    reason: status.canonical_reason().unwrap_or_default().to_owned(),
                })
            }
            Response::Received { status, .. } => {
                Err(WellKnownError::UnexpectedStatus(status.as_u16()))
            }
            Response::Failed { reason } => Err(WellKnownError::Unreachable { status: 0, reason }),
        }
    }
}

impl WellKnown {
    /// Builds the document's URL with `name` as its host, and nothing else:
    /// names carrying a path, userinfo or port are rejected.
    fn document_url(&self, name: &str) -> Result<Url, url::ParseError> {
        let mut url = Url::parse("https://localhost/.well-known/")?;
        url.path_segments_mut()
            .map_err(|()| url::ParseError::RelativeUrlWithoutBase)?
            .pop_if_empty()
            .push(&self.record_name);
        url.set_host(Some(name))?;
        Ok(url)
    }

    /// Parses a document. A malformed TTL line is reported through `events`
    /// and replaced by the default TTL.
    fn parse_record(
        &self,
        name: &str,
        body: &str,
        events: &Events,
    ) -> Result<KeyRecord, WellKnownError> {
        if body.is_empty() {
            return Err(WellKnownError::EmptyResponse);
        }
        let mut lines = body
            .split('\n')
            .map(|line| line.strip_suffix('\r').unwrap_or(line));

        let key = lines
            .next()
            .and_then(|line| self.protocol_regex.captures(line))
            .and_then(|captures| captures.get(1))
            .and_then(|key| key.as_str().parse::<Key>().ok())
            .ok_or_else(|| WellKnownError::NonConforming {
                pattern: self.protocol_regex.to_string(),
            })?;

        let ttl = match lines.next().filter(|line| !line.is_empty()) {
            None => None,
            Some(line) => {
                let ttl = ttl_line()
                    .captures(line)
                    .and_then(|captures| captures[1].parse::<u64>().ok());
                if ttl.is_none() {
                    #[cfg(feature = "log")]
                    tracing::warn!(%name, %line, "failed to parse well-known TTL line");
                    events.emit(Event::Failed {
                        method: Method::WellKnown,
                        name: name.to_owned(),
                        err: format!("Failed to parse TTL line {line:?}"),
                    });
                }
                ttl
            }
        };

        Ok(KeyRecord::new(key, ttl))
    }
}
