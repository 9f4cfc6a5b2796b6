//! Protocols for discovering the key a name points to.

use crate::{events::Events, record::KeyRecord, transport::Transport};
use async_trait::async_trait;
use std::fmt;

mod dns_over_https;
pub use dns_over_https::{DnsOverHttps, DnsOverHttpsError, DnsProvider, DEFAULT_DNS_PROVIDERS};

mod well_known;
pub use well_known::{WellKnown, WellKnownError, DEFAULT_RECORD_NAME};

/// Tag identifying the protocol behind a resolution or failure.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Method {
    /// TXT record lookup over DNS-over-HTTPS.
    DnsOverHttps,
    /// `https://<name>/.well-known/<record>` document.
    WellKnown,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::DnsOverHttps => "dns-over-https",
            Self::WellKnown => "well-known",
        })
    }
}

/// Represents the ability to resolve a name to a key.
#[async_trait]
pub trait KeyResolver: Send + Sync {
    /// Protocol implemented by the resolver.
    const METHOD: Method;

    /// Errors encountered during resolution.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Resolves a normalized name, performing at most one request through
    /// `transport`. Defects that do not prevent resolution are reported
    /// through `events`.
    async fn resolve_key<T: Transport + ?Sized>(
        &self,
        transport: &T,
        name: &str,
        events: &Events,
    ) -> Result<KeyRecord, Self::Error>;
}
