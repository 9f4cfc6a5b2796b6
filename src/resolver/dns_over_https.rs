//! Key resolution from TXT records fetched over DNS-over-HTTPS.

use super::{KeyResolver, Method};
use crate::{
    events::Events,
    record::{Key, KeyRecord, MAX_SAFE_INTEGER},
    transport::Transport,
};
use async_trait::async_trait;
use http::{header::ACCEPT, HeaderMap, HeaderValue};
use rand::Rng;
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;
use std::sync::OnceLock;
use url::Url;

/// Public DNS-over-HTTPS resolvers to pick from when none is configured, as
/// `(host, port, path)`.
pub const DEFAULT_DNS_PROVIDERS: [(&str, u16, &str); 3] = [
    ("cloudflare-dns.com", 443, "/dns-query"),
    ("dns.google", 443, "/resolve"),
    ("dns.quad9.net", 5053, "/dns-query"),
];

/// Location of a JSON DNS-over-HTTPS endpoint.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DnsProvider {
    host: String,
    port: u16,
    path: String,
}

impl DnsProvider {
    /// Creates a provider served from `path` on `host`, port 443.
    pub fn new(host: impl ToString, path: impl ToString) -> Self {
        Self {
            host: host.to_string(),
            port: 443,
            path: path.to_string(),
        }
    }

    /// Sets the port of the provider.
    pub fn port(self, port: u16) -> Self {
        Self { port, ..self }
    }

    /// Picks one of the [`DEFAULT_DNS_PROVIDERS`] at random.
    pub fn random() -> Self {
        let idx = rand::rng().random_range(0..DEFAULT_DNS_PROVIDERS.len());
        let (host, port, path) = DEFAULT_DNS_PROVIDERS[idx];
        Self::new(host, path).port(port)
    }

    /// Gets the provider's host.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Builds the URL querying the TXT records of `fqdn`.
    fn query_url(&self, fqdn: &str) -> Result<Url, url::ParseError> {
        let mut url = Url::parse(&format!("https://{}:{}{}", self.host, self.port, self.path))?;
        url.query_pairs_mut()
            .append_pair("name", fqdn)
            .append_pair("type", "TXT");
        Ok(url)
    }
}

/// Errors encountered by [`DnsOverHttps`].
#[derive(Debug, thiserror::Error)]
pub enum DnsOverHttpsError {
    /// Only fully qualified names are looked up.
    #[error("Name is not a FQDN")]
    NotFqdn,
    /// The provider's location does not form a valid URL.
    #[error("invalid provider url: {0}")]
    ProviderUrl(#[from] url::ParseError),
    /// The response body was not JSON.
    #[error("Failed to parse JSON response: {0}")]
    Json(#[from] serde_json::Error),
    /// The response had no `Answer` section.
    #[error("Did not give any TXT answers")]
    NoAnswers,
    /// The response's `Answer` section was not a list.
    #[error("Answer section is not an array")]
    MalformedAnswers,
    /// None of the answers held a key.
    #[error("No TXT answer matched {pattern}")]
    NoMatchingAnswer {
        /// Pattern the answers were matched against.
        pattern: String,
    },
}

/// Default pattern extracting a key from TXT record data.
pub(crate) fn default_txt_regex() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r#"(?i)"?dwebkey=([0-9a-f]{64})"?"#).unwrap())
}

/// Resolves names from TXT records of the form `dwebkey=<key>`, queried
/// through a JSON DNS-over-HTTPS provider.
#[derive(Clone, Debug)]
pub struct DnsOverHttps {
    provider: DnsProvider,
    txt_regex: Regex,
}

impl DnsOverHttps {
    /// Creates a resolver querying `provider`.
    pub fn new(provider: DnsProvider) -> Self {
        Self {
            provider,
            txt_regex: default_txt_regex().clone(),
        }
    }

    /// Sets the provider of the resolver.
    pub fn provider(self, provider: DnsProvider) -> Self {
        Self { provider, ..self }
    }

    /// Sets the pattern extracting a key (capture group 1) from TXT data.
    pub fn txt_regex(self, txt_regex: Regex) -> Self {
        Self { txt_regex, ..self }
    }
}

impl Default for DnsOverHttps {
    fn default() -> Self {
        Self::new(DnsProvider::random())
    }
}

#[async_trait]
impl KeyResolver for DnsOverHttps {
    const METHOD: Method = Method::DnsOverHttps;
    type Error = DnsOverHttpsError;

    async fn resolve_key<T: Transport + ?Sized>(
        &self,
        transport: &T,
        name: &str,
        _events: &Events,
    ) -> Result<KeyRecord, Self::Error> {
        if !name.contains('.') {
            return Err(DnsOverHttpsError::NotFqdn);
        }
        let fqdn = if name.ends_with('.') {
            name.to_owned()
        } else {
            format!("{name}.")
        };
        let url = self.provider.query_url(&fqdn)?;

        // Cloudflare requires this exact header, other providers ignore it
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/dns-json"));

        #[cfg(feature = "log")]
        tracing::debug!(name = %fqdn, provider = %self.provider.host, "dns-over-https lookup");
        let response = transport.get(&url, &headers).await;
        parse_response(response.body(), &self.txt_regex)
    }
}

/// A TXT answer in a JSON DNS response.
#[derive(Debug, Deserialize)]
struct TxtAnswer {
    data: String,
    #[serde(rename = "TTL", default)]
    ttl: Option<Value>,
}

/// Extracts the key of the first matching answer in a JSON DNS response.
fn parse_response(body: &str, txt_regex: &Regex) -> Result<KeyRecord, DnsOverHttpsError> {
    let response: Value = serde_json::from_str(body)?;
    let answers = response
        .get("Answer")
        .ok_or(DnsOverHttpsError::NoAnswers)?
        .as_array()
        .ok_or(DnsOverHttpsError::MalformedAnswers)?;

    answers
        .iter()
        .filter_map(|answer| TxtAnswer::deserialize(answer).ok())
        .find_map(|answer| {
            let key = txt_regex.captures(&answer.data)?.get(1)?.as_str();
            let key = key.parse::<Key>().ok()?;
            Some(KeyRecord::new(key, answer.ttl.as_ref().and_then(integral_ttl)))
        })
        .ok_or_else(|| DnsOverHttpsError::NoMatchingAnswer {
            pattern: txt_regex.to_string(),
        })
}

/// Reads a TTL that is a non-negative integer, whether JSON spells it `60`
/// or `60.0`.
fn integral_ttl(ttl: &Value) -> Option<u64> {
    ttl.as_u64().or_else(|| {
        let ttl = ttl.as_f64()?;
        let integral = ttl.fract() == 0.0 && (0.0..=MAX_SAFE_INTEGER as f64).contains(&ttl);
        integral.then_some(ttl as u64)
    })
}
