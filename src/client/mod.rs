//! Resolution of names to keys.

use crate::{
    events::{Event, Events, Observer},
    name::{self, NormalizedName},
    record::{Key, KeyRecord},
    resolver::{DnsOverHttps, DnsProvider, KeyResolver, WellKnown, WellKnownError},
    transport::Transport,
};
use regex::Regex;
use std::{fmt, sync::Arc, time::Duration};

/// In-memory caching of resolved names.
pub mod cache;
use cache::{CacheEntry, Cached, MemoryCache};

mod persistent;
pub use persistent::PersistentCache;

/// How long a name known not to resolve is remembered.
const MISS_TTL: Duration = Duration::from_secs(60);

/// Errors encountered while resolving a name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// The name could not be interpreted as a hostname, URL, or key.
    #[error("invalid name {name:?}: {reason}")]
    InvalidName {
        /// Name as supplied by the caller.
        name: String,
        /// What is wrong with it.
        reason: &'static str,
    },
    /// The name does not resolve to a key.
    #[error("no key record found for {name}")]
    NotFound {
        /// Normalized name that was resolved.
        name: String,
    },
    /// The name's `.well-known` record exists but is malformed.
    #[error("invalid record for {name}: {source}")]
    InvalidRecord {
        /// Normalized name that was resolved.
        name: String,
        /// What is wrong with the record.
        source: WellKnownError,
    },
    /// The name's host answered with an unexpected HTTP status.
    #[error("lookup of {name} failed with HTTP status {status}")]
    Lookup {
        /// Normalized name that was resolved.
        name: String,
        /// HTTP status of the response.
        status: u16,
    },
}

impl Error {
    fn not_found(name: &str) -> Self {
        Self::NotFound {
            name: name.to_owned(),
        }
    }

    fn from_well_known(name: &str, err: WellKnownError) -> Self {
        let name = name.to_owned();
        match err {
            WellKnownError::UnexpectedStatus(status) => Self::Lookup { name, status },
            source @ WellKnownError::NonConforming { .. } => Self::InvalidRecord { name, source },
            WellKnownError::Unreachable { .. } | WellKnownError::EmptyResponse => {
                Self::NotFound { name }
            }
        }
    }
}

/// Per-call switches for [`NameResolver::resolve_name_with`]. Everything is
/// off by default.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ResolveOptions {
    /// Skip reading the in-memory cache. Results are still written to it.
    pub ignore_cache: bool,
    /// Treat a cached "not found" as absent instead of failing with it.
    pub ignore_cached_miss: bool,
    /// Skip the DNS-over-HTTPS TXT lookup.
    pub no_dns_over_https: bool,
    /// Skip the `.well-known` lookup.
    pub no_well_known: bool,
}

/// Resolver of names to keys, caching what it learns.
///
/// A resolver should be reused (and shared, it is `Sync`) to take advantage of
/// caching.
pub struct NameResolver<T> {
    transport: T,
    hash_regex: Regex,
    dns_over_https: DnsOverHttps,
    well_known: WellKnown,
    cache: MemoryCache,
    persistent_cache: Option<Box<dyn PersistentCache>>,
    events: Events,
}

impl<T: Transport + Default> NameResolver<T> {
    /// Creates a resolver using a default transport.
    pub fn new() -> Self {
        Self::new_with_transport(T::default())
    }
}

impl<T: Transport + Default> Default for NameResolver<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Transport> NameResolver<T> {
    /// Creates a resolver performing requests through `transport`.
    ///
    /// The DNS-over-HTTPS provider is picked at random among the defaults
    /// unless [`dns_provider`](Self::dns_provider) is used.
    pub fn new_with_transport(transport: T) -> Self {
        Self {
            transport,
            hash_regex: name::default_hash_regex().clone(),
            dns_over_https: DnsOverHttps::default(),
            well_known: WellKnown::default(),
            cache: Default::default(),
            persistent_cache: None,
            events: Default::default(),
        }
    }

    /// Resolves a name, URL, or key to a key.
    pub async fn resolve_name(&self, name: &str) -> Result<Key, Error> {
        self.resolve_name_with(name, ResolveOptions::default()).await
    }

    /// Resolves a name, URL, or key to a key, with options.
    ///
    /// Names that already are keys are returned without consulting the cache
    /// or the network. Failures other than [`Error::InvalidName`] are handed to
    /// the persistent cache, if any, for a last chance at an answer.
    pub async fn resolve_name_with(&self, name: &str, options: ResolveOptions) -> Result<Key, Error> {
        let name = match name::normalize(name, &self.hash_regex)? {
            NormalizedName::Key(key) => return Ok(key),
            NormalizedName::Name(name) => name,
        };

        match self.resolve_normalized(&name, options).await {
            Ok(key) => Ok(key),
            Err(err) => match &self.persistent_cache {
                Some(persistent_cache) => {
                    #[cfg(feature = "log")]
                    tracing::debug!(%name, error = %err, "falling back to persistent cache");
                    persistent_cache.read(&name, err).await
                }
                None => Err(err),
            },
        }
    }

    async fn resolve_normalized(&self, name: &str, options: ResolveOptions) -> Result<Key, Error> {
        if !options.ignore_cache {
            match self.cache.get(name) {
                Some(Cached::Key(key)) => {
                    #[cfg(feature = "log")]
                    tracing::debug!(%name, %key, "in-memory cache hit");
                    return Ok(key);
                }
                Some(Cached::Missing) if !options.ignore_cached_miss => {
                    #[cfg(feature = "log")]
                    tracing::debug!(%name, "in-memory cache hit for missing name");
                    return Err(Error::not_found(name));
                }
                _ => {}
            }
        }

        let mut record = None;
        if !options.no_dns_over_https {
            // Failures here are never surfaced; the well-known lookup gets a turn
            record = self.attempt(&self.dns_over_https, name).await.ok();
        }
        if record.is_none() && !options.no_well_known {
            match self.attempt(&self.well_known, name).await {
                Ok(found) => record = Some(found),
                Err(err) => {
                    if err.is_definitive_miss() {
                        self.cache.set(name, Cached::Missing, MISS_TTL);
                    }
                    return Err(Error::from_well_known(name, err));
                }
            }
        }

        let KeyRecord { key, ttl } = record.ok_or_else(|| Error::not_found(name))?;
        if ttl != 0 {
            self.cache
                .set(name, Cached::Key(key.clone()), Duration::from_secs(ttl));
        }
        if let Some(persistent_cache) = &self.persistent_cache {
            persistent_cache.write(name, &key, ttl).await;
        }
        Ok(key)
    }

    /// Resolves a name with one protocol, reporting the outcome as an event.
    async fn attempt<R: KeyResolver>(&self, resolver: &R, name: &str) -> Result<KeyRecord, R::Error> {
        match resolver.resolve_key(&self.transport, name, &self.events).await {
            Ok(record) => {
                #[cfg(feature = "log")]
                tracing::info!(method = %R::METHOD, %name, key = %record.key, ttl = record.ttl, "resolved");
                self.events.emit(Event::Resolved {
                    method: R::METHOD,
                    name: name.to_owned(),
                    key: record.key.clone(),
                });
                Ok(record)
            }
            Err(err) => {
                #[cfg(feature = "log")]
                tracing::debug!(method = %R::METHOD, %name, error = %err, "lookup failed");
                self.events.emit(Event::Failed {
                    method: R::METHOD,
                    name: name.to_owned(),
                    err: err.to_string(),
                });
                Err(err)
            }
        }
    }

    /// Lists the live entries of the in-memory cache, ordered by name.
    pub fn list_cache(&self) -> Vec<CacheEntry> {
        self.cache.list()
    }

    /// Empties the in-memory cache.
    pub fn flush_cache(&self) {
        #[cfg(feature = "log")]
        tracing::info!("flushing in-memory cache");
        self.events.emit(Event::CacheFlushed);
        self.cache.flush();
    }

    /// Sets the pattern recognizing names that already are keys. The first
    /// 64 characters of a matching name are taken as the key.
    pub fn hash_regex(self, hash_regex: Regex) -> Self {
        Self { hash_regex, ..self }
    }

    /// Sets the pattern extracting a key (capture group 1) from TXT records.
    pub fn txt_regex(self, txt_regex: Regex) -> Self {
        Self {
            dns_over_https: self.dns_over_https.txt_regex(txt_regex),
            ..self
        }
    }

    /// Sets the pattern extracting a key (capture group 1) from the first line
    /// of `.well-known` records.
    pub fn protocol_regex(self, protocol_regex: Regex) -> Self {
        Self {
            well_known: self.well_known.protocol_regex(protocol_regex),
            ..self
        }
    }

    /// Sets the name of `.well-known` records, `dweb` by default.
    pub fn record_name(self, record_name: impl ToString) -> Self {
        Self {
            well_known: self.well_known.record_name(record_name),
            ..self
        }
    }

    /// Sets the DNS-over-HTTPS provider used for TXT lookups.
    pub fn dns_provider(self, provider: DnsProvider) -> Self {
        Self {
            dns_over_https: self.dns_over_https.provider(provider),
            ..self
        }
    }

    /// Sets the persistent cache of the resolver.
    pub fn persistent_cache(self, persistent_cache: impl PersistentCache + 'static) -> Self {
        Self {
            persistent_cache: Some(Box::new(persistent_cache)),
            ..self
        }
    }

    /// Adds an observer of the resolver's events.
    pub fn observer(mut self, observer: impl Observer + 'static) -> Self {
        self.events.subscribe(Arc::new(observer));
        self
    }

    /// Sets the transport of the resolver. The in-memory cache starts empty.
    pub fn transport<U: Transport>(self, transport: U) -> NameResolver<U> {
        NameResolver {
            transport,
            cache: Default::default(),
            hash_regex: self.hash_regex,
            dns_over_https: self.dns_over_https,
            well_known: self.well_known,
            persistent_cache: self.persistent_cache,
            events: self.events,
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for NameResolver<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NameResolver")
            .field("transport", &self.transport)
            .field("hash_regex", &self.hash_regex)
            .field("dns_over_https", &self.dns_over_https)
            .field("well_known", &self.well_known)
            .field("cache", &self.cache)
            .field("persistent_cache", &self.persistent_cache.is_some())
            .field("events", &self.events)
            .finish()
    }
}
