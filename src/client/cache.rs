//! In-memory cache of resolved names.

use crate::record::{Key, MAX_TTL};
use arc_swap::ArcSwap;
use std::{
    collections::BTreeMap,
    time::{Duration, Instant},
};

/// Value cached for a name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Cached {
    /// The name resolved to a key.
    Key(Key),
    /// The name is known not to resolve.
    Missing,
}

#[derive(Clone, Debug)]
struct Entry {
    value: Cached,
    valid_until: Instant,
}

impl Entry {
    fn valid(&self) -> bool {
        Instant::now() < self.valid_until
    }
}

/// Snapshot of a live cache entry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CacheEntry {
    /// Normalized name the entry is for.
    pub name: String,
    /// Cached value.
    pub value: Cached,
    /// Time the entry expires at.
    pub valid_until: Instant,
}

/// A cache of names, each valid for a limited period of time.
///
/// Expired entries are treated as absent when read. Writers replace the whole
/// map atomically, so concurrent resolutions never observe a partial update.
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: ArcSwap<BTreeMap<String, Entry>>,
}

impl MemoryCache {
    /// Gets the value cached for a name, if it has not expired.
    pub fn get(&self, name: &str) -> Option<Cached> {
        self.entries
            .load()
            .get(name)
            .filter(|entry| entry.valid())
            .map(|entry| entry.value.clone())
    }

    /// Caches a value for a name for `ttl`.
    pub fn set(&self, name: &str, value: Cached, ttl: Duration) {
        let now = Instant::now();
        let valid_until = now
            .checked_add(ttl)
            .unwrap_or_else(|| now + Duration::from_secs(MAX_TTL));
        self.insert(name, Entry { value, valid_until });
    }

    fn insert(&self, name: &str, entry: Entry) {
        self.entries.rcu(|entries| {
            let mut entries = (**entries).clone();
            entries.retain(|_, existing| existing.valid());
            entries.insert(name.to_owned(), entry.clone());
            entries
        });
    }

    /// Lists the live entries, ordered by name.
    pub fn list(&self) -> Vec<CacheEntry> {
        self.entries
            .load()
            .iter()
            .filter(|(_, entry)| entry.valid())
            .map(|(name, entry)| CacheEntry {
                name: name.clone(),
                value: entry.value.clone(),
                valid_until: entry.valid_until,
            })
            .collect()
    }

    /// Removes every entry.
    pub fn flush(&self) {
        self.entries.store(Default::default());
    }
}
