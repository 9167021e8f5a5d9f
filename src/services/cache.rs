//! TTL result cache
//!
//! Entries are checked for staleness only when read. Nothing sweeps the map:
//! a stale entry stays in memory until a later `put` for the same key
//! replaces it. Concurrent writers for one key resolve last-write-wins.

use std::time::{Duration, Instant};

use dashmap::DashMap;

/// Default time-to-live for cached lookups
pub const DEFAULT_TTL: Duration = Duration::from_secs(5 * 60);

#[derive(Debug, Clone)]
struct CacheEntry<V> {
    payload: V,
    inserted_at: Instant,
}

/// Concurrency-safe TTL cache keyed by string
pub struct ResultCache<V> {
    ttl: Duration,
    entries: DashMap<String, CacheEntry<V>>,
}

impl<V: Clone> ResultCache<V> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: DashMap::new(),
        }
    }

    pub fn get(&self, key: &str) -> Option<V> {
        self.get_at(key, Instant::now())
    }

    /// Fresh payload for `key` as of `now`, or `None` if missing or expired.
    pub fn get_at(&self, key: &str, now: Instant) -> Option<V> {
        let entry = self.entries.get(key)?;
        if now.saturating_duration_since(entry.inserted_at) < self.ttl {
            Some(entry.payload.clone())
        } else {
            None
        }
    }

    pub fn put(&self, key: impl Into<String>, payload: V) {
        self.put_at(key, payload, Instant::now());
    }

    pub fn put_at(&self, key: impl Into<String>, payload: V, now: Instant) {
        self.entries.insert(
            key.into(),
            CacheEntry {
                payload,
                inserted_at: now,
            },
        );
    }

    /// Number of stored entries, stale ones included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<V: Clone> Default for ResultCache<V> {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}

/// Cache key for a search: trimmed, lower-cased query plus page.
pub fn search_key(query: &str, page: u32) -> String {
    format!("{}-{}", query.trim().to_lowercase(), page)
}
