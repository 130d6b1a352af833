//! Cache adapters.
//!
//! The framework itself only uses `get` and `set`, to keep the merged
//! configuration and route table between setups. Runnables get the same
//! adapter for their own use.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use parking_lot::RwLock;
use serde_json::Value;

/// Key/value cache contract.
///
/// Every operation reports success as a boolean, mirroring typical cache
/// clients: a `false` from `set` means "not stored", never an error.
/// A zero TTL means the entry does not expire.
pub trait CacheAdapter: Send + Sync + fmt::Debug {
    /// Returns the value for `key`, or `None` on a miss.
    fn get(&self, key: &str) -> Option<Value>;

    /// Stores `value` under `key` for `ttl`.
    fn set(&self, key: &str, value: Value, ttl: Duration) -> bool;

    /// Returns true if `key` is present and fresh.
    fn has(&self, key: &str) -> bool;

    /// Extends the lifetime of `key` to `ttl` from now.
    fn renew(&self, key: &str, ttl: Duration) -> bool;

    /// Removes `key`.
    fn remove(&self, key: &str) -> bool;

    /// Removes everything.
    fn flush(&self) -> bool;
}

/// A cache that stores nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullCache;

impl CacheAdapter for NullCache {
    fn get(&self, _key: &str) -> Option<Value> {
        None
    }

    fn set(&self, _key: &str, _value: Value, _ttl: Duration) -> bool {
        false
    }

    fn has(&self, _key: &str) -> bool {
        false
    }

    fn renew(&self, _key: &str, _ttl: Duration) -> bool {
        false
    }

    fn remove(&self, _key: &str) -> bool {
        false
    }

    fn flush(&self) -> bool {
        false
    }
}

/// Cached entry.
#[derive(Debug, Clone)]
struct CacheEntry {
    value: Value,
    expires_at: Option<Instant>,
}

impl CacheEntry {
    fn new(value: Value, ttl: Duration) -> Self {
        Self {
            value,
            expires_at: expiry(ttl),
        }
    }

    fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|at| Instant::now() >= at)
    }
}

fn expiry(ttl: Duration) -> Option<Instant> {
    if ttl.is_zero() {
        None
    } else {
        Instant::now().checked_add(ttl)
    }
}

/// Cache statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Number of cache hits.
    pub hits: u64,
    /// Number of cache misses.
    pub misses: u64,
    /// Number of entries currently in cache, expired ones included.
    pub size: usize,
}

/// In-process cache with per-entry TTL.
///
/// # Example
///
/// ```
/// use caravel_core::{CacheAdapter, MemoryCache};
/// use serde_json::json;
/// use std::time::Duration;
///
/// let cache = MemoryCache::new();
/// assert!(cache.set("answer", json!(42), Duration::from_secs(60)));
/// assert_eq!(cache.get("answer"), Some(json!(42)));
/// assert_eq!(cache.stats().hits, 1);
/// ```
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: RwLock<HashMap<String, CacheEntry>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl MemoryCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns cache statistics.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            size: self.entries.read().len(),
        }
    }

    /// Drops expired entries.
    pub fn evict_expired(&self) -> usize {
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired());
        before - entries.len()
    }
}

impl CacheAdapter for MemoryCache {
    fn get(&self, key: &str) -> Option<Value> {
        let entries = self.entries.read();
        match entries.get(key) {
            Some(entry) if !entry.is_expired() => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                Some(entry.value.clone())
            }
            _ => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    fn set(&self, key: &str, value: Value, ttl: Duration) -> bool {
        self.entries
            .write()
            .insert(key.to_string(), CacheEntry::new(value, ttl));
        true
    }

    fn has(&self, key: &str) -> bool {
        self.entries
            .read()
            .get(key)
            .is_some_and(|entry| !entry.is_expired())
    }

    fn renew(&self, key: &str, ttl: Duration) -> bool {
        let mut entries = self.entries.write();
        match entries.get_mut(key) {
            Some(entry) if !entry.is_expired() => {
                entry.expires_at = expiry(ttl);
                true
            }
            _ => false,
        }
    }

    fn remove(&self, key: &str) -> bool {
        self.entries.write().remove(key).is_some()
    }

    fn flush(&self) -> bool {
        self.entries.write().clear();
        true
    }
}
