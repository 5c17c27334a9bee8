//! Expiring in-memory cache
//!
//! Provides an `ExpiringCache` mapping keys to values stamped with their
//! insertion time. Entries older than the TTL read as misses and are dropped
//! on that read; there is no background sweep.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Duration, Utc};

use super::clock::{Clock, SystemClock};

/// Default time-to-live for cache entries in hours
pub const DEFAULT_TTL_HOURS: i64 = 24;

/// A stored value with its insertion time
#[derive(Debug, Clone)]
struct CacheEntry<V> {
    /// The cached data
    data: V,
    /// When the data was cached
    cached_at: DateTime<Utc>,
}

/// Thread-safe map whose entries expire after a fixed TTL
///
/// Concurrent `get`/`put` calls are serialized by a mutex. Two callers missing
/// the same key at once will both fetch; the later `put` wins.
#[derive(Debug)]
pub struct ExpiringCache<K, V> {
    entries: Mutex<HashMap<K, CacheEntry<V>>>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl<K, V> ExpiringCache<K, V>
where
    K: Eq + Hash + std::fmt::Display,
    V: Clone,
{
    /// Creates a cache with the given TTL using the wall clock
    pub fn new(ttl: Duration) -> Self {
        Self::with_clock(ttl, Arc::new(SystemClock))
    }

    /// Creates a cache with the given TTL and time source
    pub fn with_clock(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl,
            clock,
        }
    }

    /// The configured time-to-live
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Locks the map; a poisoned lock still holds a consistent map
    fn lock(&self) -> MutexGuard<'_, HashMap<K, CacheEntry<V>>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns the value for `key` if it is present and younger than the TTL
    ///
    /// An expired entry is removed and reported as a miss.
    pub fn get(&self, key: &K) -> Option<V> {
        let now = self.clock.now();
        let mut entries = self.lock();

        let expired = match entries.get(key) {
            None => return None,
            Some(entry) => now - entry.cached_at > self.ttl,
        };

        if expired {
            log::debug!("Cache entry {} expired, evicting", key);
            entries.remove(key);
            return None;
        }

        entries.get(key).map(|entry| entry.data.clone())
    }

    /// Stores `value` under `key`, replacing any previous entry and its age
    pub fn put(&self, key: K, value: V) {
        let entry = CacheEntry {
            data: value,
            cached_at: self.clock.now(),
        };
        self.lock().insert(key, entry);
    }

    /// Drops every entry
    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Number of stored entries, expired ones included until they are read
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}
