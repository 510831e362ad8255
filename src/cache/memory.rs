//! Fallback Store Module
//!
//! In-process key/value map used when the cache backend is unreachable.
//! Expiry is lazy on read; once the map grows past the sweep mark a write
//! sweeps every expired entry in one pass. The mark then moves to twice the
//! surviving size, so live entries are not rescanned on every write.

use std::collections::HashMap;

use tracing::{debug, info};

use crate::cache::pattern::glob_match;
use crate::cache::CacheEntry;

// == Memory Store ==
/// Fallback storage with TTL semantics matching the backend's.
#[derive(Debug)]
pub struct MemoryStore {
    /// Key-value storage
    entries: HashMap<String, CacheEntry>,
    /// Lowest size at which a write may trigger an expiry sweep
    sweep_threshold: usize,
    /// Size above which the next write sweeps
    sweep_at: usize,
}

impl MemoryStore {
    // == Constructor ==
    pub fn new(sweep_threshold: usize) -> Self {
        Self {
            entries: HashMap::new(),
            sweep_threshold,
            sweep_at: sweep_threshold,
        }
    }

    // == Set ==
    /// Stores a serialized value, overwriting any previous entry and its TTL.
    pub fn set(&mut self, key: String, value: String, ttl_seconds: u64, now_ms: u64) {
        self.entries
            .insert(key, CacheEntry::new(value, ttl_seconds, now_ms));

        let mark = self.sweep_at;
        if self.entries.len() > mark {
            let removed = self.cleanup_expired(now_ms);
            if removed > 0 {
                info!("Fallback cache over {} entries, swept {} expired", mark, removed);
            } else {
                debug!("Fallback cache over {} entries, nothing expired", mark);
            }
        }
    }

    // == Get ==
    /// Retrieves a value by key, evicting it if it has expired.
    pub fn get(&mut self, key: &str, now_ms: u64) -> Option<String> {
        let expired = self.entries.get(key)?.is_expired_at(now_ms);
        if expired {
            self.entries.remove(key);
            return None;
        }
        self.entries.get(key).map(|entry| entry.value.clone())
    }

    // == Delete ==
    /// Removes an entry by key. Returns whether it existed.
    pub fn delete(&mut self, key: &str) -> bool {
        self.entries.remove(key).is_some()
    }

    // == Delete Matching ==
    /// Removes every key matching the glob pattern. Returns the number removed.
    pub fn delete_matching(&mut self, pattern: &str) -> usize {
        let before = self.entries.len();
        self.entries.retain(|key, _| !glob_match(pattern, key));
        before - self.entries.len()
    }

    // == Cleanup Expired ==
    /// Removes all expired entries. Returns the number of entries removed.
    pub fn cleanup_expired(&mut self, now_ms: u64) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired_at(now_ms));
        self.sweep_at = self.sweep_threshold.max(self.entries.len() * 2);
        before - self.entries.len()
    }

    // == Length ==
    /// Returns the current number of entries, expired ones included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    // == Is Empty ==
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
