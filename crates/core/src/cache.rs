//! In-memory response cache with TTL and a capacity bound
//!
//! Typing, deleting and retyping the same query is common; cached responses
//! let those keystrokes resolve without another round trip to the index.
//!
//! # Example
//!
//! ```rust
//! use recall_radar_core::cache::{CacheConfig, ResponseCache};
//! use std::time::Duration;
//!
//! let cache = ResponseCache::new(CacheConfig::new(Duration::from_secs(60), 128));
//! cache.insert(&["product_recalls", "teddy"], 3u32);
//! assert_eq!(cache.get(&["product_recalls", "teddy"]), Some(3));
//! ```

use serde::Serialize;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};

/// Cache configuration
#[derive(Debug, Clone, Serialize)]
pub struct CacheConfig {
    /// How long an entry stays valid (zero disables the cache)
    pub ttl: Duration,
    /// Maximum number of entries
    pub capacity: usize,
}

impl CacheConfig {
    /// Create a cache configuration
    pub fn new(ttl: Duration, capacity: usize) -> Self {
        Self { ttl, capacity }
    }

    /// A cache that never stores anything
    pub fn disabled() -> Self {
        Self::new(Duration::ZERO, 0)
    }

    fn is_enabled(&self) -> bool {
        !self.ttl.is_zero() && self.capacity > 0
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self::new(Duration::from_secs(120), 512)
    }
}

struct CacheEntry<V> {
    inserted_at: Instant,
    value: V,
}

/// Thread-safe TTL cache keyed by a hash of its key parts
pub struct ResponseCache<V> {
    config: CacheConfig,
    entries: RwLock<HashMap<String, CacheEntry<V>>>,
}

impl<V: Clone> ResponseCache<V> {
    /// Create a new cache
    pub fn new(config: CacheConfig) -> Self {
        Self {
            config,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Look up a live entry
    pub fn get(&self, parts: &[&str]) -> Option<V> {
        if !self.config.is_enabled() {
            return None;
        }

        let key = hash_key(parts);
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        entries
            .get(&key)
            .filter(|entry| entry.inserted_at.elapsed() < self.config.ttl)
            .map(|entry| entry.value.clone())
    }

    /// Store a value, evicting expired entries and then the oldest one when full
    pub fn insert(&self, parts: &[&str], value: V) {
        if !self.config.is_enabled() {
            return;
        }

        let key = hash_key(parts);
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());

        if entries.len() >= self.config.capacity && !entries.contains_key(&key) {
            let ttl = self.config.ttl;
            entries.retain(|_, entry| entry.inserted_at.elapsed() < ttl);

            if entries.len() >= self.config.capacity {
                let oldest = entries
                    .iter()
                    .min_by_key(|(_, entry)| entry.inserted_at)
                    .map(|(k, _)| k.clone());
                if let Some(oldest) = oldest {
                    entries.remove(&oldest);
                }
            }
        }

        entries.insert(
            key,
            CacheEntry {
                inserted_at: Instant::now(),
                value,
            },
        );
    }

    /// Drop every entry
    pub fn clear(&self) {
        self.entries
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .clear();
    }

    /// Get cache statistics
    pub fn stats(&self) -> CacheStats {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        let expired = entries
            .values()
            .filter(|entry| entry.inserted_at.elapsed() >= self.config.ttl)
            .count();

        CacheStats {
            entries: entries.len(),
            expired_entries: expired,
            capacity: self.config.capacity,
            ttl_secs: self.config.ttl.as_secs(),
        }
    }
}

/// Cache statistics
#[derive(Debug, Clone, Serialize)]
pub struct CacheStats {
    /// Stored entries, live or expired
    pub entries: usize,
    /// Entries past their TTL that have not been evicted yet
    pub expired_entries: usize,
    /// Configured capacity
    pub capacity: usize,
    /// Configured TTL
    pub ttl_secs: u64,
}

// Parts are length-prefixed so ("ab", "c") and ("a", "bc") never collide
fn hash_key(parts: &[&str]) -> String {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update((part.len() as u64).to_le_bytes());
        hasher.update(part.as_bytes());
    }
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cache(ttl: Duration, capacity: usize) -> ResponseCache<String> {
        ResponseCache::new(CacheConfig::new(ttl, capacity))
    }

    #[test]
    fn test_insert_and_get() {
        let cache = cache(Duration::from_secs(60), 8);
        cache.insert(&["idx", "teddy"], "hit".to_string());

        assert_eq!(cache.get(&["idx", "teddy"]), Some("hit".to_string()));
        assert_eq!(cache.get(&["idx", "teddy bear"]), None);
    }

    #[test]
    fn test_key_parts_do_not_collide() {
        let cache = cache(Duration::from_secs(60), 8);
        cache.insert(&["ab", "c"], "first".to_string());

        assert_eq!(cache.get(&["a", "bc"]), None);
    }

    #[test]
    fn test_expiry() {
        let cache = cache(Duration::from_millis(20), 8);
        cache.insert(&["idx", "seat"], "hit".to_string());

        std::thread::sleep(Duration::from_millis(40));
        assert_eq!(cache.get(&["idx", "seat"]), None);
        assert_eq!(cache.stats().expired_entries, 1);
    }

    #[test]
    fn test_capacity_evicts_oldest() {
        let cache = cache(Duration::from_secs(60), 2);
        cache.insert(&["a"], "1".to_string());
        std::thread::sleep(Duration::from_millis(2));
        cache.insert(&["b"], "2".to_string());
        std::thread::sleep(Duration::from_millis(2));
        cache.insert(&["c"], "3".to_string());

        assert_eq!(cache.get(&["a"]), None);
        assert_eq!(cache.get(&["b"]), Some("2".to_string()));
        assert_eq!(cache.get(&["c"]), Some("3".to_string()));
        assert_eq!(cache.stats().entries, 2);
    }

    #[test]
    fn test_disabled_cache_stores_nothing() {
        let cache: ResponseCache<u32> = ResponseCache::new(CacheConfig::disabled());
        cache.insert(&["idx", "q"], 1);
        assert_eq!(cache.get(&["idx", "q"]), None);
        assert_eq!(cache.stats().entries, 0);
    }

    #[test]
    fn test_clear() {
        let cache = cache(Duration::from_secs(60), 8);
        cache.insert(&["idx", "q"], "hit".to_string());
        cache.clear();
        assert_eq!(cache.stats().entries, 0);
    }
}
