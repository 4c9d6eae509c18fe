//! In-memory result cache with per-entry TTL.
//!
//! [`ResultCache`] maps string keys to immutable payloads of any type. An
//! entry expires at an absolute instant; expired entries are evicted lazily
//! by the next `get` for that key. There is no background sweep and no
//! capacity bound, so entries leave only through expiry, `delete` or `clear`.
//!
//! The cache is an ordinary value: the application's composition root owns
//! one instance for the process lifetime and tests build their own.
//!
//! ```ignore
//! use snowgrid::ResultCache;
//!
//! let cache = ResultCache::new();
//! cache.set("snowfall:latest", event);
//! let hit: Option<Arc<SnowfallEvent>> = cache.get("snowfall:latest");
//! ```

use std::any::Any;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;

/// Default time-to-live: two hours.
pub const DEFAULT_TTL: Duration = Duration::from_secs(2 * 60 * 60);

type Payload = Arc<dyn Any + Send + Sync>;

/// A cached payload together with its expiry instant.
#[derive(Debug, Clone)]
pub struct CacheEntry<T> {
    pub value: T,
    /// `None` when the TTL reaches past what `Instant` can represent.
    pub expires_at: Option<Instant>,
}

impl<T> CacheEntry<T> {
    pub fn new(value: T, ttl: Duration) -> Self {
        Self {
            value,
            expires_at: Instant::now().checked_add(ttl),
        }
    }

    /// An entry is live while `now < expires_at`.
    pub fn is_expired_at(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|at| now >= at)
    }
}

/// Statistics about cache usage.
#[derive(Debug, Clone, Default)]
pub struct CacheStats {
    /// Number of entries currently stored (including not-yet-evicted expired ones).
    pub entry_count: u64,
    /// Number of `get` calls answered from the cache.
    pub hit_count: u64,
    /// Number of `get` calls that found nothing usable.
    pub miss_count: u64,
}

impl CacheStats {
    /// Calculate the cache hit rate (0.0 to 1.0).
    ///
    /// Returns 0.0 if no requests have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hit_count + self.miss_count;
        if total == 0 {
            0.0
        } else {
            self.hit_count as f64 / total as f64
        }
    }
}

/// Process-wide key/value store with per-entry expiry.
pub struct ResultCache {
    entries: DashMap<String, CacheEntry<Payload>>,
    default_ttl: Duration,
    hit_count: AtomicU64,
    miss_count: AtomicU64,
}

impl Default for ResultCache {
    fn default() -> Self {
        Self::new()
    }
}

impl ResultCache {
    /// Create an empty cache with the two-hour default TTL.
    pub fn new() -> Self {
        Self::with_default_ttl(DEFAULT_TTL)
    }

    /// Create an empty cache whose `set` uses `ttl`.
    pub fn with_default_ttl(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            default_ttl: ttl,
            hit_count: AtomicU64::new(0),
            miss_count: AtomicU64::new(0),
        }
    }

    /// The TTL applied by [`Self::set`].
    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    /// Look up a live entry of type `T`.
    ///
    /// An expired entry is removed and reported as absent. An entry stored
    /// under a different type is also reported as absent but left in place.
    pub fn get<T: Any + Send + Sync>(&self, key: &str) -> Option<Arc<T>> {
        let now = Instant::now();

        let expired = match self.entries.get(key) {
            Some(entry) if !entry.is_expired_at(now) => {
                if let Ok(value) = Arc::clone(&entry.value).downcast::<T>() {
                    self.hit_count.fetch_add(1, Ordering::Relaxed);
                    return Some(value);
                }
                false
            }
            Some(_) => true,
            None => false,
        };

        if expired {
            self.entries.remove_if(key, |_, entry| entry.is_expired_at(now));
            tracing::debug!(key, "Evicted expired cache entry");
        }

        self.miss_count.fetch_add(1, Ordering::Relaxed);
        None
    }

    /// Store `value` under `key` with the default TTL.
    ///
    /// Returns the shared handle that later `get` calls will hand out.
    pub fn set<T: Any + Send + Sync>(&self, key: impl Into<String>, value: T) -> Arc<T> {
        self.set_with_ttl(key, value, self.default_ttl)
    }

    /// Store `value` under `key`, expiring after `ttl`.
    pub fn set_with_ttl<T: Any + Send + Sync>(
        &self,
        key: impl Into<String>,
        value: T,
        ttl: Duration,
    ) -> Arc<T> {
        let value = Arc::new(value);
        let payload: Payload = value.clone();
        self.entries.insert(key.into(), CacheEntry::new(payload, ttl));
        value
    }

    /// Remove a single key.
    pub fn delete(&self, key: &str) {
        self.entries.remove(key);
    }

    /// Remove every entry.
    pub fn clear(&self) {
        self.entries.clear();
    }

    /// Number of stored entries, including expired ones not yet read.
    pub fn size(&self) -> usize {
        self.entries.len()
    }

    /// Get cache statistics.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entry_count: self.entries.len() as u64,
            hit_count: self.hit_count.load(Ordering::Relaxed),
            miss_count: self.miss_count.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_set_and_get() {
        let cache = ResultCache::new();
        cache.set("storms:list", vec![1u32, 2, 3]);

        let value = cache.get::<Vec<u32>>("storms:list").unwrap();
        assert_eq!(*value, vec![1, 2, 3]);
        assert_eq!(cache.size(), 1);
    }

    #[test]
    fn test_missing_key() {
        let cache = ResultCache::new();
        assert!(cache.get::<String>("nope").is_none());
        assert_eq!(cache.stats().miss_count, 1);
    }

    #[test]
    fn test_expiry_evicts_lazily() {
        let cache = ResultCache::new();
        cache.set_with_ttl("snowfall:latest", "event".to_string(), Duration::from_millis(50));

        assert!(cache.get::<String>("snowfall:latest").is_some());

        thread::sleep(Duration::from_millis(80));

        // Still stored until someone reads it
        assert_eq!(cache.size(), 1);
        assert!(cache.get::<String>("snowfall:latest").is_none());
        assert_eq!(cache.size(), 0);
        assert!(cache.get::<String>("snowfall:latest").is_none());
    }

    #[test]
    fn test_zero_ttl_is_immediately_expired() {
        let cache = ResultCache::new();
        cache.set_with_ttl("k", 1u8, Duration::ZERO);
        assert!(cache.get::<u8>("k").is_none());
        assert_eq!(cache.size(), 0);
    }

    #[test]
    fn test_huge_ttl_never_expires() {
        let cache = ResultCache::with_default_ttl(Duration::from_secs(u64::MAX));
        cache.set("snowfall:latest", 7u32);
        assert_eq!(*cache.get::<u32>("snowfall:latest").unwrap(), 7);

        let entry = CacheEntry::new((), Duration::MAX);
        assert!(entry.expires_at.is_none());
        assert!(!entry.is_expired_at(Instant::now()));
    }

    #[test]
    fn test_overwrite_resets_value() {
        let cache = ResultCache::new();
        cache.set("k", 1u32);
        cache.set("k", 2u32);
        assert_eq!(*cache.get::<u32>("k").unwrap(), 2);
        assert_eq!(cache.size(), 1);
    }

    #[test]
    fn test_type_mismatch_is_absent() {
        let cache = ResultCache::new();
        cache.set("k", 42u64);
        assert!(cache.get::<String>("k").is_none());
        // The entry is still there for the right type
        assert_eq!(*cache.get::<u64>("k").unwrap(), 42);
    }

    #[test]
    fn test_delete_and_clear() {
        let cache = ResultCache::new();
        cache.set("a", 1u8);
        cache.set("b", 2u8);
        cache.set("c", 3u8);

        cache.delete("a");
        assert_eq!(cache.size(), 2);
        assert!(cache.get::<u8>("a").is_none());

        cache.clear();
        assert_eq!(cache.size(), 0);
    }

    #[test]
    fn test_set_returns_shared_handle() {
        let cache = ResultCache::new();
        let stored = cache.set("k", String::from("payload"));
        let fetched = cache.get::<String>("k").unwrap();
        assert!(Arc::ptr_eq(&stored, &fetched));
    }

    #[test]
    fn test_default_ttl() {
        assert_eq!(ResultCache::new().default_ttl(), Duration::from_secs(7200));
        let cache = ResultCache::with_default_ttl(Duration::from_secs(5));
        assert_eq!(cache.default_ttl(), Duration::from_secs(5));
    }

    #[test]
    fn test_cache_stats() {
        let stats = CacheStats {
            entry_count: 5,
            hit_count: 80,
            miss_count: 20,
        };

        assert_eq!(stats.hit_rate(), 0.8);

        let empty_stats = CacheStats::default();
        assert_eq!(empty_stats.hit_rate(), 0.0);
    }

    #[test]
    fn test_concurrent_access() {
        let cache = Arc::new(ResultCache::new());

        let handles: Vec<_> = (0..8)
            .map(|t| {
                let cache = Arc::clone(&cache);
                thread::spawn(move || {
                    for i in 0..100 {
                        let key = format!("k{}", i % 10);
                        cache.set(key.clone(), t * 1000 + i);
                        let _ = cache.get::<i32>(&key);
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(cache.size(), 10);
        let stats = cache.stats();
        assert_eq!(stats.hit_count + stats.miss_count, 800);
    }
}
