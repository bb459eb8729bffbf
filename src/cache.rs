//! Bounded LRU cache of computed query results.
//!
//! The cache is an optimization only: every miss can be answered by running
//! the query again, and a poisoned lock simply turns the cache into a
//! permanent miss.

use crate::query::types::QueryResult;
use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::Mutex;
use tracing::debug;

/// Thread-safe LRU cache keyed by canonical query signatures
pub struct ResultCache {
    /// `None` when constructed with capacity 0
    entries: Option<Mutex<LruCache<String, QueryResult>>>,
}

impl ResultCache {
    /// Create a cache holding at most `capacity` results. A capacity of 0
    /// yields a cache that never stores anything.
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: NonZeroUsize::new(capacity).map(|cap| Mutex::new(LruCache::new(cap))),
        }
    }

    /// Look up a result, promoting it to most recently used
    pub fn get(&self, key: &str) -> Option<QueryResult> {
        let found = self
            .entries
            .as_ref()
            .and_then(|m| m.lock().ok())
            .and_then(|mut cache| cache.get(key).cloned());

        if found.is_some() {
            debug!(key, "result cache hit");
        } else {
            debug!(key, "result cache miss");
        }
        found
    }

    /// Insert or replace a result, evicting the least recently used one when full
    pub fn set(&self, key: impl Into<String>, value: QueryResult) {
        let Some(mut cache) = self.entries.as_ref().and_then(|m| m.lock().ok()) else {
            return;
        };
        let key = key.into();
        let replacing = cache.contains(&key);
        // push hands back the replaced entry too; only a different key is an eviction
        if let Some((evicted, _)) = cache.push(key, value)
            && !replacing
        {
            debug!(key = %evicted, "result cache eviction");
        }
    }

    pub fn clear(&self) {
        if let Some(mut cache) = self.entries.as_ref().and_then(|m| m.lock().ok()) {
            cache.clear();
        }
    }

    pub fn len(&self) -> usize {
        self.entries
            .as_ref()
            .and_then(|m| m.lock().ok())
            .map_or(0, |cache| cache.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.entries
            .as_ref()
            .and_then(|m| m.lock().ok())
            .map_or(0, |cache| cache.cap().get())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    fn result(page: usize) -> QueryResult {
        QueryResult::empty(page)
    }

    #[test]
    fn test_get_and_set() {
        let cache = ResultCache::new(4);
        assert!(cache.get("a").is_none());

        cache.set("a", result(1));
        assert_eq!(cache.get("a").unwrap().page, 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_evicts_least_recently_used() {
        let cache = ResultCache::new(2);
        cache.set("a", result(1));
        cache.set("b", result(2));
        cache.set("c", result(3));

        assert!(cache.get("a").is_none());
        assert!(cache.get("b").is_some());
        assert!(cache.get("c").is_some());
    }

    #[test]
    fn test_get_protects_from_eviction() {
        let cache = ResultCache::new(2);
        cache.set("a", result(1));
        cache.set("b", result(2));

        assert!(cache.get("a").is_some());
        cache.set("c", result(3));

        assert!(cache.get("a").is_some());
        assert!(cache.get("b").is_none());
    }

    #[test]
    fn test_set_replaces_and_promotes() {
        let cache = ResultCache::new(2);
        cache.set("a", result(1));
        cache.set("b", result(2));
        cache.set("a", result(10));
        cache.set("c", result(3));

        assert_eq!(cache.get("a").unwrap().page, 10);
        assert!(cache.get("b").is_none());
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_clear() {
        let cache = ResultCache::new(2);
        cache.set("a", result(1));
        cache.clear();
        assert!(cache.is_empty());
        assert!(cache.get("a").is_none());
    }

    #[test]
    fn test_zero_capacity_never_stores() {
        let cache = ResultCache::new(0);
        cache.set("a", result(1));
        assert!(cache.get("a").is_none());
        assert_eq!(cache.capacity(), 0);
    }

    #[test]
    fn test_concurrent_access_keeps_bound() {
        let cache = Arc::new(ResultCache::new(8));
        let handles: Vec<_> = (0..4)
            .map(|t| {
                let cache = Arc::clone(&cache);
                thread::spawn(move || {
                    for i in 0..100 {
                        let key = format!("{}-{}", t, i % 16);
                        if cache.get(&key).is_none() {
                            cache.set(key, result(i));
                        }
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(cache.len(), 8);
    }
}
