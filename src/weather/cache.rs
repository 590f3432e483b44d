//! In-memory cache of upstream response bodies, keyed by request URL.

use std::time::{Duration, Instant};

use bytes::Bytes;
use dashmap::DashMap;

#[derive(Debug, Clone)]
struct CachedBody {
    body: Bytes,
    stored_at: Instant,
}

#[derive(Debug)]
pub struct ResponseCache {
    entries: DashMap<String, CachedBody>,
    ttl: Duration,
}

impl ResponseCache {
    /// A zero `ttl` disables caching.
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
        }
    }

    pub fn get(&self, key: &str) -> Option<Bytes> {
        let fresh = self
            .entries
            .get(key)
            .filter(|e| e.stored_at.elapsed() < self.ttl)
            .map(|e| e.body.clone());

        if fresh.is_none() {
            self.entries
                .remove_if(key, |_, e| e.stored_at.elapsed() >= self.ttl);
        }
        fresh
    }

    /// Stores `body` under `key`, first dropping every expired entry so keys
    /// that are never read again do not pile up.
    pub fn insert(&self, key: String, body: Bytes) {
        if self.ttl.is_zero() {
            return;
        }
        self.entries.retain(|_, e| e.stored_at.elapsed() < self.ttl);
        self.entries.insert(
            key,
            CachedBody {
                body,
                stored_at: Instant::now(),
            },
        );
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn returns_fresh_entries() {
        let cache = ResponseCache::new(Duration::from_secs(3600));
        cache.insert("k".into(), Bytes::from_static(b"{}"));
        assert_eq!(cache.get("k"), Some(Bytes::from_static(b"{}")));
        assert_eq!(cache.get("other"), None);
    }

    #[test]
    fn expired_entries_are_evicted_on_read() {
        let cache = ResponseCache::new(Duration::from_millis(1));
        cache.insert("k".into(), Bytes::from_static(b"{}"));
        std::thread::sleep(Duration::from_millis(10));
        assert_eq!(cache.get("k"), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn insert_sweeps_stale_keys() {
        let cache = ResponseCache::new(Duration::from_millis(1));
        for i in 0..50 {
            cache.insert(format!("lat={i}"), Bytes::from_static(b"{}"));
        }
        std::thread::sleep(Duration::from_millis(10));

        cache.insert("fresh".into(), Bytes::from_static(b"[]"));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn zero_ttl_disables_caching() {
        let cache = ResponseCache::new(Duration::ZERO);
        cache.insert("k".into(), Bytes::from_static(b"{}"));
        assert_eq!(cache.len(), 0);
        assert_eq!(cache.get("k"), None);
    }
}
