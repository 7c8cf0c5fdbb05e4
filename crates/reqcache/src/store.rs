//! The cache store: a plain key -> entry map with TTL/SWR-aware lookups.

use crate::entry::{CacheEntry, CachedResponse, Freshness};
use crate::key::CacheKey;
use crate::policy::CachePolicy;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

/// The result of a successful lookup.
#[derive(Debug, Clone)]
pub struct CacheLookup {
    /// The stored response.
    pub response: CachedResponse,
    /// True if this entry is being served from its stale-while-revalidate
    /// window rather than while still fresh.
    pub stale: bool,
}

/// A point-in-time view of the store's occupancy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CacheStats {
    pub entries: usize,
}

/// A TTL + stale-while-revalidate response cache.
///
/// Entries are never evicted by capacity; they only leave the store via
/// expiry (observed lazily, on lookup) or explicit invalidation.
#[derive(Default)]
pub struct CacheStore {
    entries: Mutex<HashMap<CacheKey, CacheEntry>>,
}

impl CacheStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up `key` against `policy`'s invalidation rule. Returns `None`
    /// if there is no entry, or `policy` says the entry must be evicted (in
    /// which case it is also removed).
    pub fn get(&self, key: &CacheKey, policy: &dyn CachePolicy) -> Option<CacheLookup> {
        let mut entries = self.entries.lock().unwrap();
        let should_invalidate = match entries.get(key) {
            Some(entry) => policy.should_invalidate(entry),
            None => return None,
        };
        if should_invalidate {
            entries.remove(key);
            log_evicted(key);
            return None;
        }
        let entry = entries.get(key).unwrap();
        let stale = !matches!(entry.freshness(), Freshness::Fresh);
        Some(CacheLookup {
            response: entry.response.clone(),
            stale,
        })
    }

    /// The raw entry for `key`, for building conditional revalidation
    /// headers. Does not evaluate freshness or remove expired entries.
    pub fn entry(&self, key: &CacheKey) -> Option<CacheEntry> {
        self.entries.lock().unwrap().get(key).cloned()
    }

    /// Stores (or replaces) an entry.
    pub fn insert(
        &self,
        key: CacheKey,
        response: CachedResponse,
        ttl: Duration,
        stale_while_revalidate: Option<Duration>,
    ) {
        let entry = CacheEntry::new(response, ttl, stale_while_revalidate);
        self.entries.lock().unwrap().insert(key, entry);
    }

    /// Marks an entry as freshly revalidated (a `304` confirmed it's still
    /// current) without replacing its body.
    pub fn mark_revalidated(&self, key: &CacheKey) {
        if let Some(entry) = self.entries.lock().unwrap().get_mut(key) {
            entry.mark_revalidated();
        }
    }

    /// Replaces the stored response for `key`, preserving its configured
    /// TTL/SWR windows but resetting its age (used after a successful
    /// non-conditional revalidation that returned a new body).
    pub fn replace(&self, key: &CacheKey, response: CachedResponse) {
        if let Some(entry) = self.entries.lock().unwrap().get_mut(key) {
            entry.response = response;
            entry.mark_revalidated();
        }
    }

    /// Removes a single entry.
    pub fn invalidate(&self, key: &CacheKey) {
        self.entries.lock().unwrap().remove(key);
    }

    /// Removes every entry.
    pub fn clear(&self) {
        self.entries.lock().unwrap().clear();
    }

    /// The current number of stored entries (including ones that have not
    /// yet been lazily evicted on lookup).
    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    /// True if the store holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// A stats snapshot.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.len(),
        }
    }

    /// Builds the conditional request headers (`If-None-Match` /
    /// `If-Modified-Since`) to attach to a revalidation request for `key`,
    /// if the stored entry carries validators.
    pub fn conditional_headers(&self, key: &CacheKey) -> Vec<(String, String)> {
        let Some(entry) = self.entry(key) else {
            return Vec::new();
        };
        let mut headers = Vec::new();
        if let Some(etag) = entry.response.etag() {
            headers.push(("If-None-Match".to_string(), etag.to_string()));
        }
        if let Some(last_modified) = entry.response.last_modified() {
            headers.push(("If-Modified-Since".to_string(), last_modified.to_string()));
        }
        headers
    }
}

fn log_evicted(key: &CacheKey) {
    #[cfg(feature = "tracing")]
    tracing::debug!(cache_key = %key, "cache entry expired past its stale-while-revalidate window");
    #[cfg(not(feature = "tracing"))]
    {
        let _ = key;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::DefaultCachePolicy;

    fn key(s: &str) -> CacheKey {
        CacheKey::explicit(s)
    }

    #[test]
    fn basic_insert_and_get() {
        let store = CacheStore::new();
        store.insert(
            key("a"),
            CachedResponse::new(200, vec![], b"hi".to_vec()),
            Duration::from_secs(60),
            None,
        );
        let hit = store.get(&key("a"), &DefaultCachePolicy).unwrap();
        assert_eq!(hit.response.body, b"hi");
        assert!(!hit.stale);
    }

    #[test]
    fn missing_key_returns_none() {
        let store = CacheStore::new();
        assert!(store.get(&key("missing"), &DefaultCachePolicy).is_none());
    }

    #[test]
    fn ttl_expiration_removes_entry() {
        let store = CacheStore::new();
        store.insert(
            key("a"),
            CachedResponse::new(200, vec![], vec![]),
            Duration::from_millis(0),
            None,
        );
        std::thread::sleep(Duration::from_millis(5));
        assert!(store.get(&key("a"), &DefaultCachePolicy).is_none());
        assert_eq!(store.len(), 0);
    }

    #[test]
    fn stale_while_revalidate_is_served_as_stale() {
        let store = CacheStore::new();
        store.insert(
            key("a"),
            CachedResponse::new(200, vec![], vec![]),
            Duration::from_millis(0),
            Some(Duration::from_secs(60)),
        );
        std::thread::sleep(Duration::from_millis(5));
        let hit = store.get(&key("a"), &DefaultCachePolicy).unwrap();
        assert!(hit.stale);
    }

    #[test]
    fn conditional_headers_from_validators() {
        let store = CacheStore::new();
        store.insert(
            key("a"),
            CachedResponse::new(200, vec![("ETag".into(), "\"v1\"".into())], vec![]),
            Duration::from_secs(60),
            None,
        );
        let headers = store.conditional_headers(&key("a"));
        assert_eq!(
            headers,
            vec![("If-None-Match".to_string(), "\"v1\"".to_string())]
        );
    }

    #[test]
    fn clear_empties_store() {
        let store = CacheStore::new();
        store.insert(
            key("a"),
            CachedResponse::new(200, vec![], vec![]),
            Duration::from_secs(60),
            None,
        );
        store.insert(
            key("b"),
            CachedResponse::new(200, vec![], vec![]),
            Duration::from_secs(60),
            None,
        );
        assert_eq!(store.len(), 2);
        store.clear();
        assert_eq!(store.len(), 0);
    }
}
