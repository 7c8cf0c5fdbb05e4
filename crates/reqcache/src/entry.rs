//! Stored cache entries and freshness accounting.

use std::time::{Duration, Instant};

/// A stored response, independent of any particular HTTP client type so this
/// crate has no dependency on one. Orchestrator-level code maps its own
/// response type to and from this shape at the cache boundary.
#[derive(Debug, Clone)]
pub struct CachedResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl CachedResponse {
    /// Builds a cached response from its parts.
    pub fn new(status: u16, headers: Vec<(String, String)>, body: Vec<u8>) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    /// The header value matching `name`, case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// The `ETag` validator, if present.
    pub fn etag(&self) -> Option<&str> {
        self.header("etag")
    }

    /// The `Last-Modified` validator, if present.
    pub fn last_modified(&self) -> Option<&str> {
        self.header("last-modified")
    }
}

/// The freshness state of an entry relative to now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Freshness {
    /// Within the TTL window: serve directly.
    Fresh,
    /// Past the TTL but within the stale-while-revalidate window: serve the
    /// stale value and trigger a background revalidation.
    StaleWhileRevalidate,
    /// Past both windows: must not be served.
    Expired,
}

/// A stored response plus the bookkeeping needed to decide whether it's
/// still servable and how to revalidate it.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub response: CachedResponse,
    pub stored_at: Instant,
    pub ttl: Duration,
    /// Extra window, past `ttl`, during which the stale value may still be
    /// served while a revalidation is attempted. `None` disables SWR.
    pub stale_while_revalidate: Option<Duration>,
}

impl CacheEntry {
    /// Creates a new entry, stamped as stored at the current instant.
    pub fn new(
        response: CachedResponse,
        ttl: Duration,
        stale_while_revalidate: Option<Duration>,
    ) -> Self {
        Self {
            response,
            stored_at: Instant::now(),
            ttl,
            stale_while_revalidate,
        }
    }

    /// This entry's current freshness.
    pub fn freshness(&self) -> Freshness {
        let age = self.stored_at.elapsed();
        if age <= self.ttl {
            Freshness::Fresh
        } else if let Some(swr) = self.stale_while_revalidate {
            if age <= self.ttl + swr {
                Freshness::StaleWhileRevalidate
            } else {
                Freshness::Expired
            }
        } else {
            Freshness::Expired
        }
    }

    /// Resets the entry's age to zero, as happens after a successful
    /// revalidation (a `304` confirms the stored body is still current).
    pub fn mark_revalidated(&mut self) {
        self.stored_at = Instant::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_within_ttl() {
        let entry = CacheEntry::new(
            CachedResponse::new(200, vec![], vec![]),
            Duration::from_secs(60),
            None,
        );
        assert_eq!(entry.freshness(), Freshness::Fresh);
    }

    #[test]
    fn expired_without_swr() {
        let mut entry = CacheEntry::new(
            CachedResponse::new(200, vec![], vec![]),
            Duration::from_millis(0),
            None,
        );
        entry.stored_at = Instant::now() - Duration::from_millis(10);
        assert_eq!(entry.freshness(), Freshness::Expired);
    }

    #[test]
    fn stale_while_revalidate_window() {
        let mut entry = CacheEntry::new(
            CachedResponse::new(200, vec![], vec![]),
            Duration::from_millis(10),
            Some(Duration::from_secs(60)),
        );
        entry.stored_at = Instant::now() - Duration::from_millis(20);
        assert_eq!(entry.freshness(), Freshness::StaleWhileRevalidate);
    }

    #[test]
    fn mark_revalidated_resets_age() {
        let mut entry = CacheEntry::new(
            CachedResponse::new(200, vec![], vec![]),
            Duration::from_secs(60),
            None,
        );
        entry.stored_at = Instant::now() - Duration::from_secs(120);
        assert_eq!(entry.freshness(), Freshness::Expired);
        entry.mark_revalidated();
        assert_eq!(entry.freshness(), Freshness::Fresh);
    }
}
