//! Cacheability and revalidation rules.

use crate::entry::{CacheEntry, CachedResponse};
use std::time::Duration;

/// The five decisions a cache policy must make, kept as a trait so callers
/// can override any one of them without reimplementing the others.
pub trait CachePolicy: Send + Sync {
    /// Whether a response with this status and these headers should be
    /// stored at all.
    ///
    /// Mirrors spec.md §4.2's `shouldCache(req,res)`: the method and status
    /// must be cacheable, neither side's `Cache-Control` may carry
    /// `no-store`/`no-cache`, and a request with `Authorization` is only
    /// cacheable if the response is explicitly marked public/shared
    /// (`max-age`, `s-maxage`, or `public`).
    fn should_cache(
        &self,
        method: &str,
        request_headers: &[(String, String)],
        status: u16,
        response_headers: &[(String, String)],
    ) -> bool;

    /// How long a freshly stored entry should be considered fresh.
    fn ttl(&self, response: &CachedResponse, default_ttl: Duration) -> Duration;

    /// The stale-while-revalidate window to grant a freshly stored entry,
    /// if any.
    fn stale_while_revalidate(&self, response: &CachedResponse) -> Option<Duration>;

    /// Whether a stored entry has passed both its TTL and
    /// stale-while-revalidate window and must be evicted rather than
    /// served.
    ///
    /// Mirrors spec.md §4.2's `shouldInvalidate(key, entry): now ≥ expires +
    /// swr` — the same boundary `CacheEntry::freshness()` computes, exposed
    /// through the policy so a custom policy can override the cutoff.
    fn should_invalidate(&self, entry: &CacheEntry) -> bool;

    /// Whether a stale-but-revalidatable entry should actually be
    /// revalidated right now, rather than just served stale.
    fn should_revalidate(&self, entry: &CacheEntry) -> bool;
}

/// The default policy: cache successful `GET`/`HEAD` responses, honor
/// `Cache-Control: max-age`/`no-store` when present, always revalidate a
/// stale-but-servable entry, and invalidate on any mutating verb.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultCachePolicy;

impl CachePolicy for DefaultCachePolicy {
    fn should_cache(
        &self,
        method: &str,
        request_headers: &[(String, String)],
        status: u16,
        response_headers: &[(String, String)],
    ) -> bool {
        if !matches!(method.to_ascii_uppercase().as_str(), "GET" | "HEAD") {
            return false;
        }
        if !(200..300).contains(&status) {
            return false;
        }
        let req_cc = header(request_headers, "cache-control").unwrap_or_default();
        if has_directive(&req_cc, "no-store") || has_directive(&req_cc, "no-cache") {
            return false;
        }
        let res_cc = header(response_headers, "cache-control").unwrap_or_default();
        if has_directive(&res_cc, "no-store") {
            return false;
        }
        if directive_value(&res_cc, "max-age") == Some("0".to_string()) {
            return false;
        }
        let has_auth = header(request_headers, "authorization").is_some();
        if has_auth {
            let explicitly_cacheable = directive_value(&res_cc, "max-age").is_some()
                || directive_value(&res_cc, "s-maxage").is_some()
                || has_directive(&res_cc, "public");
            if !explicitly_cacheable {
                return false;
            }
        }
        true
    }

    fn ttl(&self, response: &CachedResponse, default_ttl: Duration) -> Duration {
        if let Some(cache_control) = response.header("cache-control") {
            if cache_control
                .split(',')
                .any(|d| d.trim().eq_ignore_ascii_case("no-store"))
            {
                return Duration::ZERO;
            }
            for directive in cache_control.split(',') {
                let directive = directive.trim();
                if let Some(seconds) = directive.strip_prefix("max-age=") {
                    if let Ok(seconds) = seconds.trim().parse::<u64>() {
                        return Duration::from_secs(seconds);
                    }
                }
            }
        }
        default_ttl
    }

    fn stale_while_revalidate(&self, response: &CachedResponse) -> Option<Duration> {
        let cache_control = response.header("cache-control")?;
        cache_control.split(',').find_map(|directive| {
            let directive = directive.trim();
            directive
                .strip_prefix("stale-while-revalidate=")
                .and_then(|s| s.trim().parse::<u64>().ok())
                .map(Duration::from_secs)
        })
    }

    fn should_invalidate(&self, entry: &CacheEntry) -> bool {
        matches!(entry.freshness(), crate::entry::Freshness::Expired)
    }

    fn should_revalidate(&self, entry: &CacheEntry) -> bool {
        matches!(
            entry.freshness(),
            crate::entry::Freshness::StaleWhileRevalidate
        )
    }
}

fn header(headers: &[(String, String)], name: &str) -> Option<String> {
    headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(name))
        .map(|(_, v)| v.clone())
}

fn has_directive(cache_control: &str, name: &str) -> bool {
    cache_control
        .split(',')
        .any(|directive| directive.trim().eq_ignore_ascii_case(name))
}

fn directive_value(cache_control: &str, name: &str) -> Option<String> {
    cache_control.split(',').find_map(|directive| {
        let directive = directive.trim();
        directive
            .strip_prefix(name)?
            .strip_prefix('=')
            .map(|v| v.trim().trim_matches('"').to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_get_head_are_cacheable() {
        let policy = DefaultCachePolicy;
        assert!(policy.should_cache("GET", &[], 200, &[]));
        assert!(policy.should_cache("HEAD", &[], 204, &[]));
        assert!(!policy.should_cache("POST", &[], 200, &[]));
    }

    #[test]
    fn non_2xx_is_not_cacheable() {
        let policy = DefaultCachePolicy;
        assert!(!policy.should_cache("GET", &[], 404, &[]));
        assert!(!policy.should_cache("GET", &[], 500, &[]));
    }

    #[test]
    fn no_store_on_either_side_is_not_cacheable() {
        let policy = DefaultCachePolicy;
        let req_no_store = [("Cache-Control".to_string(), "no-store".to_string())];
        assert!(!policy.should_cache("GET", &req_no_store, 200, &[]));
        let res_no_store = [("Cache-Control".to_string(), "no-store".to_string())];
        assert!(!policy.should_cache("GET", &[], 200, &res_no_store));
    }

    #[test]
    fn no_cache_request_directive_is_not_cacheable() {
        let policy = DefaultCachePolicy;
        let req_no_cache = [("Cache-Control".to_string(), "no-cache".to_string())];
        assert!(!policy.should_cache("GET", &req_no_cache, 200, &[]));
    }

    #[test]
    fn response_max_age_zero_is_not_cacheable() {
        let policy = DefaultCachePolicy;
        let res = [("Cache-Control".to_string(), "max-age=0".to_string())];
        assert!(!policy.should_cache("GET", &[], 200, &res));
    }

    #[test]
    fn authorized_request_requires_explicit_public_response() {
        let policy = DefaultCachePolicy;
        let req_auth = [("Authorization".to_string(), "Bearer token".to_string())];
        assert!(!policy.should_cache("GET", &req_auth, 200, &[]));

        let res_public = [("Cache-Control".to_string(), "public, max-age=60".to_string())];
        assert!(policy.should_cache("GET", &req_auth, 200, &res_public));

        let res_s_maxage = [("Cache-Control".to_string(), "s-maxage=60".to_string())];
        assert!(policy.should_cache("GET", &req_auth, 200, &res_s_maxage));
    }

    #[test]
    fn max_age_overrides_default_ttl() {
        let policy = DefaultCachePolicy;
        let resp = CachedResponse::new(
            200,
            vec![("Cache-Control".into(), "max-age=120".into())],
            vec![],
        );
        assert_eq!(
            policy.ttl(&resp, Duration::from_secs(5)),
            Duration::from_secs(120)
        );
    }

    #[test]
    fn no_store_forces_zero_ttl() {
        let policy = DefaultCachePolicy;
        let resp = CachedResponse::new(
            200,
            vec![("Cache-Control".into(), "no-store".into())],
            vec![],
        );
        assert_eq!(policy.ttl(&resp, Duration::from_secs(5)), Duration::ZERO);
    }

    #[test]
    fn should_invalidate_matches_expired_freshness() {
        let policy = DefaultCachePolicy;
        let fresh = CacheEntry::new(
            CachedResponse::new(200, vec![], vec![]),
            Duration::from_secs(60),
            None,
        );
        assert!(!policy.should_invalidate(&fresh));

        let mut expired = CacheEntry::new(
            CachedResponse::new(200, vec![], vec![]),
            Duration::from_millis(0),
            None,
        );
        expired.stored_at = std::time::Instant::now() - Duration::from_millis(10);
        assert!(policy.should_invalidate(&expired));
    }
}
