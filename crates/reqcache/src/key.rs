//! Cache key fingerprinting.

use std::fmt;

/// A stable fingerprint identifying a cacheable request.
///
/// Built from the method, the canonical URL, the sorted query parameters,
/// and the values of whichever headers the response's `Vary` selected —
/// two requests that differ only in header order or parameter order
/// fingerprint identically.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey(String);

impl CacheKey {
    /// Builds a fingerprint from a method, URL, query parameters, and the
    /// currently-relevant vary headers (name, value) pairs.
    pub fn fingerprint(
        method: &str,
        url: &str,
        params: &[(String, String)],
        vary: &[(String, String)],
    ) -> Self {
        let mut sorted_params = params.to_vec();
        sorted_params.sort();
        let mut sorted_vary = vary.to_vec();
        sorted_vary.sort();

        let mut out = String::with_capacity(url.len() + 32);
        out.push_str(&method.to_ascii_uppercase());
        out.push('|');
        out.push_str(url);
        out.push('|');
        for (i, (k, v)) in sorted_params.iter().enumerate() {
            if i > 0 {
                out.push('&');
            }
            out.push_str(k);
            out.push('=');
            out.push_str(v);
        }
        out.push('|');
        for (i, (k, v)) in sorted_vary.iter().enumerate() {
            if i > 0 {
                out.push('&');
            }
            out.push_str(k);
            out.push('=');
            out.push_str(v);
        }
        Self(out)
    }

    /// An explicit, caller-supplied cache key, bypassing fingerprinting.
    pub fn explicit(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// The raw fingerprint string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn param_order_does_not_affect_fingerprint() {
        let a = CacheKey::fingerprint(
            "GET",
            "https://x/y",
            &[("b".into(), "2".into()), ("a".into(), "1".into())],
            &[],
        );
        let b = CacheKey::fingerprint(
            "get",
            "https://x/y",
            &[("a".into(), "1".into()), ("b".into(), "2".into())],
            &[],
        );
        assert_eq!(a, b);
    }

    #[test]
    fn vary_headers_change_the_fingerprint() {
        let a = CacheKey::fingerprint(
            "GET",
            "https://x/y",
            &[],
            &[("accept-language".into(), "en".into())],
        );
        let b = CacheKey::fingerprint(
            "GET",
            "https://x/y",
            &[],
            &[("accept-language".into(), "fr".into())],
        );
        assert_ne!(a, b);
    }

    #[test]
    fn different_method_changes_the_fingerprint() {
        let a = CacheKey::fingerprint("GET", "https://x/y", &[], &[]);
        let b = CacheKey::fingerprint("HEAD", "https://x/y", &[], &[]);
        assert_ne!(a, b);
    }
}
