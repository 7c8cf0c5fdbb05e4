//! The request/response value types that flow through the orchestrator.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

/// Identifies one logical request for the lifetime of its pending record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestId(pub(crate) u64);

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Per-request overrides of the orchestrator's defaults, mirroring
/// `RequestOptions` in the original client surface.
#[derive(Default, Clone)]
pub struct RequestOptions {
    pub timeout: Option<Duration>,
    pub max_retries: Option<u32>,
    pub retry_delay: Option<Duration>,
    pub retry_delay_jitter: Option<f64>,
    pub ignore_cache: bool,
    pub force_refresh: bool,
    pub revalidate_on_stale: Option<bool>,
    pub cache_ttl: Option<Duration>,
    pub validate_status: Option<Arc<dyn Fn(u16) -> bool + Send + Sync>>,
    pub cache_key: Option<String>,
    pub signal: Option<CancellationToken>,
    pub metadata: HashMap<String, String>,
    pub should_retry: Option<Arc<dyn Fn(&Request, &reqcore::RequestError) -> bool + Send + Sync>>,
}

impl std::fmt::Debug for RequestOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestOptions")
            .field("timeout", &self.timeout)
            .field("max_retries", &self.max_retries)
            .field("ignore_cache", &self.ignore_cache)
            .field("force_refresh", &self.force_refresh)
            .field("cache_key", &self.cache_key)
            .finish_non_exhaustive()
    }
}

/// A prepared, fully-merged request ready to be sent by an [`crate::Adapter`].
///
/// `cache_key`/`cache_ttl`/`max_retries`/`retry_delay`/`retry_delay_jitter`/
/// `validate_status`/`should_retry` mirror spec.md §3's "cacheOptions" /
/// "retryOptions" / "validateStatus" / "cacheKey" request attributes: they
/// start out as the per-call overrides in [`RequestOptions`], are resolved
/// onto the request during `preparing`, and travel with it (rather than
/// living only in the orchestrator's config) so interceptors can inspect or
/// adjust them before the request is dispatched.
#[derive(Clone)]
pub struct Request {
    pub id: RequestId,
    pub method: String,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub query: Vec<(String, String)>,
    pub body: Option<Vec<u8>>,
    pub metadata: HashMap<String, String>,
    /// True for the internal background fetch spawned to revalidate a
    /// stale cache entry; never surfaces `request:start`/`request:end`.
    pub is_revalidate: bool,
    pub retry_count: u32,
    pub ignore_cache: bool,
    pub force_refresh: bool,
    pub revalidate_on_stale: Option<bool>,
    pub cache_ttl: Option<Duration>,
    pub cache_key: Option<String>,
    pub max_retries: Option<u32>,
    pub retry_delay: Option<Duration>,
    pub retry_delay_jitter: Option<f64>,
    pub validate_status: Option<Arc<dyn Fn(u16) -> bool + Send + Sync>>,
    pub should_retry: Option<Arc<dyn Fn(&Request, &reqcore::RequestError) -> bool + Send + Sync>>,
}

impl std::fmt::Debug for Request {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Request")
            .field("id", &self.id)
            .field("method", &self.method)
            .field("url", &self.url)
            .field("headers", &self.headers)
            .field("query", &self.query)
            .field("is_revalidate", &self.is_revalidate)
            .field("retry_count", &self.retry_count)
            .field("ignore_cache", &self.ignore_cache)
            .field("force_refresh", &self.force_refresh)
            .field("cache_key", &self.cache_key)
            .finish_non_exhaustive()
    }
}

impl Request {
    pub(crate) fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub(crate) fn set_header(&mut self, name: &str, value: String) {
        if let Some(existing) = self
            .headers
            .iter_mut()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
        {
            existing.1 = value;
        } else {
            self.headers.push((name.to_string(), value));
        }
    }
}

/// A finished response returned to the caller.
#[derive(Debug, Clone)]
pub struct Response {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
    pub from_cache: bool,
    pub retry_count: u32,
}

/// The raw result of one adapter send attempt, before cache/status
/// classification.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

/// What a caller passes to [`crate::Orchestrator::request`] — a partial
/// request, merged against the orchestrator's configured defaults during
/// `preparing`.
#[derive(Clone)]
pub struct RequestInit {
    pub method: String,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub query: Vec<(String, String)>,
    pub body: Option<Vec<u8>>,
    pub options: RequestOptions,
}

impl RequestInit {
    /// A bare request with no body, headers, or overrides.
    pub fn new(method: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            url: url.into(),
            headers: Vec::new(),
            query: Vec::new(),
            body: None,
            options: RequestOptions::default(),
        }
    }

    /// Attaches a body.
    pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Adds one header.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Adds one query parameter.
    pub fn query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((name.into(), value.into()));
        self
    }

    /// Overrides the per-request options.
    pub fn options(mut self, options: RequestOptions) -> Self {
        self.options = options;
        self
    }
}
