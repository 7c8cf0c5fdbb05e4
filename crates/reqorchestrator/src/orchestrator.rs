//! The request orchestrator: the state machine in spec.md §4.5, expressed
//! as a sequence of `.await` points inside one async method rather than as
//! a literal state enum — each suspension point (`acquire`, the adapter
//! call, the backoff sleep) is the Rust-native rendition of a state
//! transition, since an `async fn`'s compiler-generated state machine
//! already *is* the enum Design Note "Coroutine-free alternative" asks
//! for in runtimes that lack one.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use reqcache::{CacheKey, CachePolicy, CacheStore, DefaultCachePolicy};
use reqcore::metrics::MetricsCollector;
use reqcore::{AbortedBy, RequestError};
use reqevents::EventBus;
use reqinterceptor::{InterceptorId, Interceptor, Pipeline};
use reqretry::{ExponentialBackoff, ExponentialRandomBackoff, RetryPolicy};
use requeue::BoundedQueue;
use reqevents::SubscriptionId;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::adapter::Adapter;
use crate::cancel::compose;
use crate::config::OrchestratorConfig;
use crate::events::{OrchestratorEvent, RequestInfo};
use crate::pending::PendingTable;
use crate::types::{RawResponse, Request, RequestId, RequestInit, RequestOptions, Response};

type InterceptorPipeline = Pipeline<Request, RawResponse, Arc<RequestError>>;

/// The orchestrator itself. Always held behind an `Arc`: background tasks
/// (the timeout timer, the external-signal watcher, background cache
/// revalidation, the periodic metrics emitter) all need to reach back into
/// shared state independently of the handle the caller holds.
pub struct Orchestrator {
    config: OrchestratorConfig,
    queue: Arc<BoundedQueue>,
    cache: CacheStore,
    cache_policy: Arc<dyn CachePolicy>,
    events: Arc<EventBus<OrchestratorEvent>>,
    interceptors: Arc<InterceptorPipeline>,
    metrics: Arc<MetricsCollector>,
    pending: Mutex<PendingTable>,
    revalidating: Mutex<HashSet<String>>,
    metrics_task: Mutex<Option<JoinHandle<()>>>,
    root_shutdown: CancellationToken,
}

impl Orchestrator {
    /// Builds a new orchestrator, starting the periodic `metrics:collect`
    /// emitter if `config.enable_metrics` is set.
    pub fn new(config: OrchestratorConfig) -> Arc<Self> {
        let queue = BoundedQueue::new(config.concurrent_requests.get());
        let metrics = Arc::new(MetricsCollector::new());
        let events = Arc::new(EventBus::new());
        let enable_metrics = config.enable_metrics;

        let this = Arc::new(Self {
            config,
            queue,
            cache: CacheStore::new(),
            cache_policy: Arc::new(DefaultCachePolicy),
            events,
            interceptors: Arc::new(Pipeline::new()),
            metrics,
            pending: Mutex::new(PendingTable::new()),
            revalidating: Mutex::new(HashSet::new()),
            metrics_task: Mutex::new(None),
            root_shutdown: CancellationToken::new(),
        });

        if enable_metrics {
            let weak = Arc::clone(&this);
            let handle = tokio::spawn(async move {
                let mut ticker = tokio::time::interval(Duration::from_secs(30));
                ticker.tick().await; // first tick fires immediately; skip it
                loop {
                    ticker.tick().await;
                    let snapshot = weak.metrics.snapshot();
                    weak.events.emit(OrchestratorEvent::MetricsCollect(snapshot));
                }
            });
            *this.metrics_task.lock().unwrap() = Some(handle);
        }

        this
    }

    // ---- public contract -------------------------------------------------

    /// Sends a request, running it through cache probing, queueing,
    /// execution, classification, and retry to a terminal outcome.
    pub async fn request(self: &Arc<Self>, init: RequestInit) -> Result<Response, RequestError> {
        self.run(init, false).await
    }

    pub async fn get(self: &Arc<Self>, url: impl Into<String>) -> Result<Response, RequestError> {
        self.request(RequestInit::new("GET", url)).await
    }

    pub async fn post(
        self: &Arc<Self>,
        url: impl Into<String>,
        body: impl Into<Vec<u8>>,
    ) -> Result<Response, RequestError> {
        self.request(RequestInit::new("POST", url).body(body)).await
    }

    pub async fn put(
        self: &Arc<Self>,
        url: impl Into<String>,
        body: impl Into<Vec<u8>>,
    ) -> Result<Response, RequestError> {
        self.request(RequestInit::new("PUT", url).body(body)).await
    }

    pub async fn patch(
        self: &Arc<Self>,
        url: impl Into<String>,
        body: impl Into<Vec<u8>>,
    ) -> Result<Response, RequestError> {
        self.request(RequestInit::new("PATCH", url).body(body)).await
    }

    pub async fn delete(self: &Arc<Self>, url: impl Into<String>) -> Result<Response, RequestError> {
        self.request(RequestInit::new("DELETE", url)).await
    }

    pub async fn head(self: &Arc<Self>, url: impl Into<String>) -> Result<Response, RequestError> {
        self.request(RequestInit::new("HEAD", url)).await
    }

    /// Cancels one in-flight request. Returns `true` the first time, and
    /// `false` on any later call for the same id (idempotence law).
    pub fn cancel(&self, id: RequestId, reason: Option<String>) -> bool {
        let mut pending = self.pending.lock().unwrap();
        let Some(record) = pending.get_mut(id) else {
            return false;
        };
        if record.aborted_by.is_some() {
            return false;
        }
        record.aborted_by = Some(AbortedBy::Caller);
        let should_emit_canceled = !record.start_emitted && !record.canceled_emitted;
        if should_emit_canceled {
            record.canceled_emitted = true;
        }
        record.controller.cancel();
        drop(pending);
        if should_emit_canceled {
            self.events.emit(OrchestratorEvent::RequestCanceled {
                request: RequestInfo {
                    id,
                    method: String::new(),
                    url: String::new(),
                },
                reason,
            });
        }
        true
    }

    /// Cancels every currently in-flight request.
    pub fn cancel_all(&self, reason: Option<String>) {
        let pending = self.pending.lock().unwrap();
        let ids = pending.live_ids();
        drop(pending);
        for id in ids {
            let mut pending = self.pending.lock().unwrap();
            if let Some(record) = pending.get_mut(id) {
                if record.aborted_by.is_none() {
                    record.aborted_by = Some(AbortedBy::Shutdown);
                    record.controller.cancel();
                }
            }
            drop(pending);
            let _ = &reason;
        }
    }

    pub fn on<F, Fut>(&self, pattern: &str, handler: F) -> SubscriptionId
    where
        F: Fn(Arc<OrchestratorEvent>) -> Fut + Send + Sync + 'static,
        Fut: std::future::Future<Output = reqevents::HandlerResult> + Send + 'static,
    {
        self.events.on(pattern, handler)
    }

    pub fn once<F, Fut>(&self, pattern: &str, handler: F) -> SubscriptionId
    where
        F: Fn(Arc<OrchestratorEvent>) -> Fut + Send + Sync + 'static,
        Fut: std::future::Future<Output = reqevents::HandlerResult> + Send + 'static,
    {
        self.events.once(pattern, handler)
    }

    pub fn off(&self, id: SubscriptionId) {
        self.events.off(id);
    }

    /// Registers an interceptor at the given weight.
    pub fn use_interceptor(
        &self,
        weight: i32,
        interceptor: Arc<dyn Interceptor<Request, RawResponse, Arc<RequestError>>>,
    ) -> InterceptorId {
        self.interceptors.register(weight, interceptor)
    }

    pub fn remove_interceptor(&self, id: InterceptorId) {
        self.interceptors.remove(id);
    }

    pub fn invalidate_cache(&self, key: Option<&str>) {
        match key {
            Some(k) => self.cache.invalidate(&CacheKey::explicit(k)),
            None => self.cache.clear(),
        }
        self.events.emit(OrchestratorEvent::CacheInvalidated {
            key: key.map(|k| k.to_string()),
        });
        self.metrics.set_cache_size(self.cache.len());
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
        self.events.emit(OrchestratorEvent::CacheClear);
        self.metrics.set_cache_size(0);
    }

    pub fn cache_stats(&self) -> reqcache::CacheStats {
        self.cache.stats()
    }

    pub fn metrics(&self) -> reqcore::metrics::MetricsSnapshot {
        self.metrics.snapshot()
    }

    /// Cancels every in-flight request, clears the cache, and stops the
    /// periodic metrics emitter. The orchestrator is unusable afterward.
    pub fn destroy(&self) {
        self.cancel_all(Some("destroyed".to_string()));
        self.queue.close("orchestrator destroyed");
        self.cache.clear();
        self.root_shutdown.cancel();
        if let Some(handle) = self.metrics_task.lock().unwrap().take() {
            handle.abort();
        }
    }

    // ---- internals ---------------------------------------------------

    async fn run(
        self: &Arc<Self>,
        init: RequestInit,
        is_revalidate: bool,
    ) -> Result<Response, RequestError> {
        let (mut req, id, external_signal) = self.prepare(init, is_revalidate)?;

        if let Some(external) = external_signal.clone() {
            let this = Arc::clone(self);
            tokio::spawn(async move {
                external.cancelled().await;
                let mut pending = this.pending.lock().unwrap();
                if let Some(record) = pending.get_mut(id) {
                    if record.aborted_by.is_none() {
                        record.aborted_by = Some(AbortedBy::Caller);
                    }
                }
            });
        }

        // cache-probing
        let cached = if !req.is_revalidate
            && self.cacheable_method(&req.method)
            && self.config.enable_cache
            && !req.ignore_cache
            && !req.force_refresh
        {
            self.probe_cache(self, &req, id).await
        } else {
            None
        };

        let result = match cached {
            Some(result) => result,
            None => self.execute_with_retries(self, &mut req, id, external_signal).await,
        };
        self.finalize(id, &req, &result).await;
        result
    }

    fn cacheable_method(&self, method: &str) -> bool {
        method.eq_ignore_ascii_case("GET")
    }

    fn prepare(
        &self,
        init: RequestInit,
        is_revalidate: bool,
    ) -> Result<(Request, RequestId, Option<CancellationToken>), RequestError> {
        if init.method.trim().is_empty() {
            return Err(RequestError::Validation {
                message: "method must not be empty".to_string(),
            });
        }
        let url = self.resolve_url(&init.url)?;
        let mut headers: Vec<(String, String)> = self
            .config
            .default_headers
            .iter()
            .map(|(k, v)| (k.to_ascii_lowercase(), v.clone()))
            .collect();
        for (k, v) in init.headers {
            let k = k.to_ascii_lowercase();
            if let Some(existing) = headers.iter_mut().find(|(name, _)| *name == k) {
                existing.1 = v;
            } else {
                headers.push((k, v));
            }
        }

        let metadata = init.options.metadata.clone();
        let method = init.method.to_ascii_uppercase();

        let internal_controller = CancellationToken::new();
        let mut pending = self.pending.lock().unwrap();
        let id = pending.insert(internal_controller.clone(), method.clone(), url.clone());
        drop(pending);

        let req = Request {
            id,
            method,
            url,
            headers,
            query: init.query,
            body: init.body,
            metadata,
            is_revalidate,
            retry_count: 0,
            ignore_cache: init.options.ignore_cache,
            force_refresh: init.options.force_refresh || is_revalidate,
            revalidate_on_stale: init.options.revalidate_on_stale,
            cache_ttl: init.options.cache_ttl,
            cache_key: init.options.cache_key.clone(),
            max_retries: init.options.max_retries,
            retry_delay: init.options.retry_delay,
            retry_delay_jitter: init.options.retry_delay_jitter,
            validate_status: init.options.validate_status.clone(),
            should_retry: init.options.should_retry.clone(),
        };

        let timeout = if is_revalidate {
            self.config.timeout
        } else {
            init.options.timeout.unwrap_or(self.config.timeout)
        };
        let external_signal = if is_revalidate {
            None
        } else {
            init.options.signal.clone()
        };
        if external_signal.is_none() && !timeout.is_zero() {
            self.arm_timeout(id, internal_controller.clone(), timeout);
        }

        Ok((req, id, external_signal))
    }

    fn arm_timeout(self: &Arc<Self>, id: RequestId, controller: CancellationToken, timeout: Duration) {
        let this = Arc::clone(self);
        tokio::spawn(async move {
            tokio::select! {
                _ = tokio::time::sleep(timeout) => {
                    let mut pending = this.pending.lock().unwrap();
                    let Some(record) = pending.get_mut(id) else { return };
                    if record.aborted_by.is_some() {
                        return;
                    }
                    record.aborted_by = Some(AbortedBy::Timeout);
                    let request = RequestInfo { id, method: record.method.clone(), url: record.url.clone() };
                    drop(pending);
                    controller.cancel();
                    log_timeout(id, timeout);
                    this.events.emit(OrchestratorEvent::Timeout {
                        request,
                        after_ms: timeout.as_millis() as u64,
                    });
                }
                _ = controller.cancelled() => {}
            }
        });
    }

    fn resolve_url(&self, url: &str) -> Result<String, RequestError> {
        if url.starts_with("http://") || url.starts_with("https://") {
            return Ok(url.to_string());
        }
        match &self.config.base_url {
            Some(base) => {
                let mut joined = base.trim_end_matches('/').to_string();
                if !url.starts_with('/') {
                    joined.push('/');
                }
                joined.push_str(url);
                Ok(joined)
            }
            None => Err(RequestError::Config {
                message: format!("relative URL {url} given with no base_url configured"),
            }),
        }
    }

    /// Headers selected into the cache fingerprint by default (spec.md §3's
    /// "selected-vary-headers", absent a server `Vary` override).
    const DEFAULT_VARY_HEADERS: [&'static str; 2] = ["accept", "authorization"];

    fn cache_key_for(&self, req: &Request) -> CacheKey {
        if let Some(explicit) = &req.cache_key {
            return CacheKey::explicit(explicit.clone());
        }
        let vary: Vec<(String, String)> = Self::DEFAULT_VARY_HEADERS
            .iter()
            .filter_map(|name| {
                req.header(name)
                    .map(|value| (name.to_string(), value.to_string()))
            })
            .collect();
        CacheKey::fingerprint(&req.method, &req.url, &req.query, &vary)
    }

    async fn probe_cache(
        self: &Arc<Self>,
        _self_ref: &Arc<Self>,
        req: &Request,
        id: RequestId,
    ) -> Option<Result<Response, RequestError>> {
        let key = self.cache_key_for(req);
        match self.cache.get(&key, self.cache_policy.as_ref()) {
            Some(lookup) if !lookup.stale => {
                self.events.emit(OrchestratorEvent::CacheHit {
                    request: info(id, req),
                    key: key.as_str().to_string(),
                });
                self.metrics.record_cache_hit();
                Some(Ok(Response {
                    status: lookup.response.status,
                    headers: lookup.response.headers,
                    body: lookup.response.body,
                    from_cache: true,
                    retry_count: 0,
                }))
            }
            Some(lookup) => {
                self.events.emit(OrchestratorEvent::CacheStale {
                    request: info(id, req),
                    key: key.as_str().to_string(),
                });
                self.metrics.record_cache_stale();
                if req.revalidate_on_stale.unwrap_or(true) {
                    self.maybe_revalidate(req, key.as_str().to_string());
                }
                Some(Ok(Response {
                    status: lookup.response.status,
                    headers: lookup.response.headers,
                    body: lookup.response.body,
                    from_cache: true,
                    retry_count: 0,
                }))
            }
            None => {
                self.events.emit(OrchestratorEvent::CacheMiss {
                    request: info(id, req),
                    key: key.as_str().to_string(),
                });
                self.metrics.record_cache_miss();
                None
            }
        }
    }

    fn maybe_revalidate(self: &Arc<Self>, req: &Request, key: String) {
        {
            let mut revalidating = self.revalidating.lock().unwrap();
            if revalidating.contains(&key) {
                return;
            }
            revalidating.insert(key.clone());
        }
        let this = Arc::clone(self);
        let mut headers = req.headers.clone();
        if self.config.enable_conditional_requests {
            let conditional_key = CacheKey::explicit(key.clone());
            for (name, value) in self.cache.conditional_headers(&conditional_key) {
                let name_lower = name.to_ascii_lowercase();
                if let Some(existing) = headers.iter_mut().find(|(k, _)| *k == name_lower) {
                    existing.1 = value;
                } else {
                    headers.push((name_lower, value));
                }
            }
        }
        let init = RequestInit {
            method: req.method.clone(),
            url: req.url.clone(),
            headers,
            query: req.query.clone(),
            body: req.body.clone(),
            options: RequestOptions {
                force_refresh: true,
                cache_key: req.cache_key.clone(),
                ..RequestOptions::default()
            },
        };
        tokio::spawn(async move {
            let _ = this.run(init, true).await;
            this.revalidating.lock().unwrap().remove(&key);
        });
    }

    async fn execute_with_retries(
        self: &Arc<Self>,
        _self_ref: &Arc<Self>,
        req: &mut Request,
        id: RequestId,
        external_signal: Option<CancellationToken>,
    ) -> Result<Response, RequestError> {
        let req_for_interceptors = req.clone();
        let prepared = match self.interceptors.run_request(req_for_interceptors).await {
            Ok(r) => r,
            Err(err) => return Err(self.unwrap_interceptor_error(err)),
        };
        *req = prepared;

        let internal_controller = {
            let pending = self.pending.lock().unwrap();
            pending.get(id).map(|r| r.controller.clone())
        };
        let Some(internal_controller) = internal_controller else {
            return Err(RequestError::AbortedWhileWaiting);
        };
        let composed = match &external_signal {
            Some(external) => compose(internal_controller.clone(), external.clone()),
            None => internal_controller.clone(),
        };

        let max_retries = req.max_retries.unwrap_or(self.config.max_retries);
        let retry_delay = req.retry_delay.unwrap_or(self.config.retry_delay);
        let jitter = req.retry_delay_jitter.unwrap_or(self.config.retry_delay_jitter);
        let backoff = ExponentialRandomBackoff::new(ExponentialBackoff::new(retry_delay), jitter);
        // A custom `should_retry` wins outright (spec.md §4.5 "Classifying /
        // retry"); absent one, fall back to the default status/kind rules.
        // `CANCELED` never reaches this predicate at all — it always returns
        // from `classify_cancellation` before `should_retry` is consulted.
        let custom_predicate = req.should_retry.clone();
        let req_snapshot = req.clone();
        let predicate: reqretry::RetryPredicate<RequestError> = Arc::new(move |err: &RequestError| {
            match &custom_predicate {
                Some(custom) => custom(&req_snapshot, err),
                None => default_should_retry(err),
            }
        });
        let retry_policy: RetryPolicy<RequestError> =
            RetryPolicy::new(max_retries + 1, Arc::new(backoff)).with_retry_predicate(predicate);
        let validate_status = req.validate_status.clone().unwrap_or_else(|| self.config.validate_status.clone());

        let mut attempt: u32 = 0;
        loop {
            attempt += 1;
            req.retry_count = attempt - 1;

            if composed.is_cancelled() {
                return Err(self.classify_cancellation(id));
            }

            let permit = match self.queue.acquire(Some(composed.clone())).await {
                Ok(permit) => permit,
                Err(queue_err) => return Err(queue_err),
            };

            if !req.is_revalidate {
                self.mark_started(id, req);
            }

            let raw = self.config.adapter.send(req, composed.clone()).await;
            drop(permit);

            let err = match raw {
                Ok(raw_response) => {
                    let raw_response = match self.interceptors.run_response(raw_response).await {
                        Ok(r) => r,
                        Err(err) => return Err(self.unwrap_interceptor_error(err)),
                    };

                    if req.is_revalidate && raw_response.status == 304 {
                        let key = self.cache_key_for(req);
                        self.cache.mark_revalidated(&key);
                        return Ok(response_from_raw(raw_response, false, req.retry_count));
                    }

                    if validate_status(raw_response.status) {
                        self.on_cacheable_success(req, &raw_response);
                        self.metrics.record_success();
                        self.events.emit(OrchestratorEvent::ResponseSuccess {
                            request: info(id, req),
                            response: Arc::new(response_from_raw(raw_response.clone(), false, req.retry_count)),
                        });
                        return Ok(response_from_raw(raw_response, false, req.retry_count));
                    }
                    RequestError::Http {
                        status: raw_response.status,
                        body: Some(raw_response.body),
                    }
                }
                Err(crate::adapter::AdapterError::Canceled) => {
                    return Err(self.classify_cancellation(id));
                }
                Err(crate::adapter::AdapterError::Network { message, source }) => {
                    self.events.emit(OrchestratorEvent::ConnectionError {
                        request: info(id, req),
                        message: message.clone(),
                    });
                    RequestError::NetworkError { message, source }
                }
                Err(crate::adapter::AdapterError::SendFailed { message }) => {
                    RequestError::RequestSendFailed { message }
                }
            };

            let should_retry = retry_policy.should_retry(attempt, &err);
            if should_retry {
                let delay = retry_policy.next_backoff(attempt);
                self.metrics.record_retry();
                log_retry_attempt(id, attempt, delay, &err);
                self.events.emit(OrchestratorEvent::RetryAttempt {
                    request: info(id, req),
                    attempt,
                    delay_ms: delay.as_millis() as u64,
                });
                tokio::select! {
                    _ = tokio::time::sleep(delay) => {}
                    _ = composed.cancelled() => return Err(self.classify_cancellation(id)),
                }
                continue;
            }

            if attempt > 1 {
                log_retries_exhausted(id, attempt, &err);
                self.events.emit(OrchestratorEvent::RetryFailed {
                    request: info(id, req),
                    attempts: attempt,
                });
            }
            self.metrics.record_error();
            let err = Arc::new(err);
            let err = self.interceptors.run_error(err).await;
            self.events.emit(OrchestratorEvent::ResponseError {
                request: info(id, req),
                error: Arc::clone(&err),
            });
            return Err(Arc::try_unwrap(err).unwrap_or_else(|arc| clone_request_error(&arc)));
        }
    }

    fn mark_started(&self, id: RequestId, req: &Request) {
        let mut pending = self.pending.lock().unwrap();
        let Some(record) = pending.get_mut(id) else { return };
        if record.start_emitted {
            return;
        }
        record.start_emitted = true;
        drop(pending);
        self.metrics.record_request();
        self.metrics.request_started();
        log_request_started(id, &req.method, &req.url);
        self.events
            .emit(OrchestratorEvent::RequestStart(info(id, req)));
    }

    fn classify_cancellation(&self, id: RequestId) -> RequestError {
        let pending = self.pending.lock().unwrap();
        let aborted_by = pending
            .get(id)
            .and_then(|r| r.aborted_by)
            .unwrap_or(AbortedBy::Caller);
        drop(pending);
        if matches!(aborted_by, AbortedBy::Timeout) {
            RequestError::Timeout { after_ms: self.config.timeout.as_millis() as u64 }
        } else {
            RequestError::Canceled { aborted_by }
        }
    }

    fn on_cacheable_success(&self, req: &Request, raw: &RawResponse) {
        if !self.config.enable_cache || !self.cacheable_method(&req.method) {
            return;
        }
        if !self
            .cache_policy
            .should_cache(&req.method, &req.headers, raw.status, &raw.headers)
        {
            return;
        }
        let key = self.cache_key_for(req);
        let response = reqcache::CachedResponse::new(raw.status, raw.headers.clone(), raw.body.clone());
        let ttl = req
            .cache_ttl
            .unwrap_or_else(|| self.cache_policy.ttl(&response, self.config.default_cache_ttl));
        let swr = self.cache_policy.stale_while_revalidate(&response);
        if req.is_revalidate {
            self.cache.replace(&key, response);
        } else {
            self.cache.insert(key, response, ttl, swr);
        }
        self.events.emit(OrchestratorEvent::CacheSet { key: self.cache_key_for(req).as_str().to_string() });
        self.metrics.set_cache_size(self.cache.len());
    }

    async fn finalize(&self, id: RequestId, req: &Request, result: &Result<Response, RequestError>) {
        let mut pending = self.pending.lock().unwrap();
        let record = pending.remove(id);
        drop(pending);
        let had_started = record.map(|r| r.start_emitted).unwrap_or(false);
        if req.is_revalidate {
            return;
        }
        if had_started {
            self.metrics.request_finished();
        }
        if let Err(err) = result {
            if err.is_timeout() {
                self.metrics.record_timeout();
            }
        }
        self.events.emit(OrchestratorEvent::RequestEnd(info(id, req)));
    }

    fn unwrap_interceptor_error(&self, err: Arc<RequestError>) -> RequestError {
        Arc::try_unwrap(err).unwrap_or_else(|arc| clone_request_error(&arc))
    }
}

fn info(id: RequestId, req: &Request) -> RequestInfo {
    RequestInfo {
        id,
        method: req.method.clone(),
        url: req.url.clone(),
    }
}

fn log_request_started(id: RequestId, method: &str, url: &str) {
    #[cfg(feature = "tracing")]
    tracing::debug!(request_id = %id, method, url, "request started");
    #[cfg(not(feature = "tracing"))]
    {
        let _ = (id, method, url);
    }
}

fn log_retry_attempt(id: RequestId, attempt: u32, delay: Duration, error: &RequestError) {
    #[cfg(feature = "tracing")]
    tracing::debug!(
        request_id = %id,
        attempt,
        delay_ms = delay.as_millis() as u64,
        %error,
        "retrying after backoff"
    );
    #[cfg(not(feature = "tracing"))]
    {
        let _ = (id, attempt, delay, error);
    }
}

fn log_retries_exhausted(id: RequestId, attempts: u32, error: &RequestError) {
    #[cfg(feature = "tracing")]
    tracing::warn!(request_id = %id, attempts, %error, "retry attempts exhausted");
    #[cfg(not(feature = "tracing"))]
    {
        let _ = (id, attempts, error);
    }
}

fn log_timeout(id: RequestId, after: Duration) {
    #[cfg(feature = "tracing")]
    tracing::warn!(request_id = %id, after_ms = after.as_millis() as u64, "request timed out");
    #[cfg(not(feature = "tracing"))]
    {
        let _ = (id, after);
    }
}

fn response_from_raw(raw: RawResponse, from_cache: bool, retry_count: u32) -> Response {
    Response {
        status: raw.status,
        headers: raw.headers,
        body: raw.body,
        from_cache,
        retry_count,
    }
}

fn default_should_retry(err: &RequestError) -> bool {
    matches!(err, RequestError::Timeout { .. })
        || matches!(err, RequestError::NetworkError { .. })
        || matches!(
            err,
            RequestError::Http { status, .. }
                if matches!(status, 408 | 429 | 500 | 502 | 503 | 504)
        )
}

fn clone_request_error(err: &RequestError) -> RequestError {
    match err {
        RequestError::Canceled { aborted_by } => RequestError::Canceled { aborted_by: *aborted_by },
        RequestError::Timeout { after_ms } => RequestError::Timeout { after_ms: *after_ms },
        RequestError::NetworkError { message, .. } => RequestError::NetworkError {
            message: message.clone(),
            source: None,
        },
        RequestError::Http { status, body } => RequestError::Http {
            status: *status,
            body: body.clone(),
        },
        RequestError::RequestSendFailed { message } => {
            RequestError::RequestSendFailed { message: message.clone() }
        }
        RequestError::QueueClosed { reason } => RequestError::QueueClosed { reason: reason.clone() },
        RequestError::AbortedWhileWaiting => RequestError::AbortedWhileWaiting,
        RequestError::Validation { message } => RequestError::Validation { message: message.clone() },
        RequestError::Config { message } => RequestError::Config { message: message.clone() },
    }
}
