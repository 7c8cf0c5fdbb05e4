//! The orchestrator's event taxonomy.

use std::sync::Arc;

use reqcore::RequestError;
use reqevents::NamedEvent;

use crate::types::{RequestId, Response};

/// Common fields every lifecycle event carries.
#[derive(Debug, Clone)]
pub struct RequestInfo {
    pub id: RequestId,
    pub method: String,
    pub url: String,
}

/// One emission on the orchestrator's event bus.
#[derive(Debug, Clone)]
pub enum OrchestratorEvent {
    RequestStart(RequestInfo),
    RequestEnd(RequestInfo),
    RequestCanceled { request: RequestInfo, reason: Option<String> },
    ResponseSuccess { request: RequestInfo, response: Arc<Response> },
    ResponseError { request: RequestInfo, error: Arc<RequestError> },
    Timeout { request: RequestInfo, after_ms: u64 },
    RetryAttempt { request: RequestInfo, attempt: u32, delay_ms: u64 },
    RetryFailed { request: RequestInfo, attempts: u32 },
    CacheHit { request: RequestInfo, key: String },
    CacheMiss { request: RequestInfo, key: String },
    CacheStale { request: RequestInfo, key: String },
    CacheSet { key: String },
    CacheInvalidated { key: Option<String> },
    CacheClear,
    MetricsCollect(reqcore::metrics::MetricsSnapshot),
    ConnectionError { request: RequestInfo, message: String },
}

impl NamedEvent for OrchestratorEvent {
    fn event_name(&self) -> &str {
        match self {
            OrchestratorEvent::RequestStart(_) => "request:start",
            OrchestratorEvent::RequestEnd(_) => "request:end",
            OrchestratorEvent::RequestCanceled { .. } => "request:canceled",
            OrchestratorEvent::ResponseSuccess { .. } => "response:success",
            OrchestratorEvent::ResponseError { .. } => "response:error",
            OrchestratorEvent::Timeout { .. } => "timeout",
            OrchestratorEvent::RetryAttempt { .. } => "retry:attempt",
            OrchestratorEvent::RetryFailed { .. } => "retry:failed",
            OrchestratorEvent::CacheHit { .. } => "cache:hit",
            OrchestratorEvent::CacheMiss { .. } => "cache:miss",
            OrchestratorEvent::CacheStale { .. } => "cache:stale",
            OrchestratorEvent::CacheSet { .. } => "cache:set",
            OrchestratorEvent::CacheInvalidated { .. } => "cache:invalidated",
            OrchestratorEvent::CacheClear => "cache:clear",
            OrchestratorEvent::MetricsCollect(_) => "metrics:collect",
            OrchestratorEvent::ConnectionError { .. } => "connection:error",
        }
    }
}
