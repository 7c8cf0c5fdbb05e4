//! The request orchestrator: wires a [`queue`](requeue)-gated adapter call
//! through caching, retries, the interceptor pipeline, and the typed event
//! bus described across spec.md §4. This crate is the composition root;
//! each concern it composes lives in its own leaf crate (`reqcache`,
//! `reqretry`, `reqevents`, `reqinterceptor`, `requeue`) and is re-exported
//! here only as far as callers need to reach it.

mod adapter;
mod cancel;
mod config;
mod events;
mod orchestrator;
mod pending;
mod types;

pub use adapter::{Adapter, AdapterError, MemoryAdapter, ScriptedResponse};
pub use config::{OrchestratorConfig, OrchestratorConfigBuilder};
pub use events::{OrchestratorEvent, RequestInfo};
pub use orchestrator::Orchestrator;
pub use types::{RawResponse, Request, RequestId, RequestInit, RequestOptions, Response};

pub use reqevents::{HandlerResult, SubscriptionId};
pub use reqinterceptor::{Interceptor, InterceptorId};
pub use reqcache::{CacheKey, CachePolicy, CacheStats, DefaultCachePolicy};
pub use reqcore::{AbortedBy, RequestError};
pub use reqcore::metrics::MetricsSnapshot;
