//! Orchestrator configuration, built the way every teacher leaf crate
//! builds its config: a typed builder with chained setters and sane
//! defaults.

use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::Duration;

use crate::adapter::Adapter;

fn default_validate_status() -> Arc<dyn Fn(u16) -> bool + Send + Sync> {
    Arc::new(|status: u16| (200..300).contains(&status))
}

/// The orchestrator's configuration, recognizing exactly the fields the
/// original client surface's constructor options do.
pub struct OrchestratorConfig {
    pub adapter: Arc<dyn Adapter>,
    pub base_url: Option<String>,
    pub default_headers: Vec<(String, String)>,
    pub concurrent_requests: NonZeroUsize,
    pub timeout: Duration,
    pub max_retries: u32,
    pub retry_delay: Duration,
    pub retry_delay_jitter: f64,
    pub enable_cache: bool,
    pub default_cache_ttl: Duration,
    pub enable_conditional_requests: bool,
    pub enable_metrics: bool,
    pub validate_status: Arc<dyn Fn(u16) -> bool + Send + Sync>,
}

impl OrchestratorConfig {
    /// Starts a builder for the given adapter; every other field takes the
    /// defaults spec.md §6 lists.
    pub fn builder(adapter: Arc<dyn Adapter>) -> OrchestratorConfigBuilder {
        OrchestratorConfigBuilder {
            adapter,
            base_url: None,
            default_headers: Vec::new(),
            concurrent_requests: NonZeroUsize::new(10).unwrap(),
            timeout: Duration::from_secs(30),
            max_retries: 3,
            retry_delay: Duration::from_secs(1),
            retry_delay_jitter: 0.3,
            enable_cache: true,
            default_cache_ttl: Duration::from_secs(300),
            enable_conditional_requests: false,
            enable_metrics: false,
            validate_status: default_validate_status(),
        }
    }
}

/// Builder for [`OrchestratorConfig`].
pub struct OrchestratorConfigBuilder {
    adapter: Arc<dyn Adapter>,
    base_url: Option<String>,
    default_headers: Vec<(String, String)>,
    concurrent_requests: NonZeroUsize,
    timeout: Duration,
    max_retries: u32,
    retry_delay: Duration,
    retry_delay_jitter: f64,
    enable_cache: bool,
    default_cache_ttl: Duration,
    enable_conditional_requests: bool,
    enable_metrics: bool,
    validate_status: Arc<dyn Fn(u16) -> bool + Send + Sync>,
}

impl OrchestratorConfigBuilder {
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn default_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.default_headers.push((name.into(), value.into()));
        self
    }

    pub fn concurrent_requests(mut self, n: NonZeroUsize) -> Self {
        self.concurrent_requests = n;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn retry_delay(mut self, retry_delay: Duration) -> Self {
        self.retry_delay = retry_delay;
        self
    }

    pub fn retry_delay_jitter(mut self, jitter: f64) -> Self {
        self.retry_delay_jitter = jitter.clamp(0.0, 1.0);
        self
    }

    pub fn enable_cache(mut self, enable: bool) -> Self {
        self.enable_cache = enable;
        self
    }

    pub fn default_cache_ttl(mut self, ttl: Duration) -> Self {
        self.default_cache_ttl = ttl;
        self
    }

    pub fn enable_conditional_requests(mut self, enable: bool) -> Self {
        self.enable_conditional_requests = enable;
        self
    }

    pub fn enable_metrics(mut self, enable: bool) -> Self {
        self.enable_metrics = enable;
        self
    }

    pub fn validate_status(
        mut self,
        validate_status: Arc<dyn Fn(u16) -> bool + Send + Sync>,
    ) -> Self {
        self.validate_status = validate_status;
        self
    }

    /// Validates and finalizes the configuration.
    pub fn build(self) -> Result<OrchestratorConfig, reqcore::RequestError> {
        if self.max_retries > 100 {
            return Err(reqcore::RequestError::Config {
                message: "max_retries unreasonably large (>100)".to_string(),
            });
        }
        Ok(OrchestratorConfig {
            adapter: self.adapter,
            base_url: self.base_url,
            default_headers: self.default_headers,
            concurrent_requests: self.concurrent_requests,
            timeout: self.timeout,
            max_retries: self.max_retries,
            retry_delay: self.retry_delay,
            retry_delay_jitter: self.retry_delay_jitter,
            enable_cache: self.enable_cache,
            default_cache_ttl: self.default_cache_ttl,
            enable_conditional_requests: self.enable_conditional_requests,
            enable_metrics: self.enable_metrics,
            validate_status: self.validate_status,
        })
    }
}
