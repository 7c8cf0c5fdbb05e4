//! An always-on metrics collector, optionally mirrored into the `metrics` crate.
//!
//! Every counter is monotonic between [`MetricsCollector::reset`] calls; every
//! gauge is clamped so it never reports below zero, even under the
//! concurrent increment/decrement races that request completion and queue
//! admission produce.

use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};

#[cfg(feature = "metrics")]
use std::sync::Once;

#[cfg(feature = "metrics")]
static METRICS_INIT: Once = Once::new();

/// A point-in-time read of every counter and gauge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub requests_total: u64,
    pub requests_active: i64,
    pub requests_success: u64,
    pub requests_error: u64,
    pub requests_timeout: u64,
    pub requests_retry: u64,
    pub cache_hit: u64,
    pub cache_miss: u64,
    pub cache_stale: u64,
    pub cache_size: i64,
    pub queue_length: i64,
    pub queue_active: i64,
    pub queue_pending: i64,
}

#[derive(Default)]
struct Gauge(AtomicI64);

impl Gauge {
    fn inc(&self) {
        self.0.fetch_add(1, Ordering::Relaxed);
    }

    fn dec(&self) {
        // Clamp at zero: a gauge must never report a negative value even if
        // a dec() races ahead of its matching inc() under concurrent access.
        let _ = self
            .0
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |v| {
                Some((v - 1).max(0))
            });
    }

    fn set(&self, v: i64) {
        self.0.store(v.max(0), Ordering::Relaxed);
    }

    fn get(&self) -> i64 {
        self.0.load(Ordering::Relaxed)
    }
}

/// Atomic request/cache/queue counters, cheap to clone-share via `Arc`.
#[derive(Default)]
pub struct MetricsCollector {
    requests_total: AtomicU64,
    requests_active: Gauge,
    requests_success: AtomicU64,
    requests_error: AtomicU64,
    requests_timeout: AtomicU64,
    requests_retry: AtomicU64,
    cache_hit: AtomicU64,
    cache_miss: AtomicU64,
    cache_stale: AtomicU64,
    cache_size: Gauge,
    queue_length: Gauge,
    queue_active: Gauge,
    queue_pending: Gauge,
}

macro_rules! counter_methods {
    ($($incr:ident => $field:ident),+ $(,)?) => {
        $(
            /// Increments this counter by one.
            pub fn $incr(&self) {
                self.$field.fetch_add(1, Ordering::Relaxed);
                #[cfg(feature = "metrics")]
                ::metrics::counter!(stringify!($field)).increment(1);
            }
        )+
    };
}

impl MetricsCollector {
    /// Creates a new, zeroed collector.
    pub fn new() -> Self {
        #[cfg(feature = "metrics")]
        Self::describe_once();
        Self::default()
    }

    #[cfg(feature = "metrics")]
    fn describe_once() {
        METRICS_INIT.call_once(|| {
            ::metrics::describe_counter!("requests_total", "Total requests admitted");
            ::metrics::describe_gauge!("requests_active", "Requests currently in flight");
            ::metrics::describe_counter!("requests_success", "Requests that reached success");
            ::metrics::describe_counter!("requests_error", "Requests that reached a terminal error");
            ::metrics::describe_counter!("requests_timeout", "Requests that timed out");
            ::metrics::describe_counter!("requests_retry", "Retry attempts issued");
            ::metrics::describe_counter!("cache_hit", "Cache hits");
            ::metrics::describe_counter!("cache_miss", "Cache misses");
            ::metrics::describe_counter!("cache_stale", "Stale-while-revalidate serves");
            ::metrics::describe_gauge!("cache_size", "Current cache entry count");
            ::metrics::describe_gauge!("queue_length", "Total queued + active requests");
            ::metrics::describe_gauge!("queue_active", "Requests currently holding a queue slot");
            ::metrics::describe_gauge!("queue_pending", "Requests waiting for a queue slot");
        });
    }

    counter_methods! {
        record_request => requests_total,
        record_success => requests_success,
        record_error => requests_error,
        record_timeout => requests_timeout,
        record_retry => requests_retry,
        record_cache_hit => cache_hit,
        record_cache_miss => cache_miss,
        record_cache_stale => cache_stale,
    }

    /// Marks a request as now in flight.
    pub fn request_started(&self) {
        self.requests_active.inc();
        #[cfg(feature = "metrics")]
        ::metrics::gauge!("requests_active").increment(1.0);
    }

    /// Marks an in-flight request as having reached a terminal state.
    pub fn request_finished(&self) {
        self.requests_active.dec();
        #[cfg(feature = "metrics")]
        ::metrics::gauge!("requests_active").decrement(1.0);
    }

    /// Sets the current cache entry count.
    pub fn set_cache_size(&self, size: usize) {
        self.cache_size.set(size as i64);
        #[cfg(feature = "metrics")]
        ::metrics::gauge!("cache_size").set(size as f64);
    }

    /// Sets the current queue gauges (length = active + pending).
    pub fn set_queue_gauges(&self, active: usize, pending: usize) {
        self.queue_active.set(active as i64);
        self.queue_pending.set(pending as i64);
        self.queue_length.set((active + pending) as i64);
        #[cfg(feature = "metrics")]
        {
            ::metrics::gauge!("queue_active").set(active as f64);
            ::metrics::gauge!("queue_pending").set(pending as f64);
            ::metrics::gauge!("queue_length").set((active + pending) as f64);
        }
    }

    /// Returns an owned point-in-time snapshot of every counter and gauge.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            requests_total: self.requests_total.load(Ordering::Relaxed),
            requests_active: self.requests_active.get(),
            requests_success: self.requests_success.load(Ordering::Relaxed),
            requests_error: self.requests_error.load(Ordering::Relaxed),
            requests_timeout: self.requests_timeout.load(Ordering::Relaxed),
            requests_retry: self.requests_retry.load(Ordering::Relaxed),
            cache_hit: self.cache_hit.load(Ordering::Relaxed),
            cache_miss: self.cache_miss.load(Ordering::Relaxed),
            cache_stale: self.cache_stale.load(Ordering::Relaxed),
            cache_size: self.cache_size.get(),
            queue_length: self.queue_length.get(),
            queue_active: self.queue_active.get(),
            queue_pending: self.queue_pending.get(),
        }
    }

    /// Zeroes every monotonic counter. Gauges (which reflect current state
    /// rather than accumulated history) are left untouched.
    pub fn reset(&self) {
        self.requests_total.store(0, Ordering::Relaxed);
        self.requests_success.store(0, Ordering::Relaxed);
        self.requests_error.store(0, Ordering::Relaxed);
        self.requests_timeout.store(0, Ordering::Relaxed);
        self.requests_retry.store(0, Ordering::Relaxed);
        self.cache_hit.store(0, Ordering::Relaxed);
        self.cache_miss.store(0, Ordering::Relaxed);
        self.cache_stale.store(0, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_requests() {
        let m = MetricsCollector::new();
        m.record_request();
        m.request_started();
        m.record_success();
        m.request_finished();
        let snap = m.snapshot();
        assert_eq!(snap.requests_total, 1);
        assert_eq!(snap.requests_success, 1);
        assert_eq!(snap.requests_active, 0);
    }

    #[test]
    fn gauge_never_goes_negative() {
        let m = MetricsCollector::new();
        m.request_finished();
        m.request_finished();
        assert_eq!(m.snapshot().requests_active, 0);
    }

    #[test]
    fn reset_zeroes_counters_not_gauges() {
        let m = MetricsCollector::new();
        m.record_request();
        m.request_started();
        m.reset();
        let snap = m.snapshot();
        assert_eq!(snap.requests_total, 0);
        assert_eq!(snap.requests_active, 1);
    }
}
