//! Metrics regression tests for `reqcore::MetricsCollector`.
//!
//! These tests pin down the metric names and kinds the collector mirrors
//! into the `metrics` crate. Renaming or re-typing one of these breaks
//! anyone's dashboards built against `reqorchestrator`, so we treat them as
//! part of the public API.

mod helpers {
    use metrics_util::debugging::{DebugValue, DebuggingRecorder};
    use std::sync::LazyLock;

    pub(crate) static RECORDER: LazyLock<DebuggingRecorder> = LazyLock::new(DebuggingRecorder::default);

    /// Installs the debugging recorder as the global recorder. Idempotent:
    /// later calls from other tests in this binary are no-ops.
    pub(crate) fn init_recorder() {
        let _ = metrics::set_global_recorder(&*RECORDER);
    }

    pub(crate) fn snapshot() -> Vec<(
        metrics_util::CompositeKey,
        Option<metrics::Unit>,
        Option<metrics::SharedString>,
        DebugValue,
    )> {
        RECORDER.snapshotter().snapshot().into_vec()
    }

    pub(crate) fn assert_counter_exists(name: &str) {
        let found = snapshot().iter().any(|(key, _, _, value)| {
            key.key().name() == name && matches!(value, DebugValue::Counter(_))
        });
        assert!(found, "expected counter '{name}' not found in metrics");
    }

    pub(crate) fn assert_gauge_exists(name: &str) {
        let found = snapshot()
            .iter()
            .any(|(key, _, _, value)| key.key().name() == name && matches!(value, DebugValue::Gauge(_)));
        assert!(found, "expected gauge '{name}' not found in metrics");
    }
}

use helpers::{assert_counter_exists, assert_gauge_exists, init_recorder};
use reqcore::MetricsCollector;

#[test]
fn request_lifecycle_counters_and_gauges_are_stable() {
    init_recorder();
    let metrics = MetricsCollector::new();

    metrics.record_request();
    metrics.request_started();
    metrics.record_success();
    metrics.request_finished();
    metrics.record_retry();
    metrics.record_timeout();
    metrics.record_error();

    assert_counter_exists("requests_total");
    assert_counter_exists("requests_success");
    assert_counter_exists("requests_error");
    assert_counter_exists("requests_timeout");
    assert_counter_exists("requests_retry");
    assert_gauge_exists("requests_active");
}

#[test]
fn cache_counters_and_size_gauge_are_stable() {
    init_recorder();
    let metrics = MetricsCollector::new();

    metrics.record_cache_hit();
    metrics.record_cache_miss();
    metrics.record_cache_stale();
    metrics.set_cache_size(42);

    assert_counter_exists("cache_hit");
    assert_counter_exists("cache_miss");
    assert_counter_exists("cache_stale");
    assert_gauge_exists("cache_size");
}

#[test]
fn queue_gauges_are_stable() {
    init_recorder();
    let metrics = MetricsCollector::new();

    metrics.set_queue_gauges(3, 5);

    assert_gauge_exists("queue_active");
    assert_gauge_exists("queue_pending");
    assert_gauge_exists("queue_length");
}
