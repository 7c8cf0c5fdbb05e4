//! Pluggable backoff interval strategies.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Computes the delay before a given retry attempt.
///
/// `attempt` is 1-based: `next_interval(1)` is the delay before the first
/// retry (i.e. after the first failed attempt).
pub trait IntervalFunction: Send + Sync {
    /// Returns the delay to wait before `attempt`.
    fn next_interval(&self, attempt: u32) -> Duration;
}

/// Always waits the same duration.
#[derive(Debug, Clone, Copy)]
pub struct FixedInterval {
    interval: Duration,
}

impl FixedInterval {
    /// Creates a fixed-interval strategy.
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }
}

impl IntervalFunction for FixedInterval {
    fn next_interval(&self, _attempt: u32) -> Duration {
        self.interval
    }
}

/// `base * multiplier.powi(attempt - 1)`, capped at `max_interval`.
#[derive(Debug, Clone, Copy)]
pub struct ExponentialBackoff {
    base: Duration,
    multiplier: f64,
    max_interval: Duration,
}

impl ExponentialBackoff {
    /// Creates an exponential backoff starting at `base` with multiplier `2.0`
    /// and no cap (30 minutes, in practice an effectively unreachable
    /// ceiling for request retries).
    pub fn new(base: Duration) -> Self {
        Self {
            base,
            multiplier: 2.0,
            max_interval: Duration::from_secs(1800),
        }
    }

    /// Overrides the growth multiplier (default `2.0`).
    pub fn multiplier(mut self, multiplier: f64) -> Self {
        self.multiplier = multiplier;
        self
    }

    /// Caps the computed interval.
    pub fn max_interval(mut self, max_interval: Duration) -> Self {
        self.max_interval = max_interval;
        self
    }
}

impl IntervalFunction for ExponentialBackoff {
    fn next_interval(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1) as i32;
        let scaled = self.base.as_secs_f64() * self.multiplier.powi(exponent);
        Duration::from_secs_f64(scaled).min(self.max_interval)
    }
}

/// An [`ExponentialBackoff`] with added jitter: the computed interval is
/// randomized by up to `randomization_factor` in either direction
/// (`interval * (1 ± randomization_factor)`), spreading out retries from
/// many concurrently-failing requests so they don't all land on the same
/// instant.
pub struct ExponentialRandomBackoff {
    inner: ExponentialBackoff,
    randomization_factor: f64,
}

impl ExponentialRandomBackoff {
    /// Wraps `inner`, adding jitter of `randomization_factor` (clamped to
    /// `[0.0, 1.0]`).
    pub fn new(inner: ExponentialBackoff, randomization_factor: f64) -> Self {
        Self {
            inner,
            randomization_factor: randomization_factor.clamp(0.0, 1.0),
        }
    }
}

impl IntervalFunction for ExponentialRandomBackoff {
    fn next_interval(&self, attempt: u32) -> Duration {
        let base = self.inner.next_interval(attempt);
        if self.randomization_factor == 0.0 {
            return base;
        }
        let delta = rand::random::<f64>() * 2.0 * self.randomization_factor - self.randomization_factor;
        let scaled = base.as_secs_f64() * (1.0 + delta).max(0.0);
        Duration::from_secs_f64(scaled)
    }
}

/// Adapts a plain closure into an [`IntervalFunction`].
pub struct FnInterval<F>
where
    F: Fn(u32) -> Duration + Send + Sync,
{
    f: F,
}

impl<F> FnInterval<F>
where
    F: Fn(u32) -> Duration + Send + Sync,
{
    /// Wraps `f` as an [`IntervalFunction`].
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F> IntervalFunction for FnInterval<F>
where
    F: Fn(u32) -> Duration + Send + Sync,
{
    fn next_interval(&self, attempt: u32) -> Duration {
        (self.f)(attempt)
    }
}

/// An [`IntervalFunction`] that counts how many times it's been asked,
/// useful in tests that need to assert the exact sequence of delays an
/// orchestrator requested.
#[derive(Default)]
pub struct CountingInterval {
    calls: AtomicU64,
}

impl CountingInterval {
    /// The number of times `next_interval` has been called so far.
    pub fn call_count(&self) -> u64 {
        self.calls.load(Ordering::SeqCst)
    }
}

impl IntervalFunction for CountingInterval {
    fn next_interval(&self, _attempt: u32) -> Duration {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Duration::ZERO
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_interval_never_changes() {
        let backoff = FixedInterval::new(Duration::from_millis(50));
        assert_eq!(backoff.next_interval(1), Duration::from_millis(50));
        assert_eq!(backoff.next_interval(10), Duration::from_millis(50));
    }

    #[test]
    fn exponential_doubles_by_default() {
        let backoff = ExponentialBackoff::new(Duration::from_millis(100));
        assert_eq!(backoff.next_interval(1), Duration::from_millis(100));
        assert_eq!(backoff.next_interval(2), Duration::from_millis(200));
        assert_eq!(backoff.next_interval(3), Duration::from_millis(400));
    }

    #[test]
    fn exponential_respects_cap() {
        let backoff =
            ExponentialBackoff::new(Duration::from_millis(100)).max_interval(Duration::from_millis(150));
        assert_eq!(backoff.next_interval(3), Duration::from_millis(150));
    }

    #[test]
    fn random_backoff_stays_within_jitter_bounds() {
        let base = ExponentialBackoff::new(Duration::from_millis(100));
        let jittered = ExponentialRandomBackoff::new(base, 0.3);
        for attempt in 1..=4 {
            let lower = (base.next_interval(attempt).as_secs_f64() * 0.7).max(0.0);
            let upper = base.next_interval(attempt).as_secs_f64() * 1.3;
            let got = jittered.next_interval(attempt).as_secs_f64();
            assert!(got >= lower - 0.0001 && got <= upper + 0.0001, "got {got}, expected [{lower},{upper}]");
        }
    }

    #[test]
    fn fn_interval_delegates_to_closure() {
        let backoff = FnInterval::new(|attempt| Duration::from_millis(attempt as u64 * 10));
        assert_eq!(backoff.next_interval(3), Duration::from_millis(30));
    }
}
