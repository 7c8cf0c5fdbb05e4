//! A retry policy: how many attempts, how long to wait between them, and
//! which errors are worth retrying at all.

use crate::backoff::IntervalFunction;
use std::sync::Arc;
use std::time::Duration;

/// Decides whether a given error is worth retrying.
pub type RetryPredicate<E> = Arc<dyn Fn(&E) -> bool + Send + Sync>;

/// A complete retry policy: an attempt budget, a backoff strategy, and an
/// optional predicate restricting which errors get retried at all (absent a
/// predicate, every error is considered retryable).
pub struct RetryPolicy<E> {
    max_attempts: u32,
    interval_fn: Arc<dyn IntervalFunction>,
    retry_predicate: Option<RetryPredicate<E>>,
}

impl<E> RetryPolicy<E> {
    /// Creates a policy allowing up to `max_attempts` total attempts (so
    /// `max_attempts - 1` retries) using `interval_fn` for backoff.
    pub fn new(max_attempts: u32, interval_fn: Arc<dyn IntervalFunction>) -> Self {
        Self {
            max_attempts,
            interval_fn,
            retry_predicate: None,
        }
    }

    /// Restricts retrying to errors for which `predicate` returns true.
    pub fn with_retry_predicate(mut self, predicate: RetryPredicate<E>) -> Self {
        self.retry_predicate = Some(predicate);
        self
    }

    /// Whether `error`, having just failed on `attempt` (1-based), should be
    /// retried.
    pub fn should_retry(&self, attempt: u32, error: &E) -> bool {
        if attempt >= self.max_attempts {
            return false;
        }
        match &self.retry_predicate {
            Some(predicate) => predicate(error),
            None => true,
        }
    }

    /// The delay to wait before retrying after `attempt`.
    pub fn next_backoff(&self, attempt: u32) -> Duration {
        self.interval_fn.next_interval(attempt)
    }

    /// The maximum number of attempts this policy allows.
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }
}
