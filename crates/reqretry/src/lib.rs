//! Backoff intervals and a retry policy, factored out of the orchestrator so
//! the interval strategy can be swapped independently of its retry-classify
//! loop.
//!
//! ```
//! use reqretry::{ExponentialBackoff, IntervalFunction};
//! use std::time::Duration;
//!
//! let backoff = ExponentialBackoff::new(Duration::from_millis(100));
//! assert_eq!(backoff.next_interval(1), Duration::from_millis(100));
//! assert_eq!(backoff.next_interval(2), Duration::from_millis(200));
//! ```

mod backoff;
mod policy;

pub use backoff::{
    CountingInterval, ExponentialBackoff, ExponentialRandomBackoff, FixedInterval, FnInterval,
    IntervalFunction,
};
pub use policy::{RetryPolicy, RetryPredicate};
