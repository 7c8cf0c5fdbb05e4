//! A bounded, FIFO, cancellable admission queue for the request orchestrator.
//!
//! Plain `tokio::sync::Semaphore` permits are fair enough for simple
//! concurrency limiting, but they can't express two things this crate needs:
//! a waiter that can be pulled out of line by its own cancellation signal
//! without poisoning the queue for everyone behind it, and a stats stream
//! that hands a fresh subscriber the *current* snapshot instead of only
//! future updates. [`BoundedQueue`] is a small hand-rolled waiter list behind
//! a mutex instead, paired with a `tokio::sync::watch` stats channel (whose
//! native "latest value on subscribe" behavior is exactly what's needed
//! here).
//!
//! ```
//! use requeue::BoundedQueue;
//!
//! # async fn example() {
//! let queue = BoundedQueue::new(2);
//! let permit = queue.acquire(None).await.unwrap();
//! assert_eq!(queue.stats().active, 1);
//! drop(permit);
//! # }
//! ```

mod queue;
mod stats;

pub use queue::{BoundedQueue, QueuePermit};
pub use stats::QueueStats;
