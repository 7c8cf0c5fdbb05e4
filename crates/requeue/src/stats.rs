//! Queue occupancy snapshot.

/// A point-in-time view of the queue's occupancy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueStats {
    /// Permits currently held.
    pub active: usize,
    /// Waiters currently queued for a permit.
    pub pending: usize,
    /// The queue's configured capacity.
    pub capacity: usize,
    /// Whether `close` has been called; no further acquires will be admitted.
    pub is_closed: bool,
}

impl QueueStats {
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            active: 0,
            pending: 0,
            capacity,
            is_closed: false,
        }
    }
}
