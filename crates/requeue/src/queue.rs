use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use reqcore::RequestError;
use tokio::sync::{oneshot, watch};
use tokio_util::sync::CancellationToken;

use crate::stats::QueueStats;

enum WaiterOutcome {
    Granted,
    Closed(String),
    Cleared,
}

struct Waiter {
    id: u64,
    notify: oneshot::Sender<WaiterOutcome>,
}

struct Inner {
    capacity: usize,
    active: usize,
    waiters: VecDeque<Waiter>,
    closed: Option<String>,
    next_id: u64,
}

/// A bounded, FIFO, cancellable admission queue.
///
/// Always held behind an `Arc` (`new` returns one directly) since permits and
/// waiters both need to hand work back to the queue independently of the
/// handle the original caller holds.
pub struct BoundedQueue {
    inner: Mutex<Inner>,
    stats_tx: watch::Sender<QueueStats>,
}

impl BoundedQueue {
    /// Creates a queue that admits at most `capacity` concurrent permits.
    pub fn new(capacity: usize) -> Arc<Self> {
        let (stats_tx, _rx) = watch::channel(QueueStats::new(capacity));
        Arc::new(Self {
            inner: Mutex::new(Inner {
                capacity,
                active: 0,
                waiters: VecDeque::new(),
                closed: None,
                next_id: 0,
            }),
            stats_tx,
        })
    }

    /// The current occupancy snapshot.
    pub fn stats(&self) -> QueueStats {
        *self.stats_tx.borrow()
    }

    /// Subscribes to occupancy changes. The subscriber immediately observes
    /// the current snapshot, then every subsequent change.
    pub fn subscribe(&self) -> watch::Receiver<QueueStats> {
        self.stats_tx.subscribe()
    }

    /// Attempts to acquire a permit without waiting. Returns `None` if the
    /// queue is at capacity or closed.
    pub fn try_acquire(self: &Arc<Self>) -> Option<QueuePermit> {
        let mut inner = self.inner.lock().unwrap();
        if inner.closed.is_some() || inner.active >= inner.capacity {
            return None;
        }
        inner.active += 1;
        drop(inner);
        self.publish_stats();
        Some(QueuePermit {
            queue: Arc::clone(self),
        })
    }

    /// Acquires a permit, waiting in FIFO order if the queue is at capacity.
    ///
    /// If `cancel` fires before a permit is granted, the waiter is removed
    /// from the line (without disturbing waiters behind it) and this
    /// resolves to `RequestError::AbortedWhileWaiting`.
    pub async fn acquire(
        self: &Arc<Self>,
        cancel: Option<CancellationToken>,
    ) -> Result<QueuePermit, RequestError> {
        if let Some(token) = &cancel {
            if token.is_cancelled() {
                return Err(RequestError::AbortedWhileWaiting);
            }
        }
        if let Some(permit) = self.try_acquire() {
            return Ok(permit);
        }

        let (tx, rx) = oneshot::channel();
        let id = {
            let mut inner = self.inner.lock().unwrap();
            if let Some(reason) = &inner.closed {
                return Err(RequestError::QueueClosed {
                    reason: reason.clone(),
                });
            }
            let id = inner.next_id;
            inner.next_id += 1;
            inner.waiters.push_back(Waiter { id, notify: tx });
            id
        };
        self.publish_stats();

        let outcome = match cancel {
            Some(token) => {
                tokio::select! {
                    res = rx => res.ok(),
                    _ = token.cancelled() => {
                        if !self.remove_waiter(id) {
                            // The waiter was already popped and handed a slot by a
                            // concurrent release() before cancellation was observed;
                            // hand that slot back to the next waiter in line.
                            self.release();
                        }
                        self.publish_stats();
                        #[cfg(feature = "tracing")]
                        tracing::debug!(waiter = id, "queue wait aborted by cancellation");
                        return Err(RequestError::AbortedWhileWaiting);
                    }
                }
            }
            None => rx.await.ok(),
        };

        self.publish_stats();
        match outcome {
            Some(WaiterOutcome::Granted) => Ok(QueuePermit {
                queue: Arc::clone(self),
            }),
            Some(WaiterOutcome::Closed(reason)) => Err(RequestError::QueueClosed { reason }),
            Some(WaiterOutcome::Cleared) => Err(RequestError::AbortedWhileWaiting),
            None => Err(RequestError::QueueClosed {
                reason: "queue dropped".to_string(),
            }),
        }
    }

    /// Stops admitting new acquires. Already-active permits are unaffected;
    /// every currently queued waiter is rejected with `QueueClosed`.
    pub fn close(&self, reason: impl Into<String>) {
        let reason = reason.into();
        let mut inner = self.inner.lock().unwrap();
        inner.closed = Some(reason.clone());
        let waiters = std::mem::take(&mut inner.waiters);
        drop(inner);
        for waiter in waiters {
            let _ = waiter.notify.send(WaiterOutcome::Closed(reason.clone()));
        }
        self.publish_stats();
    }

    /// Rejects every currently queued waiter with `AbortedWhileWaiting`
    /// without closing the queue to further acquires.
    pub fn clear(&self) {
        let mut inner = self.inner.lock().unwrap();
        let waiters = std::mem::take(&mut inner.waiters);
        drop(inner);
        for waiter in waiters {
            let _ = waiter.notify.send(WaiterOutcome::Cleared);
        }
        self.publish_stats();
    }

    fn remove_waiter(&self, id: u64) -> bool {
        let mut inner = self.inner.lock().unwrap();
        let before = inner.waiters.len();
        inner.waiters.retain(|w| w.id != id);
        inner.waiters.len() != before
    }

    /// Releases one held permit, transferring it directly to the next
    /// waiter in line if one exists, or decrementing `active` otherwise.
    fn release(&self) {
        loop {
            let mut inner = self.inner.lock().unwrap();
            match inner.waiters.pop_front() {
                Some(waiter) => {
                    drop(inner);
                    if waiter.notify.send(WaiterOutcome::Granted).is_ok() {
                        break;
                    }
                    // Receiver already gone (canceled): slot wasn't consumed,
                    // try the next waiter in line instead.
                }
                None => {
                    inner.active -= 1;
                    break;
                }
            }
        }
        self.publish_stats();
    }

    fn publish_stats(&self) {
        let inner = self.inner.lock().unwrap();
        let stats = QueueStats {
            active: inner.active,
            pending: inner.waiters.len(),
            capacity: inner.capacity,
            is_closed: inner.closed.is_some(),
        };
        drop(inner);
        let _ = self.stats_tx.send(stats);
    }
}

/// A held queue slot. Releases the slot (handing it to the next waiter, if
/// any) when dropped.
pub struct QueuePermit {
    queue: Arc<BoundedQueue>,
}

impl Drop for QueuePermit {
    fn drop(&mut self) {
        self.queue.release();
    }
}
