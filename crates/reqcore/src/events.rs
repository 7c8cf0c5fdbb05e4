//! A small fire-and-forget listener broadcast.
//!
//! This is the internal notification primitive components reach for when they
//! need to tell observers "something happened" without the ordering,
//! middleware, and pattern-matching machinery the typed event bus in
//! `reqevents` provides. The bounded queue's stats stream and other
//! component-local signals use this directly.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

/// Trait for listening to a single event type.
pub trait EventListener<E>: Send + Sync {
    /// Called when an event occurs.
    fn on_event(&self, event: &E);
}

/// Type alias for a boxed event listener.
pub type BoxedEventListener<E> = Arc<dyn EventListener<E>>;

/// A collection of listeners for one event type, with panic isolation: a
/// listener that panics does not stop its siblings from being notified, and
/// does not propagate into the emitter.
#[derive(Clone)]
pub struct EventListeners<E> {
    listeners: Vec<BoxedEventListener<E>>,
}

impl<E> Default for EventListeners<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> EventListeners<E> {
    /// Creates a new empty listener collection.
    pub fn new() -> Self {
        Self {
            listeners: Vec::new(),
        }
    }

    /// Registers a listener.
    pub fn add(&mut self, listener: BoxedEventListener<E>) {
        self.listeners.push(listener);
    }

    /// True if no listeners are registered.
    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// The number of registered listeners.
    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    /// Notifies every listener. A listener that panics is caught, logged (if
    /// the `tracing` feature is enabled), and otherwise ignored.
    pub fn emit(&self, event: &E) {
        for listener in &self.listeners {
            let result = panic::catch_unwind(AssertUnwindSafe(|| listener.on_event(event)));
            if result.is_err() {
                log_listener_panic();
            }
        }
    }
}

#[cfg(feature = "tracing")]
fn log_listener_panic() {
    tracing::warn!("event listener panicked; continuing with remaining listeners");
}

#[cfg(not(feature = "tracing"))]
fn log_listener_panic() {}

/// Adapts a plain closure into an [`EventListener`].
pub struct FnListener<E, F>
where
    F: Fn(&E) + Send + Sync,
{
    f: F,
    _marker: std::marker::PhantomData<fn(&E)>,
}

impl<E, F> FnListener<E, F>
where
    F: Fn(&E) + Send + Sync,
{
    /// Wraps `f` as an [`EventListener`].
    pub fn new(f: F) -> Self {
        Self {
            f,
            _marker: std::marker::PhantomData,
        }
    }
}

impl<E, F> EventListener<E> for FnListener<E, F>
where
    F: Fn(&E) + Send + Sync,
{
    fn on_event(&self, event: &E) {
        (self.f)(event)
    }
}
