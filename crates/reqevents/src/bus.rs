//! The event bus itself: subscriber registration, priority/pattern
//! dispatch, and the two emit modes.

use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use crate::middleware::{EventContext, HandlerResult, Middleware, Next};
use crate::pattern::Pattern;
use crate::NamedEvent;

type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// An async subscriber callback.
pub type AsyncHandler<E> = Arc<dyn Fn(Arc<E>) -> BoxFuture<'static, HandlerResult> + Send + Sync>;

/// Opaque handle returned by every subscribe call, used to unsubscribe
/// later via [`EventBus::off`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

struct Subscriber<E> {
    id: SubscriptionId,
    pattern: Pattern,
    priority: i32,
    once: bool,
    handler: AsyncHandler<E>,
}

struct Inner<E> {
    subscribers: Vec<Subscriber<E>>,
    next_id: u64,
    global_middleware: Vec<Arc<dyn Middleware<E>>>,
    pattern_middleware: Vec<(Pattern, Arc<dyn Middleware<E>>)>,
}

impl<E> Default for Inner<E> {
    fn default() -> Self {
        Self {
            subscribers: Vec::new(),
            next_id: 0,
            global_middleware: Vec::new(),
            pattern_middleware: Vec::new(),
        }
    }
}

/// A typed event bus. `E` is the event payload type carried by every
/// publication on this bus; applications that need several unrelated event
/// families typically enumerate them as variants of one `E`, or run
/// separate `EventBus` instances.
pub struct EventBus<E> {
    inner: Mutex<Inner<E>>,
}

impl<E> Default for EventBus<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> EventBus<E>
where
    E: NamedEvent + 'static,
{
    /// Creates an empty bus.
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
        }
    }

    /// Subscribes `handler` to events whose name matches `pattern`
    /// (`"request:start"` for an exact name, `"cache:*"` for a namespace,
    /// `"*"` for everything), at the default priority of `0`.
    pub fn on<F, Fut>(&self, pattern: &str, handler: F) -> SubscriptionId
    where
        F: Fn(Arc<E>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        self.on_with(pattern, 0, handler)
    }

    /// Like [`EventBus::on`] but with an explicit priority. Higher
    /// priorities run first; subscribers at equal priority run in
    /// registration order.
    pub fn on_with<F, Fut>(&self, pattern: &str, priority: i32, handler: F) -> SubscriptionId
    where
        F: Fn(Arc<E>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        self.register(Pattern::compile(pattern), priority, false, handler)
    }

    /// Subscribes a handler that automatically unsubscribes itself after
    /// its first matching dispatch.
    pub fn once<F, Fut>(&self, pattern: &str, handler: F) -> SubscriptionId
    where
        F: Fn(Arc<E>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        self.register(Pattern::compile(pattern), 0, true, handler)
    }

    fn register<F, Fut>(
        &self,
        pattern: Pattern,
        priority: i32,
        once: bool,
        handler: F,
    ) -> SubscriptionId
    where
        F: Fn(Arc<E>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        let wrapped: AsyncHandler<E> = Arc::new(move |event| Box::pin(handler(event)));
        let mut inner = self.inner.lock().expect("event bus mutex poisoned");
        let id = SubscriptionId(inner.next_id);
        inner.next_id += 1;
        inner.subscribers.push(Subscriber {
            id,
            pattern,
            priority,
            once,
            handler: wrapped,
        });
        inner
            .subscribers
            .sort_by(|a, b| b.priority.cmp(&a.priority));
        id
    }

    /// Removes a subscriber by the id returned from its subscribe call.
    /// A no-op if the subscriber already fired as a `once` handler or was
    /// already removed.
    pub fn off(&self, id: SubscriptionId) {
        let mut inner = self.inner.lock().expect("event bus mutex poisoned");
        inner.subscribers.retain(|s| s.id != id);
    }

    /// Registers middleware that runs on every emitted event, before any
    /// subscriber.
    pub fn use_middleware<M>(&self, middleware: M)
    where
        M: Middleware<E> + 'static,
    {
        let mut inner = self.inner.lock().expect("event bus mutex poisoned");
        inner.global_middleware.push(Arc::new(middleware));
    }

    /// Registers middleware that only runs for events matching `pattern`.
    pub fn use_pattern_middleware<M>(&self, pattern: &str, middleware: M)
    where
        M: Middleware<E> + 'static,
    {
        let mut inner = self.inner.lock().expect("event bus mutex poisoned");
        inner
            .pattern_middleware
            .push((Pattern::compile(pattern), Arc::new(middleware)));
    }

    /// Dispatches `event` without waiting for subscribers. A handler whose
    /// future resolves without ever yielding runs synchronously, in place —
    /// observable by a sync spy before the caller next awaits a microtask.
    /// A handler that actually suspends (a real `.await` on I/O, a timer,
    /// …) is handed off to the Tokio runtime instead, so `emit` never
    /// blocks waiting for it. This does not guarantee handlers have run, or
    /// run in any particular relative order, by the time `emit` returns —
    /// use [`EventBus::emit_async`] when that matters.
    pub fn emit(&self, event: E)
    where
        E: Send + Sync,
    {
        let event = Arc::new(event);
        if let Some(handlers) = self.matching_handlers(&event) {
            for handler in handlers {
                dispatch_or_spawn(Arc::clone(&event), handler);
            }
        }
    }

    /// Dispatches `event` and awaits every matching handler before
    /// returning. Handler errors are logged and isolated; one failing
    /// handler does not prevent the others from running.
    pub async fn emit_async(&self, event: E)
    where
        E: Send + Sync,
    {
        let event = Arc::new(event);
        let Some(handlers) = self.matching_handlers(&event) else {
            return;
        };
        let futures = handlers.into_iter().map(|handler| {
            let event = Arc::clone(&event);
            async move {
                if let Err(error) = handler(event).await {
                    log_handler_error(error.as_ref());
                }
            }
        });
        futures::future::join_all(futures).await;
    }

    /// Runs the global middleware chain for `event`, then the handlers that
    /// should fire, in spec.md §4.3 point 3's order: exact/any-handlers
    /// first, then (gated by the pattern-middleware chain, which wraps only
    /// this group) the namespace-pattern handlers. Removes any `once`
    /// subscriber that actually dispatched. Returns `None` if the global
    /// chain blocked the event — in that case nothing ran, pattern
    /// handlers included.
    fn matching_handlers(&self, event: &Arc<E>) -> Option<Vec<AsyncHandler<E>>> {
        let name = event.event_name().to_string();
        let mut inner = self.inner.lock().expect("event bus mutex poisoned");

        let mut global_ctx = EventContext {
            event: event.as_ref(),
            blocked: false,
        };
        Next::new(&inner.global_middleware).proceed(&mut global_ctx);
        if global_ctx.blocked {
            return None;
        }

        // `Prefix` subscriptions ("ns:*") are the spec's "pattern" kind,
        // wrapped by pattern middleware; `Exact`/`Wildcard`("*")/`AnyOf`
        // subscriptions are the "exact"/"any" kinds and dispatch directly.
        let mut direct = Vec::new();
        let mut direct_once = Vec::new();
        let mut patterned = Vec::new();
        let mut patterned_once = Vec::new();
        for subscriber in &inner.subscribers {
            if !subscriber.pattern.matches(&name) {
                continue;
            }
            if matches!(subscriber.pattern, Pattern::Prefix(_)) {
                patterned.push(Arc::clone(&subscriber.handler));
                if subscriber.once {
                    patterned_once.push(subscriber.id);
                }
            } else {
                direct.push(Arc::clone(&subscriber.handler));
                if subscriber.once {
                    direct_once.push(subscriber.id);
                }
            }
        }
        if !direct_once.is_empty() {
            inner.subscribers.retain(|s| !direct_once.contains(&s.id));
        }

        let pattern_chain: Vec<Arc<dyn Middleware<E>>> = inner
            .pattern_middleware
            .iter()
            .filter(|(pattern, _)| pattern.matches(&name))
            .map(|(_, middleware)| Arc::clone(middleware))
            .collect();
        let mut pattern_ctx = EventContext {
            event: event.as_ref(),
            blocked: false,
        };
        Next::new(&pattern_chain).proceed(&mut pattern_ctx);

        let mut handlers = direct;
        if !pattern_ctx.blocked {
            if !patterned_once.is_empty() {
                inner.subscribers.retain(|s| !patterned_once.contains(&s.id));
            }
            handlers.extend(patterned);
        }
        Some(handlers)
    }
}

/// Polls `handler(event)` once. A future that resolves on the first poll
/// (no real suspension) runs to completion inline; one that's still
/// pending is handed to the runtime to finish on its own.
fn dispatch_or_spawn<E>(event: Arc<E>, handler: AsyncHandler<E>)
where
    E: Send + Sync + 'static,
{
    use std::task::Poll;

    let mut fut = handler(event);
    let waker = futures::task::noop_waker();
    let mut cx = std::task::Context::from_waker(&waker);
    match fut.as_mut().poll(&mut cx) {
        Poll::Ready(result) => {
            if let Err(error) = result {
                log_handler_error(error.as_ref());
            }
        }
        Poll::Pending => {
            tokio::spawn(async move {
                if let Err(error) = fut.await {
                    log_handler_error(error.as_ref());
                }
            });
        }
    }
}

fn log_handler_error(error: &(dyn std::error::Error + Send + Sync)) {
    #[cfg(feature = "tracing")]
    tracing::warn!(%error, "event bus handler returned an error");
    #[cfg(not(feature = "tracing"))]
    let _ = error;
}
