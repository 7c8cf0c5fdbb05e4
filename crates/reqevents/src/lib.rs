//! A typed, pattern-matching event bus with a middleware chain.
//!
//! This generalizes `reqcore::events::EventListeners`'s single-topic
//! broadcast into three dispatch shapes (exact name, any of several names,
//! `prefix:*` pattern), ordered subscriber priority, and a middleware chain
//! that can inspect or block an event before subscribers see it — while
//! keeping the same guarantee that one misbehaving subscriber cannot take
//! down its siblings.
//!
//! ```
//! use reqevents::{EventBus, NamedEvent};
//!
//! #[derive(Clone)]
//! struct Ping;
//!
//! impl NamedEvent for Ping {
//!     fn event_name(&self) -> &str {
//!         "ping"
//!     }
//! }
//!
//! # async fn example() {
//! let bus: EventBus<Ping> = EventBus::new();
//! bus.on("ping", |_event| async { Ok(()) });
//! bus.emit_async(Ping).await;
//! # }
//! ```

mod bus;
mod middleware;
mod pattern;

pub use bus::{EventBus, SubscriptionId};
pub use middleware::{EventContext, HandlerResult, Middleware, Next};

/// Implemented by every event type a bus can carry, so the bus can match it
/// against exact/any/pattern subscriptions without knowing its shape.
pub trait NamedEvent: Send + Sync {
    /// The dot/colon-separated topic name this event is published under
    /// (e.g. `"request:start"`, `"cache:hit"`).
    fn event_name(&self) -> &str;
}
