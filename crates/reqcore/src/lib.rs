//! Core infrastructure shared by every request-orchestrator crate.
//!
//! - [`error`] — the closed `RequestError` taxonomy every subsystem reports through.
//! - [`events`] — a lightweight fire-and-forget listener broadcast, for internal
//!   component notifications that don't need the full typed event bus in
//!   `reqevents`.
//! - [`metrics`] — an always-on atomic counter/gauge collector, optionally mirrored
//!   into the `metrics` crate's global recorder.

pub mod error;
pub mod events;
pub mod metrics;

pub use error::{AbortedBy, RequestError};
pub use events::{EventListener, EventListeners, FnListener};
pub use metrics::{MetricsCollector, MetricsSnapshot};
