//! The pluggable transport contract.

mod memory;

pub use memory::{MemoryAdapter, ScriptedResponse};

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::types::{RawResponse, Request};

/// A transport-level failure, distinct from an HTTP status the caller's
/// `validate_status` rejects.
#[derive(Debug, thiserror::Error)]
pub enum AdapterError {
    /// The exchange was aborted via the passed-in `cancel` token. Adapters
    /// must raise this specific variant rather than a generic network error
    /// so the orchestrator can tell cancellation apart from a real
    /// transport failure.
    #[error("adapter send canceled")]
    Canceled,

    /// DNS/connect/TLS/read/write failure before a status line was
    /// available.
    #[error("network error: {message}")]
    Network {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The adapter could not even attempt to send (e.g. it refused to
    /// serialize the request).
    #[error("send failed: {message}")]
    SendFailed { message: String },
}

/// A pluggable transport executing one HTTP attempt.
///
/// Implementations must honor `cancel` using whatever mechanism their
/// underlying transport offers, and must distinguish a cancellation from a
/// network failure by raising [`AdapterError::Canceled`] specifically.
/// Implementations must not mutate `request`.
#[async_trait]
pub trait Adapter: Send + Sync {
    /// Executes one HTTP attempt.
    async fn send(
        &self,
        request: &Request,
        cancel: CancellationToken,
    ) -> Result<RawResponse, AdapterError>;
}
