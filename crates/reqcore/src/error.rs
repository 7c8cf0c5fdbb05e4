//! The request orchestrator's closed error taxonomy.
//!
//! Every terminal failure a request can reach is one of the variants below.
//! Unlike a generic middleware error wrapper, this type does not carry an
//! arbitrary application error type parameter: the orchestrator's surface is
//! HTTP-shaped, so the kinds of failure are closed and known up front.
//!
//! ```
//! use reqcore::RequestError;
//!
//! let err = RequestError::Timeout { after_ms: 30_000 };
//! assert!(err.is_timeout());
//! assert_eq!(err.to_string(), "request timed out after 30000ms");
//! ```

use std::fmt;

/// Identifies which of the composed cancellation sources fired first.
///
/// A request can be aborted by the caller's own signal, by the orchestrator's
/// timeout, or by `cancelAll`/`destroy`. Only the first source to fire is
/// latched; later sources are no-ops for attribution purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbortedBy {
    /// The caller's own cancellation signal (a passed-in token or a `cancel(id)` call).
    Caller,
    /// The orchestrator's own timeout for this request.
    Timeout,
    /// `cancelAll` or `destroy` tore down every in-flight request.
    Shutdown,
}

impl fmt::Display for AbortedBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AbortedBy::Caller => "caller",
            AbortedBy::Timeout => "timeout",
            AbortedBy::Shutdown => "shutdown",
        })
    }
}

/// A terminal request failure.
#[derive(Debug, thiserror::Error)]
pub enum RequestError {
    /// The request was canceled before it reached a terminal success.
    #[error("request canceled by {aborted_by}")]
    Canceled {
        /// Which composed signal latched first.
        aborted_by: AbortedBy,
    },

    /// The request's deadline elapsed before the adapter responded.
    #[error("request timed out after {after_ms}ms")]
    Timeout {
        /// The configured timeout that elapsed, in milliseconds.
        after_ms: u64,
    },

    /// The adapter could not complete the exchange at all (DNS, connect,
    /// TLS, read/write errors before a status line was available).
    #[error("network error: {message}")]
    NetworkError {
        /// A human-readable description of the transport failure.
        message: String,
        /// The adapter's underlying error, if it supplied one.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The adapter returned a response whose status failed `validate_status`.
    #[error("http {status}")]
    Http {
        /// The response status code.
        status: u16,
        /// The response body, if it was small enough to buffer.
        body: Option<Vec<u8>>,
    },

    /// The adapter accepted the request but failed to deliver it (e.g. a
    /// malformed request the adapter refused to serialize).
    #[error("failed to send request: {message}")]
    RequestSendFailed {
        /// A human-readable description of the send failure.
        message: String,
    },

    /// The request was never admitted because the bounded queue had already
    /// been closed.
    #[error("queue closed: {reason}")]
    QueueClosed {
        /// The reason the queue was closed with.
        reason: String,
    },

    /// The request was waiting for a queue slot when it was aborted.
    #[error("aborted while waiting for a queue slot")]
    AbortedWhileWaiting,

    /// A caller-supplied argument failed validation before any network
    /// activity was attempted.
    #[error("validation error: {message}")]
    Validation {
        /// A human-readable description of what failed validation.
        message: String,
    },

    /// The orchestrator itself was misconfigured.
    #[error("configuration error: {message}")]
    Config {
        /// A human-readable description of the configuration problem.
        message: String,
    },
}

impl RequestError {
    /// True if this is a [`RequestError::Canceled`] variant.
    pub fn is_canceled(&self) -> bool {
        matches!(self, RequestError::Canceled { .. })
    }

    /// True if this is a [`RequestError::Timeout`] variant.
    pub fn is_timeout(&self) -> bool {
        matches!(self, RequestError::Timeout { .. })
    }

    /// True if this is a [`RequestError::NetworkError`] variant.
    pub fn is_network_error(&self) -> bool {
        matches!(self, RequestError::NetworkError { .. })
    }

    /// The HTTP status code, if this is an [`RequestError::Http`] variant.
    pub fn status(&self) -> Option<u16> {
        match self {
            RequestError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Which signal aborted the request, if this is a [`RequestError::Canceled`] variant.
    pub fn aborted_by(&self) -> Option<AbortedBy> {
        match self {
            RequestError::Canceled { aborted_by } => Some(*aborted_by),
            _ => None,
        }
    }
}
