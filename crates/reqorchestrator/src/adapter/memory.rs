//! A scriptable in-memory adapter used throughout this workspace's own test
//! suite, and a reasonable starting point for tests in consumers too small
//! to want a real transport.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use super::{Adapter, AdapterError};
use crate::types::{RawResponse, Request};

/// One scripted reply: either a response to return, an error to raise, or
/// a delay to sleep before replying (for exercising timeouts/cancellation).
pub enum ScriptedResponse {
    Reply(RawResponse),
    Fail(AdapterError),
    /// Sleeps `delay`, honoring cancellation, then replies with `then`.
    Delay {
        delay: Duration,
        then: Box<ScriptedResponse>,
    },
}

impl ScriptedResponse {
    /// A convenience constructor for a plain successful reply.
    pub fn ok(status: u16, body: impl Into<Vec<u8>>) -> Self {
        ScriptedResponse::Reply(RawResponse {
            status,
            headers: Vec::new(),
            body: body.into(),
        })
    }

    /// A convenience constructor for a reply carrying headers.
    pub fn ok_with_headers(
        status: u16,
        headers: Vec<(String, String)>,
        body: impl Into<Vec<u8>>,
    ) -> Self {
        ScriptedResponse::Reply(RawResponse {
            status,
            headers,
            body: body.into(),
        })
    }
}

/// An [`Adapter`] that replays a pre-programmed queue of responses per URL,
/// falling back to a default 200 empty body if the queue for a URL is
/// empty. Every call is recorded for later assertions.
#[derive(Default)]
pub struct MemoryAdapter {
    scripts: Mutex<std::collections::HashMap<String, VecDeque<ScriptedResponse>>>,
    calls: Mutex<Vec<Request>>,
}

impl MemoryAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues one scripted reply for the next call against `url`.
    pub fn push(&self, url: impl Into<String>, response: ScriptedResponse) {
        self.scripts
            .lock()
            .unwrap()
            .entry(url.into())
            .or_default()
            .push_back(response);
    }

    /// The requests this adapter has seen so far, in call order.
    pub fn calls(&self) -> Vec<Request> {
        self.calls.lock().unwrap().clone()
    }

    fn next_for(&self, url: &str) -> ScriptedResponse {
        let mut scripts = self.scripts.lock().unwrap();
        scripts
            .get_mut(url)
            .and_then(|queue| queue.pop_front())
            .unwrap_or_else(|| ScriptedResponse::ok(200, Vec::new()))
    }
}

#[async_trait]
impl Adapter for MemoryAdapter {
    async fn send(
        &self,
        request: &Request,
        cancel: CancellationToken,
    ) -> Result<RawResponse, AdapterError> {
        self.calls.lock().unwrap().push(request.clone());
        let mut script = self.next_for(&request.url);
        loop {
            match script {
                ScriptedResponse::Reply(response) => return Ok(response),
                ScriptedResponse::Fail(error) => return Err(error),
                ScriptedResponse::Delay { delay, then } => {
                    tokio::select! {
                        _ = tokio::time::sleep(delay) => {
                            script = *then;
                        }
                        _ = cancel.cancelled() => return Err(AdapterError::Canceled),
                    }
                }
            }
        }
    }
}
