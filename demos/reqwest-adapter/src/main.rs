//! A minimal consumer wiring [`reqorchestrator`] to a real transport.
//!
//! Shows the shape an [`Adapter`] implementation takes outside the
//! in-memory test double shipped with the orchestrator crate: translate
//! [`Request`] into a `reqwest::Request`, race the send against the
//! supplied cancellation token, and translate the result (or transport
//! failure) back into [`RawResponse`]/[`AdapterError`].

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqorchestrator::{
    Adapter, AdapterError, OrchestratorConfig, RawResponse, Request, RequestInit,
};
use tokio_util::sync::CancellationToken;

struct ReqwestAdapter {
    client: reqwest::Client,
}

impl ReqwestAdapter {
    fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl Adapter for ReqwestAdapter {
    async fn send(
        &self,
        request: &Request,
        cancel: CancellationToken,
    ) -> Result<RawResponse, AdapterError> {
        let method = reqwest::Method::from_bytes(request.method.as_bytes())
            .map_err(|e| AdapterError::SendFailed { message: e.to_string() })?;
        let mut builder = self.client.request(method, &request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        let send = async {
            let response = builder
                .send()
                .await
                .map_err(|e| AdapterError::Network { message: e.to_string(), source: Some(Box::new(e)) })?;
            let status = response.status().as_u16();
            let headers = response
                .headers()
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_str().unwrap_or_default().to_string()))
                .collect();
            let body = response
                .bytes()
                .await
                .map_err(|e| AdapterError::Network { message: e.to_string(), source: Some(Box::new(e)) })?
                .to_vec();
            Ok(RawResponse { status, headers, body })
        };

        tokio::select! {
            result = send => result,
            _ = cancel.cancelled() => Err(AdapterError::Canceled),
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let config = OrchestratorConfig::builder(Arc::new(ReqwestAdapter::new()))
        .base_url("https://httpbin.org")
        .timeout(Duration::from_secs(10))
        .max_retries(2)
        .build()?;
    let orchestrator = reqorchestrator::Orchestrator::new(config);

    orchestrator.on("response:success", |event| async move {
        tracing::info!(?event, "request succeeded");
        Ok(())
    });

    let response = orchestrator
        .request(RequestInit::new("GET", "https://httpbin.org/get"))
        .await?;
    println!("status: {}", response.status);

    orchestrator.destroy();
    Ok(())
}
