//! Terminal transport backed by a platform [`HttpClient`].

use std::sync::Arc;

use async_trait::async_trait;
use nimbus_platform::{HttpClient, Method};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::Response;
use crate::context::Context;
use crate::error::{PipelineError, Result};
use crate::pipeline::Transport;
use crate::request::Request;

/// Settings for the native HTTP client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransportOptions {
    /// Overall per-request timeout in seconds (default: 120).
    pub timeout_secs: u64,
    /// Idle connection timeout in seconds (default: 90).
    pub pool_idle_timeout_secs: u64,
}

impl Default for TransportOptions {
    fn default() -> Self {
        Self {
            timeout_secs: 120,
            pool_idle_timeout_secs: 90,
        }
    }
}

/// Sends the request with an [`HttpClient`], racing the exchange against
/// the context deadline and cancellation.
pub struct HttpTransport {
    client: Arc<dyn HttpClient>,
}

impl HttpTransport {
    pub fn new(client: Arc<dyn HttpClient>) -> Self {
        Self { client }
    }

    /// Transport over the native `reqwest` client.
    #[cfg(feature = "native")]
    pub fn native(options: &TransportOptions) -> Result<Self> {
        use std::time::Duration;

        let client = nimbus_platform::NativeHttpClient::with_timeouts(
            Duration::from_secs(options.timeout_secs),
            Duration::from_secs(options.pool_idle_timeout_secs),
        )?;
        Ok(Self::new(Arc::new(client)))
    }

    async fn exchange(&self, ctx: &Context, request: &Request) -> Result<Response> {
        let body = match request.method() {
            Method::Get | Method::Head | Method::Delete if request.body().is_empty() => None,
            _ => Some(request.body()),
        };
        let send = self
            .client
            .request(request.method(), request.url(), request.headers(), body);

        let response = match ctx.remaining() {
            Some(left) => tokio::time::timeout(left, send)
                .await
                .map_err(|_| PipelineError::Timeout)??,
            None => send.await?,
        };
        Ok(response)
    }
}

impl std::fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTransport").finish_non_exhaustive()
    }
}

#[async_trait]
impl Transport for HttpTransport {
    fn name(&self) -> &'static str {
        "http"
    }

    async fn send(&self, ctx: &Context, request: &Request) -> Result<Response> {
        ctx.check()?;
        debug!(method = %request.method(), url = request.url(), "sending request");

        let outcome = tokio::select! {
            biased;
            _ = ctx.cancelled() => Err(PipelineError::Cancelled),
            outcome = self.exchange(ctx, request) => outcome,
        };

        if let Ok(response) = &outcome {
            debug!(status = response.status, bytes = response.body.len(), "received response");
        }
        outcome
    }
}
