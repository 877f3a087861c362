//! Exponential backoff retry over the rest of the chain.
//!
//! [`RetryPolicy`] re-runs everything after it when the outcome is a
//! retryable status code or a transient failure. Retries are bounded by
//! [`RetryOptions::max_retries`]; when they run out, the last outcome is
//! returned unchanged.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::Response;
use crate::context::Context;
use crate::error::Result;
use crate::log::{Classification, LogRegistry};
use crate::pipeline::{Next, Policy};
use crate::request::Request;

/// Configuration for retry behavior.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryOptions {
    /// Maximum number of retries after the first attempt (default: 4).
    pub max_retries: u32,
    /// Delay before the first retry in milliseconds (default: 4000).
    pub retry_delay_ms: u64,
    /// Upper bound for the computed delay in milliseconds (default: 120000).
    pub max_retry_delay_ms: u64,
    /// Response status codes that trigger a retry.
    pub status_codes: Vec<u16>,
}

impl Default for RetryOptions {
    fn default() -> Self {
        Self {
            max_retries: 4,
            retry_delay_ms: 4_000,
            max_retry_delay_ms: 120_000,
            status_codes: vec![408, 429, 500, 502, 503, 504],
        }
    }
}

impl RetryOptions {
    /// Total number of times the rest of the chain may run.
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// Backoff before retry number `retry` (1-based):
    /// `min(retry_delay_ms * 2^(retry - 1), max_retry_delay_ms)`.
    pub fn delay(&self, retry: u32) -> Duration {
        let exp = 2u64.saturating_pow(retry.saturating_sub(1));
        let ms = self
            .retry_delay_ms
            .saturating_mul(exp)
            .min(self.max_retry_delay_ms);
        Duration::from_millis(ms)
    }

    pub fn is_retryable_status(&self, status: u16) -> bool {
        self.status_codes.contains(&status)
    }
}

/// Server-requested delay from `retry-after-ms`, `x-ms-retry-after-ms`
/// (milliseconds) or `Retry-After` (whole seconds).
pub fn retry_after(response: &Response) -> Option<Duration> {
    for name in ["retry-after-ms", "x-ms-retry-after-ms"] {
        if let Some(ms) = response.header(name).and_then(|v| v.trim().parse::<u64>().ok()) {
            return Some(Duration::from_millis(ms));
        }
    }
    response
        .header("retry-after")
        .and_then(|v| v.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
}

pub struct RetryPolicy {
    options: RetryOptions,
    registry: Arc<LogRegistry>,
}

impl RetryPolicy {
    /// Retry policy reporting to the process-wide log registry.
    pub fn new(options: RetryOptions) -> Self {
        Self::with_registry(options, LogRegistry::global())
    }

    pub fn with_registry(options: RetryOptions, registry: Arc<LogRegistry>) -> Self {
        Self { options, registry }
    }

    pub fn options(&self) -> &RetryOptions {
        &self.options
    }

    fn should_retry(&self, outcome: &Result<Response>) -> bool {
        match outcome {
            Ok(response) => self.options.is_retryable_status(response.status),
            Err(err) => err.is_retryable(),
        }
    }

    fn log_retry(&self, retry: u32, delay: Duration) {
        if self.registry.should_log(Classification::HttpRetry) {
            let message = format!(
                "HTTP Retry attempt #{retry} will be made in {}ms.",
                delay.as_millis()
            );
            self.registry
                .write(Classification::HttpRetry, message.as_bytes());
        }
    }
}

impl std::fmt::Debug for RetryPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RetryPolicy")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Policy for RetryPolicy {
    fn name(&self) -> &'static str {
        "retry"
    }

    async fn process(
        &self,
        ctx: &Context,
        request: &mut Request,
        next: Next<'_>,
    ) -> Result<Response> {
        request.mark_retry_headers_start();
        let max_attempts = self.options.max_attempts();
        let mut attempt = 1;

        loop {
            if attempt > 1 {
                request.remove_retry_headers();
            }

            let outcome = next.run(ctx, request).await;
            if attempt >= max_attempts || !self.should_retry(&outcome) {
                if attempt > 1 && outcome.is_ok() {
                    debug!(attempt, "request finished after retry");
                }
                return outcome;
            }

            let retry = attempt;
            let delay = outcome
                .as_ref()
                .ok()
                .and_then(retry_after)
                .unwrap_or_else(|| self.options.delay(retry));

            if ctx.is_cancelled() || ctx.expires_within(delay) {
                debug!(
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    "context ends before next retry, giving up"
                );
                return outcome;
            }

            match &outcome {
                Ok(response) => warn!(
                    retry,
                    status = response.status,
                    delay_ms = delay.as_millis() as u64,
                    "retrying request"
                ),
                Err(err) => warn!(
                    retry,
                    error = %err,
                    delay_ms = delay.as_millis() as u64,
                    "retrying request"
                ),
            }
            self.log_retry(retry, delay);

            tokio::select! {
                _ = tokio::time::sleep(delay) => {}
                _ = ctx.cancelled() => return outcome,
            }
            attempt += 1;
        }
    }
}
