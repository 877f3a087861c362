//! Request/response logging through the classification registry.
//!
//! Messages are only formatted when the registry says someone is listening.
//! Sensitive header values are replaced and long values are shortened so a
//! log line never carries a full token.

use std::fmt::Write as _;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tracing::debug;

use crate::Response;
use crate::context::Context;
use crate::error::Result;
use crate::log::{Classification, LogRegistry};
use crate::pipeline::{Next, Policy};
use crate::request::Request;

const REDACTED: &str = "REDACTED";

/// Headers whose values are never logged.
const SENSITIVE_HEADERS: &[&str] = &[
    "authorization",
    "x-ms-authorization-auxiliary",
    "cookie",
    "set-cookie",
];

const MAX_VALUE_LEN: usize = 50;
const VALUE_HEAD_LEN: usize = 23;
const VALUE_TAIL_LEN: usize = 22;
const ELLIPSIS: &str = " ... ";

pub struct LoggingPolicy {
    registry: Arc<LogRegistry>,
}

impl LoggingPolicy {
    /// Logging policy reporting to the process-wide registry.
    pub fn new() -> Self {
        Self::with_registry(LogRegistry::global())
    }

    pub fn with_registry(registry: Arc<LogRegistry>) -> Self {
        Self { registry }
    }
}

impl Default for LoggingPolicy {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for LoggingPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoggingPolicy").finish_non_exhaustive()
    }
}

#[async_trait]
impl Policy for LoggingPolicy {
    fn name(&self) -> &'static str {
        "logging"
    }

    async fn process(
        &self,
        ctx: &Context,
        request: &mut Request,
        next: Next<'_>,
    ) -> Result<Response> {
        if self.registry.should_log(Classification::HttpRequest) {
            let message = format_request(request);
            self.registry
                .write(Classification::HttpRequest, message.as_bytes());
        }

        let started = Instant::now();
        let outcome = next.run(ctx, request).await;
        let elapsed = started.elapsed();

        match &outcome {
            Ok(response) => {
                debug!(
                    method = %request.method(),
                    status = response.status,
                    elapsed_ms = elapsed.as_millis() as u64,
                    "http exchange complete"
                );
                if self.registry.should_log(Classification::HttpResponse) {
                    let message = format_response(response, elapsed, request);
                    self.registry
                        .write(Classification::HttpResponse, message.as_bytes());
                }
            }
            Err(err) => debug!(
                method = %request.method(),
                error = %err,
                elapsed_ms = elapsed.as_millis() as u64,
                "http exchange failed"
            ),
        }
        outcome
    }
}

/// `HTTP Request : <METHOD> <url>` followed by one tab-indented line per
/// header.
pub fn format_request(request: &Request) -> String {
    let mut out = format!("HTTP Request : {} {}", request.method(), request.url());
    for (name, value) in request.headers() {
        push_header(&mut out, name, value);
    }
    out
}

/// `HTTP Response (<n>ms) : <status> <reason>`, the response headers sorted
/// by name, then the request that produced it.
pub fn format_response(response: &Response, elapsed: Duration, request: &Request) -> String {
    let mut out = format!(
        "HTTP Response ({}ms) : {} {}",
        elapsed.as_millis(),
        response.status,
        response.reason_phrase()
    );
    let mut headers: Vec<_> = response.headers.iter().collect();
    headers.sort_by(|a, b| a.0.cmp(b.0));
    for (name, value) in headers {
        push_header(&mut out, name, value);
    }
    out.push_str("\n\n -> ");
    out.push_str(&format_request(request));
    out
}

fn push_header(out: &mut String, name: &str, value: &str) {
    let _ = write!(out, "\n\t{name} : ");
    if SENSITIVE_HEADERS.iter().any(|s| s.eq_ignore_ascii_case(name)) {
        out.push_str(REDACTED);
    } else {
        out.push_str(&shorten(value));
    }
}

/// Values longer than 50 characters keep their first 23 and last 22
/// characters around `" ... "`.
fn shorten(value: &str) -> std::borrow::Cow<'_, str> {
    let len = value.chars().count();
    if len <= MAX_VALUE_LEN {
        return value.into();
    }
    let head: String = value.chars().take(VALUE_HEAD_LEN).collect();
    let tail: String = value.chars().skip(len - VALUE_TAIL_LEN).collect();
    format!("{head}{ELLIPSIS}{tail}").into()
}
