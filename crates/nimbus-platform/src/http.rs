//! HTTP client abstraction and native implementation.
//!
//! Provides a platform-agnostic [`HttpClient`] trait and a native implementation
//! backed by [`reqwest`]. The pipeline's terminal transport policy talks to
//! whatever implementation the client was assembled with.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
#[cfg(feature = "native")]
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

/// Errors produced by an [`HttpClient`] implementation.
#[derive(Error, Debug)]
pub enum HttpError {
    /// The connection could not be established or was dropped.
    #[error("connection failed: {0}")]
    Connection(String),

    /// The exchange did not complete within the client's timeout.
    #[error("request timed out")]
    Timeout,

    /// The request could not be built (bad URL, bad header, ...).
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Any other error from reqwest.
    #[cfg(feature = "native")]
    #[error("http error: {0}")]
    Http(#[source] reqwest::Error),
}

impl HttpError {
    /// Whether the failure is transient and the exchange may succeed if sent again.
    pub fn is_transient(&self) -> bool {
        match self {
            HttpError::Connection(_) | HttpError::Timeout => true,
            HttpError::InvalidRequest(_) => false,
            #[cfg(feature = "native")]
            HttpError::Http(e) => e.is_request() || e.is_body(),
        }
    }
}

#[cfg(feature = "native")]
impl From<reqwest::Error> for HttpError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            HttpError::Timeout
        } else if err.is_connect() {
            HttpError::Connection(err.to_string())
        } else if err.is_builder() {
            HttpError::InvalidRequest(err.to_string())
        } else {
            HttpError::Http(err)
        }
    }
}

/// HTTP request method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Head,
    Post,
    Put,
    Patch,
    Delete,
}

impl Method {
    /// The method's wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Head => "HEAD",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Method {
    type Err = HttpError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(Method::Get),
            "HEAD" => Ok(Method::Head),
            "POST" => Ok(Method::Post),
            "PUT" => Ok(Method::Put),
            "PATCH" => Ok(Method::Patch),
            "DELETE" => Ok(Method::Delete),
            other => Err(HttpError::InvalidRequest(format!(
                "unsupported method: {other}"
            ))),
        }
    }
}

/// HTTP response from a request.
#[derive(Debug, Clone, Default)]
pub struct HttpResponse {
    /// HTTP status code (e.g., 200, 404, 500).
    pub status: u16,
    /// Response headers. Keys are stored lowercase.
    pub headers: HashMap<String, String>,
    /// Raw response body bytes.
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Build a response with the given status and no headers or body.
    pub fn with_status(status: u16) -> Self {
        Self {
            status,
            ..Self::default()
        }
    }

    /// Add a header, normalizing the name to lowercase.
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.insert(name.to_ascii_lowercase(), value.into());
        self
    }

    /// Add a header value, joining it to an existing value of the same
    /// name with `", "`.
    pub fn append_header(&mut self, name: &str, value: &str) {
        self.headers
            .entry(name.to_ascii_lowercase())
            .and_modify(|existing| {
                existing.push_str(", ");
                existing.push_str(value);
            })
            .or_insert_with(|| value.to_string());
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// Parse body as UTF-8 text.
    pub fn text(&self) -> Result<String, std::string::FromUtf8Error> {
        String::from_utf8(self.body.clone())
    }

    /// Parse body as JSON.
    pub fn json<T: serde::de::DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }

    /// Check if status is success (2xx).
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Canonical reason phrase for the status code, if it is a common one.
    pub fn reason_phrase(&self) -> &'static str {
        match self.status {
            200 => "OK",
            201 => "Created",
            202 => "Accepted",
            204 => "No Content",
            304 => "Not Modified",
            400 => "Bad Request",
            401 => "Unauthorized",
            403 => "Forbidden",
            404 => "Not Found",
            408 => "Request Timeout",
            409 => "Conflict",
            412 => "Precondition Failed",
            429 => "Too Many Requests",
            500 => "Internal Server Error",
            502 => "Bad Gateway",
            503 => "Service Unavailable",
            504 => "Gateway Timeout",
            _ => "",
        }
    }
}

/// Platform-agnostic HTTP client.
///
/// Implementors perform exactly one network exchange per call. Retrying,
/// authentication and logging are the pipeline's business, not the client's.
#[async_trait]
pub trait HttpClient: Send + Sync {
    /// Send an HTTP request with the given method, URL, headers, and optional body.
    async fn request(
        &self,
        method: Method,
        url: &str,
        headers: &[(String, String)],
        body: Option<&[u8]>,
    ) -> Result<HttpResponse, HttpError>;
}

/// Native HTTP client using [`reqwest`].
#[cfg(feature = "native")]
pub struct NativeHttpClient {
    client: reqwest::Client,
}

#[cfg(feature = "native")]
impl NativeHttpClient {
    /// Create a client with reqwest's defaults (no overall timeout).
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    /// Create a client with an overall request timeout and idle-connection timeout.
    pub fn with_timeouts(
        timeout: Duration,
        pool_idle_timeout: Duration,
    ) -> Result<Self, HttpError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .pool_idle_timeout(pool_idle_timeout)
            .build()?;
        Ok(Self { client })
    }
}

#[cfg(feature = "native")]
impl Default for NativeHttpClient {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "native")]
#[async_trait]
impl HttpClient for NativeHttpClient {
    async fn request(
        &self,
        method: Method,
        url: &str,
        headers: &[(String, String)],
        body: Option<&[u8]>,
    ) -> Result<HttpResponse, HttpError> {
        let reqwest_method = reqwest::Method::from_bytes(method.as_str().as_bytes())
            .map_err(|e| HttpError::InvalidRequest(e.to_string()))?;
        let mut builder = self.client.request(reqwest_method, url);

        for (key, value) in headers {
            builder = builder.header(key.as_str(), value.as_str());
        }

        if let Some(body_bytes) = body {
            builder = builder.body(body_bytes.to_vec());
        }

        tracing::trace!(%method, url, headers = headers.len(), "sending http request");
        let response = builder.send().await?;

        let mut result = HttpResponse::with_status(response.status().as_u16());
        for (key, value) in response.headers() {
            result.append_header(key.as_str(), &String::from_utf8_lossy(value.as_bytes()));
        }
        result.body = response.bytes().await?.to_vec();

        Ok(result)
    }
}
