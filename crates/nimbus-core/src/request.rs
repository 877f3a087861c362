//! The mutable request that travels down the pipeline.
//!
//! A [`Request`] has bounded storage: a URL capacity in bytes and a fixed
//! number of header slots. Operations that would exceed either bound fail with
//! [`PipelineError::InsufficientCapacity`] and leave the request untouched.

use nimbus_platform::Method;

use crate::error::{PipelineError, Result};

/// Default URL capacity in bytes.
pub const DEFAULT_URL_CAPACITY: usize = 2048;

/// Default number of header slots.
pub const DEFAULT_HEADER_CAPACITY: usize = 16;

/// An outgoing HTTP request.
#[derive(Debug, Clone)]
pub struct Request {
    method: Method,
    url: String,
    url_capacity: usize,
    headers: Vec<(String, String)>,
    header_capacity: usize,
    retry_headers_start: usize,
    body: Vec<u8>,
}

impl Request {
    /// Create a request with the default capacities.
    pub fn new(method: Method, url: &str) -> Result<Self> {
        Self::with_capacity(method, url, DEFAULT_URL_CAPACITY, DEFAULT_HEADER_CAPACITY)
    }

    /// Create a request with explicit URL and header capacities.
    pub fn with_capacity(
        method: Method,
        url: &str,
        url_capacity: usize,
        header_capacity: usize,
    ) -> Result<Self> {
        if url.len() > url_capacity {
            return Err(PipelineError::InsufficientCapacity {
                what: "url",
                needed: url.len(),
                available: url_capacity,
            });
        }
        Ok(Self {
            method,
            url: url.to_string(),
            url_capacity,
            headers: Vec::with_capacity(header_capacity),
            header_capacity,
            retry_headers_start: 0,
            body: Vec::new(),
        })
    }

    /// Attach a body.
    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Headers in the order they were appended.
    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// First header with the given name (case-insensitive).
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn header_capacity(&self) -> usize {
        self.header_capacity
    }

    pub fn url_capacity(&self) -> usize {
        self.url_capacity
    }

    /// Append a header. Header names must be non-empty; surrounding
    /// whitespace in the name is trimmed.
    pub fn append_header(&mut self, name: &str, value: &str) -> Result<()> {
        let name = name.trim();
        if name.is_empty() {
            return Err(PipelineError::InvalidConfig("header name is empty".into()));
        }
        if self.headers.len() >= self.header_capacity {
            return Err(PipelineError::InsufficientCapacity {
                what: "header",
                needed: self.headers.len() + 1,
                available: self.header_capacity,
            });
        }
        self.headers.push((name.to_string(), value.to_string()));
        Ok(())
    }

    /// Append `name=value` to the query string. Values are appended as
    /// given; encoding them is the caller's job.
    pub fn set_query_parameter(&mut self, name: &str, value: &str) -> Result<()> {
        if name.is_empty() {
            return Err(PipelineError::InvalidConfig(
                "query parameter name is empty".into(),
            ));
        }
        let separator = if self.url.contains('?') { '&' } else { '?' };
        let needed = self.url.len() + 1 + name.len() + 1 + value.len();
        self.ensure_url_capacity(needed)?;

        self.url.push(separator);
        self.url.push_str(name);
        self.url.push('=');
        self.url.push_str(value);
        Ok(())
    }

    /// Mark the current end of the header list. Headers appended after the
    /// mark belong to a single attempt and are dropped by
    /// [`remove_retry_headers`](Self::remove_retry_headers).
    pub fn mark_retry_headers_start(&mut self) {
        self.retry_headers_start = self.headers.len();
    }

    /// Drop every header appended after the retry mark.
    pub fn remove_retry_headers(&mut self) {
        self.headers.truncate(self.retry_headers_start);
    }

    fn ensure_url_capacity(&self, needed: usize) -> Result<()> {
        if needed > self.url_capacity {
            return Err(PipelineError::InsufficientCapacity {
                what: "url",
                needed,
                available: self.url_capacity,
            });
        }
        Ok(())
    }
}
