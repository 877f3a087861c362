//! Block blob client.
//!
//! [`BlobClient`] points at a single blob URL and owns the canonical
//! pipeline (api-version, telemetry, retry, credential, logging, transport)
//! assembled once at construction.

use std::sync::Arc;

use nimbus_core::log::LogRegistry;
use nimbus_core::policy::{ApiVersionOptions, Credential, RetryOptions};
use nimbus_core::{
    Context, DEFAULT_URL_CAPACITY, Pipeline, PipelineError, PipelineOptions, Request, Transport,
};
use nimbus_platform::Method;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{BlobError, Result};

/// Storage service API version sent in `x-ms-version`.
pub const STORAGE_API_VERSION: &str = "2019-02-02";

/// Header slots reserved for a blob request.
pub const BLOB_HEADER_CAPACITY: usize = 10;

const COMPONENT: &str = "storage-blob";
const BLOB_TYPE_HEADER: &str = "x-ms-blob-type";
const BLOCK_BLOB: &str = "BlockBlob";

/// Pipeline options with the storage defaults: `x-ms-version` header and
/// 5 retries (6 attempts), 1s initial delay, 30s cap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlobClientOptions {
    pub pipeline: PipelineOptions,
}

impl From<PipelineOptions> for BlobClientOptions {
    /// Use `pipeline` as given, without storage defaults.
    fn from(pipeline: PipelineOptions) -> Self {
        Self { pipeline }
    }
}

impl Default for BlobClientOptions {
    fn default() -> Self {
        Self {
            pipeline: PipelineOptions {
                api_version: Some(ApiVersionOptions::header("x-ms-version", STORAGE_API_VERSION)),
                retry: RetryOptions {
                    max_retries: 5,
                    retry_delay_ms: 1_000,
                    max_retry_delay_ms: 30_000,
                    ..RetryOptions::default()
                },
                ..PipelineOptions::default()
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadOptions {
    /// Sent as `Content-Type` (default: `text/plain`).
    pub content_type: String,
}

impl Default for UploadOptions {
    fn default() -> Self {
        Self {
            content_type: "text/plain".into(),
        }
    }
}

/// Outcome of a successful upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadResult {
    pub status: u16,
    pub etag: Option<String>,
    pub last_modified: Option<String>,
    pub request_id: Option<String>,
}

pub struct BlobClient {
    endpoint: String,
    pipeline: Pipeline,
}

impl BlobClient {
    /// Client over the native HTTP transport, logging to the process-wide
    /// registry.
    #[cfg(feature = "native")]
    pub fn new(
        endpoint: &str,
        credential: Arc<dyn Credential>,
        options: BlobClientOptions,
    ) -> Result<Self> {
        let transport = nimbus_core::policy::HttpTransport::native(&options.pipeline.transport)?;
        Self::with_transport(
            endpoint,
            credential,
            options,
            Arc::new(transport),
            LogRegistry::global(),
        )
    }

    pub fn with_transport(
        endpoint: &str,
        credential: Arc<dyn Credential>,
        options: BlobClientOptions,
        transport: Arc<dyn Transport>,
        registry: Arc<LogRegistry>,
    ) -> Result<Self> {
        if endpoint.is_empty() {
            return Err(PipelineError::InvalidConfig("endpoint is empty".into()).into());
        }
        if endpoint.len() > DEFAULT_URL_CAPACITY {
            return Err(PipelineError::InvalidConfig(format!(
                "endpoint is {} bytes, limit is {DEFAULT_URL_CAPACITY}",
                endpoint.len()
            ))
            .into());
        }
        let pipeline = options.pipeline.build_pipeline(
            COMPONENT,
            env!("CARGO_PKG_VERSION"),
            credential,
            transport,
            registry,
        )?;
        debug!(endpoint, "blob client ready");
        Ok(Self {
            endpoint: endpoint.to_string(),
            pipeline,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    /// Upload `content` as a block blob, replacing any existing blob.
    pub async fn upload(
        &self,
        ctx: &Context,
        content: &[u8],
        options: &UploadOptions,
    ) -> Result<UploadResult> {
        let mut request = Request::with_capacity(
            Method::Put,
            &self.endpoint,
            DEFAULT_URL_CAPACITY,
            BLOB_HEADER_CAPACITY,
        )?
        .with_body(content);
        request.append_header(BLOB_TYPE_HEADER, BLOCK_BLOB)?;
        request.append_header("Content-Length", &content.len().to_string())?;
        request.append_header("Content-Type", &options.content_type)?;

        let response = self.pipeline.run(ctx, &mut request).await?;
        if !response.is_success() {
            return Err(BlobError::Status {
                status: response.status,
                code: response.header("x-ms-error-code").map(str::to_string),
                body: String::from_utf8_lossy(&response.body).into_owned(),
            });
        }

        info!(bytes = content.len(), status = response.status, "blob uploaded");
        Ok(UploadResult {
            status: response.status,
            etag: response.header("etag").map(str::to_string),
            last_modified: response.header("last-modified").map(str::to_string),
            request_id: response.header("x-ms-request-id").map(str::to_string),
        })
    }
}

impl std::fmt::Debug for BlobClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlobClient")
            .field("endpoint", &self.endpoint)
            .field("pipeline", &self.pipeline)
            .finish()
    }
}
