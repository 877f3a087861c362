//! `nimbus upload` -- upload a local file as a block blob.
//!
//! The blob URL may carry a SAS query string; pass `--token` to send a
//! bearer token instead. Diagnostic messages from the pipeline are routed to
//! `tracing` (target `nimbus::log`) when `--log`, `NIMBUS_LOG_CLASSIFICATIONS`
//! or `--verbose` is given.
//!
//! # Example
//!
//! ```text
//! nimbus upload --file hello.txt \
//!     --endpoint "https://acct.blob.core.windows.net/c/hello.txt?sv=..."
//! nimbus upload --endpoint https://... --file data.json --content-type application/json \
//!     --log http.request,http.response,http.retry
//! ```

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context as _;
use clap::Args;
use tracing::info;

use nimbus_core::Context;
use nimbus_core::PipelineOptions;
use nimbus_core::log::{self, ClassificationFilter, LogCallback};
use nimbus_core::policy::{AnonymousCredential, Credential, StaticTokenCredential};
use nimbus_platform::{Environment, NativeEnvironment};
use nimbus_storage::{BlobClient, BlobClientOptions, UploadOptions};

/// Arguments for the `nimbus upload` subcommand.
#[derive(Args)]
pub struct UploadArgs {
    /// Full blob URL.
    #[arg(long)]
    pub endpoint: String,

    /// File to upload.
    #[arg(long)]
    pub file: PathBuf,

    /// Bearer token; anonymous when omitted.
    #[arg(long)]
    pub token: Option<String>,

    /// Content type sent with the blob.
    #[arg(long, default_value = "text/plain")]
    pub content_type: String,

    /// Pipeline options file (JSON or TOML). Storage defaults apply to
    /// anything it leaves out of `api_version`.
    #[arg(long)]
    pub options: Option<PathBuf>,

    /// Comma-separated log classifications (see `nimbus classifications`).
    #[arg(long)]
    pub log: Option<String>,

    /// Give up after this many seconds.
    #[arg(long)]
    pub timeout: Option<u64>,
}

/// Run the upload command.
pub async fn run(args: UploadArgs, verbose: bool) -> anyhow::Result<()> {
    let filter = resolve_filter(args.log.as_deref(), &NativeEnvironment)?;
    if filter.is_some() || verbose {
        log::set_classifications(filter.map(Arc::new));
        log::set_callback(Some(Arc::new(LogCallback::tracing())));
    }

    let options = load_options(args.options.as_deref())?;
    let credential: Arc<dyn Credential> = match args.token {
        Some(token) => Arc::new(StaticTokenCredential::new(token)?),
        None => Arc::new(AnonymousCredential),
    };
    let client = BlobClient::new(&args.endpoint, credential, options)?;

    let content = tokio::fs::read(&args.file)
        .await
        .with_context(|| format!("reading {}", args.file.display()))?;

    let ctx = match args.timeout {
        Some(secs) => Context::with_timeout(Duration::from_secs(secs)),
        None => Context::new(),
    };
    let upload = UploadOptions {
        content_type: args.content_type,
    };
    let result = client.upload(&ctx, &content, &upload).await?;

    info!(status = result.status, "upload complete");
    println!("Uploaded {} bytes ({})", content.len(), result.status);
    if let Some(etag) = &result.etag {
        println!("  ETag:       {etag}");
    }
    if let Some(id) = &result.request_id {
        println!("  Request id: {id}");
    }
    Ok(())
}

/// `--log` wins over the environment; neither means "no filter".
fn resolve_filter(
    arg: Option<&str>,
    env: &dyn Environment,
) -> anyhow::Result<Option<ClassificationFilter>> {
    match arg {
        Some(names) => Ok(Some(names.parse()?)),
        None => Ok(ClassificationFilter::from_env(env)?),
    }
}

fn load_options(path: Option<&std::path::Path>) -> anyhow::Result<BlobClientOptions> {
    let mut options = BlobClientOptions::default();
    if let Some(path) = path {
        let loaded = PipelineOptions::from_file(path)
            .with_context(|| format!("loading options from {}", path.display()))?;
        options.pipeline = PipelineOptions {
            api_version: loaded.api_version.or(options.pipeline.api_version),
            ..loaded
        };
    }
    Ok(options)
}
