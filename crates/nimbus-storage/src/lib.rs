//! Block blob uploads over the nimbus request pipeline.
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use nimbus_core::Context;
//! use nimbus_core::policy::StaticTokenCredential;
//! use nimbus_storage::{BlobClient, BlobClientOptions, UploadOptions};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = BlobClient::new(
//!     "https://account.blob.core.windows.net/container/hello.txt",
//!     Arc::new(StaticTokenCredential::new("token")?),
//!     BlobClientOptions::default(),
//! )?;
//! let result = client
//!     .upload(&Context::new(), b"hello", &UploadOptions::default())
//!     .await?;
//! println!("etag {:?}", result.etag);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod error;

pub use client::{
    BLOB_HEADER_CAPACITY, BlobClient, BlobClientOptions, STORAGE_API_VERSION, UploadOptions,
    UploadResult,
};
pub use error::{BlobError, Result};
