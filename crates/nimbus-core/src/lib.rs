//! Request pipeline and diagnostic logging for nimbus cloud clients.
//!
//! Every outbound call made by a nimbus client passes through a [`Pipeline`]:
//! an ordered chain of [`Policy`] objects ending in a [`Transport`]. Policies
//! stamp headers, retry, authorize and log; the transport performs the
//! exchange through a platform [`nimbus_platform::HttpClient`].
//!
//! The [`log`] module is a small, lock-free dispatcher that filters
//! diagnostic messages by [`Classification`](log::Classification) and hands
//! them to a user callback.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use nimbus_core::{Context, PipelineOptions, Request};
//! use nimbus_core::log::LogRegistry;
//! use nimbus_core::policy::{HttpTransport, StaticTokenCredential};
//! use nimbus_platform::Method;
//!
//! # async fn example() -> nimbus_core::Result<()> {
//! let options = PipelineOptions::default();
//! let pipeline = options.build_pipeline(
//!     "example",
//!     env!("CARGO_PKG_VERSION"),
//!     Arc::new(StaticTokenCredential::new("token")?),
//!     Arc::new(HttpTransport::native(&options.transport)?),
//!     LogRegistry::global(),
//! )?;
//!
//! let mut request = Request::new(Method::Get, "https://example.com/")?;
//! let response = pipeline.run(&Context::new(), &mut request).await?;
//! println!("{}", response.status);
//! # Ok(())
//! # }
//! ```

pub mod context;
pub mod error;
pub mod log;
pub mod options;
pub mod pipeline;
pub mod policy;
pub mod request;

#[cfg(test)]
mod testing;

pub use context::Context;
pub use error::{PipelineError, Result};
pub use options::PipelineOptions;
pub use pipeline::{Next, Pipeline, PipelineBuilder, Policy, Transport};
pub use request::{DEFAULT_HEADER_CAPACITY, DEFAULT_URL_CAPACITY, Request};

/// Responses are the platform client's response type.
pub type Response = nimbus_platform::HttpResponse;
