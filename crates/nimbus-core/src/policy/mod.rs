//! Built-in pipeline policies.
//!
//! Client libraries assemble these in a fixed order:
//!
//! 1. [`ApiVersionPolicy`] stamps the service API version
//! 2. [`TelemetryPolicy`] sets `User-Agent`
//! 3. [`RetryPolicy`] re-runs everything below it on transient failures
//! 4. [`CredentialPolicy`] authorizes each attempt
//! 5. [`LoggingPolicy`] reports each attempt to the log registry
//! 6. [`HttpTransport`] performs the exchange
//!
//! Policies below the retry policy run once per attempt; the headers they add
//! are removed before the next attempt.

pub mod api_version;
pub mod credential;
pub mod logging;
pub mod retry;
pub mod telemetry;
pub mod transport;

pub use api_version::{ApiVersionLocation, ApiVersionOptions, ApiVersionPolicy};
pub use credential::{AnonymousCredential, Credential, CredentialPolicy, StaticTokenCredential};
pub use logging::LoggingPolicy;
pub use retry::{RetryOptions, RetryPolicy};
pub use telemetry::{MAX_APPLICATION_ID_LEN, TelemetryOptions, TelemetryPolicy};
pub use transport::{HttpTransport, TransportOptions};
