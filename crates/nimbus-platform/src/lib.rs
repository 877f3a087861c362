//! Platform abstraction layer for nimbus.
//!
//! Provides traits for the platform-dependent operations the request
//! pipeline needs ([`http::HttpClient`] for the network exchange,
//! [`env::Environment`] for environment-driven configuration) together with
//! native implementations.
//!
//! # Example
//!
//! ```rust,no_run
//! use nimbus_platform::http::{HttpClient, Method, NativeHttpClient};
//!
//! # async fn example() {
//! let client = NativeHttpClient::new();
//! let response = client
//!     .request(Method::Get, "https://example.com", &[], None)
//!     .await
//!     .unwrap();
//! assert!(response.is_success());
//! # }
//! ```

pub mod env;
pub mod http;

pub use env::{Environment, MapEnvironment, NativeEnvironment};
pub use http::{HttpClient, HttpError, HttpResponse, Method};
#[cfg(feature = "native")]
pub use http::NativeHttpClient;
