//! Filterable diagnostic logging.
//!
//! Users register an optional [`ClassificationFilter`] and an optional
//! [`LogCallback`]; pipeline policies ask [`should_log`] before building a
//! message and hand it to [`log`]. Decisions follow three rules:
//!
//! 1. no callback registered: nothing is emitted;
//! 2. callback but no filter: everything is emitted;
//! 3. both: only classifications listed in the filter are emitted.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use nimbus_core::log::{self, Classification, ClassificationFilter, LogCallback};
//!
//! log::set_callback(Some(Arc::new(LogCallback::new(|c, msg| {
//!     eprintln!("[{c}] {}", String::from_utf8_lossy(msg));
//! }))));
//! log::set_classifications(Some(Arc::new(ClassificationFilter::new([
//!     Classification::HttpRequest,
//!     Classification::HttpResponse,
//! ]))));
//!
//! assert!(log::should_log(Classification::HttpRequest));
//! assert!(!log::should_log(Classification::HttpRetry));
//! # log::set_callback(None);
//! # log::set_classifications(None);
//! ```

mod classification;
mod filter;
mod registry;

use std::sync::Arc;

pub use classification::{Classification, END_OF_LIST, Facility, UnknownClassification};
pub use filter::{ClassificationFilter, LOG_CLASSIFICATIONS_ENV};
pub use registry::{LogCallback, LogRegistry};

/// Install or clear the process-wide classification filter.
pub fn set_classifications(filter: Option<Arc<ClassificationFilter>>) {
    LogRegistry::global().set_classifications(filter);
}

/// Install or clear the process-wide log callback.
pub fn set_callback(callback: Option<Arc<LogCallback>>) {
    LogRegistry::global().set_callback(callback);
}

/// Whether a message of `classification` would be emitted by the
/// process-wide registry.
pub fn should_log(classification: Classification) -> bool {
    LogRegistry::global().should_log(classification)
}

/// Emit `message` through the process-wide registry if `classification`
/// passes. Returns whether the callback was invoked.
pub fn log(classification: Classification, message: &[u8]) -> bool {
    LogRegistry::global().write(classification, message)
}
