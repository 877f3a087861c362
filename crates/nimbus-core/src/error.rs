//! Pipeline error types for nimbus-core.
//!
//! Every policy and the pipeline engine return [`Result<T>`], which uses
//! [`PipelineError`] as the error type. Failures are values: a policy that
//! delegates must inspect the delegated result before post-processing.

use nimbus_platform::HttpError;
use thiserror::Error;

/// Errors that can end a pipeline run.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// A constructed value (URL, header, query parameter) does not fit the
    /// space reserved for it. Nothing was applied.
    #[error("insufficient capacity for {what}: needed {needed}, available {available}")]
    InsufficientCapacity {
        /// What was being stored (e.g. "header", "url").
        what: &'static str,
        /// Size required to store the value.
        needed: usize,
        /// Size still available.
        available: usize,
    },

    /// Options or arguments supplied at construction are unusable.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The credential could not authorize the request.
    #[error("credential error: {0}")]
    Credential(String),

    /// A policy rejected the request without delegating.
    #[error("rejected by {policy} policy: {reason}")]
    Rejected {
        /// Name of the rejecting policy.
        policy: &'static str,
        /// Why the request was rejected.
        reason: String,
    },

    /// The call context's deadline passed.
    #[error("deadline exceeded")]
    Timeout,

    /// The call context was cancelled.
    #[error("operation cancelled")]
    Cancelled,

    /// The terminal transport failed to complete the exchange.
    #[error("transport error: {0}")]
    Transport(#[from] HttpError),

    /// A JSON serialization/deserialization error (options loading).
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// A TOML deserialization error (options loading).
    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Reading an options file failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl PipelineError {
    /// Whether the retry policy may send the request again after this failure.
    pub fn is_retryable(&self) -> bool {
        match self {
            PipelineError::Transport(e) => e.is_transient(),
            PipelineError::Timeout => true,
            PipelineError::InsufficientCapacity { .. }
            | PipelineError::InvalidConfig(_)
            | PipelineError::Credential(_)
            | PipelineError::Rejected { .. }
            | PipelineError::Cancelled
            | PipelineError::Json(_)
            | PipelineError::Toml(_)
            | PipelineError::Io(_) => false,
        }
    }
}

/// A convenience type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, PipelineError>;
