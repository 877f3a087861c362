//! Error types for the blob client.

use nimbus_core::PipelineError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BlobError {
    /// The request never produced a service response.
    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    /// The service answered with a non-success status.
    #[error("storage service returned {status}{}", error_code_suffix(.code))]
    Status {
        status: u16,
        /// Value of the `x-ms-error-code` response header.
        code: Option<String>,
        /// Response body, usually an XML error document.
        body: String,
    },
}

impl BlobError {
    /// HTTP status of a service error.
    pub fn status(&self) -> Option<u16> {
        match self {
            BlobError::Status { status, .. } => Some(*status),
            BlobError::Pipeline(_) => None,
        }
    }
}

fn error_code_suffix(code: &Option<String>) -> String {
    code.as_deref().map(|c| format!(" ({c})")).unwrap_or_default()
}

pub type Result<T> = std::result::Result<T, BlobError>;
