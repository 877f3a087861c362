//! Authorization of outgoing requests.
//!
//! Acquiring tokens is out of scope here: a [`Credential`] only knows how to
//! decorate a request with whatever proof it already holds.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use crate::Response;
use crate::context::Context;
use crate::error::{PipelineError, Result};
use crate::pipeline::{Next, Policy};
use crate::request::Request;

/// Something that can authorize a request.
#[async_trait]
pub trait Credential: Send + Sync {
    /// Add authorization to `request`. Called once per attempt.
    async fn authorize(&self, ctx: &Context, request: &mut Request) -> Result<()>;
}

/// Leaves requests untouched (SAS URLs, public containers).
#[derive(Debug, Clone, Copy, Default)]
pub struct AnonymousCredential;

#[async_trait]
impl Credential for AnonymousCredential {
    async fn authorize(&self, _ctx: &Context, _request: &mut Request) -> Result<()> {
        Ok(())
    }
}

/// A pre-acquired bearer token.
#[derive(Clone)]
pub struct StaticTokenCredential {
    token: String,
}

impl StaticTokenCredential {
    pub fn new(token: impl Into<String>) -> Result<Self> {
        let token = token.into();
        if token.trim().is_empty() {
            return Err(PipelineError::InvalidConfig("token is empty".into()));
        }
        Ok(Self { token })
    }
}

impl fmt::Debug for StaticTokenCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StaticTokenCredential")
            .field("token", &"[redacted]")
            .finish()
    }
}

#[async_trait]
impl Credential for StaticTokenCredential {
    async fn authorize(&self, _ctx: &Context, request: &mut Request) -> Result<()> {
        request.append_header("Authorization", &format!("Bearer {}", self.token))
    }
}

/// Runs the credential before delegating.
pub struct CredentialPolicy {
    credential: Arc<dyn Credential>,
}

impl CredentialPolicy {
    pub fn new(credential: Arc<dyn Credential>) -> Self {
        Self { credential }
    }
}

impl fmt::Debug for CredentialPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialPolicy").finish_non_exhaustive()
    }
}

#[async_trait]
impl Policy for CredentialPolicy {
    fn name(&self) -> &'static str {
        "credential"
    }

    async fn process(
        &self,
        ctx: &Context,
        request: &mut Request,
        next: Next<'_>,
    ) -> Result<Response> {
        self.credential.authorize(ctx, request).await?;
        next.run(ctx, request).await
    }
}
