//! Sets the `User-Agent` header.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::Response;
use crate::context::Context;
use crate::error::{PipelineError, Result};
use crate::pipeline::{Next, Policy};
use crate::request::Request;

/// Longest application id accepted in the user agent.
pub const MAX_APPLICATION_ID_LEN: usize = 24;

const USER_AGENT_PREFIX: &str = "nimbus-rs";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TelemetryOptions {
    /// Prepended to the user agent, separated by a space.
    #[serde(default)]
    pub application_id: Option<String>,
}

/// Adds `User-Agent: [<application_id> ]nimbus-rs-<component>/<version>`.
#[derive(Debug, Clone)]
pub struct TelemetryPolicy {
    user_agent: String,
}

impl TelemetryPolicy {
    pub fn new(component: &str, version: &str, options: &TelemetryOptions) -> Result<Self> {
        let sdk = format!("{USER_AGENT_PREFIX}-{component}/{version}");
        let user_agent = match options.application_id.as_deref() {
            None | Some("") => sdk,
            Some(id) if id.chars().count() > MAX_APPLICATION_ID_LEN => {
                return Err(PipelineError::InvalidConfig(format!(
                    "application id is longer than {MAX_APPLICATION_ID_LEN} characters"
                )));
            }
            Some(id) => format!("{id} {sdk}"),
        };
        Ok(Self { user_agent })
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }
}

#[async_trait]
impl Policy for TelemetryPolicy {
    fn name(&self) -> &'static str {
        "telemetry"
    }

    async fn process(
        &self,
        ctx: &Context,
        request: &mut Request,
        next: Next<'_>,
    ) -> Result<Response> {
        request.append_header("User-Agent", &self.user_agent)?;
        next.run(ctx, request).await
    }
}
