//! Stamps the service API version on every request.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::Response;
use crate::context::Context;
use crate::error::{PipelineError, Result};
use crate::pipeline::{Next, Policy};
use crate::request::Request;

/// Where the API version goes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApiVersionLocation {
    #[default]
    Header,
    QueryParameter,
}

/// API version settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiVersionOptions {
    #[serde(default)]
    pub location: ApiVersionLocation,
    /// Header or query parameter name (`x-ms-version`, `api-version`).
    pub name: String,
    pub version: String,
}

impl ApiVersionOptions {
    pub fn header(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            location: ApiVersionLocation::Header,
            name: name.into(),
            version: version.into(),
        }
    }

    pub fn query_parameter(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            location: ApiVersionLocation::QueryParameter,
            name: name.into(),
            version: version.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ApiVersionPolicy {
    options: ApiVersionOptions,
}

impl ApiVersionPolicy {
    pub fn new(options: ApiVersionOptions) -> Result<Self> {
        if options.name.trim().is_empty() {
            return Err(PipelineError::InvalidConfig(
                "api version name is empty".into(),
            ));
        }
        Ok(Self { options })
    }

    pub fn options(&self) -> &ApiVersionOptions {
        &self.options
    }
}

#[async_trait]
impl Policy for ApiVersionPolicy {
    fn name(&self) -> &'static str {
        "api-version"
    }

    async fn process(
        &self,
        ctx: &Context,
        request: &mut Request,
        next: Next<'_>,
    ) -> Result<Response> {
        let ApiVersionOptions {
            location,
            name,
            version,
        } = &self.options;
        match location {
            ApiVersionLocation::Header => request.append_header(name, version)?,
            ApiVersionLocation::QueryParameter => request.set_query_parameter(name, version)?,
        }
        next.run(ctx, request).await
    }
}
