//! Client pipeline options and canonical pipeline assembly.
//!
//! Every section has serde defaults, so an empty document is valid:
//!
//! ```toml
//! [api_version]
//! location = "header"
//! name = "x-ms-version"
//! version = "2019-02-02"
//!
//! [telemetry]
//! application_id = "my-app"
//!
//! [retry]
//! max_retries = 2
//! status_codes = [429, 503]
//!
//! [transport]
//! timeout_secs = 30
//! ```

use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;
use crate::log::LogRegistry;
use crate::pipeline::{Pipeline, Transport};
use crate::policy::{
    ApiVersionOptions, ApiVersionPolicy, Credential, CredentialPolicy, LoggingPolicy,
    RetryOptions, RetryPolicy, TelemetryOptions, TelemetryPolicy, TransportOptions,
};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineOptions {
    /// API version stamping; no policy is added when absent.
    pub api_version: Option<ApiVersionOptions>,
    pub telemetry: TelemetryOptions,
    pub retry: RetryOptions,
    pub transport: TransportOptions,
}

impl PipelineOptions {
    pub fn from_json_str(s: &str) -> Result<Self> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn from_toml_str(s: &str) -> Result<Self> {
        Ok(toml::from_str(s)?)
    }

    /// Load from a `.json` file, or TOML for any other extension.
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        debug!(path = %path.display(), json = is_json, "loading pipeline options");
        if is_json {
            Self::from_json_str(&raw)
        } else {
            Self::from_toml_str(&raw)
        }
    }

    /// Assemble the canonical pipeline: api-version (when configured),
    /// telemetry, retry, credential, logging, then `transport`.
    ///
    /// Retry and logging report to `registry`.
    pub fn build_pipeline(
        &self,
        component: &str,
        version: &str,
        credential: Arc<dyn Credential>,
        transport: Arc<dyn Transport>,
        registry: Arc<LogRegistry>,
    ) -> Result<Pipeline> {
        let mut builder = Pipeline::builder();
        if let Some(api_version) = &self.api_version {
            builder = builder.policy(ApiVersionPolicy::new(api_version.clone())?);
        }
        let pipeline = builder
            .policy(TelemetryPolicy::new(component, version, &self.telemetry)?)
            .policy(RetryPolicy::with_registry(
                self.retry.clone(),
                Arc::clone(&registry),
            ))
            .policy(CredentialPolicy::new(credential))
            .policy(LoggingPolicy::with_registry(registry))
            .shared_transport(transport);
        debug!(policies = ?pipeline.names(), "pipeline assembled");
        Ok(pipeline)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Context;
    use crate::error::PipelineError;
    use crate::policy::{AnonymousCredential, ApiVersionLocation, StaticTokenCredential};
    use crate::request::Request;
    use crate::testing::StubTransport;
    use nimbus_platform::Method;
    use std::io::Write;

    #[test]
    fn empty_documents_give_defaults() {
        assert_eq!(PipelineOptions::from_json_str("{}").unwrap(), PipelineOptions::default());
        assert_eq!(PipelineOptions::from_toml_str("").unwrap(), PipelineOptions::default());
    }

    #[test]
    fn toml_sections() {
        let opts = PipelineOptions::from_toml_str(
            r#"
            [api_version]
            location = "query_parameter"
            name = "api-version"
            version = "7.0"

            [telemetry]
            application_id = "demo"

            [retry]
            max_retries = 2
            status_codes = [503]
            "#,
        )
        .unwrap();
        let api = opts.api_version.unwrap();
        assert_eq!(api.location, ApiVersionLocation::QueryParameter);
        assert_eq!(opts.telemetry.application_id.as_deref(), Some("demo"));
        assert_eq!(opts.retry.max_retries, 2);
        assert_eq!(opts.retry.retry_delay_ms, 4_000);
        assert_eq!(opts.retry.status_codes, vec![503]);
        assert_eq!(opts.transport, TransportOptions::default());
    }

    #[test]
    fn json_sections() {
        let opts = PipelineOptions::from_json_str(
            r#"{"retry": {"max_retry_delay_ms": 10}, "transport": {"timeout_secs": 3}}"#,
        )
        .unwrap();
        assert_eq!(opts.retry.max_retry_delay_ms, 10);
        assert_eq!(opts.transport.timeout_secs, 3);
        assert!(opts.api_version.is_none());
    }

    #[test]
    fn malformed_input_is_reported() {
        assert!(matches!(
            PipelineOptions::from_json_str("{"),
            Err(PipelineError::Json(_))
        ));
        assert!(matches!(
            PipelineOptions::from_toml_str("retry = 3"),
            Err(PipelineError::Toml(_))
        ));
    }

    #[test]
    fn from_file_picks_format_by_extension() {
        let dir = tempfile::tempdir().unwrap();

        let json_path = dir.path().join("opts.json");
        std::fs::File::create(&json_path)
            .unwrap()
            .write_all(br#"{"retry": {"max_retries": 1}}"#)
            .unwrap();
        assert_eq!(PipelineOptions::from_file(&json_path).unwrap().retry.max_retries, 1);

        let toml_path = dir.path().join("opts.toml");
        std::fs::write(&toml_path, "[retry]\nmax_retries = 7\n").unwrap();
        assert_eq!(PipelineOptions::from_file(&toml_path).unwrap().retry.max_retries, 7);

        let missing = dir.path().join("missing.toml");
        assert!(matches!(
            PipelineOptions::from_file(&missing),
            Err(PipelineError::Io(_))
        ));
    }

    #[test]
    fn canonical_order() {
        let opts = PipelineOptions {
            api_version: Some(ApiVersionOptions::header("x-ms-version", "2019-02-02")),
            ..PipelineOptions::default()
        };
        let pipeline = opts
            .build_pipeline(
                "core",
                "1.0",
                Arc::new(AnonymousCredential),
                Arc::new(StubTransport::new([200])),
                Arc::new(LogRegistry::new()),
            )
            .unwrap();
        assert_eq!(
            pipeline.names(),
            vec!["api-version", "telemetry", "retry", "credential", "logging", "stub"]
        );

        let without_version = PipelineOptions::default()
            .build_pipeline(
                "core",
                "1.0",
                Arc::new(AnonymousCredential),
                Arc::new(StubTransport::new([200])),
                Arc::new(LogRegistry::new()),
            )
            .unwrap();
        assert_eq!(without_version.len(), 4);
    }

    #[test]
    fn invalid_telemetry_fails_assembly() {
        let opts = PipelineOptions {
            telemetry: TelemetryOptions {
                application_id: Some("x".repeat(40)),
            },
            ..PipelineOptions::default()
        };
        let err = opts
            .build_pipeline(
                "core",
                "1.0",
                Arc::new(AnonymousCredential),
                Arc::new(StubTransport::new([200])),
                Arc::new(LogRegistry::new()),
            )
            .unwrap_err();
        assert!(matches!(err, PipelineError::InvalidConfig(_)));
    }

    #[tokio::test]
    async fn assembled_pipeline_sends_expected_headers() {
        let transport = Arc::new(StubTransport::new([503, 200]));
        let seen = transport.requests();
        let opts = PipelineOptions {
            api_version: Some(ApiVersionOptions::header("x-ms-version", "2019-02-02")),
            retry: RetryOptions {
                retry_delay_ms: 1,
                ..RetryOptions::default()
            },
            ..PipelineOptions::default()
        };
        let pipeline = opts
            .build_pipeline(
                "core",
                "1.0",
                Arc::new(StaticTokenCredential::new("tok").unwrap()),
                transport,
                Arc::new(LogRegistry::new()),
            )
            .unwrap();

        let mut req = Request::new(Method::Get, "https://example.com").unwrap();
        let response = pipeline.run(&Context::new(), &mut req).await.unwrap();
        assert_eq!(response.status, 200);

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        for attempt in seen.iter() {
            let names: Vec<_> = attempt.headers().iter().map(|(n, _)| n.as_str()).collect();
            assert_eq!(names, vec!["x-ms-version", "User-Agent", "Authorization"]);
        }
    }
}
