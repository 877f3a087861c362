//! Policy chain and execution engine.
//!
//! A [`Pipeline`] is an ordered list of [`Policy`] objects followed by one
//! [`Transport`]. Running the pipeline hands the request to the first policy
//! together with a [`Next`] cursor over everything after it. Each policy may
//! modify the request, delegate through the cursor, post-process the
//! outcome, or return without delegating (short-circuit). Outcomes unwind
//! through the policies in reverse order.
//!
//! The transport is a separate trait with no cursor, so the terminal step can
//! never delegate and a pipeline cannot be built without one.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use crate::Response;
use crate::context::Context;
use crate::error::Result;
use crate::request::Request;

// ---------------------------------------------------------------------------
// Traits
// ---------------------------------------------------------------------------

/// One link in the pipeline.
///
/// The implementing struct holds the policy's configuration; `process` is
/// its behavior. Implementations must be safe to call concurrently from
/// independent runs.
#[async_trait]
pub trait Policy: Send + Sync {
    /// Short name used in logs and diagnostics.
    fn name(&self) -> &'static str;

    /// Handle `request`, usually by delegating to `next`.
    async fn process(
        &self,
        ctx: &Context,
        request: &mut Request,
        next: Next<'_>,
    ) -> Result<Response>;
}

/// The terminal step performing the remote exchange.
#[async_trait]
pub trait Transport: Send + Sync {
    fn name(&self) -> &'static str {
        "transport"
    }

    async fn send(&self, ctx: &Context, request: &Request) -> Result<Response>;
}

// ---------------------------------------------------------------------------
// Cursor
// ---------------------------------------------------------------------------

/// The remainder of the chain after the current policy.
///
/// `Next` is `Copy`, so a policy can run the rest of the chain more than
/// once (the retry policy does).
#[derive(Clone, Copy)]
pub struct Next<'a> {
    policies: &'a [Arc<dyn Policy>],
    transport: &'a dyn Transport,
}

impl<'a> Next<'a> {
    /// Run the rest of the chain.
    pub async fn run(self, ctx: &Context, request: &mut Request) -> Result<Response> {
        match self.policies.split_first() {
            Some((head, rest)) => {
                let next = Next {
                    policies: rest,
                    transport: self.transport,
                };
                head.process(ctx, request, next).await
            }
            None => self.transport.send(ctx, request).await,
        }
    }

    /// Number of policies left before the transport.
    pub fn remaining(&self) -> usize {
        self.policies.len()
    }
}

impl fmt::Debug for Next<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Next")
            .field("remaining", &self.remaining())
            .field("transport", &self.transport.name())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

/// A fixed, ordered chain of policies ending in a transport.
///
/// Built once per client with [`Pipeline::builder`]; immutable afterwards.
pub struct Pipeline {
    policies: Vec<Arc<dyn Policy>>,
    transport: Arc<dyn Transport>,
}

impl Pipeline {
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::default()
    }

    /// Send `request` through every policy and the transport.
    pub async fn run(&self, ctx: &Context, request: &mut Request) -> Result<Response> {
        let next = Next {
            policies: &self.policies,
            transport: self.transport.as_ref(),
        };
        next.run(ctx, request).await
    }

    /// Number of policies, not counting the transport.
    pub fn len(&self) -> usize {
        self.policies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.policies.is_empty()
    }

    /// Policy names in execution order, transport last.
    pub fn names(&self) -> Vec<&'static str> {
        self.policies
            .iter()
            .map(|p| p.name())
            .chain(std::iter::once(self.transport.name()))
            .collect()
    }
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("policies", &self.names())
            .finish()
    }
}

/// Appends policies in execution order; finishing with a transport yields
/// the [`Pipeline`].
#[derive(Default)]
pub struct PipelineBuilder {
    policies: Vec<Arc<dyn Policy>>,
}

impl PipelineBuilder {
    pub fn policy(self, policy: impl Policy + 'static) -> Self {
        self.shared_policy(Arc::new(policy))
    }

    /// Append a policy instance that is also held elsewhere.
    pub fn shared_policy(mut self, policy: Arc<dyn Policy>) -> Self {
        self.policies.push(policy);
        self
    }

    pub fn transport(self, transport: impl Transport + 'static) -> Pipeline {
        self.shared_transport(Arc::new(transport))
    }

    pub fn shared_transport(self, transport: Arc<dyn Transport>) -> Pipeline {
        Pipeline {
            policies: self.policies,
            transport,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PipelineError;
    use crate::testing::{Journal, Recorder, StubTransport};
    use nimbus_platform::Method;

    fn request() -> Request {
        Request::new(Method::Get, "https://example.com/").unwrap()
    }

    /// Returns a canned response without delegating.
    struct ShortCircuit(u16);

    #[async_trait]
    impl Policy for ShortCircuit {
        fn name(&self) -> &'static str {
            "short-circuit"
        }

        async fn process(&self, _: &Context, _: &mut Request, _: Next<'_>) -> Result<Response> {
            Ok(Response::with_status(self.0))
        }
    }

    /// Turns any response into an error.
    struct Reject;

    #[async_trait]
    impl Policy for Reject {
        fn name(&self) -> &'static str {
            "reject"
        }

        async fn process(
            &self,
            ctx: &Context,
            request: &mut Request,
            next: Next<'_>,
        ) -> Result<Response> {
            let response = next.run(ctx, request).await?;
            Err(PipelineError::Rejected {
                policy: "reject",
                reason: format!("status {}", response.status),
            })
        }
    }

    #[tokio::test]
    async fn policies_run_in_order_and_unwind_in_reverse() {
        let journal = Journal::default();
        let transport = StubTransport::new([200]).with_journal(journal.clone());
        let pipeline = Pipeline::builder()
            .policy(Recorder::new("a", journal.clone()))
            .policy(Recorder::new("b", journal.clone()))
            .transport(transport);

        let response = pipeline.run(&Context::new(), &mut request()).await.unwrap();
        assert_eq!(response.status, 200);
        assert_eq!(
            journal.entries(),
            vec!["a:down", "b:down", "transport", "b:up", "a:up"]
        );
    }

    #[tokio::test]
    async fn policies_see_earlier_mutations() {
        let journal = Journal::default();
        let transport = StubTransport::new([204]);
        let seen = transport.requests();
        let pipeline = Pipeline::builder()
            .policy(Recorder::new("a", journal.clone()).with_header("x-a", "1"))
            .policy(Recorder::new("b", journal).with_header("x-b", "2"))
            .transport(transport);

        pipeline.run(&Context::new(), &mut request()).await.unwrap();
        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(
            seen[0].headers(),
            &[("x-a".to_string(), "1".to_string()), ("x-b".to_string(), "2".to_string())]
        );
    }

    #[tokio::test]
    async fn short_circuit_skips_rest_of_chain() {
        let journal = Journal::default();
        let transport = StubTransport::new([200]).with_journal(journal.clone());
        let calls = transport.calls();
        let pipeline = Pipeline::builder()
            .policy(Recorder::new("a", journal.clone()))
            .policy(ShortCircuit(304))
            .policy(Recorder::new("c", journal.clone()))
            .transport(transport);

        let response = pipeline.run(&Context::new(), &mut request()).await.unwrap();
        assert_eq!(response.status, 304);
        assert_eq!(journal.entries(), vec!["a:down", "a:up"]);
        assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn transport_only_pipeline() {
        let pipeline = Pipeline::builder().transport(StubTransport::new([201]));
        assert!(pipeline.is_empty());
        assert_eq!(pipeline.names(), vec!["stub"]);
        let response = pipeline.run(&Context::new(), &mut request()).await.unwrap();
        assert_eq!(response.status, 201);
    }

    #[tokio::test]
    async fn failures_propagate_through_earlier_policies() {
        let journal = Journal::default();
        let pipeline = Pipeline::builder()
            .policy(Recorder::new("outer", journal.clone()))
            .policy(Reject)
            .transport(StubTransport::new([200]));

        let err = pipeline.run(&Context::new(), &mut request()).await.unwrap_err();
        assert!(matches!(err, PipelineError::Rejected { policy: "reject", .. }));
        assert_eq!(journal.entries(), vec!["outer:down", "outer:err"]);
    }

    #[tokio::test]
    async fn names_follow_assembly_order() {
        let journal = Journal::default();
        let pipeline = Pipeline::builder()
            .policy(Recorder::new("first", journal.clone()))
            .policy(Reject)
            .transport(StubTransport::new([200]));
        assert_eq!(pipeline.len(), 2);
        assert_eq!(pipeline.names(), vec!["recorder", "reject", "stub"]);
        assert!(format!("{pipeline:?}").contains("reject"));
    }

    #[tokio::test]
    async fn concurrent_runs_are_independent() {
        let transport = StubTransport::new([200; 8]);
        let calls = transport.calls();
        let pipeline = Arc::new(
            Pipeline::builder()
                .policy(Recorder::new("a", Journal::default()).with_header("x-a", "1"))
                .transport(transport),
        );

        let mut handles = Vec::new();
        for _ in 0..8 {
            let pipeline = Arc::clone(&pipeline);
            handles.push(tokio::spawn(async move {
                let mut req = request();
                let response = pipeline.run(&Context::new(), &mut req).await.unwrap();
                (response.status, req.headers().len())
            }));
        }
        for handle in handles {
            assert_eq!(handle.await.unwrap(), (200, 1));
        }
        assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 8);
    }
}
