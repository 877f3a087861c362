//! Test doubles shared by the unit tests of this crate.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::Response;
use crate::context::Context;
use crate::error::{PipelineError, Result};
use crate::pipeline::{Next, Policy, Transport};
use crate::request::Request;

/// Ordered record of what ran.
#[derive(Clone, Default)]
pub(crate) struct Journal(Arc<Mutex<Vec<String>>>);

impl Journal {
    pub(crate) fn push(&self, entry: impl Into<String>) {
        self.0.lock().unwrap().push(entry.into());
    }

    pub(crate) fn entries(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }
}

/// Policy that journals `<label>:down` before delegating and `<label>:up`
/// or `<label>:err` afterwards, optionally appending a header.
pub(crate) struct Recorder {
    label: &'static str,
    journal: Journal,
    header: Option<(&'static str, &'static str)>,
}

impl Recorder {
    pub(crate) fn new(label: &'static str, journal: Journal) -> Self {
        Self {
            label,
            journal,
            header: None,
        }
    }

    pub(crate) fn with_header(mut self, name: &'static str, value: &'static str) -> Self {
        self.header = Some((name, value));
        self
    }
}

#[async_trait]
impl Policy for Recorder {
    fn name(&self) -> &'static str {
        "recorder"
    }

    async fn process(
        &self,
        ctx: &Context,
        request: &mut Request,
        next: Next<'_>,
    ) -> Result<Response> {
        self.journal.push(format!("{}:down", self.label));
        if let Some((name, value)) = self.header {
            request.append_header(name, value)?;
        }
        let outcome = next.run(ctx, request).await;
        let suffix = if outcome.is_ok() { "up" } else { "err" };
        self.journal.push(format!("{}:{suffix}", self.label));
        outcome
    }
}

/// One scripted transport outcome.
pub(crate) enum Step {
    Respond(Response),
    Fail(fn() -> PipelineError),
}

/// Transport replaying scripted outcomes; answers `200` once the script
/// runs out. Keeps a copy of every request it was handed.
pub(crate) struct StubTransport {
    steps: Mutex<VecDeque<Step>>,
    calls: Arc<AtomicUsize>,
    requests: Arc<Mutex<Vec<Request>>>,
    journal: Option<Journal>,
}

impl StubTransport {
    pub(crate) fn new(statuses: impl IntoIterator<Item = u16>) -> Self {
        Self::with_steps(
            statuses
                .into_iter()
                .map(|s| Step::Respond(Response::with_status(s))),
        )
    }

    pub(crate) fn with_steps(steps: impl IntoIterator<Item = Step>) -> Self {
        Self {
            steps: Mutex::new(steps.into_iter().collect()),
            calls: Arc::new(AtomicUsize::new(0)),
            requests: Arc::new(Mutex::new(Vec::new())),
            journal: None,
        }
    }

    pub(crate) fn with_journal(mut self, journal: Journal) -> Self {
        self.journal = Some(journal);
        self
    }

    pub(crate) fn calls(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.calls)
    }

    pub(crate) fn requests(&self) -> Arc<Mutex<Vec<Request>>> {
        Arc::clone(&self.requests)
    }
}

#[async_trait]
impl Transport for StubTransport {
    fn name(&self) -> &'static str {
        "stub"
    }

    async fn send(&self, _ctx: &Context, request: &Request) -> Result<Response> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request.clone());
        if let Some(journal) = &self.journal {
            journal.push("transport");
        }
        let step = self.steps.lock().unwrap().pop_front();
        match step {
            Some(Step::Respond(response)) => Ok(response),
            Some(Step::Fail(make)) => Err(make()),
            None => Ok(Response::with_status(200)),
        }
    }
}
