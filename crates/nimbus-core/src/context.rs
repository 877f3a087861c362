//! Per-call context: an optional deadline and a cancellation token.
//!
//! Nothing in the pipeline engine itself looks at the context. Policies that
//! wait (the retry backoff and the transport) are expected to honor it.

use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::error::{PipelineError, Result};

/// Deadline and cancellation state for one pipeline run.
///
/// Clones share the same cancellation token.
#[derive(Debug, Clone, Default)]
pub struct Context {
    deadline: Option<Instant>,
    cancel: CancellationToken,
}

impl Context {
    /// A context with no deadline.
    pub fn new() -> Self {
        Self::default()
    }

    /// A context expiring `timeout` from now. A timeout too large to
    /// represent as an instant means no deadline.
    pub fn with_timeout(timeout: Duration) -> Self {
        match Instant::now().checked_add(timeout) {
            Some(deadline) => Self::with_deadline(deadline),
            None => Self::new(),
        }
    }

    pub fn with_deadline(deadline: Instant) -> Self {
        Self {
            deadline: Some(deadline),
            cancel: CancellationToken::new(),
        }
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Time left before the deadline; `None` when there is no deadline.
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|d| d.saturating_duration_since(Instant::now()))
    }

    /// Whether the deadline would pass within `wait`.
    pub fn expires_within(&self, wait: Duration) -> bool {
        self.remaining().is_some_and(|left| left <= wait)
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Resolves when [`cancel`](Self::cancel) is called on this context or a clone.
    pub async fn cancelled(&self) {
        self.cancel.cancelled().await
    }

    /// `Err(Cancelled)` or `Err(Timeout)` if the context can no longer be
    /// used to start work.
    pub fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            return Err(PipelineError::Cancelled);
        }
        if self.deadline.is_some_and(|d| d <= Instant::now()) {
            return Err(PipelineError::Timeout);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_context_never_expires() {
        let ctx = Context::new();
        assert!(ctx.deadline().is_none());
        assert!(ctx.remaining().is_none());
        assert!(!ctx.expires_within(Duration::from_secs(3600)));
        assert!(ctx.check().is_ok());
    }

    #[tokio::test]
    async fn deadline_in_the_past_has_expired() {
        let ctx = Context::with_deadline(Instant::now() - Duration::from_millis(1));
        assert!(matches!(ctx.check(), Err(PipelineError::Timeout)));
        assert_eq!(ctx.remaining(), Some(Duration::ZERO));
    }

    #[tokio::test]
    async fn expires_within_compares_remaining_time() {
        let ctx = Context::with_timeout(Duration::from_secs(10));
        assert!(ctx.expires_within(Duration::from_secs(60)));
        assert!(!ctx.expires_within(Duration::from_millis(10)));
    }

    #[tokio::test]
    async fn unrepresentable_timeout_means_no_deadline() {
        for timeout in [Duration::MAX, Duration::from_secs(u64::MAX)] {
            let ctx = Context::with_timeout(timeout);
            assert!(ctx.deadline().is_none());
            assert!(ctx.check().is_ok());
            assert!(!ctx.expires_within(Duration::from_secs(3600)));
        }
    }

    #[tokio::test]
    async fn cancellation_is_shared_by_clones() {
        let ctx = Context::new();
        let clone = ctx.clone();
        clone.cancel();
        assert!(ctx.is_cancelled());
        assert!(matches!(ctx.check(), Err(PipelineError::Cancelled)));
        // Already cancelled, so this resolves immediately.
        ctx.cancelled().await;
    }
}
