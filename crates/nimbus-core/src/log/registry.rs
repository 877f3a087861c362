//! Classification registry and the log dispatch engine.
//!
//! The registry holds two independently replaceable slots: the classification
//! filter and the callback. Each slot is an [`ArcSwapOption`], so registration
//! is a single atomic pointer swap and never blocks a concurrent dispatch.
//! The dispatcher loads both slots once at the start of a decision and works
//! only on that snapshot.

use std::fmt;
use std::sync::{Arc, LazyLock};

use arc_swap::ArcSwapOption;

use super::classification::Classification;
use super::filter::ClassificationFilter;

type CallbackFn = dyn Fn(Classification, &[u8]) + Send + Sync;

/// User function receiving log messages.
///
/// The message slice is only valid for the duration of the call.
pub struct LogCallback {
    f: Box<CallbackFn>,
}

impl LogCallback {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(Classification, &[u8]) + Send + Sync + 'static,
    {
        Self { f: Box::new(f) }
    }

    /// A callback that forwards every message to a `tracing` debug event
    /// with target `nimbus::log`.
    pub fn tracing() -> Self {
        Self::new(|classification, message| {
            let text = String::from_utf8_lossy(message);
            tracing::debug!(target: "nimbus::log", %classification, "{text}");
        })
    }

    fn call(&self, classification: Classification, message: &[u8]) {
        (self.f)(classification, message)
    }
}

impl fmt::Debug for LogCallback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogCallback").finish_non_exhaustive()
    }
}

static GLOBAL: LazyLock<Arc<LogRegistry>> = LazyLock::new(|| Arc::new(LogRegistry::new()));

/// Holder of the registered filter and callback.
///
/// Starts with neither registered. Most code uses the process-wide instance
/// from [`LogRegistry::global`]; private instances are useful for tests and
/// for embedders that want isolated log routing.
#[derive(Default)]
pub struct LogRegistry {
    filter: ArcSwapOption<ClassificationFilter>,
    callback: ArcSwapOption<LogCallback>,
}

impl LogRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide registry.
    pub fn global() -> Arc<LogRegistry> {
        Arc::clone(&GLOBAL)
    }

    /// Install a classification filter, or clear it with `None`.
    ///
    /// The registry keeps a shared reference to the filter; it never copies
    /// or modifies its entries. The previous filter is released and not
    /// consulted again.
    pub fn set_classifications(&self, filter: Option<Arc<ClassificationFilter>>) {
        self.filter.store(filter);
    }

    /// Install a callback, or clear it with `None`. Without a callback nothing
    /// is ever emitted, whatever the filter says.
    pub fn set_callback(&self, callback: Option<Arc<LogCallback>>) {
        self.callback.store(callback);
    }

    /// The currently registered filter.
    pub fn classifications(&self) -> Option<Arc<ClassificationFilter>> {
        self.filter.load_full()
    }

    pub fn has_callback(&self) -> bool {
        self.callback.load().is_some()
    }

    /// Whether a message of `classification` would currently be emitted.
    ///
    /// Lets callers skip formatting a message body nobody will receive.
    pub fn should_log(&self, classification: Classification) -> bool {
        self.dispatch(false, classification, &[])
    }

    /// Emit `message` if `classification` currently passes; returns whether
    /// the callback was invoked.
    ///
    /// The callback runs synchronously on the calling thread. Panics raised
    /// by the callback are not caught.
    pub fn write(&self, classification: Classification, message: &[u8]) -> bool {
        self.dispatch(true, classification, message)
    }

    fn dispatch(&self, log_it: bool, classification: Classification, message: &[u8]) -> bool {
        // Snapshot both slots once; a concurrent swap only affects later calls.
        let callback = self.callback.load();
        let filter = self.filter.load();

        let Some(callback) = &*callback else {
            return false;
        };

        let allowed = match &*filter {
            None => true,
            Some(filter) => filter.contains(classification),
        };

        if allowed && log_it {
            callback.call(classification, message);
        }
        allowed
    }
}

impl fmt::Debug for LogRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogRegistry")
            .field("filter", &self.filter.load_full())
            .field("has_callback", &self.has_callback())
            .finish()
    }
}
