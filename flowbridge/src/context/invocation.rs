//! The host-supplied per-invocation execution context.

use crate::cancellation::CancellationToken;
use crate::events::{get_event_sink, EventSink};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use uuid::Uuid;

/// Per-invocation data supplied by the host runtime.
///
/// Carries the invocation identity, the function application directory (from
/// which the binaries directory is resolved), the host's cancellation signal,
/// and an event sink for structured logging. The context is supplied fresh
/// for every call and is never owned by the adapter.
pub struct InvocationContext {
    /// Unique ID for this invocation.
    invocation_id: Uuid,
    /// Root directory of the deployed function application.
    function_app_dir: PathBuf,
    /// The host's cancellation signal for this invocation.
    cancellation: Arc<CancellationToken>,
    /// Event sink for emitting adapter events.
    event_sink: Arc<dyn EventSink>,
}

impl std::fmt::Debug for InvocationContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InvocationContext")
            .field("invocation_id", &self.invocation_id)
            .field("function_app_dir", &self.function_app_dir)
            .field("cancelled", &self.cancellation.is_cancelled())
            .finish()
    }
}

impl InvocationContext {
    /// Creates a new invocation context rooted at the given application
    /// directory, with a fresh invocation ID and the global event sink.
    #[must_use]
    pub fn new(function_app_dir: impl Into<PathBuf>) -> Self {
        Self {
            invocation_id: Uuid::new_v4(),
            function_app_dir: function_app_dir.into(),
            cancellation: CancellationToken::new(),
            event_sink: get_event_sink(),
        }
    }

    /// Sets the invocation ID.
    #[must_use]
    pub fn with_invocation_id(mut self, invocation_id: Uuid) -> Self {
        self.invocation_id = invocation_id;
        self
    }

    /// Sets the cancellation token.
    #[must_use]
    pub fn with_cancellation(mut self, cancellation: Arc<CancellationToken>) -> Self {
        self.cancellation = cancellation;
        self
    }

    /// Sets the event sink.
    #[must_use]
    pub fn with_event_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.event_sink = sink;
        self
    }

    /// Returns the invocation ID.
    #[must_use]
    pub fn invocation_id(&self) -> Uuid {
        self.invocation_id
    }

    /// Returns the function application directory.
    #[must_use]
    pub fn function_app_dir(&self) -> &Path {
        &self.function_app_dir
    }

    /// Returns the cancellation token.
    #[must_use]
    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancellation
    }

    /// Returns true if the invocation has been cancelled.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }

    /// Tries to emit an event through the context's sink.
    pub fn try_emit_event(&self, event_type: &str, data: Option<serde_json::Value>) {
        self.event_sink.try_emit(event_type, data);
    }
}
