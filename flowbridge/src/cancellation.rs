//! Cooperative cancellation for host invocations.
//!
//! The host runtime hands each invocation a cancellation signal. Only the
//! wait for the initialization lock observes it; once endpoint startup has
//! begun it always runs to completion or fails on its own.

use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

/// Token for observing a host-supplied cancellation signal.
///
/// Cancellation is idempotent: only the first reason is stored. The token
/// can be polled synchronously with [`is_cancelled`](Self::is_cancelled) or
/// awaited with [`cancelled`](Self::cancelled).
pub struct CancellationToken {
    cancelled: AtomicBool,
    reason: Mutex<Option<String>>,
    notify: Notify,
}

impl std::fmt::Debug for CancellationToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CancellationToken")
            .field("cancelled", &self.cancelled.load(Ordering::SeqCst))
            .field("reason", &self.reason.lock())
            .finish()
    }
}

impl CancellationToken {
    /// Creates a new cancellation token.
    #[must_use]
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Returns true if cancellation has been requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Returns the cancellation reason if cancelled.
    #[must_use]
    pub fn reason(&self) -> Option<String> {
        self.reason.lock().clone()
    }

    /// Requests cancellation with a reason.
    ///
    /// This is idempotent - only the first reason is stored.
    pub fn cancel(&self, reason: impl Into<String>) {
        let reason = reason.into();

        if !self.cancelled.swap(true, Ordering::SeqCst) {
            *self.reason.lock() = Some(reason);
        }
        self.notify.notify_waiters();
    }

    /// Resolves once cancellation has been requested.
    ///
    /// Resolves immediately if the token is already cancelled.
    pub async fn cancelled(&self) {
        loop {
            if self.is_cancelled() {
                return;
            }
            let notified = self.notify.notified();
            tokio::pin!(notified);
            // Register the waiter before re-checking so a cancel between the
            // check and the wait cannot be missed.
            notified.as_mut().enable();
            if self.is_cancelled() {
                return;
            }
            notified.await;
        }
    }
}

impl Default for CancellationToken {
    fn default() -> Self {
        Self {
            cancelled: AtomicBool::new(false),
            reason: Mutex::new(None),
            notify: Notify::new(),
        }
    }
}
