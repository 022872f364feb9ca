//! Mock framework collaborators for endpoint testing.

use crate::config::EndpointConfiguration;
use crate::context::{ErrorOutcome, FailureContext, MessageContext};
use crate::endpoint::{EndpointStartup, MessagePipeline};
use crate::errors::BridgeError;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;

/// A pipeline that records everything forwarded to it.
#[derive(Debug, Default)]
pub struct MockPipeline {
    messages: Mutex<Vec<MessageContext>>,
    failures: Mutex<Vec<FailureContext>>,
    message_error: Mutex<Option<String>>,
    failure_outcome: Mutex<ErrorOutcome>,
}

impl MockPipeline {
    /// Creates a pipeline that accepts every message and reports failures
    /// as handled.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent `push_message` fail with the given reason.
    pub fn fail_messages_with(&self, reason: impl Into<String>) {
        *self.message_error.lock() = Some(reason.into());
    }

    /// Sets the outcome returned from `push_failure`.
    pub fn set_failure_outcome(&self, outcome: ErrorOutcome) {
        *self.failure_outcome.lock() = outcome;
    }

    /// Returns the messages forwarded so far.
    #[must_use]
    pub fn messages(&self) -> Vec<MessageContext> {
        self.messages.lock().clone()
    }

    /// Returns the failures forwarded so far.
    #[must_use]
    pub fn failures(&self) -> Vec<FailureContext> {
        self.failures.lock().clone()
    }

    /// Returns the number of messages forwarded so far.
    #[must_use]
    pub fn message_count(&self) -> usize {
        self.messages.lock().len()
    }
}

#[async_trait]
impl MessagePipeline for MockPipeline {
    async fn push_message(&self, message: MessageContext) -> Result<(), BridgeError> {
        self.messages.lock().push(message);
        if let Some(reason) = self.message_error.lock().clone() {
            return Err(BridgeError::pipeline(reason));
        }
        Ok(())
    }

    async fn push_failure(&self, failure: FailureContext) -> Result<ErrorOutcome, BridgeError> {
        self.failures.lock().push(failure);
        Ok(*self.failure_outcome.lock())
    }
}

/// A startup that counts invocations and tracks concurrent overlap.
#[derive(Debug)]
pub struct CountingStartup {
    pipeline: Arc<dyn MessagePipeline>,
    starts: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    delay: Option<Duration>,
}

impl CountingStartup {
    /// Creates a counting startup returning the given pipeline.
    #[must_use]
    pub fn new(pipeline: Arc<dyn MessagePipeline>) -> Self {
        Self {
            pipeline,
            starts: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
            delay: None,
        }
    }

    /// Holds each startup open for the given duration, widening race windows.
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Returns how many times `start` was invoked.
    #[must_use]
    pub fn start_count(&self) -> usize {
        self.starts.load(Ordering::SeqCst)
    }

    /// Returns the maximum number of startups ever in flight at once.
    #[must_use]
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EndpointStartup for CountingStartup {
    async fn start(
        &self,
        _configuration: EndpointConfiguration,
    ) -> Result<Arc<dyn MessagePipeline>, BridgeError> {
        self.starts.fetch_add(1, Ordering::SeqCst);
        let now_in_flight = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now_in_flight, Ordering::SeqCst);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        Ok(Arc::clone(&self.pipeline))
    }
}

/// A startup that fails a fixed number of times before succeeding.
#[derive(Debug)]
pub struct FailingStartup {
    pipeline: Arc<dyn MessagePipeline>,
    failures_remaining: AtomicUsize,
    starts: AtomicUsize,
}

impl FailingStartup {
    /// Creates a startup that fails `failures` times, then succeeds.
    #[must_use]
    pub fn new(pipeline: Arc<dyn MessagePipeline>, failures: usize) -> Self {
        Self {
            pipeline,
            failures_remaining: AtomicUsize::new(failures),
            starts: AtomicUsize::new(0),
        }
    }

    /// Returns how many times `start` was invoked.
    #[must_use]
    pub fn start_count(&self) -> usize {
        self.starts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EndpointStartup for FailingStartup {
    async fn start(
        &self,
        _configuration: EndpointConfiguration,
    ) -> Result<Arc<dyn MessagePipeline>, BridgeError> {
        self.starts.fetch_add(1, Ordering::SeqCst);

        let failed = self
            .failures_remaining
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |remaining| {
                remaining.checked_sub(1)
            })
            .is_ok();
        if failed {
            return Err(BridgeError::startup("induced startup failure"));
        }
        Ok(Arc::clone(&self.pipeline))
    }
}

/// A startup that blocks until released, for driving lock-wait scenarios.
#[derive(Debug)]
pub struct SlowStartup {
    pipeline: Arc<dyn MessagePipeline>,
    entered: Semaphore,
    gate: Semaphore,
    starts: AtomicUsize,
}

impl SlowStartup {
    /// Creates a gated startup returning the given pipeline.
    #[must_use]
    pub fn new(pipeline: Arc<dyn MessagePipeline>) -> Self {
        Self {
            pipeline,
            entered: Semaphore::new(0),
            gate: Semaphore::new(0),
            starts: AtomicUsize::new(0),
        }
    }

    /// Waits until a startup attempt is in flight.
    pub async fn entered(&self) {
        if let Ok(permit) = self.entered.acquire().await {
            permit.forget();
        }
    }

    /// Lets one in-flight startup finish.
    pub fn release(&self) {
        self.gate.add_permits(1);
    }

    /// Returns how many times `start` was invoked.
    #[must_use]
    pub fn start_count(&self) -> usize {
        self.starts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EndpointStartup for SlowStartup {
    async fn start(
        &self,
        _configuration: EndpointConfiguration,
    ) -> Result<Arc<dyn MessagePipeline>, BridgeError> {
        self.starts.fetch_add(1, Ordering::SeqCst);
        self.entered.add_permits(1);

        if let Ok(permit) = self.gate.acquire().await {
            permit.forget();
        }
        Ok(Arc::clone(&self.pipeline))
    }
}
