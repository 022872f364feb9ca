//! The cached endpoint host: lazy startup plus message forwarding.

use super::seam::{EndpointStartup, MessagePipeline};
use crate::config::{ConfigurationFactory, EndpointConfiguration};
use crate::context::{ErrorOutcome, FailureContext, InvocationContext, MessageContext};
use crate::discovery::{DiscoveryOptions, ModuleScanner};
use crate::errors::BridgeError;
use std::sync::Arc;
use std::sync::OnceLock;
use tokio::sync::Mutex;
use tracing::{debug, info};

/// Hosts a messaging endpoint inside a serverless function runtime.
///
/// One instance is created per process and reused across concurrent
/// invocations. The first invocation builds the endpoint configuration, runs
/// module discovery, starts the endpoint, and publishes its pipeline handle;
/// every invocation after that forwards straight into the cached handle.
///
/// The handle transitions unset -> set exactly once. A failed startup
/// publishes nothing, so the next invocation retries from scratch.
pub struct FunctionEndpoint {
    startup: Arc<dyn EndpointStartup>,
    configuration_factory: Box<ConfigurationFactory>,
    scanner: ModuleScanner,
    /// The only shared mutable state: the set-once pipeline handle.
    pipeline: OnceLock<Arc<dyn MessagePipeline>>,
    /// Serializes the configure-discover-start sequence.
    init_lock: Mutex<()>,
}

impl std::fmt::Debug for FunctionEndpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FunctionEndpoint")
            .field("started", &self.is_started())
            .field("scanner", &self.scanner)
            .finish()
    }
}

impl FunctionEndpoint {
    /// Creates an endpoint host.
    ///
    /// `configuration_factory` is invoked with the triggering invocation's
    /// context at most once per successful startup.
    pub fn new<F>(
        startup: Arc<dyn EndpointStartup>,
        configuration_factory: F,
        discovery: DiscoveryOptions,
    ) -> Self
    where
        F: Fn(&InvocationContext) -> Result<EndpointConfiguration, BridgeError>
            + Send
            + Sync
            + 'static,
    {
        Self {
            startup,
            configuration_factory: Box::new(configuration_factory),
            scanner: ModuleScanner::new(discovery),
            pipeline: OnceLock::new(),
            init_lock: Mutex::new(()),
        }
    }

    /// Returns true if the endpoint has started and published its pipeline.
    #[must_use]
    pub fn is_started(&self) -> bool {
        self.pipeline.get().is_some()
    }

    /// Returns the pipeline handle, starting the endpoint on first use.
    ///
    /// Fast path: a published handle is returned without taking the lock.
    /// Slow path: the initialization lock is acquired (racing the caller's
    /// cancellation signal), the handle is re-checked, and if still unset
    /// the configure-discover-start sequence runs. At most one such sequence
    /// is ever in flight; concurrent callers either observe the published
    /// handle or block until the in-flight attempt finishes.
    pub async fn ensure_started(
        &self,
        ctx: &InvocationContext,
    ) -> Result<Arc<dyn MessagePipeline>, BridgeError> {
        if let Some(pipeline) = self.pipeline.get() {
            return Ok(Arc::clone(pipeline));
        }

        let _guard = tokio::select! {
            guard = self.init_lock.lock() => guard,
            () = ctx.cancellation().cancelled() => {
                let reason = ctx
                    .cancellation()
                    .reason()
                    .unwrap_or_else(|| "invocation cancelled".to_string());
                return Err(BridgeError::cancelled(reason));
            }
        };

        // Another caller may have finished startup while we waited.
        if let Some(pipeline) = self.pipeline.get() {
            return Ok(Arc::clone(pipeline));
        }

        ctx.try_emit_event("endpoint.starting", None);
        let configuration = (self.configuration_factory)(ctx)?;
        debug!(endpoint = configuration.endpoint_name(), "Configuration built");

        let summary = self.scanner.scan(ctx)?;
        debug!(
            loaded = summary.loaded,
            skipped = summary.skipped,
            failed = summary.failed,
            "Module discovery finished"
        );

        let endpoint_name = configuration.endpoint_name().to_string();
        let pipeline = match self.startup.start(configuration).await {
            Ok(pipeline) => pipeline,
            Err(err) => {
                ctx.try_emit_event(
                    "endpoint.start_failed",
                    Some(serde_json::json!({
                        "endpoint": endpoint_name,
                        "error": err.to_string(),
                    })),
                );
                return Err(err);
            }
        };

        // The publication point: the handle's only write, still under the lock.
        self.pipeline.set(Arc::clone(&pipeline)).ok();
        info!(endpoint = %endpoint_name, "Messaging endpoint started");
        ctx.try_emit_event(
            "endpoint.started",
            Some(serde_json::json!({"endpoint": endpoint_name})),
        );

        Ok(pipeline)
    }

    /// Forwards an inbound message into the pipeline, starting the endpoint
    /// first if needed.
    ///
    /// Pure pass-through: the pipeline's result or error is returned
    /// unchanged, with no retry or transformation at this layer.
    pub async fn process(
        &self,
        message: MessageContext,
        ctx: &InvocationContext,
    ) -> Result<(), BridgeError> {
        let pipeline = self.ensure_started(ctx).await?;

        ctx.try_emit_event(
            "message.forwarded",
            Some(serde_json::json!({"message_id": message.message_id})),
        );
        pipeline.push_message(message).await
    }

    /// Forwards a failed message into the pipeline's recoverability handling,
    /// starting the endpoint first if needed.
    ///
    /// Returns the framework's verdict unchanged.
    pub async fn process_failed(
        &self,
        failure: FailureContext,
        ctx: &InvocationContext,
    ) -> Result<ErrorOutcome, BridgeError> {
        let pipeline = self.ensure_started(ctx).await?;

        ctx.try_emit_event(
            "message.failure_forwarded",
            Some(serde_json::json!({
                "message_id": failure.message.message_id,
                "processing_attempts": failure.processing_attempts,
            })),
        );
        pipeline.push_failure(failure).await
    }
}
