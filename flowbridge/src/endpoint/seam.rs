//! Seams to the external messaging framework.
//!
//! The transport, retry policy, serialization, and pipeline execution all
//! live behind these two traits; the adapter never reimplements them.

use crate::config::EndpointConfiguration;
use crate::context::{ErrorOutcome, FailureContext, MessageContext};
use crate::errors::BridgeError;
use async_trait::async_trait;
use std::sync::Arc;

/// The started endpoint's message pipeline.
///
/// Inbound messages and failures are injected through this handle, bypassing
/// the endpoint's own transport listener. The handle lives for the process
/// lifetime once published.
#[async_trait]
pub trait MessagePipeline: Send + Sync + std::fmt::Debug {
    /// Forwards an inbound message into the pipeline.
    async fn push_message(&self, message: MessageContext) -> Result<(), BridgeError>;

    /// Forwards a failed message into the pipeline's recoverability handling
    /// and returns the framework's verdict.
    async fn push_failure(&self, failure: FailureContext) -> Result<ErrorOutcome, BridgeError>;
}

/// Starts the external messaging endpoint.
#[async_trait]
pub trait EndpointStartup: Send + Sync {
    /// Starts the endpoint with the given configuration and returns its
    /// pipeline handle.
    ///
    /// Runs to completion or fails; the adapter never cancels an in-flight
    /// startup.
    async fn start(
        &self,
        configuration: EndpointConfiguration,
    ) -> Result<Arc<dyn MessagePipeline>, BridgeError>;
}
