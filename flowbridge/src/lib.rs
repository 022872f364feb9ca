//! # Flowbridge
//!
//! A thin adapter that hosts a message-pipeline endpoint inside a
//! host-managed serverless function runtime.
//!
//! The heavy lifting - transport, retry policy, serialization, pipeline
//! execution - belongs to the external messaging framework behind the
//! [`endpoint::EndpointStartup`] and [`endpoint::MessagePipeline`] seams.
//! Flowbridge contributes the pieces a serverless host needs around them:
//!
//! - **Lazy one-time startup**: the first invocation builds configuration,
//!   runs module discovery, and starts the endpoint; the pipeline handle is
//!   published once and reused by every later invocation
//! - **Message forwarding**: inbound messages and failed-message contexts
//!   pass through to the cached pipeline unchanged
//! - **Module discovery**: the binaries directory is scanned for extension
//!   modules, skipping platform-signed ones by a configurable allow-list
//! - **Cancellation handling**: a caller waiting on initialization honors
//!   the host's cancellation signal
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use flowbridge::prelude::*;
//!
//! // Created once per process, reused across invocations.
//! let endpoint = FunctionEndpoint::new(
//!     startup,
//!     |_ctx| Ok(EndpointConfiguration::new("orders")),
//!     DiscoveryOptions::new(load_context),
//! );
//!
//! // Per invocation:
//! endpoint.process(message, &ctx).await?;
//! ```

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    missing_docs,
    rust_2018_idioms
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod cancellation;
pub mod config;
pub mod context;
pub mod discovery;
pub mod endpoint;
pub mod errors;
pub mod events;
pub mod testing;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::cancellation::CancellationToken;
    pub use crate::config::{ConfigurationFactory, EndpointConfiguration};
    pub use crate::context::{ErrorOutcome, FailureContext, InvocationContext, MessageContext};
    pub use crate::discovery::{
        CollectingLoadContext, DiscoveryOptions, ModuleIdentity, ModuleLoadContext,
        ModuleScanner, ScanSummary, SignerAllowList, SignerToken,
    };
    pub use crate::endpoint::{EndpointStartup, FunctionEndpoint, MessagePipeline};
    pub use crate::errors::{BridgeError, LoadError};
    pub use crate::events::{
        get_event_sink, set_event_sink, EventSink, LoggingEventSink, NoOpEventSink,
    };
}
