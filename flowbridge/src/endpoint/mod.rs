//! Endpoint hosting and message forwarding.
//!
//! This module provides:
//! - The seams to the external messaging framework
//! - The cached endpoint host with double-checked lazy startup

mod host;
#[cfg(test)]
mod integration_tests;
mod seam;

pub use host::FunctionEndpoint;
pub use seam::{EndpointStartup, MessagePipeline};
