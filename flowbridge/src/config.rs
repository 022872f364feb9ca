//! Endpoint configuration produced by the caller-supplied factory.

use crate::context::InvocationContext;
use crate::errors::BridgeError;
use serde::{Deserialize, Serialize};

/// Configuration handed to the external framework's startup routine.
///
/// Produced at most once per process lifetime by the configuration factory
/// and immutable after creation. The settings bag is opaque to the adapter;
/// only the external framework interprets it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EndpointConfiguration {
    endpoint_name: String,
    settings: serde_json::Map<String, serde_json::Value>,
}

impl EndpointConfiguration {
    /// Creates a configuration for the named endpoint.
    #[must_use]
    pub fn new(endpoint_name: impl Into<String>) -> Self {
        Self {
            endpoint_name: endpoint_name.into(),
            settings: serde_json::Map::new(),
        }
    }

    /// Adds an opaque framework setting.
    #[must_use]
    pub fn with_setting(
        mut self,
        key: impl Into<String>,
        value: impl Into<serde_json::Value>,
    ) -> Self {
        self.settings.insert(key.into(), value.into());
        self
    }

    /// Returns the endpoint name.
    #[must_use]
    pub fn endpoint_name(&self) -> &str {
        &self.endpoint_name
    }

    /// Looks up a framework setting.
    #[must_use]
    pub fn setting(&self, key: &str) -> Option<&serde_json::Value> {
        self.settings.get(key)
    }

    /// Returns the full settings bag.
    #[must_use]
    pub fn settings(&self) -> &serde_json::Map<String, serde_json::Value> {
        &self.settings
    }
}

/// Caller-supplied factory producing the endpoint configuration from an
/// invocation context.
///
/// Invoked at most once per successful startup; a failure is surfaced to the
/// caller and the next invocation runs the factory again.
pub type ConfigurationFactory =
    dyn Fn(&InvocationContext) -> Result<EndpointConfiguration, BridgeError> + Send + Sync;
