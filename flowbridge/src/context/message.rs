//! Inbound message and failed-message payloads.
//!
//! These are caller-supplied values forwarded verbatim into the pipeline
//! handle; the adapter never inspects or transforms the body.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// An inbound message as delivered by the host trigger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageContext {
    /// Transport-level message ID.
    pub message_id: String,
    /// Transport headers.
    pub headers: HashMap<String, String>,
    /// Opaque message body.
    pub body: Vec<u8>,
    /// When the host handed the message to the adapter.
    pub received_at: DateTime<Utc>,
}

impl MessageContext {
    /// Creates a new message context with the current receive time.
    #[must_use]
    pub fn new(message_id: impl Into<String>, body: impl Into<Vec<u8>>) -> Self {
        Self {
            message_id: message_id.into(),
            headers: HashMap::new(),
            body: body.into(),
            received_at: Utc::now(),
        }
    }

    /// Adds a transport header.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Replaces the transport headers.
    #[must_use]
    pub fn with_headers(mut self, headers: HashMap<String, String>) -> Self {
        self.headers = headers;
        self
    }

    /// Looks up a transport header.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(String::as_str)
    }
}

/// A message the pipeline failed to process, plus the failure details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureContext {
    /// The original message.
    pub message: MessageContext,
    /// Description of the processing failure.
    pub error: String,
    /// How many times processing has been attempted.
    pub processing_attempts: u32,
}

impl FailureContext {
    /// Creates a failure context for a first failed attempt.
    #[must_use]
    pub fn new(message: MessageContext, error: impl Into<String>) -> Self {
        Self {
            message,
            error: error.into(),
            processing_attempts: 1,
        }
    }

    /// Sets the processing attempt count.
    #[must_use]
    pub fn with_processing_attempts(mut self, attempts: u32) -> Self {
        self.processing_attempts = attempts;
        self
    }
}

/// Outcome of failed-message handling, returned by the external framework
/// unchanged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorOutcome {
    /// The failure was handled; the host may complete the message.
    #[default]
    Handled,
    /// The framework asked the host to redeliver the message.
    RetryRequired,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_message_context_headers() {
        let message = MessageContext::new("m-1", b"payload".to_vec())
            .with_header("content-type", "application/json")
            .with_header("correlation-id", "c-42");

        assert_eq!(message.header("content-type"), Some("application/json"));
        assert_eq!(message.header("correlation-id"), Some("c-42"));
        assert_eq!(message.header("missing"), None);
    }

    #[test]
    fn test_failure_context_defaults_to_one_attempt() {
        let message = MessageContext::new("m-2", b"payload".to_vec());
        let failure = FailureContext::new(message, "handler threw");

        assert_eq!(failure.processing_attempts, 1);
        assert_eq!(failure.error, "handler threw");
    }

    #[test]
    fn test_failure_context_attempt_count() {
        let message = MessageContext::new("m-3", b"payload".to_vec());
        let failure = FailureContext::new(message, "handler threw").with_processing_attempts(4);

        assert_eq!(failure.processing_attempts, 4);
    }

    #[test]
    fn test_error_outcome_serde_round_trip() {
        let json = serde_json::to_string(&ErrorOutcome::RetryRequired).expect("serialize");
        assert_eq!(json, "\"retry_required\"");

        let outcome: ErrorOutcome = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(outcome, ErrorOutcome::RetryRequired);
    }
}
