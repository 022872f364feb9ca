//! Error types for the flowbridge adapter.
//!
//! The adapter surfaces exactly three kinds of failure to its callers:
//! cancellation while waiting to initialize, failure of the one-time startup
//! sequence, and whatever the external framework raises during forwarding.
//! Per-module discovery failures never escape the scan and are carried by
//! [`LoadError`] internally.

use thiserror::Error;

/// Boxed error surfaced verbatim from the external messaging framework.
pub type SourceError = Box<dyn std::error::Error + Send + Sync>;

/// The main error type for flowbridge operations.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// Cancellation was observed while waiting for the initialization lock.
    #[error("Initialization cancelled: {reason}")]
    Cancelled {
        /// Why the invocation was cancelled.
        reason: String,
    },

    /// The configuration factory failed to produce an endpoint configuration.
    #[error("Endpoint configuration failed: {0}")]
    Configuration(String),

    /// Endpoint startup failed; the handle stays unset and the next
    /// invocation retries from scratch.
    #[error("Endpoint startup failed: {source}")]
    Startup {
        /// The framework's startup failure.
        #[source]
        source: SourceError,
    },

    /// A forwarded message or failure raised inside the external pipeline.
    #[error("Pipeline error: {source}")]
    Pipeline {
        /// The framework's processing failure.
        #[source]
        source: SourceError,
    },

    /// Enumerating the binaries directory failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl BridgeError {
    /// Creates a cancellation error.
    #[must_use]
    pub fn cancelled(reason: impl Into<String>) -> Self {
        Self::Cancelled {
            reason: reason.into(),
        }
    }

    /// Creates a configuration-factory error.
    #[must_use]
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Wraps a framework startup failure.
    #[must_use]
    pub fn startup(source: impl Into<SourceError>) -> Self {
        Self::Startup {
            source: source.into(),
        }
    }

    /// Wraps a framework processing failure.
    #[must_use]
    pub fn pipeline(source: impl Into<SourceError>) -> Self {
        Self::Pipeline {
            source: source.into(),
        }
    }

    /// Returns true if this error is a cancellation.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }
}

/// A per-module failure during binaries-directory discovery.
///
/// These are recorded at debug level with the offending file name and the
/// scan continues; a single bad module never aborts discovery.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The module's identity header could not be read.
    #[error("Module header unreadable: {0}")]
    Io(#[from] std::io::Error),

    /// The file does not open with the module magic bytes.
    #[error("Not a module file: bad magic")]
    BadMagic,

    /// The file ended before the identity header was complete.
    #[error("Module header truncated")]
    TruncatedHeader,

    /// The header carries a format version this scanner does not understand.
    #[error("Unsupported module header version {0}")]
    UnsupportedVersion(u8),

    /// The module name in the header is not valid UTF-8.
    #[error("Module name is not valid UTF-8")]
    InvalidName,

    /// The load context refused to load the module.
    #[error("Load context rejected '{name}': {reason}")]
    Rejected {
        /// The module name from its identity header.
        name: String,
        /// Why the load context refused it.
        reason: String,
    },
}

impl LoadError {
    /// Creates a load-context rejection error.
    #[must_use]
    pub fn rejected(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Rejected {
            name: name.into(),
            reason: reason.into(),
        }
    }
}
