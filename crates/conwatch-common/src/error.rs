//! Unified error types for the Conwatch workspace.
//!
//! No variant here is fatal to the process: the poller retries after
//! `RuntimeUnavailable`, a `SessionWriteFailed` ends only the session it
//! names, and `MalformedRecord` skips a single container entry.

use thiserror::Error;

/// Top-level error type shared across the workspace.
#[derive(Debug, Error)]
pub enum ConwatchError {
    /// The container runtime could not be queried.
    #[error("container runtime unavailable: {message}")]
    RuntimeUnavailable {
        /// Description of the underlying transport or exec failure.
        message: String,
    },

    /// Writing to an observer's connection failed.
    #[error("session {session} write failed: {message}")]
    SessionWriteFailed {
        /// Identifier of the session whose connection broke.
        session: u64,
        /// Description of the write failure.
        message: String,
    },

    /// A container record from the runtime lacks expected fields.
    #[error("malformed runtime record: {message}")]
    MalformedRecord {
        /// Description of the missing or invalid field.
        message: String,
    },

    /// A configuration value is invalid.
    #[error("invalid configuration: {message}")]
    Config {
        /// Description of the invalid configuration.
        message: String,
    },

    /// Serialization or deserialization failed.
    #[error("serialization error: {source}")]
    Serialization {
        /// Underlying serialization error.
        #[from]
        source: serde_json::Error,
    },
}

/// Convenience alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, ConwatchError>;
