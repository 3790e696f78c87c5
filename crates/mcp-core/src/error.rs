//! Error types for the MCP gateway.
//!
//! One error hierarchy is shared by every crate in the workspace. Errors carry
//! enough context (server, operation, path) to be logged without the caller
//! having to wrap them again.
//!
//! # Examples
//!
//! ```
//! use mcp_gateway_core::{Error, Result};
//!
//! fn require_namespace(name: &str) -> Result<()> {
//!     if name.is_empty() {
//!         return Err(Error::ConfigError {
//!             message: "namespace cannot be empty".to_string(),
//!         });
//!     }
//!     Ok(())
//! }
//!
//! let err = require_namespace("").unwrap_err();
//! assert!(err.is_config_error());
//! ```

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the MCP gateway.
#[derive(Error, Debug)]
pub enum Error {
    /// Backend MCP server connection failed.
    ///
    /// Raised when the child process cannot be spawned or the MCP handshake
    /// does not complete. Fatal at startup.
    #[error("MCP server connection failed: {server}")]
    ConnectionFailed {
        /// Namespace of the backend that failed to connect
        server: String,
        /// Underlying error cause
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Resource not found error.
    ///
    /// Used for unknown namespaces on invocation ("backend not found").
    #[error("Resource not found: {resource}")]
    ResourceNotFound {
        /// Identifier of the missing resource
        resource: String,
    },

    /// An operation name could not be split into namespace and local name.
    #[error("Invalid operation name: {name}")]
    InvalidOperationName {
        /// The offending name as received from the caller
        name: String,
    },

    /// Configuration error.
    ///
    /// Raised when configuration is invalid, missing required fields,
    /// or contains contradictory settings.
    #[error("Configuration error: {message}")]
    ConfigError {
        /// Description of the configuration problem
        message: String,
    },

    /// Timeout error.
    #[error("Operation timed out after {duration_secs}s: {operation}")]
    Timeout {
        /// Name of the operation that timed out
        operation: String,
        /// Duration in seconds before timeout occurred
        duration_secs: u64,
    },

    /// Serialization/deserialization error.
    #[error("Serialization error: {message}")]
    SerializationError {
        /// Description of the serialization failure
        message: String,
        /// Underlying serde error
        #[source]
        source: Option<serde_json::Error>,
    },

    /// A call forwarded to a backend or to the oracle failed.
    #[error("Execution error: {message}")]
    ExecutionError {
        /// Description of the failure
        message: String,
        /// Optional underlying error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The classification oracle returned nothing usable.
    #[error("Classification failed for '{operation}': {reason}")]
    ClassificationFailed {
        /// Operation whose response was being classified
        operation: String,
        /// Why the classification was rejected
        reason: String,
    },

    /// Reading or writing durable state failed.
    #[error("Storage error at {}: {source}", path.display())]
    StorageError {
        /// File involved in the failed operation
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Validation error for domain values.
    #[error("Validation error in {field}: {reason}")]
    ValidationError {
        /// The field that failed validation
        field: String,
        /// Detailed reason for the validation failure
        reason: String,
    },
}

impl Error {
    /// Returns `true` if this is a connection error.
    ///
    /// # Examples
    ///
    /// ```
    /// use mcp_gateway_core::Error;
    ///
    /// let err = Error::ConnectionFailed {
    ///     server: "ado".to_string(),
    ///     source: "connection refused".into(),
    /// };
    /// assert!(err.is_connection_error());
    /// ```
    #[must_use]
    pub const fn is_connection_error(&self) -> bool {
        matches!(self, Self::ConnectionFailed { .. })
    }

    /// Returns `true` if this is a resource not found error.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::ResourceNotFound { .. })
    }

    /// Returns `true` if the operation name could not be routed.
    #[must_use]
    pub const fn is_invalid_operation_name(&self) -> bool {
        matches!(self, Self::InvalidOperationName { .. })
    }

    /// Returns `true` if this is a configuration error.
    ///
    /// # Examples
    ///
    /// ```
    /// use mcp_gateway_core::Error;
    ///
    /// let err = Error::ConfigError {
    ///     message: "missing oracle.api_key".to_string(),
    /// };
    /// assert!(err.is_config_error());
    /// ```
    #[must_use]
    pub const fn is_config_error(&self) -> bool {
        matches!(self, Self::ConfigError { .. })
    }

    /// Returns `true` if this is a timeout error.
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    /// Returns `true` if this is an execution error.
    #[must_use]
    pub const fn is_execution_error(&self) -> bool {
        matches!(self, Self::ExecutionError { .. })
    }

    /// Returns `true` if the oracle output was rejected.
    #[must_use]
    pub const fn is_classification_error(&self) -> bool {
        matches!(self, Self::ClassificationFailed { .. })
    }

    /// Returns `true` if this is a storage error.
    #[must_use]
    pub const fn is_storage_error(&self) -> bool {
        matches!(self, Self::StorageError { .. })
    }

    /// Returns `true` if this is a validation error.
    #[must_use]
    pub const fn is_validation_error(&self) -> bool {
        matches!(self, Self::ValidationError { .. })
    }
}

/// Result type alias for gateway operations.
pub type Result<T> = std::result::Result<T, Error>;
