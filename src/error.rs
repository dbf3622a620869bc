//! Error types for storage-ops
//!
//! Provides the crate-wide error enum and the classification used by the
//! error boundary to route failures to the right diagnostic formatter.

use crate::api::errors::{ApiError, TransportError};
use crate::diagnostics::StackTrace;
use crate::domain::Operation;
use thiserror::Error;

/// Unified error type for storage-ops
#[derive(Error, Debug)]
pub enum Error {
    // =========================================================================
    // Internal Errors
    // =========================================================================
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Invariant violated by the caller
    #[error("BUG: {0}")]
    Bug(String),

    // =========================================================================
    // Input Errors
    // =========================================================================
    /// Malformed size, duration or version string supplied by an operator
    #[error("Invalid input: {0}")]
    UserInput(String),

    /// Malformed requirement string supplied by a programmer
    #[error("Invalid version requirement: {0}")]
    InvalidRequirement(String),

    #[error("{name} version {installed} does not satisfy requirement '{required}'")]
    DependencyVersion {
        name: String,
        installed: String,
        required: String,
    },

    // =========================================================================
    // Remote Errors
    // =========================================================================
    #[error("API request failed: {0}")]
    Api(#[from] ApiError),

    #[error("Operation {} ({}) failed", .operation.id, .operation.request_type)]
    OperationFailed {
        operation: Box<Operation>,
        trace: StackTrace,
    },

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Wait for operation {operation_id} was cancelled")]
    Cancelled { operation_id: String },

    // =========================================================================
    // Parse Errors
    // =========================================================================
    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),
}

/// Failure categories the error boundary knows how to render
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Structured REST error response
    Api,
    /// Operation that reached the `Failed` status
    Operation,
    /// Network / HTTP layer failure
    Transport,
    /// Anything else; handed to the previous handler
    Unrecognized,
}

impl Error {
    /// Build an operation failure, capturing the current call stack
    pub fn operation_failed(operation: Operation) -> Self {
        Error::OperationFailed {
            operation: Box::new(operation),
            trace: StackTrace::capture(),
        }
    }

    /// Classify this error for diagnostic routing
    pub fn kind(&self) -> FailureKind {
        match self {
            Error::Api(_) => FailureKind::Api,
            Error::OperationFailed { .. } => FailureKind::Operation,
            Error::Transport(_) => FailureKind::Transport,
            _ => FailureKind::Unrecognized,
        }
    }

    /// Errors caused by operator-supplied input
    pub fn is_user_input(&self) -> bool {
        matches!(self, Error::UserInput(_) | Error::DependencyVersion { .. })
    }
}

/// Result type alias for storage-ops
pub type Result<T> = std::result::Result<T, Error>;
