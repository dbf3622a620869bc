//! Operation records
//!
//! Server-tracked asynchronous units of work. The client never creates or
//! destroys operations; it only polls them until they reach a terminal status.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

// =============================================================================
// Status
// =============================================================================

/// Lifecycle status of an operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OperationStatus {
    Pending,
    Aborting,
    Succeeded,
    Failed,
}

impl OperationStatus {
    /// Terminal statuses never change again
    pub fn is_terminal(&self) -> bool {
        matches!(self, OperationStatus::Succeeded | OperationStatus::Failed)
    }
}

impl std::fmt::Display for OperationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OperationStatus::Pending => write!(f, "Pending"),
            OperationStatus::Aborting => write!(f, "Aborting"),
            OperationStatus::Succeeded => write!(f, "Succeeded"),
            OperationStatus::Failed => write!(f, "Failed"),
        }
    }
}

// =============================================================================
// Operation
// =============================================================================

/// Error attached to a failed operation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationError {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pure_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub http_code: Option<u16>,
}

/// Reference to the resource produced by a succeeded operation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceReference {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub self_link: Option<String>,
}

/// A server-tracked asynchronous operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Operation {
    /// Stable identifier for the operation's lifetime
    pub id: String,
    pub status: OperationStatus,
    /// Server-suggested poll delay in milliseconds
    #[serde(default)]
    pub retry_in: u64,
    /// Kind of mutation, e.g. `CreateVolume`
    #[serde(default)]
    pub request_type: String,
    /// Populated iff `status == Failed`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<OperationError>,
    /// Populated iff `status == Succeeded`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<ResourceReference>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub self_link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Operation {
    /// Create a bare operation record
    pub fn new(
        id: impl Into<String>,
        status: OperationStatus,
        request_type: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            status,
            retry_in: 0,
            request_type: request_type.into(),
            error: None,
            result: None,
            self_link: None,
            created_at: None,
            updated_at: None,
        }
    }

    pub fn with_retry_in(mut self, retry_in: u64) -> Self {
        self.retry_in = retry_in;
        self
    }

    pub fn with_error(mut self, error: OperationError) -> Self {
        self.error = Some(error);
        self
    }

    /// Poll delay dictated by the server, rounded up to whole seconds
    pub fn retry_delay(&self) -> Duration {
        Duration::from_secs(self.retry_in.div_ceil(1000))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retry_delay_rounds_up() {
        let op = Operation::new("op", OperationStatus::Pending, "CreateVolume");
        assert_eq!(op.clone().with_retry_in(0).retry_delay(), Duration::ZERO);
        assert_eq!(op.clone().with_retry_in(1).retry_delay(), Duration::from_secs(1));
        assert_eq!(op.clone().with_retry_in(1000).retry_delay(), Duration::from_secs(1));
        assert_eq!(op.with_retry_in(1500).retry_delay(), Duration::from_secs(2));
    }

    #[test]
    fn test_terminal_statuses() {
        assert!(!OperationStatus::Pending.is_terminal());
        assert!(!OperationStatus::Aborting.is_terminal());
        assert!(OperationStatus::Succeeded.is_terminal());
        assert!(OperationStatus::Failed.is_terminal());
    }

    #[test]
    fn test_deserialize_failed_operation() {
        let json = r#"{
            "id": "op1",
            "status": "Failed",
            "retry_in": 1000,
            "request_type": "CreateVolume",
            "error": {"message": "disk full", "pure_code": "E2", "http_code": 409},
            "unknown_field": true
        }"#;

        let op: Operation = serde_json::from_str(json).unwrap();
        assert_eq!(op.status, OperationStatus::Failed);
        assert_eq!(op.retry_in, 1000);
        let error = op.error.unwrap();
        assert_eq!(error.message.as_deref(), Some("disk full"));
        assert_eq!(error.http_code, Some(409));
        assert!(op.result.is_none());
    }
}
