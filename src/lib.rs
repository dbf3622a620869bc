//! storage-ops - Operation awaiting and diagnostics core
//!
//! The core used by declarative reconciliation modules that drive a remote
//! storage-orchestration REST API. A module issues a mutating call, receives
//! an operation handle and blocks until the operation converges; failures
//! are rendered into actionable, call-site-annotated messages.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────────┐
//! │                   Reconciliation modules (callers)                   │
//! ├──────────────────────────────────────────────────────────────────────┤
//! │  ┌──────────────────┐   ┌──────────────────┐   ┌──────────────────┐  │
//! │  │  Error Boundary  │──▶│   Diagnostics    │   │ Version / Size / │  │
//! │  │ (handler chain)  │   │ (classify/report)│   │ Duration parsing │  │
//! │  └────────┬─────────┘   └──────────────────┘   └──────────────────┘  │
//! │           │                                                          │
//! │  ┌────────┴─────────┐   ┌──────────────────┐                         │
//! │  │ Operation Awaiter│──▶│  OperationsApi   │ (REST client / mocks)   │
//! │  └──────────────────┘   └──────────────────┘                         │
//! └──────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//!
//! - [`operations`]: operation awaiter
//! - [`diagnostics`]: error classification, formatting and failure reports
//! - [`boundary`]: error boundary routing failures to the formatters
//! - [`version`]: version constraint engine
//! - [`parsing`]: size and duration parsing
//! - [`api`]: API failure types and the operations REST client
//! - [`domain`]: operation records and ports
//! - [`startup`]: dependency version checks
//! - [`config`]: client configuration
//! - [`error`]: error types

pub mod api;
pub mod boundary;
pub mod config;
pub mod diagnostics;
pub mod domain;
pub mod error;
pub mod operations;
pub mod parsing;
pub mod startup;
pub mod version;

// Re-export commonly used types
pub use api::{ApiError, RestOperationsClient, TransportError, TransportErrorKind};

pub use boundary::{install_exception_hook, ErrorBoundary, FailureHandler};

pub use config::ClientConfig;

pub use diagnostics::{
    extract_call_site, format_api_exception, format_failed_operation, format_transport_exception,
    ClassifiedError, FailureReport, ReportContext, StackTrace, Verbosity,
};

pub use domain::{Operation, OperationError, OperationStatus, OperationsApi, ResourceReference};

pub use error::{Error, FailureKind, Result};

pub use operations::{await_operation, await_operation_cancellable};

pub use parsing::{
    format_size, parse_duration, parse_duration_components, parse_duration_minutes, parse_size,
    DurationComponents, SizeFactor,
};

pub use version::{
    compare, parse_requirements, parse_version, version_satisfied, Comparator, Requirement,
    VersionTuple,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
