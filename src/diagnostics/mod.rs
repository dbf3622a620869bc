//! Diagnostics
//!
//! - [`trace`]: call-stack snapshots attached to failures
//! - [`classify`]: error classification and single-line message formatting
//! - [`report`]: verbosity-aware failure reports

pub mod classify;
pub mod report;
pub mod trace;

pub use classify::*;
pub use report::*;
pub use trace::*;
