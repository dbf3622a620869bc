//! API client layer
//!
//! Failure types raised by the remote API and the REST clients for its
//! API groups. Client modules are named `*_api`; diagnostics use that naming
//! to recover the call site from a stack trace.

pub mod errors;
pub mod operations_api;

pub use errors::*;
pub use operations_api::*;
