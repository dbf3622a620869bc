//! Asynchronous operation tracking

pub mod awaiter;

pub use awaiter::*;
