//! Domain types and ports

pub mod operation;
pub mod ports;

pub use operation::*;
pub use ports::*;
