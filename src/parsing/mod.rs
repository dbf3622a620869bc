//! Human-readable magnitude parsing
//!
//! - [`size`]: byte sizes with K/M/G/T/P suffixes
//! - [`duration`]: calendar durations such as `1Y2W3D4H5M`

pub mod duration;
pub mod size;

pub use duration::*;
pub use size::*;
