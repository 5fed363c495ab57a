//! Utility types shared by every layer.
//!
//! - [`Error`] / [`Result`] - Error handling
//! - Math type re-exports from glam, [`BBox3f`]

mod error;
mod math;

pub use error::*;
pub use math::*;
