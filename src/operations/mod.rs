//! CSG operations
//!
//! Combine the distances of two children evaluated at the same point.

mod smooth;

pub use smooth::{sdf_smooth_subtraction, sdf_smooth_union, smooth_max, smooth_min, BLEND_SCALE};
