//! Leaf distance functions
//!
//! Pure functions of a local-space point; placement is handled by
//! [`Primitive`](crate::types::Primitive).

mod box3d;
mod mandelbulb;
mod sphere;
mod torus;

pub use box3d::sdf_box3d;
pub use mandelbulb::{sdf_mandelbulb, ESCAPE_RADIUS};
pub use sphere::sdf_sphere;
pub use torus::sdf_torus;
