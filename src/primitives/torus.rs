//! Torus primitive SDF

use glam::{Vec2, Vec3};

/// Signed distance to a torus in the XZ plane
///
/// # Arguments
/// * `point` - Point to evaluate
/// * `major_radius` - Distance from center to the tube center
/// * `minor_radius` - Tube radius
#[inline(always)]
pub fn sdf_torus(point: Vec3, major_radius: f32, minor_radius: f32) -> f32 {
    let q = Vec2::new(Vec2::new(point.x, point.z).length() - major_radius, point.y);
    q.length() - minor_radius
}
