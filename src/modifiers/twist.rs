//! Twist modifier

use glam::Vec3;

/// Twist space around the Y-axis
///
/// Rotates the XZ components by `strength * y`.
#[inline(always)]
pub fn modifier_twist(point: Vec3, strength: f32) -> Vec3 {
    let (s, c) = (point.y * strength).sin_cos();
    Vec3::new(point.x * c - point.z * s, point.y, point.x * s + point.z * c)
}
