//! Repetition modifier
//!
//! `p - s * round(p / s)` folds space into the cell `[-s/2, s/2]`.

use glam::Vec3;

/// Infinite repetition along all axes
///
/// Axes with zero spacing are left untouched instead of producing NaN.
#[inline(always)]
pub fn modifier_repeat(point: Vec3, spacing: Vec3) -> Vec3 {
    Vec3::new(
        fold(point.x, spacing.x),
        fold(point.y, spacing.y),
        fold(point.z, spacing.z),
    )
}

#[inline(always)]
fn fold(x: f32, s: f32) -> f32 {
    if s == 0.0 {
        x
    } else {
        x - s * (x / s).round()
    }
}
