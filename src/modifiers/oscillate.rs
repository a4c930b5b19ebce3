//! Oscillating translation

use glam::Vec3;

/// Offset of an oscillating child at `time`
///
/// The child is evaluated at `p - modifier_oscillate_offset(..)`.
#[inline(always)]
pub fn modifier_oscillate_offset(direction: Vec3, amplitude: f32, speed: f32, time: f32) -> Vec3 {
    direction * ((time * speed).sin() * amplitude)
}

/// Map a point into the frame of an oscillating child
#[inline(always)]
pub fn modifier_oscillate(point: Vec3, direction: Vec3, amplitude: f32, speed: f32, time: f32) -> Vec3 {
    point - modifier_oscillate_offset(direction, amplitude, speed, time)
}
