//! Smooth CSG operations
//!
//! The blend radius `k` passed to the `sdf_smooth_*` functions is scaled by 4
//! before reaching the polynomial kernel, so the blend region spans `4k`.

/// Blend width multiplier applied to the user-facing `k`
pub const BLEND_SCALE: f32 = 4.0;

/// Polynomial smooth minimum
///
/// k=0 safety: clamps k to a tiny epsilon via max().
#[inline(always)]
pub fn smooth_min(a: f32, b: f32, k: f32) -> f32 {
    let k = k.max(1e-10);
    let h = (k - (a - b).abs()).max(0.0) / k;
    a.min(b) - h * h * k * 0.25
}

/// Polynomial smooth maximum
#[inline(always)]
pub fn smooth_max(a: f32, b: f32, k: f32) -> f32 {
    let k = k.max(1e-10);
    let h = (k - (a - b).abs()).max(0.0) / k;
    a.max(b) + h * h * k * 0.25
}

/// Smooth union of two SDFs
#[inline(always)]
pub fn sdf_smooth_union(d1: f32, d2: f32, k: f32) -> f32 {
    smooth_min(d1, d2, k * BLEND_SCALE)
}

/// Smooth subtraction of B from A
#[inline(always)]
pub fn sdf_smooth_subtraction(d1: f32, d2: f32, k: f32) -> f32 {
    smooth_max(d1, -d2, k * BLEND_SCALE)
}
