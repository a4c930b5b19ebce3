//! Conservative bounds of primitive trees
//!
//! Radii are measured in a node's local space around [`local_center`].
//! Child contributions are first mapped into the parent's local space
//! through the child's own placement.

use glam::{Mat4, Vec3};

use crate::operations::BLEND_SCALE;
use crate::types::{try_invert, Aabb, Primitive, Shape};

/// Bounding radius used for the Mandelbulb (its escape radius plus margin)
pub const MANDELBULB_BOUNDING_RADIUS: f32 = 2.5;

/// Inflation applied to bounding-radius AABBs
pub const AABB_INFLATION: f32 = 1.5;

/// Local→world placement of a node; a singular transform is used as-is
#[inline]
fn placement(prim: &Primitive) -> Mat4 {
    try_invert(prim.transform).unwrap_or(prim.transform)
}

/// Largest axis stretch of a matrix
#[inline]
pub fn max_axis_scale(m: Mat4) -> f32 {
    m.x_axis
        .truncate()
        .length()
        .max(m.y_axis.truncate().length())
        .max(m.z_axis.truncate().length())
}

/// Center of a child expressed in its parent's local space
#[inline]
fn placed_center(child: &Primitive) -> Vec3 {
    placement(child).transform_point3(local_center(child))
}

/// Bounding radius of a child expressed in its parent's local space
#[inline]
fn placed_radius(child: &Primitive) -> f32 {
    local_bounding_radius(child) * max_axis_scale(placement(child))
}

/// Local-space point around which [`local_bounding_radius`] is measured
pub fn local_center(prim: &Primitive) -> Vec3 {
    match &prim.shape {
        Shape::SmoothUnion { a, b, .. } => (placed_center(a) + placed_center(b)) * 0.5,
        Shape::SmoothSubtraction { a, .. } => placed_center(a),
        Shape::Round { child, .. } | Shape::AnimatedTranslate { child, .. } => placed_center(child),
        Shape::Sphere { .. }
        | Shape::Box3d { .. }
        | Shape::Torus { .. }
        | Shape::Mandelbulb { .. }
        | Shape::Twist { .. }
        | Shape::Repetition { .. } => Vec3::ZERO,
    }
}

/// Conservative local-space bounding radius
///
/// Never smaller than the true extent of the surface; infinite for
/// unbounded nodes such as repetition.
pub fn local_bounding_radius(prim: &Primitive) -> f32 {
    match &prim.shape {
        Shape::Sphere { radius } => radius.abs(),
        Shape::Box3d { half_extents } => half_extents.abs().length(),
        Shape::Torus {
            major_radius,
            minor_radius,
        } => major_radius.abs() + minor_radius.abs(),
        Shape::Mandelbulb { .. } => MANDELBULB_BOUNDING_RADIUS,

        // the blend can bulge out by at most k
        Shape::SmoothUnion { a, b, k } => {
            let gap = (placed_center(a) - placed_center(b)).length();
            placed_radius(a).max(placed_radius(b)) + 0.5 * gap + k.abs() * BLEND_SCALE * 0.25
        }
        Shape::SmoothSubtraction { a, .. } => placed_radius(a),
        Shape::Round { child, radius } => placed_radius(child) + radius.max(0.0),
        Shape::Twist { child, .. } => placed_center(child).length() + placed_radius(child),
        Shape::Repetition { .. } => f32::INFINITY,
        Shape::AnimatedTranslate {
            child, amplitude, ..
        } => placed_radius(child) + amplitude.abs(),
    }
}

/// World-space position of a node (its local center, placed)
pub fn world_position(prim: &Primitive) -> Vec3 {
    placed_center(prim)
}

/// Cube around the world position sized by the bounding radius
///
/// Half-size is `radius * max_axis_scale * 1.5`; unbounded nodes get an
/// infinite box.
pub fn approximate_aabb(prim: &Primitive) -> Aabb {
    let half = placed_radius(prim) * AABB_INFLATION;
    if !half.is_finite() {
        return Aabb::infinite();
    }
    Aabb::from_center_extents(world_position(prim), Vec3::splat(half))
}
