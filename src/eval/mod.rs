//! SDF Evaluation
//!
//! Functions for evaluating primitive trees at points. Every node first maps
//! the incoming point through its world→local transform, so children of an
//! operator receive the operator's local point and apply their own transform.

mod bounds;

pub use bounds::{
    approximate_aabb, local_bounding_radius, local_center, max_axis_scale, world_position,
    AABB_INFLATION, MANDELBULB_BOUNDING_RADIUS,
};

use crate::modifiers::*;
use crate::operations::*;
use crate::primitives::*;
use crate::types::{Primitive, Shape};
use glam::Vec3;

/// Evaluate a primitive tree at a world-space point
///
/// # Arguments
/// * `prim` - The tree root
/// * `point` - Point to evaluate, in the space the root's transform expects
///
/// # Returns
/// Signed distance to the surface
#[inline]
pub fn eval(prim: &Primitive, point: Vec3) -> f32 {
    eval_local(prim, prim.transform.transform_point3(point))
}

/// Evaluate a node at a point already mapped into its local space
#[inline]
pub fn eval_local(prim: &Primitive, p: Vec3) -> f32 {
    match &prim.shape {
        // === Leaves ===
        Shape::Sphere { radius } => sdf_sphere(p, *radius),
        Shape::Box3d { half_extents } => sdf_box3d(p, *half_extents),
        Shape::Torus {
            major_radius,
            minor_radius,
        } => sdf_torus(p, *major_radius, *minor_radius),
        Shape::Mandelbulb {
            power,
            iterations,
            animated,
            speed,
            time,
        } => {
            let phase = if *animated { time * speed } else { 0.0 };
            sdf_mandelbulb(p, *power, *iterations, phase)
        }

        // === Operators ===
        Shape::SmoothUnion { a, b, k } => sdf_smooth_union(eval(a, p), eval(b, p), *k),
        Shape::SmoothSubtraction { a, b, k } => sdf_smooth_subtraction(eval(a, p), eval(b, p), *k),
        Shape::Round { child, radius } => eval(child, p) - radius,
        Shape::Twist { child, strength } => eval(child, modifier_twist(p, *strength)),
        Shape::Repetition { child, spacing } => eval(child, modifier_repeat(p, *spacing)),
        Shape::AnimatedTranslate {
            child,
            direction,
            amplitude,
            speed,
            time,
        } => eval(
            child,
            modifier_oscillate(p, *direction, *amplitude, *speed, *time),
        ),
    }
}
