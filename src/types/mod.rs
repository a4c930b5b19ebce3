//! Core types for sdf_march
//!
//! Defines the primitive tree (`Primitive` + `Shape`) and the containers
//! shared by the acceleration structures and the raymarchers.

use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

mod constructors;
mod containers;

pub use containers::{compute_bounds, Aabb, Ray};

/// Determinant magnitude below which a transform is treated as singular
pub const SINGULAR_EPSILON: f32 = 1e-12;

/// A placed node of the primitive tree
///
/// `transform` maps world space into the node's local space, so
/// `sdf(world) == local_sdf(transform * world)` for every node. Operators
/// hold their children by value; the tree is acyclic by construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Primitive {
    /// World→local affine transform
    #[serde(default)]
    pub transform: Mat4,
    /// Shape evaluated in local space
    pub shape: Shape,
}

/// Local-space shape of a primitive
///
/// Leaves are analytic or estimated distance functions; operators combine
/// or deform their children, which are evaluated at the operator's local point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Shape {
    /// Sphere centered at the origin
    Sphere {
        /// Radius
        radius: f32,
    },
    /// Axis-aligned box centered at the origin
    Box3d {
        /// Half-extents along each axis
        half_extents: Vec3,
    },
    /// Torus in the XZ plane
    Torus {
        /// Distance from the center to the tube center
        major_radius: f32,
        /// Tube radius
        minor_radius: f32,
    },
    /// Power-map fractal bulb (distance estimate)
    Mandelbulb {
        /// Exponent of the power map
        power: f32,
        /// Iteration cap
        iterations: u32,
        /// Whether `time` offsets the azimuth
        animated: bool,
        /// Azimuth offset rate, radians per time unit
        speed: f32,
        /// Time set by [`Primitive::set_time`]
        #[serde(default)]
        time: f32,
    },
    /// Polynomial smooth union of two children
    SmoothUnion {
        /// First child
        a: Box<Primitive>,
        /// Second child
        b: Box<Primitive>,
        /// Blend radius
        k: f32,
    },
    /// Polynomial smooth subtraction of `b` from `a`
    SmoothSubtraction {
        /// Shape being carved
        a: Box<Primitive>,
        /// Shape removed from `a`
        b: Box<Primitive>,
        /// Blend radius
        k: f32,
    },
    /// Child inflated by a constant radius
    Round {
        /// Rounded child
        child: Box<Primitive>,
        /// Rounding radius
        radius: f32,
    },
    /// Child twisted around the Y axis
    Twist {
        /// Twisted child
        child: Box<Primitive>,
        /// Rotation angle per unit of Y
        strength: f32,
    },
    /// Infinite tiling of the child
    Repetition {
        /// Repeated child
        child: Box<Primitive>,
        /// Cell size per axis
        spacing: Vec3,
    },
    /// Child oscillating along a direction
    AnimatedTranslate {
        /// Moving child
        child: Box<Primitive>,
        /// Unit direction of motion
        direction: Vec3,
        /// Peak displacement
        amplitude: f32,
        /// Angular frequency
        speed: f32,
        /// Time set by [`Primitive::set_time`]
        #[serde(default)]
        time: f32,
    },
}

impl Primitive {
    /// Create a primitive with an identity transform
    #[inline]
    pub fn new(shape: Shape) -> Self {
        Primitive {
            transform: Mat4::IDENTITY,
            shape,
        }
    }

    /// Signed distance at a world-space point
    #[inline]
    pub fn sdf(&self, point: Vec3) -> f32 {
        crate::eval::eval(self, point)
    }

    /// Signed distance at a point already in this node's local space
    #[inline]
    pub fn local_sdf(&self, local: Vec3) -> f32 {
        crate::eval::eval_local(self, local)
    }

    /// Conservative bounding radius around the local origin
    pub fn local_bounding_radius(&self) -> f32 {
        crate::eval::local_bounding_radius(self)
    }

    /// World-space position of the node
    pub fn world_position(&self) -> Vec3 {
        crate::eval::world_position(self)
    }

    /// Approximate world-space AABB derived from the bounding radius
    pub fn approximate_aabb(&self) -> Aabb {
        crate::eval::approximate_aabb(self)
    }

    /// Local→world matrix, if the stored transform is invertible
    pub fn local_to_world(&self) -> Option<Mat4> {
        try_invert(self.transform)
    }

    /// Propagate the animation time to this node and every descendant
    pub fn set_time(&mut self, t: f32) {
        match &mut self.shape {
            Shape::Sphere { .. } | Shape::Box3d { .. } | Shape::Torus { .. } => {}
            Shape::Mandelbulb { time, .. } => *time = t,
            Shape::SmoothUnion { a, b, .. } | Shape::SmoothSubtraction { a, b, .. } => {
                a.set_time(t);
                b.set_time(t);
            }
            Shape::Round { child, .. }
            | Shape::Twist { child, .. }
            | Shape::Repetition { child, .. } => child.set_time(t),
            Shape::AnimatedTranslate { child, time, .. } => {
                *time = t;
                child.set_time(t);
            }
        }
    }

    /// Whether any node of the tree depends on time
    pub fn is_animated(&self) -> bool {
        match &self.shape {
            Shape::Mandelbulb { animated, .. } => *animated,
            Shape::AnimatedTranslate { .. } => true,
            Shape::SmoothUnion { a, b, .. } | Shape::SmoothSubtraction { a, b, .. } => {
                a.is_animated() || b.is_animated()
            }
            Shape::Round { child, .. }
            | Shape::Twist { child, .. }
            | Shape::Repetition { child, .. } => child.is_animated(),
            Shape::Sphere { .. } | Shape::Box3d { .. } | Shape::Torus { .. } => false,
        }
    }

    /// Count nodes in the tree
    pub fn node_count(&self) -> u32 {
        match &self.shape {
            Shape::SmoothUnion { a, b, .. } | Shape::SmoothSubtraction { a, b, .. } => {
                1 + a.node_count() + b.node_count()
            }
            Shape::Round { child, .. }
            | Shape::Twist { child, .. }
            | Shape::Repetition { child, .. }
            | Shape::AnimatedTranslate { child, .. } => 1 + child.node_count(),
            _ => 1,
        }
    }

    /// Short lowercase name of the shape
    pub fn kind_name(&self) -> &'static str {
        match &self.shape {
            Shape::Sphere { .. } => "sphere",
            Shape::Box3d { .. } => "box",
            Shape::Torus { .. } => "torus",
            Shape::Mandelbulb { .. } => "mandelbulb",
            Shape::SmoothUnion { .. } => "smooth-union",
            Shape::SmoothSubtraction { .. } => "smooth-subtraction",
            Shape::Round { .. } => "round",
            Shape::Twist { .. } => "twist",
            Shape::Repetition { .. } => "repetition",
            Shape::AnimatedTranslate { .. } => "animated-translate",
        }
    }
}

/// Invert a matrix, or `None` when it is singular or the inverse is not finite
pub fn try_invert(m: Mat4) -> Option<Mat4> {
    let det = m.determinant();
    if !det.is_finite() || det.abs() <= SINGULAR_EPSILON {
        return None;
    }
    let inv = m.inverse();
    inv.is_finite().then_some(inv)
}

/// Invert a matrix, keeping it unchanged (with a warning) when singular
pub fn invert_or_keep(m: Mat4) -> Mat4 {
    match try_invert(m) {
        Some(inv) => inv,
        None => {
            tracing::warn!(
                determinant = m.determinant(),
                "singular transform, keeping the matrix un-inverted"
            );
            m
        }
    }
}
