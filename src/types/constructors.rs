//! Chainable constructors for Primitive trees

use glam::{Mat4, Quat, Vec3};

use super::{invert_or_keep, Primitive, Shape};

/// Default Mandelbulb exponent
pub const MANDELBULB_POWER: f32 = 8.0;
/// Default Mandelbulb iteration cap
pub const MANDELBULB_ITERATIONS: u32 = 9;

impl Primitive {
    // === Leaf constructors ===

    /// Create a sphere with the given radius
    #[must_use]
    #[inline]
    pub fn sphere(radius: f32) -> Self {
        Primitive::new(Shape::Sphere { radius })
    }

    /// Create an axis-aligned box from its half-extents
    #[must_use]
    #[inline]
    pub fn box3d(half_extents: Vec3) -> Self {
        Primitive::new(Shape::Box3d { half_extents })
    }

    /// Create a torus in the XZ plane
    #[must_use]
    #[inline]
    pub fn torus(major_radius: f32, minor_radius: f32) -> Self {
        Primitive::new(Shape::Torus {
            major_radius,
            minor_radius,
        })
    }

    /// Create a static power-8 Mandelbulb
    #[must_use]
    #[inline]
    pub fn mandelbulb() -> Self {
        Primitive::new(Shape::Mandelbulb {
            power: MANDELBULB_POWER,
            iterations: MANDELBULB_ITERATIONS,
            animated: false,
            speed: 0.0,
            time: 0.0,
        })
    }

    /// Create a Mandelbulb whose azimuth drifts with time
    #[must_use]
    #[inline]
    pub fn animated_mandelbulb(speed: f32) -> Self {
        Primitive::new(Shape::Mandelbulb {
            power: MANDELBULB_POWER,
            iterations: MANDELBULB_ITERATIONS,
            animated: true,
            speed,
            time: 0.0,
        })
    }

    // === Operators ===

    /// Smoothly blend with another primitive
    #[must_use]
    #[inline]
    pub fn smooth_union(self, other: Primitive, k: f32) -> Self {
        Primitive::new(Shape::SmoothUnion {
            a: Box::new(self),
            b: Box::new(other),
            k,
        })
    }

    /// Smoothly carve another primitive out of this one
    #[must_use]
    #[inline]
    pub fn smooth_subtract(self, other: Primitive, k: f32) -> Self {
        Primitive::new(Shape::SmoothSubtraction {
            a: Box::new(self),
            b: Box::new(other),
            k,
        })
    }

    /// Inflate by a constant radius
    #[must_use]
    #[inline]
    pub fn round(self, radius: f32) -> Self {
        Primitive::new(Shape::Round {
            child: Box::new(self),
            radius,
        })
    }

    /// Twist around the Y axis
    #[must_use]
    #[inline]
    pub fn twist(self, strength: f32) -> Self {
        Primitive::new(Shape::Twist {
            child: Box::new(self),
            strength,
        })
    }

    /// Tile infinitely with the given cell size
    #[must_use]
    #[inline]
    pub fn repeat(self, spacing: Vec3) -> Self {
        Primitive::new(Shape::Repetition {
            child: Box::new(self),
            spacing,
        })
    }

    /// Oscillate along `direction` (normalized here)
    #[must_use]
    #[inline]
    pub fn oscillate(self, direction: Vec3, amplitude: f32, speed: f32) -> Self {
        Primitive::new(Shape::AnimatedTranslate {
            child: Box::new(self),
            direction: direction.normalize_or_zero(),
            amplitude,
            speed,
            time: 0.0,
        })
    }

    // === Placement ===

    /// Apply a local→world placement on top of the current one
    ///
    /// A singular placement is stored un-inverted (see [`invert_or_keep`]).
    #[must_use]
    pub fn placed(mut self, local_to_world: Mat4) -> Self {
        self.transform *= invert_or_keep(local_to_world);
        self
    }

    /// Move by an offset
    #[must_use]
    #[inline]
    pub fn translate(self, offset: Vec3) -> Self {
        self.placed(Mat4::from_translation(offset))
    }

    /// Rotate about the world origin
    #[must_use]
    #[inline]
    pub fn rotate(self, rotation: Quat) -> Self {
        self.placed(Mat4::from_quat(rotation))
    }

    /// Scale about the world origin
    #[must_use]
    #[inline]
    pub fn scale(self, factor: Vec3) -> Self {
        self.placed(Mat4::from_scale(factor))
    }

    /// Replace the world→local transform directly
    #[must_use]
    #[inline]
    pub fn with_transform(mut self, world_to_local: Mat4) -> Self {
        self.transform = world_to_local;
        self
    }
}
