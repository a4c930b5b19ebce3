//! Container types: Aabb, Ray

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Direction components smaller than this are treated as parallel to a slab
pub const PARALLEL_EPSILON: f32 = 1e-10;

/// Axis-aligned bounding box
///
/// `min[i] <= max[i]` holds for every box built through [`Aabb::from_corners`]
/// or [`Aabb::union`]; [`Aabb::is_degenerate`] reports boxes that break it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    /// Minimum corner
    pub min: Vec3,
    /// Maximum corner
    pub max: Vec3,
}

impl Aabb {
    /// Create a new AABB
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Aabb { min, max }
    }

    /// Create from two arbitrary corners, ordering them per axis
    pub fn from_corners(a: Vec3, b: Vec3) -> Self {
        Aabb {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// Create from center and half-extents
    pub fn from_center_extents(center: Vec3, half_extents: Vec3) -> Self {
        Aabb::from_corners(center - half_extents, center + half_extents)
    }

    /// Create an empty (inverted) AABB, the identity for [`Aabb::union`]
    #[inline]
    pub fn empty() -> Self {
        Aabb {
            min: Vec3::splat(f32::INFINITY),
            max: Vec3::splat(f32::NEG_INFINITY),
        }
    }

    /// Box of zero size at the origin
    pub fn zero() -> Self {
        Aabb::new(Vec3::ZERO, Vec3::ZERO)
    }

    /// Box covering all of space
    pub fn infinite() -> Self {
        Aabb::new(Vec3::NEG_INFINITY, Vec3::INFINITY)
    }

    /// Get center point
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Get size
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    /// Both corners finite
    pub fn is_finite(&self) -> bool {
        self.min.is_finite() && self.max.is_finite()
    }

    /// Non-finite, inverted, or zero volume
    pub fn is_degenerate(&self) -> bool {
        if !self.is_finite() {
            return true;
        }
        let size = self.size();
        size.x <= 0.0 || size.y <= 0.0 || size.z <= 0.0
    }

    /// Check if point is inside (boundary inclusive)
    pub fn contains(&self, point: Vec3) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
            && point.z >= self.min.z
            && point.z <= self.max.z
    }

    /// Check overlap with another box (touching counts)
    pub fn intersects(&self, other: &Aabb) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
            && self.min.z <= other.max.z
            && self.max.z >= other.min.z
    }

    /// Euclidean distance from a point to the box; 0 inside
    pub fn distance_to_point(&self, point: Vec3) -> f32 {
        let gap = (self.min - point).max(point - self.max).max(Vec3::ZERO);
        gap.length()
    }

    /// Distance from a point to the farthest point of the box
    pub fn max_distance_to_point(&self, point: Vec3) -> f32 {
        (point - self.min).abs().max((point - self.max).abs()).length()
    }

    /// Euclidean gap between two boxes; 0 when they overlap
    pub fn distance_to_box(&self, other: &Aabb) -> f32 {
        let gap = (other.min - self.max).max(self.min - other.max).max(Vec3::ZERO);
        gap.length()
    }

    /// Slab test against a ray
    ///
    /// Returns `(t_enter, t_exit)` when the ray's forward half crosses the box.
    /// `t_enter` is negative when the origin is inside.
    pub fn intersect_ray(&self, origin: Vec3, direction: Vec3) -> Option<(f32, f32)> {
        let mut t_enter = f32::NEG_INFINITY;
        let mut t_exit = f32::INFINITY;

        for axis in 0..3 {
            let o = origin[axis];
            let d = direction[axis];
            let (lo, hi) = (self.min[axis], self.max[axis]);

            if d.abs() < PARALLEL_EPSILON {
                if o < lo || o > hi {
                    return None;
                }
                continue;
            }

            let inv = 1.0 / d;
            let mut t0 = (lo - o) * inv;
            let mut t1 = (hi - o) * inv;
            if t0 > t1 {
                std::mem::swap(&mut t0, &mut t1);
            }
            t_enter = t_enter.max(t0);
            t_exit = t_exit.min(t1);
            if t_enter > t_exit {
                return None;
            }
        }

        if t_exit < 0.0 {
            return None;
        }
        Some((t_enter, t_exit))
    }

    /// Expand to include another AABB
    pub fn union(&self, other: &Aabb) -> Aabb {
        Aabb {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// Expand to include a point
    pub fn include_point(&self, point: Vec3) -> Aabb {
        Aabb {
            min: self.min.min(point),
            max: self.max.max(point),
        }
    }

    /// Grow by a margin on every side
    pub fn expand(&self, margin: f32) -> Aabb {
        Aabb {
            min: self.min - Vec3::splat(margin),
            max: self.max + Vec3::splat(margin),
        }
    }
}

/// Union of a set of boxes; a zero box at the origin when empty
pub fn compute_bounds(boxes: &[Aabb]) -> Aabb {
    let mut iter = boxes.iter();
    match iter.next() {
        Some(first) => iter.fold(*first, |acc, b| acc.union(b)),
        None => Aabb::zero(),
    }
}

/// Ray for raymarching
#[derive(Debug, Clone, Copy)]
pub struct Ray {
    /// Ray origin point
    pub origin: Vec3,
    /// Ray direction (normalized)
    pub direction: Vec3,
}

impl Ray {
    /// Create a new ray
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Ray {
            origin,
            direction: direction.normalize(),
        }
    }

    /// Get point along ray at distance t
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}
