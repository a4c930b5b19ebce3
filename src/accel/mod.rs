//! Spatial acceleration structures
//!
//! A scene holds exactly one [`AccelerationStructure`]. Besides speeding up
//! nearest-distance queries, a structure can steer a single ray through the
//! per-ray protocol:
//!
//! 1. [`AccelerationStructure::on_ray_march_start`] once, before the first step
//! 2. [`AccelerationStructure::on_ray_march_step`] before every SDF evaluation
//! 3. [`AccelerationStructure::on_ray_march_end`] exactly once, consuming the state
//!
//! The per-ray state is owned by the marcher for the lifetime of one ray.

pub mod bvh;
pub mod octree;

use std::fmt;
use std::str::FromStr;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::error::MarchError;
use crate::types::{Aabb, Primitive};

pub use bvh::{Bvh, BvhConfig, BvhNode, BvhRayState};
pub use octree::{Octree, OctreeConfig, OctreeNode};

/// Skips shorter than this are ignored; the marcher evaluates instead
pub const SKIP_TOLERANCE: f32 = 1e-5;

/// Selectable acceleration structure variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccelKind {
    /// Linear scan over every primitive
    #[default]
    None,
    /// Region octree with empty-space skipping
    Octree,
    /// Bounding volume hierarchy with ray-interval culling
    Bvh,
}

impl AccelKind {
    /// Every variant, in display order
    pub const ALL: [AccelKind; 3] = [AccelKind::None, AccelKind::Octree, AccelKind::Bvh];

    /// Lowercase name
    pub fn name(self) -> &'static str {
        match self {
            AccelKind::None => "none",
            AccelKind::Octree => "octree",
            AccelKind::Bvh => "bvh",
        }
    }
}

impl fmt::Display for AccelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for AccelKind {
    type Err = MarchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" | "" => Ok(AccelKind::None),
            "octree" => Ok(AccelKind::Octree),
            "bvh" => Ok(AccelKind::Bvh),
            other => Err(MarchError::UnknownAcceleration(other.to_string())),
        }
    }
}

/// Per-ray inputs handed to the protocol hooks
#[derive(Debug, Clone, Copy)]
pub struct RayMarchContext {
    /// Ray origin
    pub origin: Vec3,
    /// Unit ray direction
    pub direction: Vec3,
    /// Distance travelled so far
    pub current_distance: f32,
    /// Distance at which the ray gives up
    pub max_distance: f32,
}

/// Opaque per-ray state owned by the structure's hooks
#[derive(Debug, Clone)]
pub enum RayMarchState {
    /// Octree: clip range of the ray against the root bounds, if bounded
    Octree(Option<(f32, f32)>),
    /// BVH: sorted leaf intervals
    Bvh(BvhRayState),
}

/// Outcome of the start hook
#[derive(Debug, Clone)]
pub enum RayStart {
    /// The structure does not steer rays
    Inactive,
    /// Steer the ray with this state
    Active(RayMarchState),
    /// Nothing can be hit; the ray is a miss
    Terminate,
}

/// Outcome of the step hook
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StepAction {
    /// Evaluate the SDF at the current distance
    Evaluate,
    /// Advance by this distance without evaluating
    Skip(f32),
    /// Nothing left along the ray; terminate as a miss
    Exhausted,
}

/// The scene's active acceleration structure
#[derive(Debug, Clone, Default)]
pub enum AccelerationStructure {
    /// Linear scan
    #[default]
    None,
    /// Octree
    Octree(Octree),
    /// BVH
    Bvh(Bvh),
}

impl AccelerationStructure {
    /// Build the selected structure over a primitive list
    pub fn build(
        kind: AccelKind,
        primitives: &[Primitive],
        octree: &OctreeConfig,
        bvh: &BvhConfig,
    ) -> Self {
        match kind {
            AccelKind::None => AccelerationStructure::None,
            AccelKind::Octree => AccelerationStructure::Octree(Octree::build(primitives, octree)),
            AccelKind::Bvh => AccelerationStructure::Bvh(Bvh::build(primitives, bvh)),
        }
    }

    /// Which variant this is
    pub fn kind(&self) -> AccelKind {
        match self {
            AccelerationStructure::None => AccelKind::None,
            AccelerationStructure::Octree(_) => AccelKind::Octree,
            AccelerationStructure::Bvh(_) => AccelKind::Bvh,
        }
    }

    /// Number of tree nodes (0 for the linear scan)
    pub fn node_count(&self) -> usize {
        match self {
            AccelerationStructure::None => 0,
            AccelerationStructure::Octree(tree) => tree.node_count(),
            AccelerationStructure::Bvh(bvh) => bvh.node_count(),
        }
    }

    /// Bounds covered by the structure, if it has any
    pub fn bounds(&self) -> Option<Aabb> {
        match self {
            AccelerationStructure::None => None,
            AccelerationStructure::Octree(tree) => Some(tree.bounds()),
            AccelerationStructure::Bvh(bvh) => bvh.bounds(),
        }
    }

    /// Candidate primitives for a point query
    ///
    /// `None` for the linear scan, which has no filter.
    pub fn get_primitives_at(&self, point: Vec3) -> Option<Vec<usize>> {
        match self {
            AccelerationStructure::None => None,
            AccelerationStructure::Octree(tree) => Some(tree.get_primitives_at(point)),
            AccelerationStructure::Bvh(bvh) => Some(bvh.get_primitives_at(point)),
        }
    }

    /// Start hook: prepare per-ray state or end the ray early
    pub fn on_ray_march_start(&self, ctx: &RayMarchContext) -> RayStart {
        match self {
            AccelerationStructure::None => RayStart::Inactive,
            AccelerationStructure::Octree(tree) => {
                let root = tree.bounds();
                if root.is_degenerate() {
                    return RayStart::Active(RayMarchState::Octree(None));
                }
                match root.intersect_ray(ctx.origin, ctx.direction) {
                    Some((enter, exit)) if enter <= ctx.max_distance => {
                        RayStart::Active(RayMarchState::Octree(Some((enter, exit))))
                    }
                    _ => RayStart::Terminate,
                }
            }
            AccelerationStructure::Bvh(bvh) => match bvh.on_ray_march_start(ctx) {
                Some(state) => RayStart::Active(RayMarchState::Bvh(state)),
                None => RayStart::Terminate,
            },
        }
    }

    /// Step hook: evaluate, skip ahead, or stop
    pub fn on_ray_march_step(&self, ctx: &RayMarchContext, state: &mut RayMarchState) -> StepAction {
        match (self, state) {
            (AccelerationStructure::Octree(tree), RayMarchState::Octree(range)) => {
                let t = ctx.current_distance;
                if let Some((enter, exit)) = *range {
                    if t < enter - SKIP_TOLERANCE {
                        return StepAction::Skip(enter - t);
                    }
                    if t > exit {
                        return StepAction::Exhausted;
                    }
                }
                let skip = tree.march_ray(ctx.origin, ctx.direction, t);
                if skip > SKIP_TOLERANCE {
                    StepAction::Skip(skip)
                } else {
                    StepAction::Evaluate
                }
            }
            (AccelerationStructure::Bvh(bvh), RayMarchState::Bvh(state)) => {
                bvh.on_ray_march_step(ctx, state)
            }
            _ => StepAction::Evaluate,
        }
    }

    /// End hook: release the per-ray state
    pub fn on_ray_march_end(&self, state: RayMarchState) {
        if let RayMarchState::Bvh(state) = &state {
            tracing::trace!(
                intervals = state.intervals().len(),
                visited = state.index(),
                "ray left bvh"
            );
        }
        drop(state);
    }
}
