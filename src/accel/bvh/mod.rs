//! BVH (Bounding Volume Hierarchy) over primitive bounds
//!
//! Composite SDFs have no closed-form bounds, so each primitive's box is
//! estimated by sampling its local field on a fixed grid and keeping points
//! close to the surface. This can under-bound unbounded or strongly deformed
//! operators; queries that come back empty fall back to a full scan.

mod build;
mod query;

pub use query::BvhRayState;

use serde::{Deserialize, Serialize};

use crate::types::Aabb;

/// BVH build and query parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BvhConfig {
    /// Leaves hold at most this many primitives
    pub max_primitives_per_leaf: usize,
    /// Recursion limit; deeper nodes become leaves
    pub max_depth: u32,
    /// Half-size of the local sampling grid
    pub sample_range: f32,
    /// Grid subdivisions per axis (`N + 1` samples)
    pub samples_per_axis: u32,
    /// Samples with `|sdf|` below this are treated as near the surface
    pub surface_threshold: f32,
    /// Padding added around the sampled box
    pub padding: f32,
    /// Closest-distance search stops once a distance below this is found
    pub early_exit: f32,
}

impl Default for BvhConfig {
    fn default() -> Self {
        BvhConfig {
            max_primitives_per_leaf: 8,
            max_depth: 32,
            sample_range: 3.0,
            samples_per_axis: 8,
            surface_threshold: 0.5,
            padding: 0.2,
            early_exit: 0.001,
        }
    }
}

/// BVH Node
#[derive(Debug, Clone)]
pub enum BvhNode {
    /// Leaf node containing primitive indices
    Leaf {
        /// Union of the primitives' boxes
        bounds: Aabb,
        /// Primitive indices
        primitives: Vec<usize>,
    },
    /// Internal node with two children
    Internal {
        /// Union of both children
        bounds: Aabb,
        /// Lower half along the split axis
        left: Box<BvhNode>,
        /// Upper half along the split axis
        right: Box<BvhNode>,
    },
}

impl BvhNode {
    /// Get bounds of this node
    #[inline]
    pub fn bounds(&self) -> &Aabb {
        match self {
            BvhNode::Leaf { bounds, .. } => bounds,
            BvhNode::Internal { bounds, .. } => bounds,
        }
    }
}

/// BVH acceleration structure
#[derive(Debug, Clone)]
pub struct Bvh {
    pub(crate) root: Option<BvhNode>,
    pub(crate) primitive_bounds: Vec<Aabb>,
    pub(crate) config: BvhConfig,
    node_count: usize,
}

impl Bvh {
    /// Root node, `None` for an empty scene
    pub fn root(&self) -> Option<&BvhNode> {
        self.root.as_ref()
    }

    /// Bounds of the whole hierarchy
    pub fn bounds(&self) -> Option<Aabb> {
        self.root.as_ref().map(|r| *r.bounds())
    }

    /// Sampled box of every primitive, by index
    pub fn primitive_bounds(&self) -> &[Aabb] {
        &self.primitive_bounds
    }

    /// Parameters the hierarchy was built with
    pub fn config(&self) -> &BvhConfig {
        &self.config
    }

    /// Total number of nodes
    pub fn node_count(&self) -> usize {
        self.node_count
    }

    /// Number of primitives indexed by the hierarchy
    pub fn primitive_count(&self) -> usize {
        self.primitive_bounds.len()
    }
}
