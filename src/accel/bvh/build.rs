//! BVH construction: sampled primitive boxes, median split on the widest axis

use std::time::Instant;

use glam::Vec3;

use super::{Bvh, BvhConfig, BvhNode};
use crate::eval::max_axis_scale;
use crate::types::{Aabb, Primitive};

impl Bvh {
    /// Build a BVH over a primitive list
    pub fn build(primitives: &[Primitive], config: &BvhConfig) -> Bvh {
        let start = Instant::now();
        let primitive_bounds: Vec<Aabb> = primitives
            .iter()
            .map(|p| sample_bounds(p, config))
            .collect();

        if primitives.is_empty() {
            return Bvh {
                root: None,
                primitive_bounds,
                config: *config,
                node_count: 0,
            };
        }

        let mut node_count = 0;
        let indices: Vec<usize> = (0..primitives.len()).collect();
        let root = build_node(&primitive_bounds, indices, 0, config, &mut node_count);

        tracing::debug!(
            primitives = primitives.len(),
            nodes = node_count,
            elapsed_us = start.elapsed().as_micros() as u64,
            "bvh built"
        );

        Bvh {
            root: Some(root),
            primitive_bounds,
            config: *config,
            node_count,
        }
    }
}

/// Estimate a primitive's world-space box by sampling its local field
///
/// Grid points `(-range + 2 * range * i / N, ...)` for `i` in `0..=N` whose
/// `|local_sdf|` is below the surface threshold are mapped to world space
/// and padded. Threshold and padding are raised to at least half a cell
/// diagonal, so every surface point of a 1-Lipschitz field lies inside the
/// box. Falls back to the bounding-radius box when the surface can extend
/// past the grid, when no sample is kept, or when the primitive's placement
/// cannot be inverted. Unbounded primitives get an infinite box.
pub fn sample_bounds(prim: &Primitive, config: &BvhConfig) -> Aabb {
    let radius = prim.local_bounding_radius();
    if !radius.is_finite() {
        return Aabb::infinite();
    }
    let Some(local_to_world) = prim.local_to_world() else {
        return prim.approximate_aabb();
    };
    if radius > config.sample_range || config.samples_per_axis == 0 {
        return prim.approximate_aabb();
    }

    let n = config.samples_per_axis;
    let step = 2.0 * config.sample_range / n as f32;
    let half_diagonal = step * 3.0f32.sqrt() * 0.5;
    let threshold = config.surface_threshold.max(half_diagonal * 1.001);
    let padding = config
        .padding
        .max(half_diagonal * max_axis_scale(local_to_world));
    let mut bounds = Aabb::empty();
    let mut kept = 0usize;

    for i in 0..=n {
        for j in 0..=n {
            for k in 0..=n {
                let local = Vec3::new(
                    -config.sample_range + step * i as f32,
                    -config.sample_range + step * j as f32,
                    -config.sample_range + step * k as f32,
                );
                if prim.local_sdf(local).abs() < threshold {
                    bounds = bounds.include_point(local_to_world.transform_point3(local));
                    kept += 1;
                }
            }
        }
    }

    if kept == 0 {
        return prim.approximate_aabb();
    }
    bounds.expand(padding)
}

/// Centroid used for split decisions; unbounded boxes sort at the origin
#[inline]
fn centroid(b: &Aabb) -> Vec3 {
    if b.is_finite() {
        b.center()
    } else {
        Vec3::ZERO
    }
}

fn build_node(
    bounds_of: &[Aabb],
    indices: Vec<usize>,
    depth: u32,
    config: &BvhConfig,
    node_count: &mut usize,
) -> BvhNode {
    *node_count += 1;

    let bounds = indices
        .iter()
        .fold(Aabb::empty(), |acc, &i| acc.union(&bounds_of[i]));

    if indices.len() <= config.max_primitives_per_leaf || depth >= config.max_depth {
        return BvhNode::Leaf {
            bounds,
            primitives: indices,
        };
    }

    // Split along the axis of greatest centroid spread
    let (lo, hi) = indices.iter().fold(
        (Vec3::splat(f32::INFINITY), Vec3::splat(f32::NEG_INFINITY)),
        |(lo, hi), &i| {
            let c = centroid(&bounds_of[i]);
            (lo.min(c), hi.max(c))
        },
    );
    let spread = hi - lo;
    let axis = if spread.x >= spread.y && spread.x >= spread.z {
        0
    } else if spread.y >= spread.z {
        1
    } else {
        2
    };

    let mut sorted = indices;
    sorted.sort_by(|&a, &b| {
        let va = centroid(&bounds_of[a])[axis];
        let vb = centroid(&bounds_of[b])[axis];
        va.partial_cmp(&vb).unwrap_or(std::cmp::Ordering::Equal)
    });

    let mid = sorted.len() / 2;
    if mid == 0 || mid == sorted.len() {
        return BvhNode::Leaf {
            bounds,
            primitives: sorted,
        };
    }
    let right_indices = sorted.split_off(mid);

    let left = build_node(bounds_of, sorted, depth + 1, config, node_count);
    let right = build_node(bounds_of, right_indices, depth + 1, config, node_count);

    BvhNode::Internal {
        bounds,
        left: Box::new(left),
        right: Box::new(right),
    }
}
