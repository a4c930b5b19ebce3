//! Octree queries: point lookup, candidate filtering and ray skipping

use glam::Vec3;

use super::{octant_for_point, Octree, OctreeNode};

impl Octree {
    /// Find the leaf containing a point
    ///
    /// Returns `None` when the point lies outside the root bounds.
    pub fn find_node(&self, point: Vec3) -> Option<&OctreeNode> {
        if !self.root.bounds.contains(point) {
            return None;
        }
        let mut node = &self.root;
        while let Some(children) = &node.children {
            node = &children[octant_for_point(point, node.bounds.center())];
        }
        Some(node)
    }

    /// Primitives stored in every leaf whose bounds contain the point
    ///
    /// Sorted and duplicate-free. Points on a shared face collect from all
    /// adjoining leaves.
    pub fn leaf_primitives_at(&self, point: Vec3) -> Vec<usize> {
        let mut out = Vec::new();
        collect_containing(&self.root, point, &mut out);
        out.sort_unstable();
        out.dedup();
        out
    }

    /// Candidate primitives for a distance query at `point`
    ///
    /// Starts from [`Octree::leaf_primitives_at`] and adds every primitive
    /// whose AABB is no farther than the farthest corner of a leaf
    /// primitive's AABB, so the primitive with the true minimum distance is
    /// never omitted. When nothing is found (empty leaf, or outside the
    /// tree) every primitive is returned.
    pub fn get_primitives_at(&self, point: Vec3) -> Vec<usize> {
        let mut found = self.leaf_primitives_at(point);
        if found.is_empty() {
            return (0..self.primitive_bounds.len()).collect();
        }

        let reach = found
            .iter()
            .map(|&i| self.primitive_bounds[i].max_distance_to_point(point))
            .fold(f32::INFINITY, f32::min);
        found.extend(self.primitives_within(point, reach));
        found.sort_unstable();
        found.dedup();
        found
    }

    /// Primitives whose AABB lies within `radius` of a point
    pub fn primitives_within(&self, point: Vec3, radius: f32) -> Vec<usize> {
        self.primitive_bounds
            .iter()
            .enumerate()
            .filter(|(_, b)| b.distance_to_point(point) <= radius)
            .map(|(i, _)| i)
            .collect()
    }

    /// Forward skip for a ray at distance `t`
    ///
    /// Inside an empty node returns `min(exit, min_distance * safety) + epsilon`;
    /// otherwise, or when that skip would be shorter than `min_skip`, returns 0
    /// and the caller evaluates normally.
    pub fn march_ray(&self, origin: Vec3, direction: Vec3, t: f32) -> f32 {
        let p = origin + direction * t;
        let Some(node) = self.find_node(p) else {
            return 0.0;
        };
        if !node.is_empty {
            return 0.0;
        }

        let exit = node
            .bounds
            .intersect_ray(p, direction)
            .map_or(0.0, |(_, exit)| exit.max(0.0));
        let skip = exit.min(node.min_distance * self.config.safety_factor);
        if skip < self.config.min_skip {
            return 0.0;
        }
        skip + self.config.skip_epsilon
    }
}

fn collect_containing(node: &OctreeNode, point: Vec3, out: &mut Vec<usize>) {
    if !node.bounds.contains(point) {
        return;
    }
    match &node.children {
        None => out.extend_from_slice(&node.primitives),
        Some(children) => {
            for child in children.iter() {
                collect_containing(child, point, out);
            }
        }
    }
}
