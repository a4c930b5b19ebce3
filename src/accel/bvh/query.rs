//! BVH queries: point candidates, ray intervals and closest distance

use glam::Vec3;

use super::{Bvh, BvhNode};
use crate::accel::{RayMarchContext, StepAction, SKIP_TOLERANCE};
use crate::scene::DistanceSample;
use crate::types::Primitive;

/// Per-ray BVH state: sorted leaf intervals and the active index
#[derive(Debug, Clone, Default)]
pub struct BvhRayState {
    intervals: Vec<(f32, f32)>,
    index: usize,
}

impl BvhRayState {
    /// Remaining and passed intervals, sorted by entry distance
    pub fn intervals(&self) -> &[(f32, f32)] {
        &self.intervals
    }

    /// Index of the interval the ray is in or approaching
    pub fn index(&self) -> usize {
        self.index
    }
}

impl Bvh {
    /// Primitives of every leaf whose bounds contain the point
    ///
    /// Sorted and duplicate-free; every primitive when no leaf matches.
    pub fn get_primitives_at(&self, point: Vec3) -> Vec<usize> {
        let mut out = Vec::new();
        if let Some(root) = &self.root {
            let mut stack = vec![root];
            while let Some(node) = stack.pop() {
                if !node.bounds().contains(point) {
                    continue;
                }
                match node {
                    BvhNode::Leaf { primitives, .. } => out.extend_from_slice(primitives),
                    BvhNode::Internal { left, right, .. } => {
                        stack.push(right);
                        stack.push(left);
                    }
                }
            }
        }
        if out.is_empty() {
            return (0..self.primitive_bounds.len()).collect();
        }
        out.sort_unstable();
        out.dedup();
        out
    }

    /// Distance intervals where the ray crosses a non-empty leaf
    ///
    /// Intervals are clipped to `[t_min, t_max]`, may overlap, and are
    /// sorted by entry distance.
    pub fn find_ray_intersections(
        &self,
        origin: Vec3,
        direction: Vec3,
        t_min: f32,
        t_max: f32,
    ) -> Vec<(f32, f32)> {
        let mut intervals = Vec::new();
        let Some(root) = &self.root else {
            return intervals;
        };

        let mut stack = vec![root];
        while let Some(node) = stack.pop() {
            let Some((enter, exit)) = node.bounds().intersect_ray(origin, direction) else {
                continue;
            };
            let (enter, exit) = (enter.max(t_min), exit.min(t_max));
            if enter > exit {
                continue;
            }
            match node {
                BvhNode::Leaf { primitives, .. } => {
                    if !primitives.is_empty() {
                        intervals.push((enter, exit));
                    }
                }
                BvhNode::Internal { left, right, .. } => {
                    stack.push(left);
                    stack.push(right);
                }
            }
        }

        intervals.sort_by(|a, b| a.0.total_cmp(&b.0));
        intervals
    }

    /// Closest primitive distance, pruning boxes farther than the best so far
    ///
    /// Starts from `max_dist` as the best candidate and stops early once a
    /// distance below `early_exit` is found. `evaluations == 0` means every
    /// subtree was pruned.
    pub fn find_closest_distance(
        &self,
        primitives: &[Primitive],
        point: Vec3,
        max_dist: f32,
    ) -> DistanceSample {
        let mut sample = DistanceSample {
            distance: max_dist,
            evaluations: 0,
        };
        if let Some(root) = &self.root {
            self.closest_recursive(root, primitives, point, &mut sample);
        }
        sample
    }

    /// Returns true once the early-exit threshold is reached
    fn closest_recursive(
        &self,
        node: &BvhNode,
        primitives: &[Primitive],
        point: Vec3,
        best: &mut DistanceSample,
    ) -> bool {
        if node.bounds().distance_to_point(point) > best.distance.max(0.0) {
            return false;
        }
        match node {
            BvhNode::Leaf { primitives: ids, .. } => {
                for &i in ids {
                    let d = primitives[i].sdf(point);
                    best.evaluations += 1;
                    if d < best.distance {
                        best.distance = d;
                    }
                    if d < self.config.early_exit {
                        return true;
                    }
                }
                false
            }
            BvhNode::Internal { left, right, .. } => {
                // closest child first
                let dl = left.bounds().distance_to_point(point);
                let dr = right.bounds().distance_to_point(point);
                let (near, far) = if dl <= dr { (left, right) } else { (right, left) };
                self.closest_recursive(near, primitives, point, best)
                    || self.closest_recursive(far, primitives, point, best)
            }
        }
    }

    /// Precompute the ray's interval list; `None` when the ray meets no leaf
    pub fn on_ray_march_start(&self, ctx: &RayMarchContext) -> Option<BvhRayState> {
        let intervals = self.find_ray_intersections(
            ctx.origin,
            ctx.direction,
            ctx.current_distance,
            ctx.max_distance,
        );
        if intervals.is_empty() {
            return None;
        }
        Some(BvhRayState {
            intervals,
            index: 0,
        })
    }

    /// Decide what the marcher does at the current distance
    ///
    /// The interval index only moves forward.
    pub fn on_ray_march_step(&self, ctx: &RayMarchContext, state: &mut BvhRayState) -> StepAction {
        let t = ctx.current_distance;
        while state.index < state.intervals.len() && t > state.intervals[state.index].1 {
            state.index += 1;
        }
        let Some(&(enter, _)) = state.intervals.get(state.index) else {
            return StepAction::Exhausted;
        };
        if t < enter - SKIP_TOLERANCE {
            StepAction::Skip(enter - t)
        } else {
            StepAction::Evaluate
        }
    }
}
