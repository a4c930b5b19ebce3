//! Scene: primitives plus one acceleration structure
//!
//! [`Scene::distance`] is the single nearest-distance query every marcher
//! uses. It returns the number of primitive evaluations alongside the value
//! so callers can accumulate diagnostics without shared counters.

use glam::Vec3;

use crate::accel::{AccelKind, AccelerationStructure, Bvh, BvhConfig, Octree, OctreeConfig};
use crate::types::{compute_bounds, Aabb, Primitive};

/// Distance value plus the number of primitive SDF evaluations it took
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DistanceSample {
    /// Signed distance (or a conservative lower bound in empty space)
    pub distance: f32,
    /// Primitive evaluations performed
    pub evaluations: usize,
}

/// Primitive list with its acceleration structure
///
/// The structure is rebuilt whenever the primitive list, the selected
/// variant or a structure config changes. Animation time does not trigger a
/// rebuild; bounding radii already cover animated motion.
#[derive(Debug, Clone)]
pub struct Scene {
    primitives: Vec<Primitive>,
    kind: AccelKind,
    octree_config: OctreeConfig,
    bvh_config: BvhConfig,
    accel: AccelerationStructure,
    bounds: Aabb,
}

impl Default for Scene {
    fn default() -> Self {
        Scene::new(Vec::new(), AccelKind::None)
    }
}

impl Scene {
    /// Create a scene with default structure configs
    pub fn new(primitives: Vec<Primitive>, kind: AccelKind) -> Self {
        Scene::with_config(primitives, kind, OctreeConfig::default(), BvhConfig::default())
    }

    /// Create a scene with explicit structure configs
    pub fn with_config(
        primitives: Vec<Primitive>,
        kind: AccelKind,
        octree_config: OctreeConfig,
        bvh_config: BvhConfig,
    ) -> Self {
        let mut scene = Scene {
            primitives,
            kind,
            octree_config,
            bvh_config,
            accel: AccelerationStructure::None,
            bounds: Aabb::zero(),
        };
        scene.rebuild();
        scene
    }

    fn rebuild(&mut self) {
        let boxes: Vec<Aabb> = self.primitives.iter().map(Primitive::approximate_aabb).collect();
        self.bounds = compute_bounds(&boxes);
        self.accel = AccelerationStructure::build(
            self.kind,
            &self.primitives,
            &self.octree_config,
            &self.bvh_config,
        );
        tracing::debug!(
            primitives = self.primitives.len(),
            accel = %self.kind,
            nodes = self.accel.node_count(),
            "scene rebuilt"
        );
    }

    /// Replace the primitive list and rebuild
    pub fn set_primitives(&mut self, primitives: Vec<Primitive>) {
        self.primitives = primitives;
        self.rebuild();
    }

    /// Select a different acceleration structure
    ///
    /// Rebuilds only when the variant actually changes.
    pub fn set_acceleration(&mut self, kind: AccelKind) {
        if kind != self.kind {
            self.kind = kind;
            self.rebuild();
        }
    }

    /// Replace the octree parameters and rebuild
    pub fn set_octree_config(&mut self, config: OctreeConfig) {
        self.octree_config = config;
        self.rebuild();
    }

    /// Replace the BVH parameters and rebuild
    pub fn set_bvh_config(&mut self, config: BvhConfig) {
        self.bvh_config = config;
        self.rebuild();
    }

    /// Primitives in evaluation order
    pub fn primitives(&self) -> &[Primitive] {
        &self.primitives
    }

    /// Selected variant
    pub fn accel_kind(&self) -> AccelKind {
        self.kind
    }

    /// The built structure
    pub fn acceleration(&self) -> &AccelerationStructure {
        &self.accel
    }

    /// Union of every primitive's approximate AABB
    pub fn bounds(&self) -> Aabb {
        self.bounds
    }

    /// Propagate the animation time to every primitive
    pub fn update_time(&mut self, t: f32) {
        for prim in &mut self.primitives {
            prim.set_time(t);
        }
    }

    /// Nearest signed distance at a point
    ///
    /// `+inf` for an empty scene.
    pub fn distance(&self, point: Vec3) -> DistanceSample {
        match &self.accel {
            AccelerationStructure::None => self.full_scan(point),
            AccelerationStructure::Octree(tree) => self.octree_distance(tree, point),
            AccelerationStructure::Bvh(bvh) => self.bvh_distance(bvh, point),
        }
    }

    /// Minimum over every primitive
    pub fn full_scan(&self, point: Vec3) -> DistanceSample {
        let distance = self
            .primitives
            .iter()
            .map(|p| p.sdf(point))
            .fold(f32::INFINITY, f32::min);
        DistanceSample {
            distance,
            evaluations: self.primitives.len(),
        }
    }

    fn octree_distance(&self, tree: &Octree, point: Vec3) -> DistanceSample {
        let Some(node) = tree.find_node(point) else {
            return self.full_scan(point);
        };
        let config = tree.config();

        if node.is_empty {
            let bound = node.min_distance * config.safety_factor;
            if bound >= config.min_skip {
                return DistanceSample {
                    distance: bound,
                    evaluations: 0,
                };
            }
            return self.full_scan(point);
        }

        let mut sample = DistanceSample {
            distance: f32::INFINITY,
            evaluations: 0,
        };
        for &i in &node.primitives {
            sample.distance = sample.distance.min(self.primitives[i].sdf(point));
            sample.evaluations += 1;
        }

        // primitives from neighbouring leaves can still be closer
        for i in tree.primitives_within(point, sample.distance.max(0.0)) {
            if node.primitives.binary_search(&i).is_err() {
                sample.distance = sample.distance.min(self.primitives[i].sdf(point));
                sample.evaluations += 1;
            }
        }
        sample
    }

    fn bvh_distance(&self, bvh: &Bvh, point: Vec3) -> DistanceSample {
        let sample = bvh.find_closest_distance(&self.primitives, point, f32::INFINITY);
        if sample.evaluations == 0 {
            return self.full_scan(point);
        }
        sample
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cluster() -> Vec<Primitive> {
        let mut prims = Vec::new();
        for i in 0..3 {
            for j in 0..3 {
                prims.push(
                    Primitive::sphere(0.3)
                        .translate(Vec3::new(i as f32 - 1.0, j as f32 - 1.0, 0.0)),
                );
            }
        }
        prims.push(Primitive::torus(0.5, 0.1).translate(Vec3::new(3.0, 3.0, 0.0)));
        prims
    }

    fn probes() -> Vec<Vec3> {
        (0..60)
            .map(|i| {
                let f = i as f32;
                Vec3::new((f * 0.37).sin() * 3.5, (f * 0.23).cos() * 3.5, (f * 0.11).sin() * 1.5)
            })
            .collect()
    }

    #[test]
    fn test_empty_scene_is_infinitely_far() {
        let scene = Scene::default();
        let s = scene.distance(Vec3::ZERO);
        assert!(s.distance.is_infinite());
        assert_eq!(s.evaluations, 0);
    }

    #[test]
    fn test_full_scan_counts_every_primitive() {
        let scene = Scene::new(cluster(), AccelKind::None);
        assert_eq!(scene.distance(Vec3::ZERO).evaluations, 10);
    }

    #[test]
    fn test_octree_distance_exact_or_conservative() {
        let exact = Scene::new(cluster(), AccelKind::None);
        let octree = Scene::new(cluster(), AccelKind::Octree);
        for p in probes() {
            let e = exact.distance(p).distance;
            let o = octree.distance(p);
            if o.evaluations == 0 {
                assert!(o.distance <= e + 1e-6, "bound {} above {} at {p:?}", o.distance, e);
            } else {
                assert!((o.distance - e).abs() < 1e-6, "at {p:?}");
            }
        }
    }

    #[test]
    fn test_bvh_distance_matches_full_scan() {
        let exact = Scene::new(cluster(), AccelKind::None);
        let bvh = Scene::new(cluster(), AccelKind::Bvh);
        for p in probes() {
            let e = exact.distance(p).distance;
            let b = bvh.distance(p).distance;
            if e >= 0.001 {
                assert!((b - e).abs() < 1e-5, "at {p:?}");
            } else {
                assert!(b < 0.001);
            }
        }
    }

    #[test]
    fn test_set_acceleration_rebuilds() {
        let mut scene = Scene::new(cluster(), AccelKind::None);
        assert_eq!(scene.acceleration().kind(), AccelKind::None);
        scene.set_acceleration(AccelKind::Bvh);
        assert_eq!(scene.acceleration().kind(), AccelKind::Bvh);
        assert!(scene.acceleration().node_count() > 0);

        scene.set_primitives(vec![Primitive::sphere(1.0)]);
        assert_eq!(scene.primitives().len(), 1);
        assert_eq!(scene.acceleration().node_count(), 1);
    }

    #[test]
    fn test_update_time_moves_animated_primitives() {
        let mut scene = Scene::new(
            vec![Primitive::sphere(0.5).oscillate(Vec3::X, 1.0, 1.0)],
            AccelKind::None,
        );
        let before = scene.distance(Vec3::new(1.5, 0.0, 0.0)).distance;
        scene.update_time(std::f32::consts::FRAC_PI_2);
        let after = scene.distance(Vec3::new(1.5, 0.0, 0.0)).distance;
        assert!((before - 1.0).abs() < 1e-5);
        assert!(after.abs() < 1e-5);
    }

    #[test]
    fn test_scene_bounds() {
        let scene = Scene::new(vec![Primitive::sphere(1.0)], AccelKind::None);
        assert_eq!(scene.bounds().max, Vec3::splat(1.5));
    }
}
