//! Integration tests: octree and BVH query guarantees

mod common;

use common::*;
use sdf_march::prelude::*;

#[test]
fn octree_candidates_contain_the_nearest_primitive() {
    let prims = cluster();
    let tree = Octree::build(&prims, &OctreeConfig::default());
    for p in scattered_points(200, 3.0) {
        let (nearest, _) = brute_force(&prims, p);
        let candidates = tree.get_primitives_at(p);
        assert!(
            candidates.contains(&nearest),
            "nearest {nearest} missing at {p:?}: {candidates:?}"
        );
    }
}

#[test]
fn octree_degenerate_bounds_build_single_leaf() {
    // zero-radius sphere: the union of primitive boxes has no volume
    let prims = vec![Primitive::sphere(0.0)];
    let tree = Octree::build(&prims, &OctreeConfig::default());
    assert!(tree.root().is_leaf());
    assert_eq!(tree.node_count(), 1);
    assert_eq!(tree.get_primitives_at(Vec3::ONE), vec![0]);
}

#[test]
fn bvh_intervals_cover_crossed_boxes() {
    let prims = cluster();
    let bvh = Bvh::build(&prims, &BvhConfig::default());
    let rays = [
        Ray::new(Vec3::new(-5.0, -1.0, 0.0), Vec3::new(1.0, 0.2, 0.0)),
        Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::new(0.1, 0.05, -1.0)),
        Ray::new(Vec3::new(4.0, 4.0, 4.0), Vec3::new(-1.0, -1.0, -1.0)),
    ];
    for ray in rays {
        let intervals = bvh.find_ray_intersections(ray.origin, ray.direction, 0.0, 10.0);
        for b in bvh.primitive_bounds() {
            let Some((enter, exit)) = b.intersect_ray(ray.origin, ray.direction) else {
                continue;
            };
            let (enter, exit) = (enter.max(0.0), exit.min(10.0));
            if enter > exit {
                continue;
            }
            assert!(
                intervals
                    .iter()
                    .any(|&(a, z)| a <= enter + 1e-4 && z >= exit - 1e-4),
                "box [{enter}, {exit}] not covered by {intervals:?}"
            );
        }
    }
}

#[test]
fn scene_distance_agrees_across_structures() {
    let exact = Scene::new(cluster(), AccelKind::None);
    let octree = Scene::new(cluster(), AccelKind::Octree);
    let bvh = Scene::new(cluster(), AccelKind::Bvh);
    for p in scattered_points(150, 3.5) {
        let e = exact.distance(p).distance;

        let o = octree.distance(p);
        if o.evaluations == 0 {
            // empty-space bound
            assert!(o.distance <= e + 1e-6 && o.distance > 0.0, "octree at {p:?}");
        } else {
            assert_close(o.distance, e, 1e-5, "octree");
        }

        let b = bvh.distance(p).distance;
        if e >= 0.001 {
            assert_close(b, e, 1e-5, "bvh");
        } else {
            assert!(b < 0.001, "bvh at {p:?}");
        }
    }
}

#[test]
fn repeated_primitive_falls_back_to_full_scan() {
    let prims = vec![
        Primitive::sphere(0.2).repeat(Vec3::splat(1.0)),
        Primitive::sphere(0.5).translate(Vec3::new(0.0, 0.0, -3.0)),
    ];
    let exact = Scene::new(prims.clone(), AccelKind::None);
    let bvh = Scene::new(prims, AccelKind::Bvh);
    // far outside any finite box, the tiled spheres are still found
    let p = Vec3::new(20.3, 40.0, 7.0);
    assert_close(bvh.distance(p).distance, exact.distance(p).distance, 1e-5, "tiled");
}

#[test]
fn scene_rebuilds_on_structure_change() {
    let mut scene = Scene::new(cluster(), AccelKind::None);
    assert!(scene.acceleration().bounds().is_none());
    scene.set_acceleration(AccelKind::Octree);
    assert_eq!(scene.accel_kind(), AccelKind::Octree);
    assert!(scene.acceleration().node_count() > 1);
    scene.set_octree_config(OctreeConfig {
        max_depth: 0,
        ..OctreeConfig::default()
    });
    assert_eq!(scene.acceleration().node_count(), 1);
}
