//! Integration tests: raymarching scenarios across algorithms and structures

mod common;

use common::*;
use sdf_march::prelude::*;

fn config() -> RaymarchConfig {
    RaymarchConfig::default()
}

#[test]
fn sphere_tracer_reports_depth_and_normal() {
    let scene = Scene::new(single_sphere(), AccelKind::None);
    let r = march(&scene, down_z(0.0, 0.0), Algorithm::SphereTracer, &config());
    assert!(r.hit);
    assert_close(r.distance, 3.5, 0.01, "depth");
    assert!((r.normal - Vec3::Z).length() < 0.01, "normal {:?}", r.normal);
    assert_close(r.point.length(), 1.5, 0.01, "hit point on surface");
}

#[test]
fn fixed_step_within_one_step_of_sphere_tracing() {
    let scene = Scene::new(single_sphere(), AccelKind::None);
    for (x, y) in [(0.0, 0.0), (0.5, 0.2), (-0.9, 0.9), (1.2, -0.4)] {
        let exact = march(&scene, down_z(x, y), Algorithm::SphereTracer, &config());
        let fixed = march(&scene, down_z(x, y), Algorithm::FixedStep { step: 0.1 }, &config());
        assert!(exact.hit && fixed.hit);
        assert!(
            (fixed.distance - exact.distance).abs() <= 0.1 + 0.002,
            "({x}, {y}): {} vs {}",
            fixed.distance,
            exact.distance
        );
    }
}

#[test]
fn adaptive_v2_uses_fewer_evaluations_on_large_sphere() {
    let scene = Scene::new(single_sphere(), AccelKind::None);
    let ray = down_z(0.0, 1.4);
    let plain = march(&scene, ray, Algorithm::SphereTracer, &config());
    let v2 = march(&scene, ray, Algorithm::AdaptiveStepV2 { overshoot: 1.2 }, &config());
    assert!(plain.hit && v2.hit);
    assert!(
        v2.sdf_evaluations < plain.sdf_evaluations,
        "{} vs {}",
        v2.sdf_evaluations,
        plain.sdf_evaluations
    );
    assert_close(v2.distance, plain.distance, 0.01, "same surface");
}

#[test]
fn structures_yield_identical_depth() {
    let rays = [
        down_z(0.0, 0.0),
        down_z(0.7, -0.3),
        down_z(1.3, 0.5),
        Ray::new(Vec3::new(4.0, 3.0, 2.0), Vec3::new(-4.0, -3.0, -2.0)),
        Ray::new(Vec3::new(0.0, 4.0, 0.0), Vec3::NEG_Y),
    ];
    for algorithm in Algorithm::ALL {
        for ray in rays {
            let depths: Vec<(bool, f32)> = AccelKind::ALL
                .iter()
                .map(|&kind| {
                    let r = march(&Scene::new(single_sphere(), kind), ray, algorithm, &config());
                    (r.hit, r.distance)
                })
                .collect();
            let tolerance = match algorithm {
                Algorithm::FixedStep { step } => step + 0.002,
                _ => 0.01,
            };
            for &(hit, depth) in &depths[1..] {
                assert_eq!(hit, depths[0].0, "{algorithm} {ray:?}");
                assert!(
                    (depth - depths[0].1).abs() <= tolerance,
                    "{algorithm} {ray:?}: {depths:?}"
                );
            }
        }
    }
}

#[test]
fn cluster_structures_agree_for_sphere_tracing() {
    let camera = Camera::orbit(0.2, -0.3, 6.0);
    // generous cap so no ray ends on the iteration limit
    let config = RaymarchConfig {
        max_steps: 500,
        ..config()
    };
    let scenes: Vec<Scene> = AccelKind::ALL
        .iter()
        .map(|&kind| Scene::new(cluster(), kind))
        .collect();
    for y in (0..24).step_by(3) {
        for x in (0..24).step_by(3) {
            let ray = camera.ray(x, y, 24, 24);
            let base = march(&scenes[0], ray, Algorithm::SphereTracer, &config);
            for scene in &scenes[1..] {
                let r = march(scene, ray, Algorithm::SphereTracer, &config);
                assert_eq!(r.hit, base.hit, "pixel ({x}, {y}) with {}", scene.accel_kind());
                if r.hit {
                    assert_close(r.distance, base.distance, 0.01, "cluster depth");
                }
            }
        }
    }
}

#[test]
fn fractal_rays_terminate() {
    let scene = Scene::new(vec![Primitive::mandelbulb()], AccelKind::Bvh);
    let camera = Camera::orbit(0.3, 0.8, 3.0);
    for algorithm in Algorithm::ALL {
        for i in 0..8 {
            let r = march(&scene, camera.ray(i * 4, 16, 32, 32), algorithm, &config());
            assert!(r.iterations <= algorithm.max_iterations(&config()) + 1);
            assert!(r.distance <= config().max_distance);
        }
    }
}

#[test]
fn animated_scene_changes_with_time() {
    let prims = vec![Primitive::sphere(0.5).oscillate(Vec3::Y, 1.0, 1.0)];
    let mut scene = Scene::new(prims, AccelKind::Octree);
    let config = config();
    let camera = Camera::default();

    let (at_rest, _) =
        render_frame(&mut scene, Algorithm::SphereTracer, &config, &camera, 8, 8, 0.0).unwrap();
    let (moved, _) = render_frame(
        &mut scene,
        Algorithm::SphereTracer,
        &config,
        &camera,
        8,
        8,
        std::f32::consts::FRAC_PI_2,
    )
    .unwrap();
    assert_ne!(at_rest.depth, moved.depth);
}

#[test]
fn frame_buffers_follow_the_output_contract() {
    let mut scene = Scene::new(single_sphere(), AccelKind::Bvh);
    let (buffers, stats) = render_frame(
        &mut scene,
        Algorithm::AdaptiveStepV3 { overshoot: 1.2 },
        &config(),
        &Camera::default(),
        20,
        20,
        0.0,
    )
    .unwrap();

    assert_eq!(buffers.depth.len(), 400);
    assert_eq!(buffers.normal.len(), 1200);
    assert_eq!(buffers.sdf_evaluations.len(), 400);
    assert_eq!(buffers.iterations.len(), 400);
    assert!(buffers.depth.iter().all(|&d| d <= 10));

    for i in 0..400 {
        let n = &buffers.normal[i * 3..i * 3 + 3];
        if buffers.depth[i] == 10 {
            assert_eq!(n, &[128, 128, 128], "miss at {i}");
        }
    }
    assert_eq!(stats.pixels, 400);
    assert!(stats.hits > 0);
}
