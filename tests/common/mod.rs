//! Common test helpers for sdf-march integration tests

#![allow(dead_code)]

use sdf_march::prelude::*;

// ============================================================================
// Standard test scenes
// ============================================================================

/// Sphere of radius 1.5 at the origin
pub fn single_sphere() -> Vec<Primitive> {
    vec![Primitive::sphere(1.5)]
}

/// 3x3 sphere grid, a torus and a rounded box spread over a few units
pub fn cluster() -> Vec<Primitive> {
    let mut prims = Vec::new();
    for i in 0..3 {
        for j in 0..3 {
            prims.push(
                Primitive::sphere(0.3).translate(Vec3::new(i as f32 - 1.0, j as f32 - 1.0, 0.0)),
            );
        }
    }
    prims.push(Primitive::torus(0.5, 0.1).translate(Vec3::new(2.5, 2.0, 0.5)));
    prims.push(
        Primitive::box3d(Vec3::new(0.4, 0.2, 0.3))
            .round(0.05)
            .translate(Vec3::new(-2.2, 1.5, -0.5)),
    );
    prims
}

/// Ray from `(x, y, 5)` straight down `-Z`
pub fn down_z(x: f32, y: f32) -> Ray {
    Ray::new(Vec3::new(x, y, 5.0), Vec3::NEG_Z)
}

// ============================================================================
// Standard test points
// ============================================================================

/// Deterministic pseudo-random points in `[-extent, extent]^3`
pub fn scattered_points(count: usize, extent: f32) -> Vec<Vec3> {
    (0..count)
        .map(|i| {
            let f = i as f32;
            Vec3::new(
                (f * 0.731).sin() * extent,
                (f * 1.137 + 0.5).sin() * extent,
                (f * 0.419 + 1.3).sin() * extent,
            )
        })
        .collect()
}

/// Exact nearest distance by scanning every primitive
pub fn brute_force(prims: &[Primitive], p: Vec3) -> (usize, f32) {
    prims
        .iter()
        .enumerate()
        .map(|(i, prim)| (i, prim.sdf(p)))
        .fold((usize::MAX, f32::INFINITY), |best, cur| if cur.1 < best.1 { cur } else { best })
}

// ============================================================================
// Assertion helpers
// ============================================================================

/// Assert two f32 values are close within tolerance
pub fn assert_close(a: f32, b: f32, tol: f32, msg: &str) {
    assert!(
        (a - b).abs() < tol,
        "{}: {} vs {} (diff={}, tol={})",
        msg,
        a,
        b,
        (a - b).abs(),
        tol
    );
}
