//! Integration tests: distance-field properties of primitives and operators

mod common;

use common::*;
use sdf_march::prelude::*;

// ============================================================================
// Leaves are exact on their analytic surfaces
// ============================================================================

#[test]
fn sphere_surface_points_are_zero() {
    let s = Primitive::sphere(1.5);
    for p in scattered_points(40, 1.0) {
        let Some(dir) = p.try_normalize() else { continue };
        assert!(s.sdf(dir * 1.5).abs() < 1e-6, "at {:?}", dir * 1.5);
    }
}

#[test]
fn box_face_points_are_zero() {
    let half = Vec3::new(0.5, 0.75, 1.0);
    let b = Primitive::box3d(half);
    let faces = [
        Vec3::new(0.5, 0.1, -0.3),
        Vec3::new(-0.5, 0.5, 0.9),
        Vec3::new(0.2, 0.75, 0.0),
        Vec3::new(-0.4, -0.75, 0.5),
        Vec3::new(0.3, -0.2, 1.0),
        Vec3::new(0.0, 0.0, -1.0),
    ];
    for p in faces {
        assert!(b.sdf(p).abs() < 1e-6, "at {p:?}");
    }
}

#[test]
fn torus_tube_points_are_zero() {
    let t = Primitive::torus(1.0, 0.25);
    for i in 0..16 {
        let a = i as f32 * std::f32::consts::TAU / 16.0;
        let b = i as f32 * 0.7;
        let ring = Vec3::new(a.cos(), 0.0, a.sin());
        let p = ring * (1.0 + 0.25 * b.cos()) + Vec3::Y * 0.25 * b.sin();
        assert!(t.sdf(p).abs() < 1e-6, "at {p:?}");
    }
}

#[test]
fn translated_leaf_keeps_distance() {
    let offset = Vec3::new(2.0, -1.0, 0.5);
    let s = Primitive::sphere(1.0).translate(offset);
    for p in scattered_points(20, 3.0) {
        assert_close(s.sdf(p + offset), Primitive::sphere(1.0).sdf(p), 1e-5, "translate");
    }
}

// ============================================================================
// Operator identities
// ============================================================================

#[test]
fn round_subtracts_radius_exactly() {
    let base = Primitive::box3d(Vec3::new(0.5, 0.3, 0.2));
    let rounded = base.clone().round(0.1);
    for p in scattered_points(50, 2.0) {
        assert_eq!(rounded.sdf(p), base.sdf(p) - 0.1, "at {p:?}");
    }
}

#[test]
fn smooth_union_never_exceeds_min() {
    let a = Primitive::sphere(0.8).translate(Vec3::new(-0.5, 0.0, 0.0));
    let b = Primitive::box3d(Vec3::splat(0.5)).translate(Vec3::new(0.5, 0.0, 0.0));
    for k in [0.05, 0.2, 0.8] {
        let u = a.clone().smooth_union(b.clone(), k);
        for p in scattered_points(60, 2.0) {
            assert!(u.sdf(p) <= a.sdf(p).min(b.sdf(p)) + 1e-6, "k={k} at {p:?}");
        }
    }
}

#[test]
fn smooth_subtraction_carves() {
    let carved = Primitive::sphere(1.0).smooth_subtract(Primitive::sphere(0.5), 0.05);
    // the center is now outside
    assert!(carved.sdf(Vec3::ZERO) > 0.0);
    // the shell is still solid
    assert!(carved.sdf(Vec3::new(0.8, 0.0, 0.0)) < 0.0);
}

#[test]
fn repetition_is_periodic() {
    let spacing = Vec3::new(2.0, 3.0, 2.5);
    let r = Primitive::torus(0.5, 0.1).repeat(spacing);
    let shifts = [
        Vec3::new(1.0, 0.0, 0.0),
        Vec3::new(0.0, -2.0, 1.0),
        Vec3::new(3.0, 1.0, -2.0),
    ];
    for p in scattered_points(30, 0.7) {
        for n in shifts {
            assert_close(r.sdf(p + n * spacing), r.sdf(p), 1e-4, "periodicity");
        }
    }
}

#[test]
fn twist_keeps_the_axis() {
    let twisted = Primitive::box3d(Vec3::new(0.2, 1.0, 0.4)).twist(1.0);
    // points on the twist axis are unaffected
    for y in [-0.8, 0.0, 0.6] {
        let p = Vec3::new(0.0, y, 0.0);
        assert_close(
            twisted.sdf(p),
            Primitive::box3d(Vec3::new(0.2, 1.0, 0.4)).sdf(p),
            1e-6,
            "axis",
        );
    }
}

#[test]
fn oscillation_follows_time() {
    let mut s = Primitive::sphere(0.5).oscillate(Vec3::X, 1.0, 2.0);
    s.set_time(std::f32::consts::FRAC_PI_4);
    // sin(pi/2) = 1: the center sits at x = 1
    assert_close(s.sdf(Vec3::X), -0.5, 1e-5, "displaced center");
}

#[test]
fn mandelbulb_is_finite_and_bounded() {
    let m = Primitive::mandelbulb();
    for p in scattered_points(40, 2.0) {
        let d = m.sdf(p);
        assert!(d.is_finite(), "at {p:?}");
    }
    // far from the bulb the estimate is positive
    assert!(m.sdf(Vec3::new(3.0, 0.0, 0.0)) > 0.5);
    assert!(m.approximate_aabb().contains(Vec3::new(1.1, 0.0, 0.0)));
}
