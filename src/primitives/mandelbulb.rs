//! Mandelbulb fractal distance estimate
//!
//! Iterates the spherical power map `z -> z^n + c` until `|z|` escapes
//! radius 2 or the iteration cap is reached, tracking the running
//! derivative `dr`. The result `0.5 * ln(r) * r / dr` is a lower bound on the
//! distance, not an exact SDF, so marchers must rely on their step cap.

use glam::Vec3;

/// Escape radius of the power map
pub const ESCAPE_RADIUS: f32 = 2.0;

/// Distance estimate to a Mandelbulb centered at origin
///
/// The point is swizzled to `(x, z, y)` so the bulb's pole points along +Y.
/// `phase` offsets the polar angle every iteration (0 for a static bulb).
#[inline]
pub fn sdf_mandelbulb(point: Vec3, power: f32, iterations: u32, phase: f32) -> f32 {
    let c = Vec3::new(point.x, point.z, point.y);
    let mut z = c;
    let mut dr = 1.0_f32;
    let mut r = 0.0_f32;

    for _ in 0..iterations {
        r = z.length();
        if r > ESCAPE_RADIUS {
            break;
        }
        if r <= f32::MIN_POSITIVE {
            // fixed point at the origin, deep inside the set
            return 0.0;
        }

        let theta = z.y.atan2(z.x) * power;
        let phi = ((z.z / r).clamp(-1.0, 1.0).asin() + phase) * power;

        dr = r.powf(power - 1.0) * dr * power + 1.0;
        r = r.powf(power);

        let (sin_t, cos_t) = theta.sin_cos();
        let (sin_p, cos_p) = phi.sin_cos();
        z = r * Vec3::new(cos_t * cos_p, sin_t * cos_p, sin_p) + c;
    }

    if r <= f32::MIN_POSITIVE {
        return 0.0;
    }
    0.5 * r.ln() * r / dr
}
