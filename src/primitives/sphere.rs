//! Sphere primitive SDF

use glam::Vec3;

/// Signed distance to a sphere centered at origin
///
/// # Arguments
/// * `point` - Point to evaluate
/// * `radius` - Sphere radius
///
/// # Returns
/// Signed distance (negative inside, positive outside)
#[inline(always)]
pub fn sdf_sphere(point: Vec3, radius: f32) -> f32 {
    point.length() - radius
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sphere_origin() {
        assert!((sdf_sphere(Vec3::ZERO, 1.0) + 1.0).abs() < 0.0001);
    }

    #[test]
    fn test_sphere_surface() {
        assert!(sdf_sphere(Vec3::new(1.5, 0.0, 0.0), 1.5).abs() < 1e-6);
        let p = Vec3::new(1.0, 1.0, 1.0).normalize() * 2.0;
        assert!(sdf_sphere(p, 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_sphere_outside() {
        assert!((sdf_sphere(Vec3::new(0.0, 0.0, 5.0), 1.5) - 3.5).abs() < 0.0001);
    }
}
