//! Per-pixel output buffers
//!
//! A frame is rendered in horizontal bands of rows. Each band writes into
//! its own [`FrameBuffers`] with row-local indexing, so bands can be
//! rendered by independent workers and stitched together afterwards.

use std::ops::Range;

use glam::{Mat3, Vec3};
use serde::{Deserialize, Serialize};

use super::{march, Algorithm, RaymarchConfig, RaymarchResult};
use crate::error::MarchError;
use crate::scene::Scene;
use crate::types::Ray;

/// Pinhole camera with unit focal length looking down its local `-Z`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    /// World-space eye position
    pub position: Vec3,
    /// Camera-to-world rotation
    pub rotation: Mat3,
}

impl Default for Camera {
    fn default() -> Self {
        Camera::orbit(0.0, 0.0, 5.0)
    }
}

impl Camera {
    /// Camera orbiting the origin
    ///
    /// `pitch` is clamped to `[-pi/2, pi/2]`. The rotation is yaw about `Y`
    /// applied after pitch about `X`; the eye sits `distance` along the
    /// rotated `+Z` axis.
    pub fn orbit(pitch: f32, yaw: f32, distance: f32) -> Self {
        let pitch = pitch.clamp(-std::f32::consts::FRAC_PI_2, std::f32::consts::FRAC_PI_2);
        let rotation = Mat3::from_rotation_y(yaw) * Mat3::from_rotation_x(pitch);
        Camera {
            position: rotation * Vec3::new(0.0, 0.0, distance),
            rotation,
        }
    }

    /// Unit world-space direction through pixel `(x, y)`
    #[inline]
    pub fn ray_direction(&self, x: u32, y: u32, width: u32, height: u32) -> Vec3 {
        let u = (x as f32 / width as f32 - 0.5) * 2.0;
        let v = (y as f32 / height as f32 - 0.5) * 2.0;
        (self.rotation * Vec3::new(u, v, -1.0)).normalize()
    }

    /// Primary ray through pixel `(x, y)`
    #[inline]
    pub fn ray(&self, x: u32, y: u32, width: u32, height: u32) -> Ray {
        Ray {
            origin: self.position,
            direction: self.ray_direction(x, y, width, height),
        }
    }
}

/// Row-major output buffers for a band of rows
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FrameBuffers {
    /// Pixels per row
    pub width: u32,
    /// Rows held
    pub rows: u32,
    /// Quantized travelled distance, one byte per pixel
    pub depth: Vec<u8>,
    /// Normal remapped to bytes, three per pixel
    pub normal: Vec<u8>,
    /// Primitive SDF evaluations per pixel
    pub sdf_evaluations: Vec<u16>,
    /// Marching iterations per pixel
    pub iterations: Vec<u16>,
}

impl FrameBuffers {
    /// Zeroed buffers for `rows` rows of `width` pixels
    pub fn new(width: u32, rows: u32) -> Self {
        let n = width as usize * rows as usize;
        FrameBuffers {
            width,
            rows,
            depth: vec![0; n],
            normal: vec![0; n * 3],
            sdf_evaluations: vec![0; n],
            iterations: vec![0; n],
        }
    }

    /// Pixel count
    pub fn len(&self) -> usize {
        self.width as usize * self.rows as usize
    }

    /// True when no pixel is held
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Append a band rendered below this one
    pub fn append(&mut self, mut band: FrameBuffers) -> Result<(), MarchError> {
        if band.width != self.width && !self.is_empty() {
            return Err(MarchError::BufferSize {
                buffer: "band",
                expected: self.width as usize,
                actual: band.width as usize,
            });
        }
        self.width = band.width;
        self.rows += band.rows;
        self.depth.append(&mut band.depth);
        self.normal.append(&mut band.normal);
        self.sdf_evaluations.append(&mut band.sdf_evaluations);
        self.iterations.append(&mut band.iterations);
        Ok(())
    }

    fn validate(&self) -> Result<(), MarchError> {
        let n = self.len();
        let checks = [
            ("depth", n, self.depth.len()),
            ("normal", n * 3, self.normal.len()),
            ("sdf evaluation", n, self.sdf_evaluations.len()),
            ("iteration", n, self.iterations.len()),
        ];
        for (buffer, expected, actual) in checks {
            if expected != actual {
                return Err(MarchError::BufferSize {
                    buffer,
                    expected,
                    actual,
                });
            }
        }
        Ok(())
    }

    /// Store one ray's result at row-local pixel `idx`
    #[inline]
    fn write(&mut self, idx: usize, result: &RaymarchResult, max_distance: f32) {
        self.depth[idx] = depth_byte(result.distance, max_distance);
        let n = if result.hit { result.normal } else { Vec3::ZERO };
        self.normal[idx * 3] = normal_byte(n.x);
        self.normal[idx * 3 + 1] = normal_byte(n.y);
        self.normal[idx * 3 + 2] = normal_byte(n.z);
        self.sdf_evaluations[idx] = saturate_u16(result.sdf_evaluations);
        self.iterations[idx] = saturate_u16(result.iterations as usize);
    }
}

/// Travelled distance clamped to the range and quantized to a byte
#[inline]
pub fn depth_byte(distance: f32, max_distance: f32) -> u8 {
    distance.min(max_distance).round().clamp(0.0, 255.0) as u8
}

/// Normal component in `[-1, 1]` remapped to `[0, 255]`
#[inline]
pub fn normal_byte(component: f32) -> u8 {
    ((component + 1.0) * 0.5 * 255.0).round().clamp(0.0, 255.0) as u8
}

#[inline]
fn saturate_u16(v: usize) -> u16 {
    u16::try_from(v).unwrap_or(u16::MAX)
}

/// Aggregate diagnostics for a rendered band or frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FrameStats {
    /// Rays marched
    pub pixels: u64,
    /// Rays that hit a surface
    pub hits: u64,
    /// Sum of primitive SDF evaluations
    pub total_evaluations: u64,
    /// Largest per-pixel evaluation count
    pub max_evaluations: u64,
    /// Sum of marching iterations
    pub total_iterations: u64,
    /// Largest per-pixel iteration count
    pub max_iterations: u64,
    /// Sum of accelerator skips
    pub total_skips: u64,
}

impl FrameStats {
    /// Fold one ray into the totals
    pub fn record(&mut self, result: &RaymarchResult) {
        let evaluations = result.sdf_evaluations as u64;
        let iterations = u64::from(result.iterations);
        self.pixels += 1;
        self.hits += u64::from(result.hit);
        self.total_evaluations += evaluations;
        self.max_evaluations = self.max_evaluations.max(evaluations);
        self.total_iterations += iterations;
        self.max_iterations = self.max_iterations.max(iterations);
        self.total_skips += u64::from(result.skips);
    }

    /// Combine the stats of two bands
    #[must_use]
    pub fn merge(self, other: FrameStats) -> FrameStats {
        FrameStats {
            pixels: self.pixels + other.pixels,
            hits: self.hits + other.hits,
            total_evaluations: self.total_evaluations + other.total_evaluations,
            max_evaluations: self.max_evaluations.max(other.max_evaluations),
            total_iterations: self.total_iterations + other.total_iterations,
            max_iterations: self.max_iterations.max(other.max_iterations),
            total_skips: self.total_skips + other.total_skips,
        }
    }

    /// Fraction of rays that hit
    pub fn hit_ratio(&self) -> f64 {
        ratio(self.hits, self.pixels)
    }

    /// Mean evaluations per ray
    pub fn mean_evaluations(&self) -> f64 {
        ratio(self.total_evaluations, self.pixels)
    }

    /// Mean iterations per ray
    pub fn mean_iterations(&self) -> f64 {
        ratio(self.total_iterations, self.pixels)
    }
}

#[inline]
fn ratio(a: u64, b: u64) -> f64 {
    if b == 0 {
        0.0
    } else {
        a as f64 / b as f64
    }
}

/// Render rows `rows` of a `width x height` frame into `buffers`
///
/// Sets the scene time first, then marches every pixel of the band.
/// `buffers` must hold exactly `rows.len()` rows of `width` pixels; index
/// `(y - rows.start) * width + x` receives pixel `(x, y)`.
#[allow(clippy::too_many_arguments)]
pub fn render_rows(
    scene: &mut Scene,
    algorithm: Algorithm,
    config: &RaymarchConfig,
    camera: &Camera,
    width: u32,
    height: u32,
    time: f32,
    rows: Range<u32>,
    buffers: &mut FrameBuffers,
) -> Result<FrameStats, MarchError> {
    if rows.start > rows.end || rows.end > height {
        return Err(MarchError::RowRange {
            start: rows.start,
            end: rows.end,
            height,
        });
    }
    let band = rows.end - rows.start;
    if buffers.width != width || buffers.rows != band {
        return Err(MarchError::BufferSize {
            buffer: "frame",
            expected: width as usize * band as usize,
            actual: buffers.len(),
        });
    }
    buffers.validate()?;

    scene.update_time(time);

    let mut stats = FrameStats::default();
    for y in rows.clone() {
        let row = (y - rows.start) as usize * width as usize;
        for x in 0..width {
            let result = march(scene, camera.ray(x, y, width, height), algorithm, config);
            buffers.write(row + x as usize, &result, config.max_distance);
            stats.record(&result);
        }
    }

    tracing::debug!(
        algorithm = %algorithm,
        rows = ?rows,
        hits = stats.hits,
        mean_evaluations = stats.mean_evaluations(),
        "band rendered"
    );
    Ok(stats)
}

/// Render a whole frame into fresh buffers
pub fn render_frame(
    scene: &mut Scene,
    algorithm: Algorithm,
    config: &RaymarchConfig,
    camera: &Camera,
    width: u32,
    height: u32,
    time: f32,
) -> Result<(FrameBuffers, FrameStats), MarchError> {
    let mut buffers = FrameBuffers::new(width, height);
    let stats = render_rows(
        scene,
        algorithm,
        config,
        camera,
        width,
        height,
        time,
        0..height,
        &mut buffers,
    )?;
    Ok((buffers, stats))
}
