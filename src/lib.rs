//! # sdf-march
//!
//! Raymarching of signed-distance-field scenes, built for comparing
//! traversal strategies and spatial acceleration structures.
//!
//! ## Features
//!
//! - **Primitives**: Sphere, Box, Torus, Mandelbulb
//! - **Operators**: Smooth union and subtraction, Round, Twist, Repetition, oscillating translation
//! - **Acceleration**: Octree with empty-space skipping, sampled-bounds BVH
//! - **Raymarching**: Sphere tracing, fixed step, three over-stepping variants
//! - **Output**: Per-pixel depth, normal, SDF-evaluation and iteration buffers
//! - **File I/O**: JSON scene descriptions
//!
//! ## Example
//!
//! ```rust
//! use sdf_march::prelude::*;
//! use glam::Vec3;
//!
//! let scene = Scene::new(vec![Primitive::sphere(1.5)], AccelKind::Bvh);
//! let ray = Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::NEG_Z);
//!
//! let result = march(&scene, ray, Algorithm::SphereTracer, &RaymarchConfig::default());
//! assert!(result.hit);
//! assert!((result.distance - 3.5).abs() < 0.01);
//! ```

#![warn(missing_docs)]

pub mod accel;
pub mod error;
pub mod eval;
pub mod io;
pub mod modifiers;
pub mod operations;
pub mod primitives;
pub mod raycast;
pub mod scene;
pub mod types;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude - commonly used types and functions
pub mod prelude {
    pub use glam::{Mat4, Quat, Vec3};

    pub use crate::accel::{AccelKind, AccelerationStructure, Bvh, BvhConfig, Octree, OctreeConfig};
    pub use crate::error::MarchError;
    pub use crate::eval::eval;
    pub use crate::io::{load_scene, save_scene, IoError, SceneDescription};
    pub use crate::raycast::{
        estimate_normal, march, render_frame, render_rows, Algorithm, Camera, FrameBuffers,
        FrameStats, MarchState, RaymarchConfig, RaymarchResult,
    };
    pub use crate::scene::{DistanceSample, Scene};
    pub use crate::types::{Aabb, Primitive, Ray, Shape};
}
