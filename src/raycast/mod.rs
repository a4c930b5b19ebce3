//! Raymarching through a [`Scene`]
//!
//! Five traversal strategies share one driver: sphere tracing, fixed-step
//! marching and three over-stepping variants that inflate the safe sphere
//! radius and validate the inflation after the fact. Every strategy
//! consults the scene's acceleration structure before each evaluation and
//! may be skipped forward through empty space.
//!
//! [`frame`] turns single rays into per-pixel output buffers.

pub mod frame;
mod march;

use std::fmt;
use std::str::FromStr;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::error::MarchError;
use crate::scene::Scene;

pub use frame::{render_frame, render_rows, Camera, FrameBuffers, FrameStats};
pub use march::march;

/// Default constant step for [`Algorithm::FixedStep`]
pub const FIXED_STEP_SIZE: f32 = 0.1;
/// Fixed-step marching never stops before this many iterations
pub const FIXED_STEP_MIN_ITERATIONS: u32 = 200;
/// Default inflation factor for the adaptive variants
pub const DEFAULT_OVERSHOOT: f32 = 1.2;

/// Marching limits shared by every algorithm
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RaymarchConfig {
    /// Iteration cap (SDF evaluation steps, skips excluded)
    pub max_steps: u32,
    /// Distance at which a ray is abandoned
    pub max_distance: f32,
    /// Hit threshold
    pub epsilon: f32,
    /// Offset used by the finite-difference normal
    pub normal_epsilon: f32,
    /// Accelerator skips allowed per ray before the accelerator is ignored
    pub max_skips: u32,
}

impl Default for RaymarchConfig {
    fn default() -> Self {
        RaymarchConfig {
            max_steps: 100,
            max_distance: 10.0,
            epsilon: 0.001,
            normal_epsilon: 0.01,
            max_skips: 400,
        }
    }
}

/// Traversal strategy
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Algorithm {
    /// Advance by exactly the evaluated distance
    #[default]
    SphereTracer,
    /// Advance by a constant step, ignoring the evaluated distance
    FixedStep {
        /// Step length
        step: f32,
    },
    /// Over-relaxed sphere tracing
    ///
    /// Steps `d * relaxation` while consecutive spheres keep overlapping and
    /// rewinds when an inflated step lands inside a surface.
    AdaptiveStep {
        /// Inflation factor
        relaxation: f32,
    },
    /// Inflated steps validated by the sphere-overlap test
    AdaptiveStepV2 {
        /// Inflation factor
        overshoot: f32,
    },
    /// Like V2, with a bridging evaluation before falling back
    AdaptiveStepV3 {
        /// Inflation factor
        overshoot: f32,
    },
}

impl Algorithm {
    /// Every algorithm with its default parameters, in display order
    pub const ALL: [Algorithm; 5] = [
        Algorithm::SphereTracer,
        Algorithm::FixedStep {
            step: FIXED_STEP_SIZE,
        },
        Algorithm::AdaptiveStep {
            relaxation: DEFAULT_OVERSHOOT,
        },
        Algorithm::AdaptiveStepV2 {
            overshoot: DEFAULT_OVERSHOOT,
        },
        Algorithm::AdaptiveStepV3 {
            overshoot: DEFAULT_OVERSHOOT,
        },
    ];

    /// Kebab-case name
    pub fn name(self) -> &'static str {
        match self {
            Algorithm::SphereTracer => "sphere-tracer",
            Algorithm::FixedStep { .. } => "fixed-step",
            Algorithm::AdaptiveStep { .. } => "adaptive-step",
            Algorithm::AdaptiveStepV2 { .. } => "adaptive-step-v2",
            Algorithm::AdaptiveStepV3 { .. } => "adaptive-step-v3",
        }
    }

    /// Replace the inflation factor of the adaptive variants
    #[must_use]
    pub fn with_overshoot(self, factor: f32) -> Self {
        match self {
            Algorithm::AdaptiveStep { .. } => Algorithm::AdaptiveStep { relaxation: factor },
            Algorithm::AdaptiveStepV2 { .. } => Algorithm::AdaptiveStepV2 { overshoot: factor },
            Algorithm::AdaptiveStepV3 { .. } => Algorithm::AdaptiveStepV3 { overshoot: factor },
            other => other,
        }
    }

    /// Replace the step length of the fixed-step variant
    #[must_use]
    pub fn with_step(self, step: f32) -> Self {
        match self {
            Algorithm::FixedStep { .. } => Algorithm::FixedStep { step },
            other => other,
        }
    }

    /// Iteration cap under a given config
    pub fn max_iterations(self, config: &RaymarchConfig) -> u32 {
        match self {
            Algorithm::FixedStep { .. } => config.max_steps.max(FIXED_STEP_MIN_ITERATIONS),
            _ => config.max_steps,
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Algorithm {
    type Err = MarchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_ascii_lowercase().replace('_', "-");
        Algorithm::ALL
            .into_iter()
            .find(|a| a.name() == name)
            .ok_or_else(|| MarchError::UnknownAlgorithm(s.to_string()))
    }
}

/// Per-ray state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MarchState {
    /// Evaluating and stepping
    Marching,
    /// Just advanced by an accelerator skip
    AccelSkip,
    /// Terminal: surface found
    Hit,
    /// Terminal: left the range or the accelerator ran out of intervals
    Miss,
}

impl MarchState {
    /// Whether the ray has finished
    pub fn is_terminal(self) -> bool {
        matches!(self, MarchState::Hit | MarchState::Miss)
    }
}

/// Outcome of marching one ray
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RaymarchResult {
    /// Whether a surface was found within range
    pub hit: bool,
    /// Travelled distance; `max_distance` on a miss
    pub distance: f32,
    /// Point at `distance` along the ray
    pub point: Vec3,
    /// Unit surface normal on a hit, zero on a miss
    pub normal: Vec3,
    /// Primitive SDF evaluations, normal estimation included
    pub sdf_evaluations: usize,
    /// Marching iterations (SDF evaluation steps)
    pub iterations: u32,
    /// Accelerator skips taken
    pub skips: u32,
    /// Terminal state
    pub state: MarchState,
}

/// Forward-difference surface normal
///
/// Evaluates the scene at `point` and at one offset per axis, so four
/// scene queries are made. Returns the unit normal (zero if the gradient
/// vanishes) and the primitive evaluations spent.
pub fn estimate_normal(scene: &Scene, point: Vec3, eps: f32) -> (Vec3, usize) {
    let base = scene.distance(point);
    let dx = scene.distance(point + Vec3::new(eps, 0.0, 0.0));
    let dy = scene.distance(point + Vec3::new(0.0, eps, 0.0));
    let dz = scene.distance(point + Vec3::new(0.0, 0.0, eps));

    let gradient = Vec3::new(
        dx.distance - base.distance,
        dy.distance - base.distance,
        dz.distance - base.distance,
    );
    let evaluations = base.evaluations + dx.evaluations + dy.evaluations + dz.evaluations;
    (gradient.normalize_or_zero(), evaluations)
}
