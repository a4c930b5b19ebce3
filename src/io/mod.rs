//! Scene description files
//!
//! A [`SceneDescription`] bundles the primitive list with the acceleration
//! and marching settings of one render pass. It is stored as JSON; every
//! settings block is optional and falls back to its defaults.

mod json;

pub use json::{from_json_string, load_scene, save_scene, to_json_string};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::accel::{AccelKind, BvhConfig, OctreeConfig};
use crate::raycast::RaymarchConfig;
use crate::scene::Scene;
use crate::types::Primitive;

/// File I/O errors
#[derive(Error, Debug)]
pub enum IoError {
    /// I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed or unserializable description
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Parsed, but not a usable scene
    #[error("Invalid scene: {0}")]
    InvalidFormat(String),
}

/// Serializable scene plus render settings
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SceneDescription {
    /// Primitives in evaluation order
    pub primitives: Vec<Primitive>,
    /// Acceleration structure to build
    #[serde(default)]
    pub acceleration: AccelKind,
    /// Octree parameters
    #[serde(default)]
    pub octree: OctreeConfig,
    /// BVH parameters
    #[serde(default)]
    pub bvh: BvhConfig,
    /// Marching limits
    #[serde(default)]
    pub raymarch: RaymarchConfig,
}

impl SceneDescription {
    /// Description with default settings
    pub fn new(primitives: Vec<Primitive>) -> Self {
        SceneDescription {
            primitives,
            ..SceneDescription::default()
        }
    }

    /// Build the scene, overriding the stored acceleration kind if given
    pub fn build(&self, kind: Option<AccelKind>) -> Scene {
        Scene::with_config(
            self.primitives.clone(),
            kind.unwrap_or(self.acceleration),
            self.octree,
            self.bvh,
        )
    }

    /// Reject settings the marchers cannot work with
    pub fn validate(&self) -> Result<(), IoError> {
        let r = &self.raymarch;
        if r.max_steps == 0 {
            return Err(IoError::InvalidFormat(
                "max_steps must be at least one".to_string(),
            ));
        }
        if !(r.max_distance.is_finite() && r.max_distance > 0.0) {
            return Err(IoError::InvalidFormat(format!(
                "max_distance must be positive, got {}",
                r.max_distance
            )));
        }
        if !(r.epsilon > 0.0 && r.normal_epsilon > 0.0) {
            return Err(IoError::InvalidFormat(
                "epsilon and normal_epsilon must be positive".to_string(),
            ));
        }
        if self.octree.max_primitives_per_node == 0 || self.bvh.max_primitives_per_leaf == 0 {
            return Err(IoError::InvalidFormat(
                "leaf capacity must be at least one".to_string(),
            ));
        }
        Ok(())
    }
}
