//! JSON scene descriptions
//!
//! Uses `serde_json::to_writer`/`from_reader` with `BufWriter`/`BufReader`.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use crate::io::{IoError, SceneDescription};

/// Save a scene description as pretty JSON
pub fn save_scene(scene: &SceneDescription, path: impl AsRef<Path>) -> Result<(), IoError> {
    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    serde_json::to_writer_pretty(writer, scene)
        .map_err(|e| IoError::Serialization(e.to_string()))?;
    Ok(())
}

/// Load and validate a scene description
pub fn load_scene(path: impl AsRef<Path>) -> Result<SceneDescription, IoError> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let reader = BufReader::new(file);

    let scene: SceneDescription =
        serde_json::from_reader(reader).map_err(|e| IoError::Serialization(e.to_string()))?;
    scene.validate()?;

    tracing::debug!(
        path = %path.display(),
        primitives = scene.primitives.len(),
        "scene loaded"
    );
    Ok(scene)
}

/// Serialize a scene description to a JSON string
pub fn to_json_string(scene: &SceneDescription) -> Result<String, IoError> {
    serde_json::to_string_pretty(scene).map_err(|e| IoError::Serialization(e.to_string()))
}

/// Parse and validate a scene description from a JSON string
pub fn from_json_string(json: &str) -> Result<SceneDescription, IoError> {
    let scene: SceneDescription =
        serde_json::from_str(json).map_err(|e| IoError::Serialization(e.to_string()))?;
    scene.validate()?;
    Ok(scene)
}
