//! Project file format: bundles the run configuration, the generated grid,
//! and the editable layer stack into one JSON document a tool can reload
//! and resume editing from.
//!
//! Follows the same versioned-wrapper idiom as `layers.rs`'s save file
//! (itself grounded on the teacher's `history::persistence::serialize`),
//! with `#[serde(flatten)]` on the settings blob so a future schema version
//! can add fields without breaking deserialization of older project files.
//! Forward-compatibility for genuinely unknown fields is `Config::extra`'s
//! job (see config.rs): flattening a fully-typed struct alone only avoids a
//! deserialization error, it silently drops anything that struct doesn't
//! declare.

use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::GenError;
use crate::grid::Grid;
use crate::layers::LayerStack;

pub const PROJECT_FILE_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
pub struct ProjectMetadata {
    pub name: String,
    pub created_at: String,
    pub last_saved: String,
}

#[derive(Serialize, Deserialize)]
pub struct ProjectFile {
    pub version: u32,
    pub metadata: ProjectMetadata,
    pub world: Grid,
    pub layers: LayerStack,
    #[serde(flatten)]
    pub settings: Config,
}

impl ProjectFile {
    pub fn new(name: impl Into<String>, world: Grid, layers: LayerStack, settings: Config, now: &str) -> Self {
        Self {
            version: PROJECT_FILE_VERSION,
            metadata: ProjectMetadata { name: name.into(), created_at: now.to_string(), last_saved: now.to_string() },
            world,
            layers,
            settings,
        }
    }

    pub fn to_json(&self) -> Result<String, GenError> {
        serde_json::to_string_pretty(self).map_err(|e| GenError::generation("project:serialize", e.to_string()))
    }

    pub fn from_json(json: &str) -> Result<Self, GenError> {
        let file: ProjectFile = serde_json::from_str(json)
            .map_err(|e| GenError::generation("project:deserialize", e.to_string()))?;
        if file.version > PROJECT_FILE_VERSION {
            return Err(GenError::generation(
                "project:version",
                format!("project file version {} is newer than this build supports ({})", file.version, PROJECT_FILE_VERSION),
            ));
        }
        Ok(file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_json() {
        let mut world = Grid::new(4, 4);
        world.set_height(1, 1, 5.0);
        let project = ProjectFile::new("test-map", world, LayerStack::default(), Config::default(), "2026-01-01T00:00:00Z");

        let json = project.to_json().unwrap();
        let restored = ProjectFile::from_json(&json).unwrap();

        assert_eq!(restored.metadata.name, "test-map");
        assert_eq!(restored.world.height_at(1, 1), 5.0);
        assert_eq!(restored.settings, project.settings);
    }

    #[test]
    fn unknown_fields_survive_a_round_trip() {
        let world = Grid::new(4, 4);
        let project = ProjectFile::new("x", world, LayerStack::default(), Config::default(), "now");

        let mut value: serde_json::Value = serde_json::from_str(&project.to_json().unwrap()).unwrap();
        value["futureTopLevelField"] = serde_json::json!("kept");
        let injected = serde_json::to_string(&value).unwrap();

        let loaded = ProjectFile::from_json(&injected).unwrap();
        let resaved = loaded.to_json().unwrap();
        let resaved_value: serde_json::Value = serde_json::from_str(&resaved).unwrap();

        assert_eq!(resaved_value["futureTopLevelField"], serde_json::json!("kept"));
    }

    #[test]
    fn rejects_a_future_version() {
        let world = Grid::new(2, 2);
        let project = ProjectFile::new("x", world, LayerStack::default(), Config::default(), "now");
        let mut json: serde_json::Value = serde_json::from_str(&project.to_json().unwrap()).unwrap();
        json["version"] = serde_json::json!(PROJECT_FILE_VERSION + 1);
        let bumped = serde_json::to_string(&json).unwrap();

        assert!(ProjectFile::from_json(&bumped).is_err());
    }
}
