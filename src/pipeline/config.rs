//! Build pipeline configuration

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A scene in the build list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SceneEntry {
    /// Project-relative scene path
    pub path: String,
    /// Whether the scene is built
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

impl SceneEntry {
    /// Enabled scene at `path`
    pub fn enabled(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            enabled: true,
        }
    }
}

/// Where builds go and what they contain
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Parent of the per-variant output folders
    pub output_root: PathBuf,
    /// Editor-local cache directory holding the persisted summary
    pub cache_dir: PathBuf,
    /// Build list
    pub scenes: Vec<SceneEntry>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            output_root: PathBuf::from("Builds"),
            cache_dir: PathBuf::from("Library"),
            scenes: Vec::new(),
        }
    }
}

impl PipelineConfig {
    /// Paths of the enabled scenes in build order
    pub fn enabled_scenes(&self) -> Vec<String> {
        self.scenes
            .iter()
            .filter(|s| s.enabled)
            .map(|s| s.path.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_paths() {
        let config = PipelineConfig::default();
        assert_eq!(config.output_root, PathBuf::from("Builds"));
        assert_eq!(config.cache_dir, PathBuf::from("Library"));
        assert!(config.enabled_scenes().is_empty());
    }

    #[test]
    fn test_enabled_scenes_skip_disabled_and_keep_order() {
        let config = PipelineConfig {
            scenes: vec![
                SceneEntry::enabled("Assets/Scenes/Boot.unity"),
                SceneEntry {
                    path: "Assets/Scenes/Debug.unity".to_string(),
                    enabled: false,
                },
                SceneEntry::enabled("Assets/Scenes/Game.unity"),
            ],
            ..Default::default()
        };

        assert_eq!(
            config.enabled_scenes(),
            vec!["Assets/Scenes/Boot.unity", "Assets/Scenes/Game.unity"]
        );
    }

    #[test]
    fn test_scene_entry_enabled_defaults_to_true() {
        let scene: SceneEntry = serde_json::from_str(r#"{"path": "Assets/Main.unity"}"#).unwrap();
        assert!(scene.enabled);
    }
}
