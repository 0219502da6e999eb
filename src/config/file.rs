//! `.crazybuild.toml` data model
//!
//! Every section and field has a default, so an empty or missing file is a valid
//! configuration.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::host::probe::DEFAULT_FIXED_TIMESTEP;
use crate::host::{HostCapabilities, ProjectProfile};
use crate::pipeline::{PipelineConfig, SceneEntry};

/// Config file name, looked up in the project root
pub const CONFIG_FILE_NAME: &str = ".crazybuild.toml";

/// Parsed `.crazybuild.toml`
///
/// # Examples
///
/// ```
/// use crazybuild::config::ConfigFile;
///
/// let config: ConfigFile = toml_edit::de::from_str(
///     r#"
///     [build]
///     supports_mobile = true
///
///     [[scenes]]
///     path = "Assets/Scenes/Main.unity"
///     "#,
/// )
/// .unwrap();
///
/// assert!(config.build.supports_mobile);
/// assert_eq!(config.build.output_root, "Builds");
/// assert_eq!(config.scenes.len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigFile {
    /// Output locations and build behavior
    pub build: BuildSection,
    /// Build list, in build order
    pub scenes: Vec<SceneEntry>,
    /// External build command
    pub toolchain: ToolchainSection,
    /// Host files backing the settings store and the asset importer
    pub host: HostSection,
    /// Global project configuration read by the analyzer
    pub project: ProjectSection,
}

/// `[build]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildSection {
    /// Parent of the per-variant output folders, relative to the project root
    pub output_root: String,
    /// Editor-local cache directory, relative to the project root
    pub cache_dir: String,
    /// Whether the game targets mobile browsers (ASTC builds expected)
    pub supports_mobile: bool,
    /// Run the analyzer after a successful Release build
    pub analyze_after_build: bool,
}

impl Default for BuildSection {
    fn default() -> Self {
        Self {
            output_root: "Builds".to_string(),
            cache_dir: "Library".to_string(),
            supports_mobile: false,
            analyze_after_build: true,
        }
    }
}

/// `[toolchain]`
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolchainSection {
    /// Program invoked for every build pass
    pub command: String,
    /// Extra arguments passed before the build request
    pub args: Vec<String>,
    /// Engine version recorded in the report when the command does not report one
    pub engine_version: Option<String>,
}

/// `[host]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HostSection {
    /// JSON player settings file
    pub settings_file: String,
    /// JSON asset import manifest
    pub import_manifest: String,
}

impl Default for HostSection {
    fn default() -> Self {
        Self {
            settings_file: "ProjectSettings/crazybuild-settings.json".to_string(),
            import_manifest: "ProjectSettings/crazybuild-imports.json".to_string(),
        }
    }
}

/// `[project]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectSection {
    /// Scriptable render pipeline asset, absent for the built-in pipeline
    pub render_pipeline: Option<String>,
    /// MSAA sample count (1 = off)
    pub msaa_sample_count: u32,
    /// Physics fixed timestep in seconds
    pub fixed_timestep: f32,
    /// Addressable asset system installed
    pub addressables_installed: bool,
    /// Static code auditor available
    pub project_auditor_available: bool,
    /// Objects with missing scripts, keyed by scene name
    pub missing_scripts: BTreeMap<String, Vec<String>>,
}

impl Default for ProjectSection {
    fn default() -> Self {
        Self {
            render_pipeline: None,
            msaa_sample_count: 1,
            fixed_timestep: DEFAULT_FIXED_TIMESTEP,
            addressables_installed: false,
            project_auditor_available: false,
            missing_scripts: BTreeMap::new(),
        }
    }
}

impl ConfigFile {
    /// Pipeline configuration with paths resolved against `project_root`
    pub fn pipeline_config(&self, project_root: &Path) -> PipelineConfig {
        PipelineConfig {
            output_root: project_root.join(&self.build.output_root),
            cache_dir: project_root.join(&self.build.cache_dir),
            scenes: self.scenes.clone(),
        }
    }

    /// Project configuration as seen by the analyzer
    pub fn project_profile(&self) -> ProjectProfile {
        let project = &self.project;
        ProjectProfile {
            render_pipeline: project.render_pipeline.clone(),
            msaa_sample_count: project.msaa_sample_count,
            fixed_timestep: project.fixed_timestep,
            capabilities: HostCapabilities {
                addressables_installed: project.addressables_installed,
                project_auditor_available: project.project_auditor_available,
            },
            missing_scripts: project.missing_scripts.clone(),
        }
    }

    /// Settings file path resolved against `project_root`
    pub fn settings_path(&self, project_root: &Path) -> PathBuf {
        project_root.join(&self.host.settings_file)
    }

    /// Import manifest path resolved against `project_root`
    pub fn import_manifest_path(&self, project_root: &Path) -> PathBuf {
        project_root.join(&self.host.import_manifest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_is_all_defaults() {
        let config: ConfigFile = toml_edit::de::from_str("").unwrap();
        assert_eq!(config, ConfigFile::default());
        assert!(config.build.analyze_after_build);
        assert_eq!(config.project.msaa_sample_count, 1);
    }

    #[test]
    fn test_full_file_parses() {
        let config: ConfigFile = toml_edit::de::from_str(
            r#"
            [build]
            output_root = "Out"
            cache_dir = "Cache"
            supports_mobile = true
            analyze_after_build = false

            [[scenes]]
            path = "Assets/Scenes/Boot.unity"

            [[scenes]]
            path = "Assets/Scenes/Debug.unity"
            enabled = false

            [toolchain]
            command = "unity-build"
            args = ["-batchmode", "-quit"]
            engine_version = "2022.3.20f1"

            [host]
            settings_file = "settings.json"

            [project]
            render_pipeline = "UniversalRP"
            msaa_sample_count = 4
            fixed_timestep = 0.01
            addressables_installed = true

            [project.missing_scripts]
            Main = ["Player", "Enemy"]
            "#,
        )
        .unwrap();

        assert_eq!(config.build.output_root, "Out");
        assert!(!config.build.analyze_after_build);
        assert_eq!(config.scenes.len(), 2);
        assert!(!config.scenes[1].enabled);
        assert_eq!(config.toolchain.args, vec!["-batchmode", "-quit"]);
        assert_eq!(config.host.settings_file, "settings.json");
        assert_eq!(
            config.host.import_manifest,
            HostSection::default().import_manifest
        );
        assert_eq!(config.project.missing_scripts["Main"].len(), 2);
    }

    #[test]
    fn test_pipeline_config_resolves_paths() {
        let mut config = ConfigFile::default();
        config.scenes.push(SceneEntry::enabled("Assets/Main.unity"));

        let pipeline = config.pipeline_config(Path::new("/game"));

        assert_eq!(pipeline.output_root, PathBuf::from("/game/Builds"));
        assert_eq!(pipeline.cache_dir, PathBuf::from("/game/Library"));
        assert_eq!(pipeline.enabled_scenes(), vec!["Assets/Main.unity"]);
    }

    #[test]
    fn test_project_profile_carries_capabilities() {
        let mut config = ConfigFile::default();
        config.project.render_pipeline = Some("HDRP".to_string());
        config.project.project_auditor_available = true;

        let profile = config.project_profile();

        assert_eq!(profile.render_pipeline.as_deref(), Some("HDRP"));
        assert!(profile.capabilities.project_auditor_available);
        assert!(!profile.capabilities.addressables_installed);
    }
}
