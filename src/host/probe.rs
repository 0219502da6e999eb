//! Global project configuration and optional host capabilities

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Engine default physics step, in seconds
pub const DEFAULT_FIXED_TIMESTEP: f32 = 0.02;

/// Optional host packages, detected once and consumed as plain data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostCapabilities {
    /// Addressable asset system is installed
    pub addressables_installed: bool,
    /// Static code auditor is available
    pub project_auditor_available: bool,
}

/// Read-only view of global project configuration
pub trait ProjectProbe {
    /// Active render pipeline asset, `None` for the built-in pipeline
    fn render_pipeline(&self) -> Option<&str>;

    /// MSAA sample count of the render pipeline (1 = disabled)
    fn msaa_sample_count(&self) -> u32;

    /// Physics fixed timestep in seconds
    fn fixed_timestep(&self) -> f32;

    /// Optional packages
    fn capabilities(&self) -> HostCapabilities;

    /// Enabled scenes containing objects with missing scripts, keyed by scene name
    fn scenes_with_missing_scripts(&self) -> BTreeMap<String, Vec<String>>;
}

impl<P: ProjectProbe + ?Sized> ProjectProbe for &P {
    fn render_pipeline(&self) -> Option<&str> {
        (**self).render_pipeline()
    }

    fn msaa_sample_count(&self) -> u32 {
        (**self).msaa_sample_count()
    }

    fn fixed_timestep(&self) -> f32 {
        (**self).fixed_timestep()
    }

    fn capabilities(&self) -> HostCapabilities {
        (**self).capabilities()
    }

    fn scenes_with_missing_scripts(&self) -> BTreeMap<String, Vec<String>> {
        (**self).scenes_with_missing_scripts()
    }
}

/// Project configuration captured as plain values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectProfile {
    /// Render pipeline asset name
    pub render_pipeline: Option<String>,
    /// MSAA sample count
    pub msaa_sample_count: u32,
    /// Physics fixed timestep in seconds
    pub fixed_timestep: f32,
    /// Optional packages
    pub capabilities: HostCapabilities,
    /// Objects with missing scripts per scene
    pub missing_scripts: BTreeMap<String, Vec<String>>,
}

impl Default for ProjectProfile {
    fn default() -> Self {
        Self {
            render_pipeline: None,
            msaa_sample_count: 1,
            fixed_timestep: DEFAULT_FIXED_TIMESTEP,
            capabilities: HostCapabilities::default(),
            missing_scripts: BTreeMap::new(),
        }
    }
}

impl ProjectProbe for ProjectProfile {
    fn render_pipeline(&self) -> Option<&str> {
        self.render_pipeline.as_deref()
    }

    fn msaa_sample_count(&self) -> u32 {
        self.msaa_sample_count
    }

    fn fixed_timestep(&self) -> f32 {
        self.fixed_timestep
    }

    fn capabilities(&self) -> HostCapabilities {
        self.capabilities
    }

    fn scenes_with_missing_scripts(&self) -> BTreeMap<String, Vec<String>> {
        self.missing_scripts
            .iter()
            .filter(|(_, objects)| !objects.is_empty())
            .map(|(scene, objects)| (scene.clone(), objects.clone()))
            .collect()
    }
}
