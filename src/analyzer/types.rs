//! Analyzer report types

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

use crate::report::BuildReportSummary;

/// Audio clips longer than this are treated as background music
pub const LONG_AUDIO_SECONDS: f32 = 10.0;

/// Quality above which a long clip is flagged, and the value the fix sets
pub const AUDIO_TARGET_QUALITY: f32 = 0.75;

/// Imported texture side above which a size reduction is suggested
pub const TEXTURE_SIZE_LIMIT: u32 = 1024;

const MB: f64 = 1024.0 * 1024.0;

/// Suggested change for a long audio clip
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum AudioIssue {
    /// Clip is imported as stereo
    ForceToMono,
    /// Clip quality is above [`AUDIO_TARGET_QUALITY`]
    ReduceQuality,
}

/// Suggested change for a texture
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum TextureIssue {
    /// Imported size is above [`TEXTURE_SIZE_LIMIT`]
    ReduceSize,
}

/// Last path component of an asset path
pub(crate) fn asset_name(path: &str) -> String {
    path.rsplit('/').next().unwrap_or(path).to_string()
}

/// A long audio clip with pending suggestions
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AudioOptimization {
    /// File name
    pub name: String,
    /// Project-relative path
    pub path: String,
    /// Length in seconds
    pub length: f32,
    /// Pending suggestions
    pub issues: BTreeSet<AudioIssue>,
}

impl AudioOptimization {
    /// Entry for the clip at `path`
    pub fn new(path: &str, length: f32, issues: BTreeSet<AudioIssue>) -> Self {
        Self {
            name: asset_name(path),
            path: path.to_string(),
            length,
            issues,
        }
    }
}

/// A texture with pending suggestions
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextureOptimization {
    /// File name
    pub name: String,
    /// Project-relative path
    pub path: String,
    /// Source image width
    pub width: u32,
    /// Source image height
    pub height: u32,
    /// Max imported size currently configured
    pub imported_size: u32,
    /// Pending suggestions
    pub issues: BTreeSet<TextureIssue>,
}

/// Project-wide suggestions that are not tied to a single asset
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Advisories {
    /// A scriptable render pipeline is active; post-processing may be removable
    pub post_processing: bool,
    /// Addressables are not installed
    pub addressables: bool,
    /// MSAA is above 2x
    pub anti_aliasing: bool,
    /// Physics runs more often than the engine default
    pub physics_timestep: bool,
    /// Configured physics timestep, for the advisory text
    pub fixed_timestep: f32,
    /// No code auditor is available, so code issues are not analyzed
    pub code_analysis_unavailable: bool,
}

/// How serious a size warning is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WarningSeverity {
    /// Build will be rejected
    Error,
    /// Build may be rejected or restricted
    Warning,
}

/// Portal size limit the last build exceeds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SizeWarning {
    /// Total size above 250 MB
    TotalTooLarge,
    /// Initial load above 50 MB
    InitialLoadTooLarge,
    /// Initial load above 20 MB
    MobileInitialLoadTooLarge,
}

impl SizeWarning {
    /// Total size limit in MB
    pub const MAX_TOTAL_MB: f64 = 250.0;
    /// Initial load limit in MB
    pub const MAX_INITIAL_LOAD_MB: f64 = 50.0;
    /// Initial load limit for mobile in MB
    pub const MAX_MOBILE_INITIAL_LOAD_MB: f64 = 20.0;

    /// First limit exceeded by the sizes, checked from most to least severe
    pub fn evaluate(total_size: u64, initial_load_size: u64) -> Option<Self> {
        let total_mb = total_size as f64 / MB;
        let initial_mb = initial_load_size as f64 / MB;
        if total_mb > Self::MAX_TOTAL_MB {
            Some(Self::TotalTooLarge)
        } else if initial_mb > Self::MAX_INITIAL_LOAD_MB {
            Some(Self::InitialLoadTooLarge)
        } else if initial_mb > Self::MAX_MOBILE_INITIAL_LOAD_MB {
            Some(Self::MobileInitialLoadTooLarge)
        } else {
            None
        }
    }

    /// Severity of this warning
    pub fn severity(&self) -> WarningSeverity {
        match self {
            Self::TotalTooLarge => WarningSeverity::Error,
            Self::InitialLoadTooLarge | Self::MobileInitialLoadTooLarge => WarningSeverity::Warning,
        }
    }

    /// User-facing text
    pub fn message(&self) -> String {
        match self {
            Self::TotalTooLarge => format!(
                "Games larger than {} MB are not accepted. Please reduce your build size.",
                Self::MAX_TOTAL_MB
            ),
            Self::InitialLoadTooLarge => format!(
                "Initial load size is greater than {} MB, your game may be rejected.",
                Self::MAX_INITIAL_LOAD_MB
            ),
            Self::MobileInitialLoadTooLarge => format!(
                "Initial load size is greater than {} MB, your game may be disabled on mobile.",
                Self::MAX_MOBILE_INITIAL_LOAD_MB
            ),
        }
    }
}

/// Categorized suggestions for the last release build
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalyzerReport {
    /// Summary the report was built from
    pub summary: BuildReportSummary,
    /// Long audio clips with suggestions
    pub audio: Vec<AudioOptimization>,
    /// Textures with suggestions
    pub textures: Vec<TextureOptimization>,
    /// Packaged assets under a `Resources` folder
    pub resources: Vec<String>,
    /// Textures with read/write enabled
    pub read_write_textures: Vec<String>,
    /// Textures with mipmaps enabled
    pub mipmap_textures: Vec<String>,
    /// Models with read/write enabled
    pub read_write_meshes: Vec<String>,
    /// Project-wide suggestions
    pub advisories: Advisories,
    /// Objects with missing scripts per enabled scene
    pub scenes_with_missing_scripts: BTreeMap<String, Vec<String>>,
    /// Portal size limit exceeded, if any
    pub size_warning: Option<SizeWarning>,
}

impl AnalyzerReport {
    /// Empty report for `summary`
    pub fn new(summary: BuildReportSummary) -> Self {
        let size_warning = SizeWarning::evaluate(summary.total_size, summary.initial_load_size);
        Self {
            summary,
            audio: Vec::new(),
            textures: Vec::new(),
            resources: Vec::new(),
            read_write_textures: Vec::new(),
            mipmap_textures: Vec::new(),
            read_write_meshes: Vec::new(),
            advisories: Advisories::default(),
            scenes_with_missing_scripts: BTreeMap::new(),
            size_warning,
        }
    }

    /// Drop audio and texture entries without pending issues
    pub fn clean_fixed_items(&mut self) {
        self.audio.retain(|a| !a.issues.is_empty());
        self.textures.retain(|t| !t.issues.is_empty());
    }

    /// Number of per-asset suggestions still pending
    pub fn pending_fixes(&self) -> usize {
        self.audio.iter().map(|a| a.issues.len()).sum::<usize>()
            + self.textures.iter().map(|t| t.issues.len()).sum::<usize>()
            + self.read_write_textures.len()
            + self.mipmap_textures.len()
            + self.read_write_meshes.len()
    }
}
