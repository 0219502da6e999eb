//! Application of analyzer suggestions
//!
//! A fix changes one import setting through the [`AssetImporter`] and removes the matching
//! issue from the report, so the report never lists a suggestion that has already been
//! applied.

use serde::Serialize;
use std::fmt;

use super::types::{AnalyzerReport, AudioIssue, TextureIssue, AUDIO_TARGET_QUALITY};
use super::AnalyzerError;
use crate::host::{AssetImporter, ImportChange};

/// Max imported texture size offered by the size fix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MaxTextureSize {
    /// 1024 px
    S1024,
    /// 512 px
    S512,
}

impl MaxTextureSize {
    /// Size in pixels
    pub fn pixels(&self) -> u32 {
        match self {
            Self::S1024 => 1024,
            Self::S512 => 512,
        }
    }

    /// Size for `pixels`, `None` for anything but 1024 and 512
    pub fn from_pixels(pixels: u32) -> Option<Self> {
        match pixels {
            1024 => Some(Self::S1024),
            512 => Some(Self::S512),
            _ => None,
        }
    }
}

/// What a fix changes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FixKind {
    /// Downmix a long clip to mono
    ForceToMono,
    /// Lower a long clip's quality to [`AUDIO_TARGET_QUALITY`]
    ReduceAudioQuality,
    /// Lower a texture's max imported size
    ReduceTextureSize(MaxTextureSize),
    /// Disable texture read/write
    DisableTextureReadWrite,
    /// Disable texture mipmaps
    DisableMipmaps,
    /// Disable mesh read/write
    DisableMeshReadWrite,
}

impl FixKind {
    fn import_change(&self) -> ImportChange {
        match self {
            Self::ForceToMono => ImportChange::ForceToMono,
            Self::ReduceAudioQuality => ImportChange::SetAudioQuality(AUDIO_TARGET_QUALITY),
            Self::ReduceTextureSize(size) => ImportChange::SetMaxTextureSize(size.pixels()),
            Self::DisableTextureReadWrite => ImportChange::DisableTextureReadWrite,
            Self::DisableMipmaps => ImportChange::DisableMipmaps,
            Self::DisableMeshReadWrite => ImportChange::DisableMeshReadWrite,
        }
    }
}

impl fmt::Display for FixKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ForceToMono => f.write_str("force to mono"),
            Self::ReduceAudioQuality => f.write_str("reduce quality"),
            Self::ReduceTextureSize(size) => write!(f, "reduce size to {}", size.pixels()),
            Self::DisableTextureReadWrite => f.write_str("disable read/write"),
            Self::DisableMipmaps => f.write_str("disable mipmaps"),
            Self::DisableMeshReadWrite => f.write_str("disable mesh read/write"),
        }
    }
}

/// One fix for one asset
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Fix {
    /// Project-relative asset path
    pub path: String,
    /// Change to make
    pub kind: FixKind,
}

impl Fix {
    /// Fix `kind` for the asset at `path`
    pub fn new(path: impl Into<String>, kind: FixKind) -> Self {
        Self {
            path: path.into(),
            kind,
        }
    }
}

/// Result of [`apply_fix`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FixOutcome {
    /// The importer was changed and the issue removed
    Applied,
    /// The report has no such issue; nothing was changed
    AlreadyApplied,
}

fn remove_from_list(list: &mut Vec<String>, path: &str) -> bool {
    let before = list.len();
    list.retain(|p| p != path);
    list.len() != before
}

fn has_issue(report: &AnalyzerReport, fix: &Fix) -> bool {
    match fix.kind {
        FixKind::ForceToMono => audio_has(report, &fix.path, AudioIssue::ForceToMono),
        FixKind::ReduceAudioQuality => audio_has(report, &fix.path, AudioIssue::ReduceQuality),
        FixKind::ReduceTextureSize(_) => report
            .textures
            .iter()
            .any(|t| t.path == fix.path && t.issues.contains(&TextureIssue::ReduceSize)),
        FixKind::DisableTextureReadWrite => report.read_write_textures.contains(&fix.path),
        FixKind::DisableMipmaps => report.mipmap_textures.contains(&fix.path),
        FixKind::DisableMeshReadWrite => report.read_write_meshes.contains(&fix.path),
    }
}

fn audio_has(report: &AnalyzerReport, path: &str, issue: AudioIssue) -> bool {
    report
        .audio
        .iter()
        .any(|a| a.path == path && a.issues.contains(&issue))
}

fn remove_issue(report: &mut AnalyzerReport, fix: &Fix) {
    let path = fix.path.as_str();
    match fix.kind {
        FixKind::ForceToMono | FixKind::ReduceAudioQuality => {
            let issue = if fix.kind == FixKind::ForceToMono {
                AudioIssue::ForceToMono
            } else {
                AudioIssue::ReduceQuality
            };
            for entry in report.audio.iter_mut().filter(|a| a.path == path) {
                entry.issues.remove(&issue);
            }
        }
        FixKind::ReduceTextureSize(_) => {
            for entry in report.textures.iter_mut().filter(|t| t.path == path) {
                entry.issues.remove(&TextureIssue::ReduceSize);
            }
        }
        FixKind::DisableTextureReadWrite => {
            remove_from_list(&mut report.read_write_textures, path);
        }
        FixKind::DisableMipmaps => {
            remove_from_list(&mut report.mipmap_textures, path);
        }
        FixKind::DisableMeshReadWrite => {
            remove_from_list(&mut report.read_write_meshes, path);
        }
    }
}

/// Apply `fix` through `importer` and remove its issue from `report`.
///
/// When the report does not list the issue the importer is left untouched and
/// [`FixOutcome::AlreadyApplied`] is returned, so applying the same fix twice is harmless.
///
/// # Errors
/// Returns [`AnalyzerError::Import`] when the importer rejects the change; the report is
/// left unchanged in that case.
pub fn apply_fix<I: AssetImporter + ?Sized>(
    report: &mut AnalyzerReport,
    importer: &I,
    fix: &Fix,
) -> Result<FixOutcome, AnalyzerError> {
    if !has_issue(report, fix) {
        log::debug!("No pending '{}' for {}", fix.kind, fix.path);
        return Ok(FixOutcome::AlreadyApplied);
    }

    importer.apply(&fix.path, fix.kind.import_change())?;
    remove_issue(report, fix);
    report.clean_fixed_items();
    log::info!("Applied '{}' to {}", fix.kind, fix.path);
    Ok(FixOutcome::Applied)
}
