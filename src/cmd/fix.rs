//! Fix command implementation
//!
//! Re-analyzes the last Release build and applies one suggestion through the import
//! manifest.

use anyhow::Result;
use console::style;
use std::path::Path;

use crate::analyzer::{apply_fix, Fix, FixKind, FixOutcome, MaxTextureSize};
use crate::cmd::workflow::ProjectContext;
use crate::error::CrazyBuildError;
use crate::fmt::{emoji, CHECKMARK, INFO};

/// Suggestion kinds accepted on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum FixTarget {
    /// Force a long audio clip to mono
    Mono,
    /// Lower a long audio clip's quality
    Quality,
    /// Lower a texture's max imported size
    TextureSize,
    /// Disable texture read/write
    TextureRw,
    /// Disable texture mipmaps
    Mipmaps,
    /// Disable mesh read/write
    MeshRw,
}

impl FixTarget {
    /// Fix kind for this target; `size` only matters for [`FixTarget::TextureSize`]
    pub fn kind(self, size: MaxTextureSize) -> FixKind {
        match self {
            Self::Mono => FixKind::ForceToMono,
            Self::Quality => FixKind::ReduceAudioQuality,
            Self::TextureSize => FixKind::ReduceTextureSize(size),
            Self::TextureRw => FixKind::DisableTextureReadWrite,
            Self::Mipmaps => FixKind::DisableMipmaps,
            Self::MeshRw => FixKind::DisableMeshReadWrite,
        }
    }
}

/// Parse `--size`, accepting only 1024 and 512
pub fn parse_texture_size(value: &str) -> Result<MaxTextureSize, String> {
    value
        .parse::<u32>()
        .ok()
        .and_then(MaxTextureSize::from_pixels)
        .ok_or_else(|| format!("'{}' is not a supported size (1024 or 512)", value))
}

/// Apply one fix to the asset at `asset_path`
///
/// # Examples
///
/// ```no_run
/// use crazybuild::analyzer::MaxTextureSize;
/// use crazybuild::cmd::fix::{cmd_fix, FixTarget};
/// use std::path::Path;
///
/// cmd_fix(
///     Path::new("."),
///     FixTarget::TextureSize,
///     "Assets/Textures/hero.png",
///     MaxTextureSize::S512,
/// )?;
/// # Ok::<(), anyhow::Error>(())
/// ```
pub fn cmd_fix(
    project_root: &Path,
    target: FixTarget,
    asset_path: &str,
    size: MaxTextureSize,
) -> Result<FixOutcome> {
    let context = ProjectContext::load(project_root)?;
    let importer = context.importer().map_err(CrazyBuildError::from)?;
    let mut report = context
        .analyze_with(&importer)
        .map_err(CrazyBuildError::from)?;

    if !report
        .summary
        .packaged_files
        .iter()
        .any(|f| f.path == asset_path)
    {
        return Err(CrazyBuildError::UnknownAsset {
            path: asset_path.to_string(),
        }
        .into());
    }

    let fix = Fix::new(asset_path, target.kind(size));
    let outcome = apply_fix(&mut report, &importer, &fix).map_err(CrazyBuildError::from)?;
    match outcome {
        FixOutcome::Applied => println!(
            "{} {}: {} ({} pending)",
            emoji(CHECKMARK),
            style(&fix.path).cyan(),
            fix.kind,
            report.pending_fixes()
        ),
        FixOutcome::AlreadyApplied => println!(
            "{} {}: nothing to {}",
            emoji(INFO),
            style(&fix.path).cyan(),
            fix.kind
        ),
    }
    Ok(outcome)
}
