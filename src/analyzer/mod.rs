//! Build analysis
//!
//! Reads the summary persisted by the last Release build and turns its packaged files into
//! optimization suggestions:
//! - long audio clips that could be mono or lower quality
//! - textures imported larger than 1024 px
//! - read/write textures and meshes, mipmapped textures
//! - assets pulled in through `Resources` folders
//! - project-wide advisories and portal size limits
//!
//! Suggestions can then be applied one at a time with [`apply_fix`].

pub mod analysis;
pub mod display;
pub mod fix;
pub mod listing;
pub mod types;

pub use analysis::{is_model_path, is_resource_path, Analyzer};
pub use display::{print_analyzer_report, print_json_report};
pub use fix::{apply_fix, Fix, FixKind, FixOutcome, MaxTextureSize};
pub use listing::{PackagedFileFilter, SMALL_ASSET_BYTES};
pub use types::{
    Advisories, AnalyzerReport, AudioIssue, AudioOptimization, SizeWarning, TextureIssue,
    TextureOptimization, WarningSeverity,
};

use std::path::PathBuf;
use thiserror::Error;

use crate::host::ImportError;
use crate::report::ReportError;

/// Errors raised while analyzing or fixing
#[derive(Error, Debug)]
pub enum AnalyzerError {
    /// No summary has been persisted yet
    #[error("no build summary found at {0}")]
    NoSummary(PathBuf),

    /// The summary could not be read
    #[error(transparent)]
    Report(#[from] ReportError),

    /// The importer rejected a change
    #[error(transparent)]
    Import(#[from] ImportError),
}
