//! Build report and persisted summary

pub mod artifacts;
pub mod generator;
pub mod summary;

pub use artifacts::{classify, select_main_files, ArtifactSizer, ArtifactType, BuildArtifactDescriptor};
pub use generator::{BuildReport, ReportGenerator, ReportInput, BUILD_SCRIPT_VERSION, REPORT_FILE_NAME};
pub use summary::{
    dedupe_packed_assets, BuildReportSummary, PackagedFileSummary, SummaryStore, SUMMARY_FILE_NAME,
};

use std::path::PathBuf;
use thiserror::Error;

/// Errors writing or reading report files
#[derive(Error, Debug)]
pub enum ReportError {
    /// File could not be read or written
    #[error("{path}: {source}")]
    Io {
        /// File path
        path: PathBuf,
        #[source]
        /// IO error source
        source: std::io::Error,
    },

    /// JSON encoding or decoding failed
    #[error("invalid report JSON: {0}")]
    Json(#[from] serde_json::Error),
}
