//! Lightweight build summary persisted for later analysis
//!
//! The summary outlives the process: the `analyze` command reads it from the editor-local
//! cache directory, possibly long after the build finished.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use super::artifacts::select_main_files;
use super::ReportError;
use crate::host::{BuildOptions, PackedAsset, ToolchainReport};
use crate::infra::{FileSystem, RealFileSystem};
use crate::pipeline::INTERMEDIATE_BUILD_SUFFIX;

/// File name of the summary inside the cache directory
pub const SUMMARY_FILE_NAME: &str = "CGReleaseBuildReportSummary-v1.json";

/// A source asset and its packed size
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackagedFileSummary {
    /// Project-relative source path
    pub path: String,
    /// Packed size in bytes
    pub size: u64,
}

/// Handoff between the build and the analyzer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildReportSummary {
    /// Packed assets, largest first, one entry per source path
    pub packaged_files: Vec<PackagedFileSummary>,
    /// When the summary was created, RFC 3339
    #[serde(rename = "buildDateISO")]
    pub build_date_iso: String,
    /// Toolchain build time in seconds
    pub duration_seconds: f64,
    /// Total output size in bytes
    pub total_size: u64,
    /// Combined size of the main files fetched on first load
    pub initial_load_size: u64,
}

impl BuildReportSummary {
    /// Summarize a toolchain run, `None` for runs that must not replace the stored summary:
    /// failed builds, development builds and secondary builds.
    pub fn from_toolchain_report(
        report: &ToolchainReport,
        options: &BuildOptions,
        created: DateTime<Local>,
    ) -> Option<Self> {
        if !report.succeeded() || options.development {
            return None;
        }
        if report
            .output_path
            .to_string_lossy()
            .ends_with(INTERMEDIATE_BUILD_SUFFIX)
        {
            return None;
        }

        Some(Self {
            packaged_files: dedupe_packed_assets(&report.packed_assets),
            build_date_iso: created.to_rfc3339(),
            duration_seconds: report.total_time,
            total_size: report.total_size,
            initial_load_size: select_main_files(&report.files)
                .iter()
                .map(|(file, _)| file.size)
                .sum(),
        })
    }
}

/// Largest entry per source path, sorted by size descending; entries without a path dropped
pub fn dedupe_packed_assets(assets: &[PackedAsset]) -> Vec<PackagedFileSummary> {
    let mut sorted: Vec<&PackedAsset> = assets.iter().collect();
    sorted.sort_by(|a, b| b.packed_size.cmp(&a.packed_size));

    let mut seen = HashSet::new();
    sorted
        .into_iter()
        .filter(|a| !a.source_asset_path.is_empty())
        .filter(|a| seen.insert(a.source_asset_path.as_str()))
        .map(|a| PackagedFileSummary {
            path: a.source_asset_path.clone(),
            size: a.packed_size,
        })
        .collect()
}

/// Reads and writes the summary file
pub struct SummaryStore<FS: FileSystem = RealFileSystem> {
    path: PathBuf,
    fs: FS,
}

impl SummaryStore<RealFileSystem> {
    /// Store inside `cache_dir`
    pub fn new(cache_dir: impl AsRef<Path>) -> Self {
        Self::with_fs(cache_dir, RealFileSystem)
    }
}

impl<FS: FileSystem> SummaryStore<FS> {
    /// Store with a custom filesystem implementation
    pub fn with_fs(cache_dir: impl AsRef<Path>, fs: FS) -> Self {
        Self {
            path: cache_dir.as_ref().join(SUMMARY_FILE_NAME),
            fs,
        }
    }

    /// Path of the summary file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write `summary`, replacing any previous one
    pub fn save(&self, summary: &BuildReportSummary) -> Result<PathBuf, ReportError> {
        let io_err = |source| ReportError::Io {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            self.fs.create_dir_all(parent).map_err(io_err)?;
        }
        let json = serde_json::to_string_pretty(summary)?;
        self.fs.write(&self.path, json).map_err(io_err)?;
        Ok(self.path.clone())
    }

    /// The stored summary, `None` when no release build has been summarized yet
    pub fn load(&self) -> Result<Option<BuildReportSummary>, ReportError> {
        if !self.fs.exists(&self.path) {
            return Ok(None);
        }
        let contents = self
            .fs
            .read_to_string(&self.path)
            .map_err(|source| ReportError::Io {
                path: self.path.clone(),
                source,
            })?;
        let summary = serde_json::from_str(&contents)?;
        Ok(Some(summary))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{BuildStatus, OutputFile};
    use tempfile::TempDir;

    fn packed(path: &str, size: u64) -> PackedAsset {
        PackedAsset {
            source_asset_path: path.to_string(),
            packed_size: size,
        }
    }

    fn release_report(output: &str) -> ToolchainReport {
        ToolchainReport {
            status: BuildStatus::Succeeded,
            output_path: PathBuf::from(output),
            files: vec![
                OutputFile {
                    path: PathBuf::from("Build/Game.data.br"),
                    size: 1000,
                },
                OutputFile {
                    path: PathBuf::from("Build/Game.wasm.br"),
                    size: 400,
                },
                OutputFile {
                    path: PathBuf::from("index.html"),
                    size: 5,
                },
            ],
            packed_assets: vec![packed("Assets/a.png", 10)],
            total_time: 12.5,
            total_size: 1405,
            ..Default::default()
        }
    }

    const RELEASE: BuildOptions = BuildOptions {
        development: false,
        auto_run: true,
        clean_build_cache: true,
    };

    #[test]
    fn test_dedupe_keeps_largest_and_drops_empty_paths() {
        let summary = dedupe_packed_assets(&[
            packed("Assets/a.png", 0),
            packed("", 999),
            packed("Assets/b.ogg", 50),
            packed("Assets/a.png", 200),
        ]);

        assert_eq!(
            summary,
            vec![
                PackagedFileSummary {
                    path: "Assets/a.png".to_string(),
                    size: 200
                },
                PackagedFileSummary {
                    path: "Assets/b.ogg".to_string(),
                    size: 50
                },
            ]
        );
    }

    #[test]
    fn test_summary_initial_load_is_main_file_total() {
        let summary = BuildReportSummary::from_toolchain_report(
            &release_report("Builds/CrazyGamesRelease"),
            &RELEASE,
            Local::now(),
        )
        .unwrap();

        assert_eq!(summary.initial_load_size, 1400);
        assert_eq!(summary.total_size, 1405);
        assert_eq!(summary.duration_seconds, 12.5);
        assert!(DateTime::parse_from_rfc3339(&summary.build_date_iso).is_ok());
    }

    #[test]
    fn test_no_summary_for_development_failed_or_intermediate_builds() {
        let dev = BuildOptions {
            development: true,
            ..RELEASE
        };
        assert!(BuildReportSummary::from_toolchain_report(
            &release_report("Builds/CrazyGamesDevelopment"),
            &dev,
            Local::now()
        )
        .is_none());

        let mut failed = release_report("Builds/CrazyGamesRelease");
        failed.status = BuildStatus::Failed;
        assert!(BuildReportSummary::from_toolchain_report(&failed, &RELEASE, Local::now()).is_none());

        assert!(BuildReportSummary::from_toolchain_report(
            &release_report("Builds/CrazyGamesRelease_cg_intermediate_build"),
            &RELEASE,
            Local::now()
        )
        .is_none());
    }

    #[test]
    fn test_store_round_trip_and_absent_file() {
        let temp = TempDir::new().unwrap();
        let store = SummaryStore::new(temp.path().join("Library"));
        assert!(store.load().unwrap().is_none());

        let summary = BuildReportSummary::from_toolchain_report(
            &release_report("Builds/CrazyGamesRelease"),
            &RELEASE,
            Local::now(),
        )
        .unwrap();
        let path = store.save(&summary).unwrap();

        assert!(path.ends_with(SUMMARY_FILE_NAME));
        assert_eq!(store.load().unwrap(), Some(summary));
    }

    #[test]
    fn test_summary_wire_names() {
        let json = serde_json::to_value(BuildReportSummary {
            packaged_files: vec![],
            build_date_iso: "2024-01-01T00:00:00+00:00".to_string(),
            duration_seconds: 1.0,
            total_size: 2,
            initial_load_size: 3,
        })
        .unwrap();

        assert!(json.get("buildDateISO").is_some());
        assert!(json.get("packagedFiles").is_some());
        assert!(json.get("initialLoadSize").is_some());
    }
}
