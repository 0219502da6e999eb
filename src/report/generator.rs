//! Build report for the developer portal
//!
//! Written as `crazygames_build_report.json` into the output directory of every successful
//! Release build. The portal reads it to learn which files make up the build and which
//! settings the build script changed.

use chrono::Local;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Instant;

use super::artifacts::{ArtifactSizer, BuildArtifactDescriptor};
use super::ReportError;
use crate::host::{BuildStatus, Decompressor, ToolchainReport};
use crate::infra::{FileSystem, RealFileSystem};
use crate::pipeline::{AdditionalBuildOptions, BuildVariant, SecondaryArtifacts};
use crate::settings::ConfigurationOption;

/// File name of the report inside the output directory
pub const REPORT_FILE_NAME: &str = "crazygames_build_report.json";

/// Version of the report producer, read by the portal
pub const BUILD_SCRIPT_VERSION: &str = "1.3.0";

/// Contents of the build report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildReport {
    /// Local time the report was written, `YYYY-MM-DD HH:MM:SS`
    pub build_date_time: String,
    /// [`BUILD_SCRIPT_VERSION`]
    pub build_script_version: String,
    /// Version of this tool
    pub sdk_version: String,
    /// Engine version that built the player
    pub unity_version: String,
    /// Variant name
    pub build_variant: String,
    /// Options chosen with the variant
    pub additional_options: AdditionalBuildOptions,
    /// Toolchain result
    pub build_result: String,
    /// Seconds from build start until the report was written
    pub total_time: f64,
    /// Every planned setting
    pub build_optimizations: Vec<ConfigurationOption>,
    /// Main files followed by secondary artifacts
    pub generated_files: Vec<BuildArtifactDescriptor>,
}

/// Everything the report is built from
pub struct ReportInput<'a> {
    /// Variant built
    pub variant: BuildVariant,
    /// Options chosen with the variant
    pub options: &'a AdditionalBuildOptions,
    /// Primary toolchain report
    pub report: &'a ToolchainReport,
    /// Planned settings
    pub optimizations: &'a [ConfigurationOption],
    /// Secondary artifact names
    pub secondary: &'a SecondaryArtifacts,
    /// When the build started
    pub started: Instant,
}

fn status_name(status: BuildStatus) -> &'static str {
    match status {
        BuildStatus::Succeeded => "Succeeded",
        BuildStatus::Failed => "Failed",
        BuildStatus::Cancelled => "Cancelled",
        BuildStatus::Unknown => "Unknown",
    }
}

/// Assembles and writes [`BuildReport`]s
pub struct ReportGenerator<'a, FS: FileSystem = RealFileSystem> {
    fs: FS,
    decompressor: &'a dyn Decompressor,
}

impl<'a, FS: FileSystem> ReportGenerator<'a, FS> {
    /// Create a generator
    pub fn new(fs: FS, decompressor: &'a dyn Decompressor) -> Self {
        Self { fs, decompressor }
    }

    /// Build the report without writing it
    pub fn generate(&self, input: &ReportInput<'_>) -> BuildReport {
        let sizer = ArtifactSizer::new(&self.fs, self.decompressor);
        let mut generated_files = sizer.main_files(&input.report.files);

        let build_dir = input.report.output_path.join("Build");
        for (pass, name) in input.secondary.iter() {
            if let Some(descriptor) = sizer.extra_file(&build_dir, name, pass.artifact_type()) {
                generated_files.push(descriptor);
            }
        }

        BuildReport {
            build_date_time: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            build_script_version: BUILD_SCRIPT_VERSION.to_string(),
            sdk_version: env!("CARGO_PKG_VERSION").to_string(),
            unity_version: input
                .report
                .engine_version
                .clone()
                .unwrap_or_else(|| "unknown".to_string()),
            build_variant: input.variant.to_string(),
            additional_options: *input.options,
            build_result: status_name(input.report.status).to_string(),
            total_time: input.started.elapsed().as_secs_f64(),
            build_optimizations: input.optimizations.to_vec(),
            generated_files,
        }
    }

    /// Build the report and write it into the output directory
    pub fn write(&self, input: &ReportInput<'_>) -> Result<PathBuf, ReportError> {
        let report = self.generate(input);
        let path = input.report.output_path.join(REPORT_FILE_NAME);
        self.write_report(&report, &path)?;
        Ok(path)
    }

    fn write_report(&self, report: &BuildReport, path: &Path) -> Result<(), ReportError> {
        let json = serde_json::to_string_pretty(report)?;
        self.fs
            .write(path, json)
            .map_err(|source| ReportError::Io {
                path: path.to_path_buf(),
                source,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{BrotliDecompressor, OutputFile};
    use crate::infra::RealFileSystem;
    use crate::pipeline::SecondaryPass;
    use tempfile::TempDir;

    fn toolchain_report(root: &Path) -> ToolchainReport {
        let build = root.join("Build");
        std::fs::create_dir_all(&build).unwrap();
        let mut files = Vec::new();
        for (name, contents) in [
            ("Game.loader.js", "loader"),
            ("Game.framework.js", "framework"),
            ("Game.data", "data data"),
            ("Game.wasm", "wasm"),
        ] {
            let path = build.join(name);
            std::fs::write(&path, contents).unwrap();
            files.push(OutputFile {
                path,
                size: contents.len() as u64,
            });
        }
        ToolchainReport {
            status: BuildStatus::Succeeded,
            output_path: root.to_path_buf(),
            files,
            engine_version: Some("6000.0.23f1".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_generate_lists_main_files_in_type_order() {
        let temp = TempDir::new().unwrap();
        let report = toolchain_report(temp.path());
        let generator = ReportGenerator::new(RealFileSystem, &BrotliDecompressor);

        let built = generator.generate(&ReportInput {
            variant: BuildVariant::Release,
            options: &AdditionalBuildOptions::default(),
            report: &report,
            optimizations: &[],
            secondary: &SecondaryArtifacts::default(),
            started: Instant::now(),
        });

        let types: Vec<_> = built
            .generated_files
            .iter()
            .map(|f| f.artifact_type.as_str())
            .collect();
        assert_eq!(types, vec!["data", "framework", "loader", "wasm"]);
        assert_eq!(built.unity_version, "6000.0.23f1");
        assert_eq!(built.build_result, "Succeeded");
        assert_eq!(built.build_script_version, "1.3.0");
    }

    #[test]
    fn test_write_includes_secondary_and_skips_missing() {
        let temp = TempDir::new().unwrap();
        let report = toolchain_report(temp.path());
        std::fs::write(temp.path().join("Build/max_512mb_Game.wasm"), "small").unwrap();

        let mut secondary = SecondaryArtifacts::default();
        secondary.set(SecondaryPass::MaxMemory512, Some("max_512mb_Game.wasm".to_string()));
        secondary.set(SecondaryPass::AstcData, Some("astc_missing.data.br".to_string()));

        let generator = ReportGenerator::new(RealFileSystem, &BrotliDecompressor);
        let path = generator
            .write(&ReportInput {
                variant: BuildVariant::Release,
                options: &AdditionalBuildOptions {
                    supports_mobile: true,
                },
                report: &report,
                optimizations: &[],
                secondary: &secondary,
                started: Instant::now(),
            })
            .unwrap();

        assert_eq!(path, temp.path().join(REPORT_FILE_NAME));
        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        let files = json["generatedFiles"].as_array().unwrap();
        assert_eq!(files.len(), 5);
        assert_eq!(files[4]["type"], "wasm_max_512mb");
        assert_eq!(files[4]["size"], 5);
        assert_eq!(json["additionalOptions"]["supportsMobile"], true);
    }

    #[test]
    fn test_unknown_engine_version() {
        let temp = TempDir::new().unwrap();
        let mut report = toolchain_report(temp.path());
        report.engine_version = None;
        let generator = ReportGenerator::new(RealFileSystem, &BrotliDecompressor);

        let built = generator.generate(&ReportInput {
            variant: BuildVariant::Release,
            options: &AdditionalBuildOptions::default(),
            report: &report,
            optimizations: &[],
            secondary: &SecondaryArtifacts::default(),
            started: Instant::now(),
        });
        assert_eq!(built.unity_version, "unknown");
    }

    #[test]
    fn test_build_date_time_format() {
        let temp = TempDir::new().unwrap();
        let report = toolchain_report(temp.path());
        let generator = ReportGenerator::new(RealFileSystem, &BrotliDecompressor);

        let built = generator.generate(&ReportInput {
            variant: BuildVariant::Release,
            options: &AdditionalBuildOptions::default(),
            report: &report,
            optimizations: &[],
            secondary: &SecondaryArtifacts::default(),
            started: Instant::now(),
        });
        assert!(
            chrono::NaiveDateTime::parse_from_str(&built.build_date_time, "%Y-%m-%d %H:%M:%S")
                .is_ok()
        );
    }
}
