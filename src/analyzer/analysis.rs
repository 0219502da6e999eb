//! Classification of packaged files into optimization suggestions

use std::collections::BTreeSet;

use super::types::{
    asset_name, Advisories, AnalyzerReport, AudioIssue, AudioOptimization, TextureIssue,
    TextureOptimization, AUDIO_TARGET_QUALITY, LONG_AUDIO_SECONDS, TEXTURE_SIZE_LIMIT,
};
use crate::host::probe::DEFAULT_FIXED_TIMESTEP;
use crate::host::{AssetImporter, AudioImport, ImportSettings, ProjectProbe, TextureImport};
use crate::report::BuildReportSummary;

/// Model file extensions whose read/write flag is checked
const MODEL_EXTENSIONS: [&str; 5] = [".fbx", ".dae", ".3ds", ".dxf", ".obj"];

/// True for asset paths inside a `Resources` folder under `Assets/`
pub fn is_resource_path(path: &str) -> bool {
    path.starts_with("Assets/") && path.contains("/Resources/")
}

/// True when the extension of `path` is a model format, case-insensitive
pub fn is_model_path(path: &str) -> bool {
    let lower = path.to_ascii_lowercase();
    MODEL_EXTENSIONS.iter().any(|ext| lower.ends_with(ext))
}

fn audio_issues(audio: &AudioImport) -> BTreeSet<AudioIssue> {
    let mut issues = BTreeSet::new();
    if audio.length_seconds <= LONG_AUDIO_SECONDS {
        return issues;
    }
    if !audio.force_to_mono {
        issues.insert(AudioIssue::ForceToMono);
    }
    if audio.quality > AUDIO_TARGET_QUALITY {
        issues.insert(AudioIssue::ReduceQuality);
    }
    issues
}

fn texture_issues(texture: &TextureImport) -> BTreeSet<TextureIssue> {
    let (width, height) = texture.imported_dimensions();
    let mut issues = BTreeSet::new();
    if width > TEXTURE_SIZE_LIMIT || height > TEXTURE_SIZE_LIMIT {
        issues.insert(TextureIssue::ReduceSize);
    }
    issues
}

/// Builds [`AnalyzerReport`]s from a persisted build summary
pub struct Analyzer<'a> {
    importer: &'a dyn AssetImporter,
    probe: &'a dyn ProjectProbe,
}

impl<'a> Analyzer<'a> {
    /// Analyzer reading import settings from `importer` and project settings from `probe`
    pub fn new(importer: &'a dyn AssetImporter, probe: &'a dyn ProjectProbe) -> Self {
        Self { importer, probe }
    }

    /// Classify every packaged file of `summary`, in path order.
    ///
    /// Reads only; nothing is changed on the importer or the project.
    pub fn analyze(&self, summary: &BuildReportSummary) -> AnalyzerReport {
        log::info!(
            "Analyzing {} packaged file(s)",
            summary.packaged_files.len()
        );
        let mut report = AnalyzerReport::new(summary.clone());

        let mut paths: Vec<&str> = summary
            .packaged_files
            .iter()
            .map(|f| f.path.as_str())
            .collect();
        paths.sort_unstable();

        for path in paths {
            self.classify(path, &mut report);
        }

        report.advisories = self.advisories();
        report.scenes_with_missing_scripts = self.probe.scenes_with_missing_scripts();
        report
    }

    fn classify(&self, path: &str, report: &mut AnalyzerReport) {
        if is_resource_path(path) {
            report.resources.push(path.to_string());
        }

        let settings = match self.importer.import_settings(path) {
            Ok(Some(settings)) => settings,
            Ok(None) => return,
            Err(e) => {
                log::warn!("Skipping {}: {}", path, e);
                return;
            }
        };

        match settings {
            ImportSettings::Audio(audio) => {
                let issues = audio_issues(&audio);
                if !issues.is_empty() {
                    report
                        .audio
                        .push(AudioOptimization::new(path, audio.length_seconds, issues));
                }
            }
            ImportSettings::Texture(texture) => {
                let issues = texture_issues(&texture);
                if !issues.is_empty() {
                    report.textures.push(TextureOptimization {
                        name: asset_name(path),
                        path: path.to_string(),
                        width: texture.source_width,
                        height: texture.source_height,
                        imported_size: texture.max_texture_size,
                        issues,
                    });
                }
                if texture.is_readable {
                    report.read_write_textures.push(path.to_string());
                }
                if texture.mipmap_enabled {
                    report.mipmap_textures.push(path.to_string());
                }
            }
            ImportSettings::Model(model) => {
                if model.is_readable && is_model_path(path) {
                    report.read_write_meshes.push(path.to_string());
                }
            }
        }
    }

    fn advisories(&self) -> Advisories {
        let capabilities = self.probe.capabilities();
        let has_pipeline = self.probe.render_pipeline().is_some();
        let fixed_timestep = self.probe.fixed_timestep();
        Advisories {
            post_processing: has_pipeline,
            addressables: !capabilities.addressables_installed,
            // 1 = off, 2 = 2x, 4 = 4x
            anti_aliasing: has_pipeline && self.probe.msaa_sample_count() > 2,
            physics_timestep: fixed_timestep < DEFAULT_FIXED_TIMESTEP,
            fixed_timestep,
            code_analysis_unavailable: !capabilities.project_auditor_available,
        }
    }
}
