//! Build executor
//!
//! Runs one primary build end to end:
//! 1. validate the scene list and clear stale output
//! 2. snapshot the global settings and apply the variant's optimization plan
//! 3. invoke the toolchain
//! 4. on a successful Release build, run the secondary passes and write the build report
//! 5. persist the build summary
//!
//! The settings snapshot is restored and the store flushed on every exit path.

use chrono::Local;
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::host::{
    BuildRequest, BuildTarget, Decompressor, SettingsStore, Toolchain, ToolchainReport,
};
use crate::infra::{FileSystem, RealFileSystem};
use crate::report::{BuildReportSummary, ReportGenerator, ReportInput, SummaryStore};
use crate::settings::{ConfigurationOption, OptimizationPlanner, RestoreReport, SettingsSnapshot};

use super::config::PipelineConfig;
use super::error::PipelineError;
use super::secondary::{SecondaryArtifacts, SecondaryBuildRunner, SecondaryPass};
use super::telemetry::{BuildEvent, BuildObserver, BuildState, ObserverRegistry};
use super::variant::{AdditionalBuildOptions, BuildVariant};

/// What a finished build produced
#[derive(Debug, Clone)]
pub struct BuildResult {
    /// Variant built
    pub variant: BuildVariant,
    /// Primary output directory
    pub output_path: PathBuf,
    /// Time from start until the summary was written
    pub duration: Duration,
    /// Every planned setting
    pub optimizations: Vec<ConfigurationOption>,
    /// Artifacts copied in from secondary passes
    pub secondary: SecondaryArtifacts,
    /// Build report, when one was written
    pub report_path: Option<PathBuf>,
    /// Persisted summary, when one was written
    pub summary_path: Option<PathBuf>,
    /// Outcome of restoring the settings snapshot
    pub restore: RestoreReport,
    /// Total output size reported by the toolchain
    pub total_size: u64,
}

/// Drives primary builds against one settings store and toolchain
pub struct BuildExecutor<'a, FS: FileSystem + Clone = RealFileSystem> {
    settings: &'a dyn SettingsStore,
    toolchain: &'a dyn Toolchain,
    decompressor: &'a dyn Decompressor,
    fs: FS,
    config: PipelineConfig,
    observers: ObserverRegistry,
    state: Mutex<BuildState>,
}

impl<'a> BuildExecutor<'a, RealFileSystem> {
    /// Executor writing to the real filesystem
    pub fn new(
        settings: &'a dyn SettingsStore,
        toolchain: &'a dyn Toolchain,
        decompressor: &'a dyn Decompressor,
        config: PipelineConfig,
    ) -> Self {
        Self::with_fs(settings, toolchain, decompressor, config, RealFileSystem)
    }
}

impl<'a, FS: FileSystem + Clone> BuildExecutor<'a, FS> {
    /// Executor with a custom filesystem implementation
    pub fn with_fs(
        settings: &'a dyn SettingsStore,
        toolchain: &'a dyn Toolchain,
        decompressor: &'a dyn Decompressor,
        config: PipelineConfig,
        fs: FS,
    ) -> Self {
        Self {
            settings,
            toolchain,
            decompressor,
            fs,
            config,
            observers: ObserverRegistry::new(),
            state: Mutex::new(BuildState::Idle),
        }
    }

    /// Register an observer for subsequent builds
    pub fn observe(&self, observer: Arc<dyn BuildObserver>) {
        self.observers.register(observer);
    }

    /// Current lifecycle state
    pub fn state(&self) -> BuildState {
        *self.state.lock()
    }

    /// Pipeline configuration in use
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Output directory of `variant`
    pub fn output_path(&self, variant: BuildVariant) -> PathBuf {
        self.config.output_root.join(variant.output_folder())
    }

    /// Build `variant`.
    ///
    /// # Errors
    /// - [`PipelineError::NoScenesConfigured`] before anything is touched
    /// - [`PipelineError::ToolchainFailure`] with every error message the toolchain reported
    /// - [`PipelineError::UnexpectedFault`] when a host collaborator fails
    ///
    /// Settings are restored in all three cases.
    pub fn build(
        &self,
        variant: BuildVariant,
        options: &AdditionalBuildOptions,
    ) -> Result<BuildResult, PipelineError> {
        let scenes = self.config.enabled_scenes();
        if scenes.is_empty() {
            return Err(PipelineError::NoScenesConfigured);
        }

        let started = Instant::now();
        let output_path = self.output_path(variant);
        log::debug!("Removing stale output {}", output_path.display());
        self.fs.remove_dir_all(&output_path)?;

        let guard = SettingsSnapshot::scoped(self.settings)?;
        let outcome = self.run(variant, options, scenes, &output_path, guard.snapshot(), started);

        let restore = guard.restore();
        self.observers.dispatch(&BuildEvent::ConfigurationRestored {
            report: restore.clone(),
        });
        if let Err(e) = self.settings.flush() {
            log::warn!("Could not persist restored settings: {}", e);
        }
        self.transition(variant, BuildState::Idle);

        outcome.map(|mut result| {
            result.restore = restore;
            result
        })
    }

    fn run(
        &self,
        variant: BuildVariant,
        options: &AdditionalBuildOptions,
        scenes: Vec<String>,
        output_path: &Path,
        snapshot: &SettingsSnapshot,
        started: Instant,
    ) -> Result<BuildResult, PipelineError> {
        let plan = OptimizationPlanner::plan(variant, snapshot);
        if let Err(e) = plan.apply(self.settings) {
            self.transition(variant, BuildState::Failed);
            return Err(e.into());
        }
        self.transition(variant, BuildState::ConfigApplied);
        self.observers.dispatch(&BuildEvent::ConfigurationApplied {
            optimizations: plan.optimizations.len(),
        });

        let request = BuildRequest {
            scenes,
            output_path: output_path.to_path_buf(),
            target: BuildTarget::WebGl,
            options: variant.toolchain_options(),
        };

        self.transition(variant, BuildState::Building);
        let mut report = match self.toolchain.build_player(&request) {
            Ok(report) => report,
            Err(e) => {
                self.transition(variant, BuildState::Failed);
                return Err(e.into());
            }
        };
        if !report.succeeded() {
            let messages = report.error_messages();
            for message in &messages {
                log::error!("{}", message);
            }
            self.transition(variant, BuildState::Failed);
            return Err(PipelineError::ToolchainFailure { messages });
        }
        if report.output_path.as_os_str().is_empty() {
            report.output_path = output_path.to_path_buf();
        }
        self.transition(variant, BuildState::Succeeded);

        let mut result = BuildResult {
            variant,
            output_path: output_path.to_path_buf(),
            duration: Duration::ZERO,
            optimizations: plan.optimizations,
            secondary: SecondaryArtifacts::default(),
            report_path: None,
            summary_path: None,
            restore: RestoreReport::default(),
            total_size: report.total_size,
        };

        if variant == BuildVariant::Release {
            result.secondary = self.run_secondary_passes(options, &request, output_path);
            result.report_path = self.write_report(variant, options, &report, &result, started);
        }
        result.summary_path = self.persist_summary(&report, &request);
        result.duration = started.elapsed();
        Ok(result)
    }

    fn run_secondary_passes(
        &self,
        options: &AdditionalBuildOptions,
        request: &BuildRequest,
        output_path: &Path,
    ) -> SecondaryArtifacts {
        let runner = SecondaryBuildRunner::new(self.settings, self.toolchain, self.fs.clone());
        let mut artifacts = SecondaryArtifacts::default();
        for pass in SecondaryPass::for_release(options.supports_mobile) {
            let artifact = runner.run_variant_build(pass, request, output_path);
            self.observers.dispatch(&BuildEvent::SecondaryPassFinished {
                pass,
                artifact: artifact.clone(),
            });
            artifacts.set(pass, artifact);
        }
        artifacts
    }

    fn write_report(
        &self,
        variant: BuildVariant,
        options: &AdditionalBuildOptions,
        report: &ToolchainReport,
        result: &BuildResult,
        started: Instant,
    ) -> Option<PathBuf> {
        let generator = ReportGenerator::new(self.fs.clone(), self.decompressor);
        let input = ReportInput {
            variant,
            options,
            report,
            optimizations: &result.optimizations,
            secondary: &result.secondary,
            started,
        };
        match generator.write(&input) {
            Ok(path) => {
                self.observers
                    .dispatch(&BuildEvent::ReportWritten { path: path.clone() });
                Some(path)
            }
            Err(e) => {
                log::warn!("Could not write build report: {}", e);
                None
            }
        }
    }

    fn persist_summary(&self, report: &ToolchainReport, request: &BuildRequest) -> Option<PathBuf> {
        let summary =
            BuildReportSummary::from_toolchain_report(report, &request.options, Local::now())?;
        let store = SummaryStore::with_fs(&self.config.cache_dir, self.fs.clone());
        match store.save(&summary) {
            Ok(path) => {
                self.observers
                    .dispatch(&BuildEvent::SummaryWritten { path: path.clone() });
                Some(path)
            }
            Err(e) => {
                log::warn!("Could not persist build summary: {}", e);
                None
            }
        }
    }

    fn transition(&self, variant: BuildVariant, state: BuildState) {
        *self.state.lock() = state;
        self.observers
            .dispatch(&BuildEvent::StateChanged { variant, state });
    }
}
