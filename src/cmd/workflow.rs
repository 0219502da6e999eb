//! Project wiring shared by the commands
//!
//! [`ProjectContext`] turns a loaded `.crazybuild.toml` into the host collaborators the
//! pipeline and the analyzer need. [`BuildWorkflow`] runs one build against them. Neither
//! prints anything; presentation lives in the command modules.
//!
//! # Examples
//!
//! ```no_run
//! use crazybuild::cmd::workflow::{BuildWorkflow, ProjectContext};
//! use crazybuild::pipeline::BuildVariant;
//! use std::path::Path;
//!
//! let context = ProjectContext::load(Path::new("."))?;
//! let result = BuildWorkflow::new(&context).execute(BuildVariant::Release, false, Vec::new())?;
//! println!("Built into {}", result.output_path.display());
//! # Ok::<(), anyhow::Error>(())
//! ```

use anyhow::Result;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::analyzer::{Analyzer, AnalyzerError, AnalyzerReport};
use crate::config::{validate, ConfigFile, ConfigLoader};
use crate::error::CrazyBuildError;
use crate::host::{
    AssetImporter, BrotliDecompressor, CommandToolchain, FileSettingsStore, ManifestAssetCatalog,
    Toolchain,
};
use crate::pipeline::{
    AdditionalBuildOptions, BuildExecutor, BuildObserver, BuildResult, BuildVariant,
    PipelineConfig,
};
use crate::report::{BuildReportSummary, SummaryStore};

/// A project root and its configuration
#[derive(Debug, Clone)]
pub struct ProjectContext {
    root: PathBuf,
    config: ConfigFile,
}

impl ProjectContext {
    /// Load `.crazybuild.toml` from `root`
    pub fn load(root: &Path) -> Result<Self> {
        Ok(Self::from_config(root, ConfigLoader::load(root)?))
    }

    /// Context for an already loaded configuration
    pub fn from_config(root: &Path, config: ConfigFile) -> Self {
        Self {
            root: root.to_path_buf(),
            config,
        }
    }

    /// Project root
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Loaded configuration
    pub fn config(&self) -> &ConfigFile {
        &self.config
    }

    /// Pipeline configuration with paths resolved against the root
    pub fn pipeline_config(&self) -> PipelineConfig {
        self.config.pipeline_config(&self.root)
    }

    /// Player settings store backed by the configured settings file
    pub fn settings_store(&self) -> FileSettingsStore {
        FileSettingsStore::new(self.config.settings_path(&self.root))
    }

    /// The configured build command, after checking it is usable
    ///
    /// # Errors
    /// [`CrazyBuildError::ToolchainNotConfigured`], [`CrazyBuildError::ConfigInvalid`] or
    /// [`CrazyBuildError::ToolchainMissing`].
    pub fn toolchain(&self) -> Result<CommandToolchain, CrazyBuildError> {
        let validation = validate(&self.config, true);
        if let Some(issue) = validation.errors().first() {
            if issue.field == "toolchain.command" {
                return Err(CrazyBuildError::ToolchainNotConfigured);
            }
            return Err(CrazyBuildError::ConfigInvalid {
                field: issue.field.clone(),
                message: issue.message.clone(),
                suggestion: issue.suggestion.clone(),
            });
        }

        let section = &self.config.toolchain;
        let toolchain = CommandToolchain::new(section.command.clone(), section.args.clone())
            .with_engine_version(section.engine_version.clone())
            .with_settings_file(Some(self.config.settings_path(&self.root)))
            .with_working_dir(&self.root);
        if !toolchain.is_available() {
            return Err(CrazyBuildError::ToolchainMissing {
                command: section.command.clone(),
            });
        }
        Ok(toolchain)
    }

    /// Asset importer backed by the configured import manifest
    pub fn importer(&self) -> Result<ManifestAssetCatalog, AnalyzerError> {
        Ok(ManifestAssetCatalog::load(
            self.config.import_manifest_path(&self.root),
        )?)
    }

    /// Store for the persisted build summary
    pub fn summary_store(&self) -> SummaryStore {
        SummaryStore::new(self.root.join(&self.config.build.cache_dir))
    }

    /// Summary of the last Release build
    ///
    /// # Errors
    /// [`AnalyzerError::NoSummary`] when no Release build has been summarized yet.
    pub fn load_summary(&self) -> Result<BuildReportSummary, AnalyzerError> {
        let store = self.summary_store();
        store
            .load()?
            .ok_or_else(|| AnalyzerError::NoSummary(store.path().to_path_buf()))
    }

    /// Analyze the last Release build, reading import settings from `importer`
    pub fn analyze_with(
        &self,
        importer: &dyn AssetImporter,
    ) -> Result<AnalyzerReport, AnalyzerError> {
        let summary = self.load_summary()?;
        let profile = self.config.project_profile();
        Ok(Analyzer::new(importer, &profile).analyze(&summary))
    }
}

/// Runs one build of a project
pub struct BuildWorkflow<'a> {
    context: &'a ProjectContext,
}

impl<'a> BuildWorkflow<'a> {
    /// Workflow for `context`
    pub fn new(context: &'a ProjectContext) -> Self {
        Self { context }
    }

    /// Build `variant` with the configured toolchain.
    ///
    /// `supports_mobile` is or-ed with `[build] supports_mobile`.
    pub fn execute(
        &self,
        variant: BuildVariant,
        supports_mobile: bool,
        observers: Vec<Arc<dyn BuildObserver>>,
    ) -> Result<BuildResult> {
        let toolchain = self.context.toolchain()?;
        self.execute_with(&toolchain, variant, supports_mobile, observers)
    }

    /// Build `variant` with an explicit toolchain
    pub fn execute_with(
        &self,
        toolchain: &dyn Toolchain,
        variant: BuildVariant,
        supports_mobile: bool,
        observers: Vec<Arc<dyn BuildObserver>>,
    ) -> Result<BuildResult> {
        let settings = self.context.settings_store();
        let decompressor = BrotliDecompressor;
        let executor = BuildExecutor::new(
            &settings,
            toolchain,
            &decompressor,
            self.context.pipeline_config(),
        );
        for observer in observers {
            executor.observe(observer);
        }

        let options = AdditionalBuildOptions {
            supports_mobile: supports_mobile || self.context.config.build.supports_mobile,
        };
        log::info!(
            "Building {} into {}",
            variant,
            executor.output_path(variant).display()
        );
        executor
            .build(variant, &options)
            .map_err(|e| CrazyBuildError::from(e).into())
    }
}
