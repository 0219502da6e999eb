//! Secondary builds for the hosting portal
//!
//! After a successful Release build the portal also wants an ASTC-compressed data file for
//! mobile GPUs and, for games that support mobile, wasm files built with a capped heap.
//! Each pass rebuilds into a temporary sibling directory with one or two settings
//! overridden, copies the single artifact it needs next to the primary build under a
//! prefixed name, and removes the temporary directory.

use serde::Serialize;
use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::host::{BuildOptions, BuildRequest, HostError, SettingsStore, Toolchain, ToolchainReport};
use crate::infra::{FileSystem, RealFileSystem};
use crate::report::ArtifactType;
use crate::settings::{SettingKey, SettingsSnapshot, SnapshotGuard, TextureSubtarget};

/// Appended to the primary output path for secondary builds
pub const INTERMEDIATE_BUILD_SUFFIX: &str = "_cg_intermediate_build";

/// One secondary build
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SecondaryPass {
    /// Data file with ASTC textures
    AstcData,
    /// wasm with a 512 MB heap ceiling
    MaxMemory512,
    /// wasm with a 1024 MB heap ceiling
    MaxMemory1024,
}

impl SecondaryPass {
    /// Passes to run for a Release build, in order
    pub fn for_release(supports_mobile: bool) -> Vec<Self> {
        if supports_mobile {
            vec![Self::AstcData, Self::MaxMemory512, Self::MaxMemory1024]
        } else {
            vec![Self::AstcData]
        }
    }

    /// Settings this pass overrides
    pub fn overrides(&self) -> Vec<(SettingKey, String)> {
        match self {
            Self::AstcData => vec![(
                SettingKey::WebGlTextureSubtarget,
                TextureSubtarget::Astc.as_str().to_string(),
            )],
            Self::MaxMemory512 => vec![(SettingKey::MaximumMemorySize, "512".to_string())],
            Self::MaxMemory1024 => vec![(SettingKey::MaximumMemorySize, "1024".to_string())],
        }
    }

    /// Suffix of the artifact taken from the pass output
    pub fn artifact_suffix(&self) -> &'static str {
        match self {
            Self::AstcData => ".data.br",
            Self::MaxMemory512 | Self::MaxMemory1024 => ".wasm.br",
        }
    }

    /// Prefix of the copied artifact's name
    pub fn prefix(&self) -> &'static str {
        match self {
            Self::AstcData => "astc_",
            Self::MaxMemory512 => "max_512mb_",
            Self::MaxMemory1024 => "max_1024mb_",
        }
    }

    /// Report type of the copied artifact
    pub fn artifact_type(&self) -> ArtifactType {
        match self {
            Self::AstcData => ArtifactType::DataAstc,
            Self::MaxMemory512 => ArtifactType::WasmMax512mb,
            Self::MaxMemory1024 => ArtifactType::WasmMax1024mb,
        }
    }
}

impl fmt::Display for SecondaryPass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::AstcData => "ASTC",
            Self::MaxMemory512 => "512MB memory",
            Self::MaxMemory1024 => "1024MB memory",
        })
    }
}

/// Names of the artifacts copied into the primary build, relative to its `Build/` folder
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SecondaryArtifacts {
    /// `astc_*.data.br`
    pub astc_data: Option<String>,
    /// `max_512mb_*.wasm.br`
    pub max_512mb: Option<String>,
    /// `max_1024mb_*.wasm.br`
    pub max_1024mb: Option<String>,
}

impl SecondaryArtifacts {
    /// Record the outcome of `pass`
    pub fn set(&mut self, pass: SecondaryPass, artifact: Option<String>) {
        match pass {
            SecondaryPass::AstcData => self.astc_data = artifact,
            SecondaryPass::MaxMemory512 => self.max_512mb = artifact,
            SecondaryPass::MaxMemory1024 => self.max_1024mb = artifact,
        }
    }

    /// Artifact name of `pass`
    pub fn get(&self, pass: SecondaryPass) -> Option<&str> {
        match pass {
            SecondaryPass::AstcData => self.astc_data.as_deref(),
            SecondaryPass::MaxMemory512 => self.max_512mb.as_deref(),
            SecondaryPass::MaxMemory1024 => self.max_1024mb.as_deref(),
        }
    }

    /// Produced artifacts with their pass, in pass order
    pub fn iter(&self) -> impl Iterator<Item = (SecondaryPass, &str)> {
        [
            SecondaryPass::AstcData,
            SecondaryPass::MaxMemory512,
            SecondaryPass::MaxMemory1024,
        ]
        .into_iter()
        .filter_map(move |pass| self.get(pass).map(|name| (pass, name)))
    }
}

/// `primary` with [`INTERMEDIATE_BUILD_SUFFIX`] appended to its last component
pub fn intermediate_path(primary: &Path) -> PathBuf {
    let mut path = OsString::from(primary.as_os_str());
    path.push(INTERMEDIATE_BUILD_SUFFIX);
    PathBuf::from(path)
}

/// Runs secondary passes against the same settings store and toolchain as the primary build
pub struct SecondaryBuildRunner<'a, FS: FileSystem = RealFileSystem> {
    settings: &'a dyn SettingsStore,
    toolchain: &'a dyn Toolchain,
    fs: FS,
}

impl<'a, FS: FileSystem> SecondaryBuildRunner<'a, FS> {
    /// Create a runner
    pub fn new(settings: &'a dyn SettingsStore, toolchain: &'a dyn Toolchain, fs: FS) -> Self {
        Self {
            settings,
            toolchain,
            fs,
        }
    }

    /// Run `pass` next to the primary build and return the copied artifact's name.
    ///
    /// Never fails: any problem is logged and yields `None`. The overridden settings are
    /// restored and the temporary directory removed in every case.
    pub fn run_variant_build(
        &self,
        pass: SecondaryPass,
        primary: &BuildRequest,
        primary_output: &Path,
    ) -> Option<String> {
        match self.try_run(pass, primary, primary_output) {
            Ok(Some(name)) => {
                log::info!("{} pass: copied {}", pass, name);
                Some(name)
            }
            Ok(None) => {
                log::warn!("Secondary build unavailable: {} pass did not succeed", pass);
                None
            }
            Err(e) => {
                log::warn!("Secondary build unavailable: {} pass failed: {}", pass, e);
                None
            }
        }
    }

    fn try_run(
        &self,
        pass: SecondaryPass,
        primary: &BuildRequest,
        primary_output: &Path,
    ) -> Result<Option<String>, HostError> {
        let temp_output = intermediate_path(&primary.output_path);
        self.fs.remove_dir_all(&temp_output)?;

        let overrides = pass.overrides();
        let keys: Vec<SettingKey> = overrides.iter().map(|(k, _)| *k).collect();
        let guard = SnapshotGuard::new(
            self.settings,
            SettingsSnapshot::capture_keys(self.settings, &keys)?,
        );
        for (key, value) in &overrides {
            self.settings.set(*key, value)?;
        }

        let request = BuildRequest {
            output_path: temp_output.clone(),
            options: BuildOptions::NONE,
            ..primary.clone()
        };
        log::debug!("{} pass building into {}", pass, temp_output.display());

        let outcome = match self.toolchain.build_player(&request) {
            Ok(report) if report.succeeded() => {
                self.copy_artifact(pass, &report, primary_output).map(Some)
            }
            Ok(report) => {
                for message in report.error_messages() {
                    log::debug!("{} pass: {}", pass, message);
                }
                Ok(None)
            }
            Err(e) => Err(e),
        };

        if let Err(e) = self.fs.remove_dir_all(&temp_output) {
            log::warn!("Could not remove {}: {}", temp_output.display(), e);
        }
        let restore = guard.restore();
        if !restore.is_complete() {
            log::warn!("{} pass left {} setting(s) unrestored", pass, restore.failures.len());
        }

        outcome
    }

    fn copy_artifact(
        &self,
        pass: SecondaryPass,
        report: &ToolchainReport,
        primary_output: &Path,
    ) -> Result<String, HostError> {
        let suffix = pass.artifact_suffix();
        let name = report
            .files
            .iter()
            .filter_map(|f| f.path.file_name())
            .map(|n| n.to_string_lossy().into_owned())
            .find(|n| n.to_ascii_lowercase().ends_with(suffix))
            .ok_or_else(|| {
                HostError::MalformedReport(format!("{} pass produced no {} file", pass, suffix))
            })?;

        let prefixed = format!("{}{}", pass.prefix(), name);
        let from = report.output_path.join("Build").join(&name);
        let to_dir = primary_output.join("Build");
        self.fs.create_dir_all(&to_dir)?;
        self.fs.copy(&from, &to_dir.join(&prefixed))?;
        Ok(prefixed)
    }
}
