//! External build toolchain
//!
//! The toolchain compiles the project for WebGL and reports what it produced. The real
//! implementation runs a configured command with the request passed through `CRAZYBUILD_*`
//! environment variables:
//!
//! | Variable | Meaning |
//! |---|---|
//! | `CRAZYBUILD_PROJECT` | Project root, also the command's working directory |
//! | `CRAZYBUILD_OUTPUT` | Output directory |
//! | `CRAZYBUILD_SCENES` | Enabled scene paths, `;`-separated |
//! | `CRAZYBUILD_TARGET` | Always `WebGL` |
//! | `CRAZYBUILD_DEVELOPMENT` | `1` for development players |
//! | `CRAZYBUILD_AUTO_RUN` | `1` to launch the player afterwards |
//! | `CRAZYBUILD_CLEAN_CACHE` | `1` to clean the build cache first |
//! | `CRAZYBUILD_REPORT_PATH` | Where the command may write its JSON build report |
//! | `CRAZYBUILD_SETTINGS` | Settings file the build must read, when configured |
//!
//! Scene paths are project-relative, so the command runs inside the project root when one is
//! set with [`CommandToolchain::with_working_dir`].
//!
//! When the command writes no report, one is synthesized from its exit status, its stderr
//! and a scan of the output directory.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Instant;
use walkdir::WalkDir;

use super::HostError;
use crate::infra::{CommandExecutor, FileSystem, RealCommandExecutor, RealFileSystem};

/// Build target platform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BuildTarget {
    /// WebGL player
    #[default]
    #[serde(rename = "WebGL")]
    WebGl,
}

impl BuildTarget {
    /// Name passed to the toolchain
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::WebGl => "WebGL",
        }
    }
}

/// Player build flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BuildOptions {
    /// Development player
    pub development: bool,
    /// Launch the player after building
    pub auto_run: bool,
    /// Clean the build cache before building
    pub clean_build_cache: bool,
}

impl BuildOptions {
    /// No flags set, used by secondary passes
    pub const NONE: Self = Self {
        development: false,
        auto_run: false,
        clean_build_cache: false,
    };
}

/// One toolchain invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildRequest {
    /// Enabled scene paths in build order
    pub scenes: Vec<String>,
    /// Output directory
    pub output_path: PathBuf,
    /// Target platform
    pub target: BuildTarget,
    /// Player flags
    pub options: BuildOptions,
}

/// Final status of a toolchain run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildStatus {
    /// Player built
    Succeeded,
    /// Build failed
    Failed,
    /// Build was cancelled
    Cancelled,
    /// Status not reported
    #[default]
    Unknown,
}

/// A file written to the output directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputFile {
    /// Path of the file
    pub path: PathBuf,
    /// Size on disk in bytes
    pub size: u64,
}

/// Severity of a build step message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageSeverity {
    /// Error
    Error,
    /// Warning
    Warning,
    /// Informational
    Info,
}

/// Message emitted during a build step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepMessage {
    /// Severity
    pub severity: MessageSeverity,
    /// Message text
    pub content: String,
}

/// A named build step and its messages
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BuildStep {
    /// Step name
    pub name: String,
    /// Messages in emission order
    #[serde(default)]
    pub messages: Vec<StepMessage>,
}

/// A source asset and its size inside the packaged build
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackedAsset {
    /// Project-relative source path, may be empty for engine-generated content
    #[serde(default)]
    pub source_asset_path: String,
    /// Packed size in bytes
    pub packed_size: u64,
}

/// What a toolchain run produced
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ToolchainReport {
    /// Final status
    pub status: BuildStatus,
    /// Output directory
    pub output_path: PathBuf,
    /// Files written to the output directory
    pub files: Vec<OutputFile>,
    /// Build steps
    pub steps: Vec<BuildStep>,
    /// Packed source assets
    pub packed_assets: Vec<PackedAsset>,
    /// Wall-clock time in seconds
    pub total_time: f64,
    /// Total output size in bytes
    pub total_size: u64,
    /// Engine version that produced the build
    pub engine_version: Option<String>,
}

impl ToolchainReport {
    /// True when the player was built
    pub fn succeeded(&self) -> bool {
        self.status == BuildStatus::Succeeded
    }

    /// Every error-severity message across all steps
    pub fn error_messages(&self) -> Vec<String> {
        self.steps
            .iter()
            .flat_map(|step| step.messages.iter())
            .filter(|m| m.severity == MessageSeverity::Error)
            .map(|m| m.content.clone())
            .collect()
    }
}

/// Compiles the project for a target
pub trait Toolchain {
    /// Run one build to completion
    fn build_player(&self, request: &BuildRequest) -> Result<ToolchainReport, HostError>;
}

impl<T: Toolchain + ?Sized> Toolchain for &T {
    fn build_player(&self, request: &BuildRequest) -> Result<ToolchainReport, HostError> {
        (**self).build_player(request)
    }
}

/// Runs an external build command
pub struct CommandToolchain<CE: CommandExecutor = RealCommandExecutor, FS: FileSystem = RealFileSystem>
{
    command: String,
    args: Vec<String>,
    engine_version: Option<String>,
    settings_file: Option<PathBuf>,
    working_dir: Option<PathBuf>,
    executor: CE,
    fs: FS,
}

impl CommandToolchain {
    /// Toolchain running `command` with `args`
    pub fn new(command: impl Into<String>, args: Vec<String>) -> Self {
        Self::with_executors(command, args, RealCommandExecutor, RealFileSystem)
    }
}

impl<CE: CommandExecutor, FS: FileSystem> CommandToolchain<CE, FS> {
    /// Toolchain with custom command executor and filesystem
    pub fn with_executors(
        command: impl Into<String>,
        args: Vec<String>,
        executor: CE,
        fs: FS,
    ) -> Self {
        Self {
            command: command.into(),
            args,
            engine_version: None,
            settings_file: None,
            working_dir: None,
            executor,
            fs,
        }
    }

    /// Engine version reported when the command does not report one
    pub fn with_engine_version(mut self, version: Option<String>) -> Self {
        self.engine_version = version;
        self
    }

    /// Settings file passed to the command
    pub fn with_settings_file(mut self, path: Option<PathBuf>) -> Self {
        self.settings_file = path;
        self
    }

    /// Project root the command runs in
    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    /// Configured command
    pub fn command(&self) -> &str {
        &self.command
    }

    /// Whether the command can be found
    pub fn is_available(&self) -> bool {
        self.resolve_program().is_ok()
    }

    /// Relative command paths resolve against the working directory
    fn resolve_program(&self) -> Result<PathBuf, which::Error> {
        match &self.working_dir {
            Some(dir) => which::which_in(&self.command, std::env::var_os("PATH"), dir),
            None => which::which(&self.command),
        }
    }

    fn report_path(request: &BuildRequest) -> PathBuf {
        let name = request
            .output_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "build".to_string());
        std::env::temp_dir().join(format!(
            "crazybuild-{}-{}.json",
            std::process::id(),
            name
        ))
    }

    fn read_report(&self, path: &Path) -> Result<Option<ToolchainReport>, HostError> {
        if !self.fs.exists(path) {
            return Ok(None);
        }
        let contents = self.fs.read_to_string(path)?;
        let report = serde_json::from_str(&contents)
            .map_err(|e| HostError::MalformedReport(format!("{}: {}", path.display(), e)))?;
        Ok(Some(report))
    }

    fn synthesize_report(
        &self,
        request: &BuildRequest,
        success: bool,
        code: Option<i32>,
        stderr: &str,
    ) -> ToolchainReport {
        let severity = if success {
            MessageSeverity::Warning
        } else {
            MessageSeverity::Error
        };
        let mut messages: Vec<StepMessage> = stderr
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(|line| StepMessage {
                severity,
                content: line.to_string(),
            })
            .collect();
        if !success && messages.is_empty() {
            messages.push(StepMessage {
                severity: MessageSeverity::Error,
                content: match code {
                    Some(code) => format!("{} exited with status {}", self.command, code),
                    None => format!("{} was terminated by a signal", self.command),
                },
            });
        }

        let files = scan_output(&request.output_path);
        let total_size = files.iter().map(|f| f.size).sum();

        ToolchainReport {
            status: if success {
                BuildStatus::Succeeded
            } else {
                BuildStatus::Failed
            },
            output_path: request.output_path.clone(),
            files,
            steps: vec![BuildStep {
                name: "Build player".to_string(),
                messages,
            }],
            packed_assets: Vec::new(),
            total_time: 0.0,
            total_size,
            engine_version: None,
        }
    }
}

impl<CE: CommandExecutor, FS: FileSystem> Toolchain for CommandToolchain<CE, FS> {
    fn build_player(&self, request: &BuildRequest) -> Result<ToolchainReport, HostError> {
        let program = self.resolve_program().map_err(|e| {
            HostError::ToolchainUnavailable(format!("'{}': {}", self.command, e))
        })?;

        let report_path = Self::report_path(request);
        self.fs.remove_file(&report_path)?;

        log::info!(
            "Running {} for {} ({} scene(s))",
            program.display(),
            request.output_path.display(),
            request.scenes.len()
        );

        // The command may run in another directory, so every path it receives is absolute
        let output_path = std::path::absolute(&request.output_path)?;
        let settings_file = self
            .settings_file
            .as_deref()
            .map(std::path::absolute)
            .transpose()?;
        let working_dir = self
            .working_dir
            .as_deref()
            .map(std::path::absolute)
            .transpose()?;

        let flag = |b: bool| if b { "1" } else { "0" };
        let started = Instant::now();
        let output = self.executor.execute(
            |cmd| {
                cmd.args(&self.args)
                    .env("CRAZYBUILD_OUTPUT", &output_path)
                    .env("CRAZYBUILD_SCENES", request.scenes.join(";"))
                    .env("CRAZYBUILD_TARGET", request.target.as_str())
                    .env("CRAZYBUILD_DEVELOPMENT", flag(request.options.development))
                    .env("CRAZYBUILD_AUTO_RUN", flag(request.options.auto_run))
                    .env("CRAZYBUILD_CLEAN_CACHE", flag(request.options.clean_build_cache))
                    .env("CRAZYBUILD_REPORT_PATH", &report_path);
                if let Some(settings) = &settings_file {
                    cmd.env("CRAZYBUILD_SETTINGS", settings);
                }
                if let Some(dir) = &working_dir {
                    cmd.current_dir(dir).env("CRAZYBUILD_PROJECT", dir);
                }
                cmd
            },
            &program,
        )?;
        let elapsed = started.elapsed().as_secs_f64();
        let stderr = String::from_utf8_lossy(&output.stderr);

        let reported = self.read_report(&report_path);
        if let Err(e) = self.fs.remove_file(&report_path) {
            log::debug!("Could not remove {}: {}", report_path.display(), e);
        }

        let mut report = match reported? {
            Some(report) => report,
            None => self.synthesize_report(
                request,
                output.status.success(),
                output.status.code(),
                &stderr,
            ),
        };

        if report.status == BuildStatus::Unknown {
            report.status = if output.status.success() {
                BuildStatus::Succeeded
            } else {
                BuildStatus::Failed
            };
        }
        if report.output_path.as_os_str().is_empty() {
            report.output_path = request.output_path.clone();
        }
        // Relative paths in a written report are relative to the command's directory
        if let Some(dir) = &working_dir {
            if report.output_path.is_relative() {
                report.output_path = dir.join(&report.output_path);
            }
            for file in report.files.iter_mut().filter(|f| f.path.is_relative()) {
                file.path = dir.join(&file.path);
            }
        }
        if report.total_time <= 0.0 {
            report.total_time = elapsed;
        }
        if report.engine_version.is_none() {
            report.engine_version = self.engine_version.clone();
        }

        log::info!(
            "Toolchain finished: {:?} in {:.1}s",
            report.status,
            report.total_time
        );
        Ok(report)
    }
}

/// Every regular file under `root` with its size, in path order
fn scan_output(root: &Path) -> Vec<OutputFile> {
    let mut files: Vec<OutputFile> = WalkDir::new(root)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .filter_map(|entry| {
            let size = entry.metadata().ok()?.len();
            Some(OutputFile {
                path: entry.into_path(),
                size,
            })
        })
        .collect();
    files.sort_by(|a, b| a.path.cmp(&b.path));
    files
}
