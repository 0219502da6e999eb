//! Top-level errors with contextual suggestions
//!
//! Provides structured error types that include:
//! - Actionable error messages
//! - Suggested fixes and recovery actions
//! - Documentation links
//! - Proper exit codes for CI/CD
//!
//! Layer errors ([`PipelineError`], [`AnalyzerError`]) convert into [`CrazyBuildError`];
//! commands return `anyhow::Result` and `main` maps the error to an exit code through
//! [`ErrorFormatter`].

use std::path::PathBuf;
use thiserror::Error;

use crate::analyzer::AnalyzerError;
use crate::pipeline::PipelineError;

const DOCS_URL: &str = "https://docs.crazygames.com/sdk/unity/";
const EXPORT_TIPS_URL: &str = "https://docs.crazygames.com/resources/export-tips/";

/// crazybuild errors with contextual suggestions
#[derive(Error, Debug)]
pub enum CrazyBuildError {
    /// The configured build command cannot be found
    #[error("Build toolchain not found: '{command}'")]
    ToolchainMissing {
        /// Configured command
        command: String,
    },

    /// No build command configured
    #[error("No build toolchain configured")]
    ToolchainNotConfigured,

    /// `.crazybuild.toml` failed validation
    #[error("Invalid configuration: {field}: {message}")]
    ConfigInvalid {
        /// Dotted field path
        field: String,
        /// What is wrong
        message: String,
        /// How to fix it
        suggestion: Option<String>,
    },

    /// Analysis requested before any Release build
    #[error("No build summary found at {}", path.display())]
    NoSummary {
        /// Expected summary location
        path: PathBuf,
    },

    /// A fix target is not a known packaged asset
    #[error("Unknown asset: {path}")]
    UnknownAsset {
        /// Project-relative asset path
        path: String,
    },

    /// Generic I/O error with context
    #[error("I/O error: {context}")]
    Io {
        /// Context about where the error occurred
        context: String,
        #[source]
        /// IO error source
        source: std::io::Error,
    },

    /// Build pipeline error
    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    /// Analysis error
    #[error("analysis error: {0}")]
    Analyzer(AnalyzerError),
}

impl From<AnalyzerError> for CrazyBuildError {
    fn from(error: AnalyzerError) -> Self {
        match error {
            AnalyzerError::NoSummary(path) => Self::NoSummary { path },
            other => Self::Analyzer(other),
        }
    }
}

impl CrazyBuildError {
    /// Get actionable suggestion for resolving this error.
    ///
    /// # Examples
    ///
    /// ```
    /// use crazybuild::error::CrazyBuildError;
    ///
    /// let error = CrazyBuildError::ToolchainMissing {
    ///     command: "unity-build".to_string(),
    /// };
    ///
    /// assert!(error.suggestion().unwrap().contains("unity-build"));
    /// ```
    pub fn suggestion(&self) -> Option<String> {
        match self {
            Self::ToolchainMissing { command } => Some(format!(
                "Install '{}' or point [toolchain] command in .crazybuild.toml at the build script",
                command
            )),
            Self::ToolchainNotConfigured => Some(
                "Run 'crazybuild init' and set [toolchain] command in .crazybuild.toml"
                    .to_string(),
            ),
            Self::ConfigInvalid { suggestion, .. } => suggestion.clone(),
            Self::NoSummary { .. } => {
                Some("Run 'crazybuild build release' first; only Release builds are analyzed".to_string())
            }
            Self::UnknownAsset { .. } => Some(
                "Run 'crazybuild analyze' to list the assets with pending fixes".to_string(),
            ),
            Self::Io { context, .. } => Some(format!(
                "Check file permissions and that {} is accessible",
                context
            )),
            Self::Pipeline(PipelineError::NoScenesConfigured) => Some(
                "Add an enabled [[scenes]] entry to .crazybuild.toml".to_string(),
            ),
            Self::Pipeline(PipelineError::ToolchainFailure { .. }) => {
                Some("Check the build errors above and fix them in the project".to_string())
            }
            Self::Pipeline(PipelineError::UnexpectedFault { .. }) => Some(
                "Player settings were restored; re-run with RUST_LOG=debug for details"
                    .to_string(),
            ),
            Self::Analyzer(_) => None,
        }
    }

    /// Get documentation URL for this error.
    pub fn docs_url(&self) -> Option<&str> {
        match self {
            Self::ToolchainMissing { .. } | Self::ToolchainNotConfigured => Some(DOCS_URL),
            Self::NoSummary { .. } | Self::UnknownAsset { .. } => Some(EXPORT_TIPS_URL),
            Self::Pipeline(PipelineError::NoScenesConfigured) => Some(DOCS_URL),
            _ => None,
        }
    }

    /// Get appropriate exit code for this error.
    ///
    /// Follows sysexits.h conventions.
    ///
    /// # Examples
    ///
    /// ```
    /// use crazybuild::error::CrazyBuildError;
    /// use crazybuild::pipeline::PipelineError;
    ///
    /// let missing = CrazyBuildError::ToolchainMissing {
    ///     command: "unity-build".to_string(),
    /// };
    /// assert_eq!(missing.exit_code(), 127);
    ///
    /// let failed = CrazyBuildError::Pipeline(PipelineError::ToolchainFailure {
    ///     messages: vec!["shader error".to_string()],
    /// });
    /// assert_eq!(failed.exit_code(), 1);
    /// ```
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ToolchainMissing { .. } => 127, // Command not found
            Self::ToolchainNotConfigured => 78,   // EX_CONFIG
            Self::ConfigInvalid { .. } => 78,     // EX_CONFIG
            Self::NoSummary { .. } => 66,         // EX_NOINPUT
            Self::UnknownAsset { .. } => 64,      // EX_USAGE
            Self::Io { .. } => 74,                // EX_IOERR
            Self::Pipeline(PipelineError::NoScenesConfigured) => 78,
            Self::Pipeline(PipelineError::ToolchainFailure { .. }) => 1,
            Self::Pipeline(PipelineError::UnexpectedFault { .. }) => 70, // EX_SOFTWARE
            Self::Analyzer(_) => 65, // EX_DATAERR
        }
    }

    /// Returns the pipeline error if this is a `Pipeline` variant.
    pub fn as_pipeline_error(&self) -> Option<&PipelineError> {
        match self {
            Self::Pipeline(e) => Some(e),
            _ => None,
        }
    }
}

/// Error formatter with colors and structured output
pub struct ErrorFormatter;

impl ErrorFormatter {
    /// Format error with suggestions and documentation links
    pub fn format(error: &anyhow::Error) -> String {
        use console::style;

        let mut output = String::new();

        output.push_str(&format!("{} {}\n", style("error:").red().bold(), error));

        // Causes already spelled out in the line above are not repeated
        let mut shown = error.to_string();
        let mut source = error.source();
        let mut indent = 1;
        while let Some(err) = source {
            let message = err.to_string();
            if !shown.contains(&message) {
                output.push_str(&format!(
                    "{}{} {}\n",
                    "  ".repeat(indent),
                    style("caused by:").yellow(),
                    message
                ));
                indent += 1;
            }
            shown = message;
            source = err.source();
        }

        if let Some(cb_error) = error.downcast_ref::<CrazyBuildError>() {
            if let Some(suggestion) = cb_error.suggestion() {
                output.push_str(&format!(
                    "\n{} {}\n",
                    style("help:").cyan().bold(),
                    suggestion
                ));
            }

            if let Some(docs) = cb_error.docs_url() {
                output.push_str(&format!("{} {}\n", style("docs:").blue(), docs));
            }
        }

        output
    }

    /// Get exit code from error
    pub fn exit_code(error: &anyhow::Error) -> i32 {
        error
            .downcast_ref::<CrazyBuildError>()
            .map(CrazyBuildError::exit_code)
            .unwrap_or(1)
    }
}
