//! Configuration validation
//!
//! Checks that cannot be expressed in the serde model: value ranges, and settings that are
//! only required for some commands.

use super::file::ConfigFile;

/// Validation severity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ValidationSeverity {
    /// Informational message
    Info,
    /// Should be addressed but not blocking
    Warning,
    /// Must be fixed
    Error,
}

impl ValidationSeverity {
    /// Convert to string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            ValidationSeverity::Info => "INFO",
            ValidationSeverity::Warning => "WARNING",
            ValidationSeverity::Error => "ERROR",
        }
    }
}

/// A validation issue found in configuration
///
/// # Examples
///
/// ```
/// use crazybuild::config::validator::{ValidationIssue, ValidationSeverity};
///
/// let issue = ValidationIssue::error("toolchain.command", "No build command configured")
///     .with_suggestion("Set [toolchain] command in .crazybuild.toml");
/// assert_eq!(issue.severity, ValidationSeverity::Error);
/// assert!(issue.suggestion.is_some());
/// ```
#[derive(Debug, Clone)]
pub struct ValidationIssue {
    /// Severity level
    pub severity: ValidationSeverity,
    /// Dotted field path, e.g. `project.fixed_timestep`
    pub field: String,
    /// Description of the issue
    pub message: String,
    /// Suggested fix
    pub suggestion: Option<String>,
}

impl ValidationIssue {
    /// Create a new validation issue
    pub fn new(
        severity: ValidationSeverity,
        field: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            severity,
            field: field.into(),
            message: message.into(),
            suggestion: None,
        }
    }

    /// Add a suggestion
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Create an error issue
    pub fn error(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ValidationSeverity::Error, field, message)
    }

    /// Create a warning issue
    pub fn warning(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ValidationSeverity::Warning, field, message)
    }

    /// Create an info issue
    pub fn info(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ValidationSeverity::Info, field, message)
    }
}

/// Result of configuration validation
#[derive(Debug, Clone)]
pub struct ValidationResult {
    /// Whether validation passed (no errors)
    pub valid: bool,
    /// Issues found during validation
    pub issues: Vec<ValidationIssue>,
}

impl ValidationResult {
    /// Create a successful validation result
    pub fn success() -> Self {
        Self {
            valid: true,
            issues: Vec::new(),
        }
    }

    /// Add an issue
    pub fn add_issue(&mut self, issue: ValidationIssue) {
        if issue.severity == ValidationSeverity::Error {
            self.valid = false;
        }
        self.issues.push(issue);
    }

    /// Check if there are any errors
    pub fn has_errors(&self) -> bool {
        !self.valid
    }

    /// Get only errors
    pub fn errors(&self) -> Vec<&ValidationIssue> {
        self.by_severity(ValidationSeverity::Error)
    }

    /// Get only warnings
    pub fn warnings(&self) -> Vec<&ValidationIssue> {
        self.by_severity(ValidationSeverity::Warning)
    }

    fn by_severity(&self, severity: ValidationSeverity) -> Vec<&ValidationIssue> {
        self.issues
            .iter()
            .filter(|i| i.severity == severity)
            .collect()
    }
}

/// Validate `config`.
///
/// `for_build` adds the checks that only matter when a build is about to run: a toolchain
/// command and at least one enabled scene.
pub fn validate(config: &ConfigFile, for_build: bool) -> ValidationResult {
    let mut result = ValidationResult::success();
    let project = &config.project;

    if project.fixed_timestep.is_nan() || project.fixed_timestep <= 0.0 {
        result.add_issue(
            ValidationIssue::error(
                "project.fixed_timestep",
                format!("must be positive, got {}", project.fixed_timestep),
            )
            .with_suggestion("Use the engine default of 0.02"),
        );
    }

    if !matches!(project.msaa_sample_count, 1 | 2 | 4 | 8) {
        result.add_issue(ValidationIssue::warning(
            "project.msaa_sample_count",
            format!(
                "{} is not a supported sample count (1, 2, 4 or 8)",
                project.msaa_sample_count
            ),
        ));
    }

    if config.build.output_root.trim().is_empty() {
        result.add_issue(ValidationIssue::error("build.output_root", "must not be empty"));
    }

    if !for_build {
        return result;
    }

    if config.toolchain.command.trim().is_empty() {
        result.add_issue(
            ValidationIssue::error("toolchain.command", "no build command configured")
                .with_suggestion("Set [toolchain] command in .crazybuild.toml"),
        );
    }

    if !config.scenes.iter().any(|s| s.enabled) {
        result.add_issue(
            ValidationIssue::warning("scenes", "no enabled scenes in the build list")
                .with_suggestion("Add a [[scenes]] entry with the path of your first scene"),
        );
    }

    result
}
