//! Build command implementation
//!
//! Thin presentation layer for the build command.
//! Business logic lives in `workflow::BuildWorkflow`.

use anyhow::Result;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use crate::analyzer::{print_analyzer_report, AnalyzerError, PackagedFileFilter};
use crate::cmd::workflow::{BuildWorkflow, ProjectContext};
use crate::fmt::{emoji, HAMMER, ROCKET, WRENCH};
use crate::pipeline::{
    BuildEvent, BuildObserver, BuildResult, BuildState, BuildVariant, LogObserver, PipelineError,
    ResultFormatter,
};

/// Spinner following the executor through a build
pub struct ProgressObserver {
    spinner: ProgressBar,
}

impl ProgressObserver {
    /// Start a spinner for a `variant` build
    pub fn start(variant: BuildVariant) -> Self {
        let spinner = ProgressBar::new_spinner();
        if let Ok(progress_style) = ProgressStyle::with_template("{spinner:.cyan} {msg}") {
            spinner.set_style(progress_style.tick_strings(&["◐", "◓", "◑", "◒", "●"]));
        }
        spinner.set_message(format!("Preparing {} build", variant));
        spinner.enable_steady_tick(Duration::from_millis(100));
        Self { spinner }
    }

    /// Stop the spinner and clear its line
    pub fn finish(&self) {
        self.spinner.finish_and_clear();
    }
}

impl BuildObserver for ProgressObserver {
    fn name(&self) -> &str {
        "progress"
    }

    fn on_event(&self, event: &BuildEvent) {
        match event {
            BuildEvent::StateChanged { variant, state } => {
                let message = match state {
                    BuildState::ConfigApplied => format!("{} settings applied", variant),
                    BuildState::Building => format!("Building {} player", variant),
                    BuildState::Succeeded => format!("{} player built", variant),
                    BuildState::Failed => format!("{} build failed", variant),
                    BuildState::Idle => return,
                };
                self.spinner.set_message(message);
            }
            BuildEvent::ConfigurationApplied { optimizations } => {
                self.spinner.println(format!(
                    "{} Applied {} build setting(s)",
                    emoji(WRENCH),
                    optimizations
                ));
            }
            BuildEvent::SecondaryPassFinished { pass, .. } => {
                self.spinner
                    .set_message(format!("{} pass finished", pass));
            }
            BuildEvent::ReportWritten { .. } => {
                self.spinner.set_message("Build report written");
            }
            BuildEvent::SummaryWritten { .. } => {
                self.spinner.set_message("Build summary saved");
            }
            BuildEvent::ConfigurationRestored { .. } => {
                self.spinner.set_message("Player settings restored");
            }
        }
    }
}

/// Main build command handler (presentation layer)
///
/// # Examples
///
/// ```no_run
/// use crazybuild::cmd::build::cmd_build;
/// use crazybuild::pipeline::BuildVariant;
/// use std::path::Path;
///
/// // Release build for desktop and mobile, analysis printed afterwards
/// cmd_build(Path::new("."), BuildVariant::Release, true, false)?;
/// # Ok::<(), anyhow::Error>(())
/// ```
pub fn cmd_build(
    project_root: &Path,
    variant: BuildVariant,
    mobile: bool,
    no_analyze: bool,
) -> Result<()> {
    println!(
        "{} {} {} build",
        emoji(ROCKET),
        style("crazybuild").bold(),
        variant
    );
    println!();

    let context = ProjectContext::load(project_root)?;
    let supports_mobile = mobile || context.config().build.supports_mobile;
    let progress = Arc::new(ProgressObserver::start(variant));

    let observers: Vec<Arc<dyn BuildObserver>> = vec![Arc::new(LogObserver), progress.clone()];
    let outcome = BuildWorkflow::new(&context).execute(variant, supports_mobile, observers);
    progress.finish();

    let result = match outcome {
        Ok(result) => result,
        Err(e) => {
            if let Some(PipelineError::ToolchainFailure { messages }) = e
                .downcast_ref::<crate::error::CrazyBuildError>()
                .and_then(|err| err.as_pipeline_error())
            {
                ResultFormatter::print_failure(messages);
            }
            return Err(e);
        }
    };

    ResultFormatter::print_summary(&result, supports_mobile);

    if should_analyze(&result, context.config().build.analyze_after_build, no_analyze) {
        present_analysis(&context)?;
    }

    Ok(())
}

fn should_analyze(result: &BuildResult, analyze_after_build: bool, no_analyze: bool) -> bool {
    result.variant == BuildVariant::Release
        && result.summary_path.is_some()
        && analyze_after_build
        && !no_analyze
}

fn present_analysis(context: &ProjectContext) -> Result<()> {
    println!();
    println!("{} Analyzing build", emoji(HAMMER));
    let importer = context.importer()?;
    match context.analyze_with(&importer) {
        Ok(report) => {
            print_analyzer_report(&report, PackagedFileFilter::default());
            Ok(())
        }
        Err(AnalyzerError::NoSummary(path)) => {
            log::warn!("Summary missing at {} after build", path.display());
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::SecondaryArtifacts;
    use crate::settings::RestoreReport;
    use std::path::PathBuf;

    fn result(variant: BuildVariant, summary: bool) -> BuildResult {
        BuildResult {
            variant,
            output_path: PathBuf::from("Builds/CrazyGamesRelease"),
            duration: Duration::from_secs(3),
            optimizations: Vec::new(),
            secondary: SecondaryArtifacts::default(),
            report_path: None,
            summary_path: summary.then(|| PathBuf::from("Library/summary.json")),
            restore: RestoreReport::default(),
            total_size: 0,
        }
    }

    #[test]
    fn test_analysis_only_after_summarized_release() {
        assert!(should_analyze(&result(BuildVariant::Release, true), true, false));
        assert!(!should_analyze(&result(BuildVariant::Release, false), true, false));
        assert!(!should_analyze(&result(BuildVariant::Development, true), true, false));
    }

    #[test]
    fn test_analysis_can_be_disabled() {
        assert!(!should_analyze(&result(BuildVariant::Release, true), false, false));
        assert!(!should_analyze(&result(BuildVariant::Release, true), true, true));
    }

    #[test]
    fn test_progress_observer_accepts_every_event() {
        let observer = ProgressObserver::start(BuildVariant::Release);
        for state in [
            BuildState::ConfigApplied,
            BuildState::Building,
            BuildState::Succeeded,
            BuildState::Failed,
            BuildState::Idle,
        ] {
            observer.on_event(&BuildEvent::StateChanged {
                variant: BuildVariant::Release,
                state,
            });
        }
        observer.on_event(&BuildEvent::ConfigurationApplied { optimizations: 12 });
        observer.finish();
    }
}
