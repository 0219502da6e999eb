//! Analyze command implementation
//!
//! Reads the summary of the last Release build and prints optimization suggestions.

use anyhow::Result;
use console::style;
use indicatif::ProgressBar;
use std::path::Path;
use std::time::Duration;

use crate::analyzer::{print_analyzer_report, print_json_report, PackagedFileFilter};
use crate::cmd::workflow::ProjectContext;
use crate::error::CrazyBuildError;
use crate::fmt::{emoji, MICROSCOPE};

/// Analyze the last Release build
///
/// `json` prints the full report as JSON instead of the console listing; the packaged-file
/// filter only applies to the console listing.
///
/// # Examples
///
/// ```no_run
/// use crazybuild::analyzer::PackagedFileFilter;
/// use crazybuild::cmd::analyze::cmd_analyze;
/// use std::path::Path;
///
/// cmd_analyze(Path::new("."), false, PackagedFileFilter::default())?;
/// # Ok::<(), anyhow::Error>(())
/// ```
pub fn cmd_analyze(project_root: &Path, json: bool, filter: PackagedFileFilter) -> Result<()> {
    let context = ProjectContext::load(project_root)?;

    if json {
        let importer = context.importer().map_err(CrazyBuildError::from)?;
        let report = context
            .analyze_with(&importer)
            .map_err(CrazyBuildError::from)?;
        return print_json_report(&report);
    }

    println!(
        "{} {} Build analysis",
        emoji(MICROSCOPE),
        style("crazybuild").bold()
    );

    let spinner = ProgressBar::new_spinner();
    spinner.set_message("Reading import settings");
    spinner.enable_steady_tick(Duration::from_millis(100));
    let outcome = context
        .importer()
        .and_then(|importer| context.analyze_with(&importer));
    spinner.finish_and_clear();

    let report = outcome.map_err(CrazyBuildError::from)?;
    print_analyzer_report(&report, filter);
    Ok(())
}

/// Packaged-file filter from the `--all-assets` and `--include-small` flags
pub fn listing_filter(all_assets: bool, include_small: bool) -> PackagedFileFilter {
    PackagedFileFilter {
        exclude_small: !include_small,
        assets_only: !all_assets,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_listing_filter_flags() {
        assert_eq!(listing_filter(false, false), PackagedFileFilter::default());
        assert_eq!(listing_filter(true, true), PackagedFileFilter::ALL);
        assert!(!listing_filter(true, false).assets_only);
        assert!(listing_filter(true, false).exclude_small);
    }

    #[test]
    fn test_analyze_without_build_reports_missing_summary() {
        let temp = TempDir::new().unwrap();

        let err = cmd_analyze(temp.path(), true, PackagedFileFilter::default()).unwrap_err();

        assert!(matches!(
            err.downcast_ref::<CrazyBuildError>(),
            Some(CrazyBuildError::NoSummary { .. })
        ));
    }
}
