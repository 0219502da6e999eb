//! Build result formatting and display

use console::style;

use super::executor::BuildResult;
use super::secondary::SecondaryPass;
use super::variant::BuildVariant;
use crate::fmt::{emoji, format_bytes, CHART, CROSSMARK, SPARKLES, WARNING};

/// Formats and displays build results
pub struct ResultFormatter;

impl ResultFormatter {
    /// Lines describing `result`, without styling
    pub fn summary_lines(result: &BuildResult) -> Vec<String> {
        let mut lines = vec![
            format!("Variant:  {}", result.variant),
            format!("Output:   {}", result.output_path.display()),
            format!("Size:     {}", format_bytes(result.total_size)),
            format!("Duration: {:.1}s", result.duration.as_secs_f64()),
            format!("Settings: {} changed for this build", result.optimizations.len()),
        ];
        for (pass, name) in result.secondary.iter() {
            lines.push(format!("{} build: {}", pass, name));
        }
        if let Some(path) = &result.report_path {
            lines.push(format!("Report:   {}", path.display()));
        }
        if let Some(path) = &result.summary_path {
            lines.push(format!("Summary:  {}", path.display()));
        }
        lines
    }

    /// Secondary passes that were attempted for `result` but produced nothing
    pub fn missing_secondary(result: &BuildResult, supports_mobile: bool) -> Vec<SecondaryPass> {
        if result.variant == BuildVariant::Development {
            return Vec::new();
        }
        SecondaryPass::for_release(supports_mobile)
            .into_iter()
            .filter(|pass| result.secondary.get(*pass).is_none())
            .collect()
    }

    /// Print a formatted summary of a finished build
    pub fn print_summary(result: &BuildResult, supports_mobile: bool) {
        println!("\n{} {}", emoji(CHART), style("Build Summary").bold());
        for line in Self::summary_lines(result) {
            println!("   {} {}", style("→").dim(), line);
        }
        for pass in Self::missing_secondary(result, supports_mobile) {
            println!(
                "   {} {} build unavailable",
                emoji(WARNING),
                style(pass.to_string()).yellow()
            );
        }
        for failure in &result.restore.failures {
            println!(
                "   {} Setting {} was not restored: {}",
                emoji(CROSSMARK),
                style(failure.key.as_str()).red(),
                failure.message
            );
        }

        println!(
            "\n{} {} Build complete!",
            emoji(SPARKLES),
            style("Success!").green().bold()
        );
    }

    /// Print the messages of a failed toolchain run
    pub fn print_failure(messages: &[String]) {
        println!("\n{} {}", emoji(CROSSMARK), style("Build failed").red().bold());
        for message in messages {
            println!("   {} {}", style("→").dim(), message);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::SecondaryArtifacts;
    use crate::settings::RestoreReport;
    use std::path::PathBuf;
    use std::time::Duration;

    fn result(variant: BuildVariant) -> BuildResult {
        BuildResult {
            variant,
            output_path: PathBuf::from("Builds/CrazyGamesRelease"),
            duration: Duration::from_millis(1500),
            optimizations: Vec::new(),
            secondary: SecondaryArtifacts::default(),
            report_path: None,
            summary_path: None,
            restore: RestoreReport::default(),
            total_size: 2 * 1024 * 1024,
        }
    }

    #[test]
    fn test_summary_lines_include_size_and_secondary_artifacts() {
        let mut release = result(BuildVariant::Release);
        release
            .secondary
            .set(SecondaryPass::AstcData, Some("astc_Game.data.br".to_string()));
        release.report_path = Some(PathBuf::from("Builds/CrazyGamesRelease/report.json"));

        let lines = ResultFormatter::summary_lines(&release);

        assert!(lines.contains(&"Size:     2.00 MB".to_string()));
        assert!(lines.contains(&"ASTC build: astc_Game.data.br".to_string()));
        assert!(lines.iter().any(|l| l.starts_with("Report:")));
        assert!(!lines.iter().any(|l| l.starts_with("Summary:")));
    }

    #[test]
    fn test_missing_secondary_lists_failed_passes() {
        let mut release = result(BuildVariant::Release);
        release.report_path = Some(PathBuf::from("report.json"));
        release
            .secondary
            .set(SecondaryPass::MaxMemory512, Some("max_512mb_Game.wasm.br".to_string()));

        assert_eq!(
            ResultFormatter::missing_secondary(&release, true),
            vec![SecondaryPass::AstcData, SecondaryPass::MaxMemory1024]
        );
    }

    #[test]
    fn test_development_has_no_missing_secondary() {
        assert!(ResultFormatter::missing_secondary(&result(BuildVariant::Development), true)
            .is_empty());
    }

    #[test]
    fn test_print_does_not_panic() {
        ResultFormatter::print_summary(&result(BuildVariant::Release), false);
        ResultFormatter::print_failure(&["error CS1002".to_string()]);
    }
}
