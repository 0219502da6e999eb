//! Analyzer report formatting
//!
//! Console and JSON output for [`AnalyzerReport`].

use chrono::{DateTime, Local};
use console::style;

use super::listing::PackagedFileFilter;
use super::types::{AnalyzerReport, AudioIssue, TextureIssue, WarningSeverity};
use crate::fmt::{emoji, format_bytes, CHART, CROSSMARK, INFO, MICROSCOPE, SPARKLES, WARNING};

const EXPORT_TIPS_URL: &str = "https://docs.crazygames.com/resources/export-tips/";
const ADDRESSABLES_URL: &str = "https://docs.crazygames.com/resources/unity-addressables-guide/";

/// Build date of the summary in local time, or the raw string when it does not parse
pub fn format_build_date(iso: &str) -> String {
    DateTime::parse_from_rfc3339(iso)
        .map(|d| {
            d.with_timezone(&Local)
                .format("%Y-%m-%d %H:%M:%S")
                .to_string()
        })
        .unwrap_or_else(|_| iso.to_string())
}

/// `MMm:SSs`
pub fn format_duration(seconds: f64) -> String {
    let total = seconds.max(0.0) as u64;
    format!("{:02}m:{:02}s", total / 60, total % 60)
}

fn section(title: &str, count: usize) {
    println!();
    println!("{} ({})", style(title).bold(), count);
}

/// Print the report to the console
pub fn print_analyzer_report(report: &AnalyzerReport, filter: PackagedFileFilter) {
    let summary = &report.summary;
    println!();
    println!("{} {}", emoji(CHART), style("Last build info").bold());
    println!("{}", style("━".repeat(50)).dim());
    println!("   Date:              {}", format_build_date(&summary.build_date_iso));
    println!("   Duration:          {}", format_duration(summary.duration_seconds));
    println!("   Total size:        {}", format_bytes(summary.total_size));
    println!("   Initial load size: {}", format_bytes(summary.initial_load_size));
    if let Some(warning) = report.size_warning {
        match warning.severity() {
            WarningSeverity::Error => {
                println!("   {} {}", emoji(CROSSMARK), style(warning.message()).red().bold())
            }
            WarningSeverity::Warning => {
                println!("   {} {}", emoji(WARNING), style(warning.message()).yellow())
            }
        }
    }

    println!();
    println!("{} {}", emoji(MICROSCOPE), style("Build analysis").bold());

    let files = filter.apply(&summary.packaged_files);
    section("Packaged assets", files.len());
    for file in files {
        println!("   {:>8} KB  {}", file.size / 1024, style(&file.path).cyan());
    }

    section("Texture size", report.textures.len());
    for texture in &report.textures {
        println!(
            "   {}  Size: {}x{}   Imported size: {}",
            style(&texture.path).cyan(),
            texture.width,
            texture.height,
            texture.imported_size
        );
        if texture.issues.contains(&TextureIssue::ReduceSize) {
            println!(
                "      → {}",
                style(format!(
                    "crazybuild fix texture-size {} --size 1024|512",
                    texture.path
                ))
                .yellow()
            );
        }
    }

    section("Audio", report.audio.len());
    for audio in &report.audio {
        println!("   {} {:.2}s", style(&audio.path).cyan(), audio.length);
        for issue in &audio.issues {
            let kind = match issue {
                AudioIssue::ForceToMono => "mono",
                AudioIssue::ReduceQuality => "quality",
            };
            println!(
                "      → {}",
                style(format!("crazybuild fix {} {}", kind, audio.path)).yellow()
            );
        }
    }

    print_path_list(
        "Assets in \"Resources\" folders",
        &report.resources,
        None,
    );
    print_path_list("R/W Textures", &report.read_write_textures, Some("texture-rw"));
    print_path_list("Mipmap Textures", &report.mipmap_textures, Some("mipmaps"));
    print_path_list("R/W Meshes", &report.read_write_meshes, Some("mesh-rw"));

    print_other(report);

    println!();
    if report.pending_fixes() == 0 && report.size_warning.is_none() {
        println!("{} No pending suggestions", SPARKLES);
    } else {
        println!(
            "{} {} pending fix(es)",
            emoji(INFO),
            style(report.pending_fixes()).bold()
        );
    }
}

fn print_path_list(title: &str, paths: &[String], fix: Option<&str>) {
    section(title, paths.len());
    for path in paths {
        match fix {
            Some(kind) => println!(
                "   {}  {}",
                style(path).cyan(),
                style(format!("(crazybuild fix {} {})", kind, path)).dim()
            ),
            None => println!("   {}", style(path).cyan()),
        }
    }
}

fn print_other(report: &AnalyzerReport) {
    let advisories = &report.advisories;
    println!();
    println!("{}", style("Other").bold());
    if advisories.post_processing {
        print_advisory(
            "Post-processing",
            "The project uses a scriptable render pipeline. If you are not using post-processing, consider disabling it to reduce build size.",
            Some(EXPORT_TIPS_URL),
        );
    }
    if advisories.addressables {
        print_advisory(
            "Addressables",
            "The Addressables package is not used in the project. Using Addressables can drastically reduce the initial load size.",
            Some(ADDRESSABLES_URL),
        );
    }
    if advisories.anti_aliasing {
        print_advisory(
            "Anti-aliasing",
            "Your project has a high anti-aliasing level. To improve performance, consider reducing it to 2x or disabling it if not needed.",
            None,
        );
    }
    if advisories.physics_timestep {
        print_advisory(
            "Physics timestep",
            &format!(
                "Your physics timestep {} is lower than the engine default {}. Consider increasing it to the default value or higher.",
                advisories.fixed_timestep,
                crate::host::probe::DEFAULT_FIXED_TIMESTEP
            ),
            None,
        );
    }
    if advisories.code_analysis_unavailable {
        print_advisory(
            "Code analysis unavailable",
            "Install Project Auditor to get code analysis.",
            None,
        );
    }
    if !report.scenes_with_missing_scripts.is_empty() {
        println!("   {} {}", emoji(WARNING), style("Missing scripts").bold());
        for (scene, objects) in &report.scenes_with_missing_scripts {
            println!("      Scene: {}", style(scene).bold());
            for object in objects {
                println!("        - {}", object);
            }
        }
    }
}

fn print_advisory(title: &str, text: &str, docs: Option<&str>) {
    println!("   {} {}", emoji(INFO), style(title).bold());
    println!("      {}", text);
    if let Some(url) = docs {
        println!("      {}", style(url).blue().underlined());
    }
}

/// Print the report as pretty JSON
pub fn print_json_report(report: &AnalyzerReport) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(report)?;
    println!("{}", json);
    Ok(())
}
