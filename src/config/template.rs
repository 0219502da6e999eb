//! Default `.crazybuild.toml` written by `crazybuild init`

/// Commented default configuration
pub const DEFAULT_CONFIG_TEMPLATE: &str = r#"# crazybuild configuration

[build]
# Builds land in <output_root>/Release and <output_root>/Development
output_root = "Builds"
# Editor-local cache holding the last Release build summary
cache_dir = "Library"
# Expect ASTC texture builds for mobile browsers
supports_mobile = false
# Print the build analysis after every Release build
analyze_after_build = true

# Build list, in build order
# [[scenes]]
# path = "Assets/Scenes/Main.unity"
# enabled = true

[toolchain]
# Program running one player build, started in the project root. The request is
# passed through CRAZYBUILD_* environment variables; the program may write a JSON
# build report to $CRAZYBUILD_REPORT_PATH.
command = ""
args = []
# engine_version = "2022.3.20f1"

[host]
settings_file = "ProjectSettings/crazybuild-settings.json"
import_manifest = "ProjectSettings/crazybuild-imports.json"

[project]
# render_pipeline = "UniversalRP"
msaa_sample_count = 1
fixed_timestep = 0.02
addressables_installed = false
project_auditor_available = false

# Objects with missing scripts, per scene
[project.missing_scripts]
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::validator::validate;
    use crate::config::ConfigFile;

    #[test]
    fn test_template_parses_to_defaults() {
        let config: ConfigFile = toml_edit::de::from_str(DEFAULT_CONFIG_TEMPLATE).unwrap();
        assert_eq!(config, ConfigFile::default());
    }

    #[test]
    fn test_template_is_valid_for_analysis() {
        let config: ConfigFile = toml_edit::de::from_str(DEFAULT_CONFIG_TEMPLATE).unwrap();
        assert!(validate(&config, false).valid);
    }
}
