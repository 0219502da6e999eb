//! `.crazybuild.toml` configuration
//!
//! This module provides:
//! - the config file model with defaults for every field
//! - loading, validation and the `init` template

pub mod file;
pub mod loader;
pub mod template;
pub mod validator;

pub use file::{
    BuildSection, ConfigFile, HostSection, ProjectSection, ToolchainSection, CONFIG_FILE_NAME,
};
pub use loader::ConfigLoader;
pub use template::DEFAULT_CONFIG_TEMPLATE;
pub use validator::{validate, ValidationIssue, ValidationResult, ValidationSeverity};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_file_name_constant_is_correct() {
        assert_eq!(CONFIG_FILE_NAME, ".crazybuild.toml");
    }
}
