//! Build variants and their fixed properties

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::host::BuildOptions;

/// Which flavor of player to build
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
pub enum BuildVariant {
    /// Debuggable build, fast iteration
    Development,
    /// Portal submission build
    Release,
}

impl BuildVariant {
    /// Output folder name under the output root
    pub fn output_folder(&self) -> &'static str {
        match self {
            Self::Development => "CrazyGamesDevelopment",
            Self::Release => "CrazyGamesRelease",
        }
    }

    /// Toolchain flags for the primary build
    pub fn toolchain_options(&self) -> BuildOptions {
        match self {
            Self::Development => BuildOptions {
                development: true,
                auto_run: true,
                clean_build_cache: false,
            },
            Self::Release => BuildOptions {
                development: false,
                auto_run: true,
                clean_build_cache: true,
            },
        }
    }

    /// Name used in reports
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Development => "Development",
            Self::Release => "Release",
        }
    }
}

impl fmt::Display for BuildVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Extra options chosen alongside the variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdditionalBuildOptions {
    /// Produce memory-capped wasm variants for mobile browsers
    pub supports_mobile: bool,
}
