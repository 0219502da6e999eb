//! Common test utilities and helpers
//!
//! - [`fixtures::GameProject`] lays out a project root with config, import manifest and
//!   persisted summary
//! - [`fixtures::FakeToolchain`] writes a realistic WebGL output tree instead of building
//!
//! # Usage
//!
//! ```rust,no_run
//! mod common;
//! use common::fixtures::{FakeToolchain, GameProject};
//!
//! let project = GameProject::new().with_scenes(&["Assets/Scenes/Main.unity"]);
//! let toolchain = FakeToolchain::new();
//! ```

pub mod fixtures;

/// Check if running in CI environment
#[allow(dead_code)]
pub fn is_ci() -> bool {
    std::env::var("CI").is_ok() || std::env::var("GITHUB_ACTIONS").is_ok()
}
