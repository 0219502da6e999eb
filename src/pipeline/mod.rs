//! Build pipeline
//!
//! A build goes through these steps:
//! 1. snapshot the global player settings and apply the variant's optimization plan
//! 2. run the external toolchain for the primary WebGL build
//! 3. for Release builds, run the secondary passes (ASTC data, capped-memory wasm)
//! 4. write the portal build report and persist the build summary
//! 5. restore the snapshot, whatever happened above

pub mod config;
pub mod error;
pub mod executor;
pub mod result_formatter;
pub mod secondary;
pub mod telemetry;
pub mod variant;

pub use config::{PipelineConfig, SceneEntry};
pub use error::PipelineError;
pub use executor::{BuildExecutor, BuildResult};
pub use result_formatter::ResultFormatter;
pub use secondary::{
    intermediate_path, SecondaryArtifacts, SecondaryBuildRunner, SecondaryPass,
    INTERMEDIATE_BUILD_SUFFIX,
};
pub use telemetry::{
    BuildEvent, BuildObserver, BuildState, LogObserver, MemoryObserver, ObserverRegistry,
};
pub use variant::{AdditionalBuildOptions, BuildVariant};
