//! Host bridge
//!
//! Everything the pipeline needs from the outside world goes through one of these narrow
//! traits: the global player settings store, the external build toolchain, per-asset import
//! configuration, global project configuration and decompression of build artifacts. Each
//! trait ships with a real implementation and an in-memory one for tests.

pub mod decompress;
pub mod import;
pub mod probe;
pub mod settings_store;
pub mod toolchain;

pub use decompress::{BrotliDecompressor, Decompressor};
pub use import::{
    AssetImporter, AudioImport, ImportChange, ImportError, ImportSettings, ManifestAssetCatalog,
    MemoryAssetCatalog, ModelImport, TextureImport,
};
pub use probe::{HostCapabilities, ProjectProbe, ProjectProfile};
pub use settings_store::{FileSettingsStore, MemorySettingsStore, SettingsError, SettingsStore};
pub use toolchain::{
    BuildOptions, BuildRequest, BuildStatus, BuildStep, BuildTarget, CommandToolchain,
    MessageSeverity, OutputFile, PackedAsset, StepMessage, Toolchain, ToolchainReport,
};

use thiserror::Error;

/// Errors raised by host collaborators
#[derive(Error, Debug)]
pub enum HostError {
    /// I/O error while talking to the host
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Settings store error
    #[error(transparent)]
    Settings(#[from] SettingsError),

    /// The build toolchain could not be invoked at all
    #[error("toolchain unavailable: {0}")]
    ToolchainUnavailable(String),

    /// The toolchain produced a report that could not be understood
    #[error("malformed toolchain report: {0}")]
    MalformedReport(String),
}
