#![warn(missing_docs)]
#![warn(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

//! crazybuild library
//!
//! Orchestrates WebGL Release and Development builds through an external toolchain,
//! restores the player settings it changed, produces the secondary artifacts a web game
//! portal expects, writes a build report and analyzes the result for import-setting
//! optimizations. Everything the CLI does can be driven programmatically.
//!
//! # Basic Example
//!
//! Planning the settings of a Release build against an in-memory store:
//!
//! ```
//! use crazybuild::host::MemorySettingsStore;
//! use crazybuild::pipeline::BuildVariant;
//! use crazybuild::settings::{OptimizationPlanner, SettingsSnapshot};
//!
//! let store = MemorySettingsStore::with_engine_defaults();
//! let snapshot = SettingsSnapshot::capture(&store).unwrap();
//!
//! let plan = OptimizationPlanner::plan(BuildVariant::Release, &snapshot);
//! assert!(!plan.optimizations.is_empty());
//! ```
//!
//! # Advanced Example: Analyzing a build
//!
//! ```
//! use crazybuild::analyzer::Analyzer;
//! use crazybuild::host::{AudioImport, ImportSettings, MemoryAssetCatalog, ProjectProfile};
//! use crazybuild::report::{BuildReportSummary, PackagedFileSummary};
//!
//! let catalog = MemoryAssetCatalog::new();
//! catalog.insert(
//!     "Assets/Audio/theme.ogg",
//!     ImportSettings::Audio(AudioImport {
//!         length_seconds: 95.0,
//!         force_to_mono: false,
//!         quality: 1.0,
//!     }),
//! );
//! let summary = BuildReportSummary {
//!     packaged_files: vec![PackagedFileSummary {
//!         path: "Assets/Audio/theme.ogg".to_string(),
//!         size: 2_400_000,
//!     }],
//!     build_date_iso: "2024-05-01T10:00:00+00:00".to_string(),
//!     duration_seconds: 120.0,
//!     total_size: 30_000_000,
//!     initial_load_size: 12_000_000,
//! };
//!
//! let report = Analyzer::new(&catalog, &ProjectProfile::default()).analyze(&summary);
//! assert_eq!(report.audio.len(), 1);
//! assert_eq!(report.pending_fixes(), 2);
//! ```

/// Build analysis and suggested fixes
pub mod analyzer;
/// Command handlers for CLI operations
pub mod cmd;
/// `.crazybuild.toml` loading and validation
pub mod config;
/// Top-level error types with contextual suggestions
pub mod error;
/// Shared formatting utilities
pub mod fmt;
/// Narrow traits for every external capability
pub mod host;
/// Infrastructure traits for filesystem and command execution
pub mod infra;
/// Build pipeline orchestration
pub mod pipeline;
/// Build report and persisted summary
pub mod report;
/// Player settings snapshot and optimization planning
pub mod settings;
