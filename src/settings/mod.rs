//! Build settings: keys, snapshot/restore and the per-variant optimization plan

pub mod keys;
pub mod planner;
pub mod snapshot;

pub use keys::{
    bool_value, CodeOptimization, CompressionFormat, DebugSymbolMode, ExceptionSupport,
    Il2CppCodeGeneration, SettingKey, TextureSubtarget,
};
pub use planner::{BuildPlan, ConfigurationOption, OptimizationPlanner};
pub use snapshot::{RestoreFailure, RestoreReport, SettingsSnapshot, SnapshotGuard};
