//! Per-variant optimization policy
//!
//! The planner is a pure function from a variant and the captured initial settings to the
//! list of writes the build needs, plus an audit record of every planned value.

use serde::{Deserialize, Serialize};

use super::keys::{
    bool_value, CodeOptimization, CompressionFormat, DebugSymbolMode, ExceptionSupport,
    Il2CppCodeGeneration, SettingKey, TextureSubtarget,
};
use super::snapshot::SettingsSnapshot;
use crate::host::{SettingsError, SettingsStore};
use crate::pipeline::BuildVariant;

/// One planned setting change, recorded even when the value does not change
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigurationOption {
    /// Setting name
    pub optimization: String,
    /// Value before the build
    pub initial_value: String,
    /// Value used for the build
    pub build_value: String,
}

/// Ordered writes for one build plus their audit records
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildPlan {
    /// Writes in application order
    pub changes: Vec<(SettingKey, String)>,
    /// Audit record, same order as `changes`
    pub optimizations: Vec<ConfigurationOption>,
}

impl BuildPlan {
    fn record(&mut self, snapshot: &SettingsSnapshot, key: SettingKey, value: impl Into<String>) {
        let value = value.into();
        self.optimizations.push(ConfigurationOption {
            optimization: key.as_str().to_string(),
            initial_value: snapshot.get(key).unwrap_or_default().to_string(),
            build_value: value.clone(),
        });
        self.changes.push((key, value));
    }

    /// Planned value of `key`, if any
    pub fn value_of(&self, key: SettingKey) -> Option<&str> {
        self.changes
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Write every change in order, stopping at the first failure
    pub fn apply<S: SettingsStore + ?Sized>(&self, store: &S) -> Result<(), SettingsError> {
        for (key, value) in &self.changes {
            log::debug!("Setting {} = {}", key, value);
            store.set(*key, value)?;
        }
        Ok(())
    }
}

/// Produces the [`BuildPlan`] for a variant
pub struct OptimizationPlanner;

impl OptimizationPlanner {
    /// Plan the setting changes for `variant` given the captured initial values
    pub fn plan(variant: BuildVariant, snapshot: &SettingsSnapshot) -> BuildPlan {
        let mut plan = BuildPlan::default();

        plan.record(
            snapshot,
            SettingKey::Il2CppCodeGeneration,
            Il2CppCodeGeneration::OptimizeSize.as_str(),
        );
        plan.record(snapshot, SettingKey::ShowSplashScreen, bool_value(false));
        plan.record(snapshot, SettingKey::ShowUnityLogo, bool_value(false));

        match variant {
            BuildVariant::Development => {
                plan.record(
                    snapshot,
                    SettingKey::CompressionFormat,
                    CompressionFormat::Disabled.as_str(),
                );
                plan.record(
                    snapshot,
                    SettingKey::ExceptionSupport,
                    ExceptionSupport::FullWithStacktrace.as_str(),
                );
                plan.record(
                    snapshot,
                    SettingKey::DebugSymbolMode,
                    DebugSymbolMode::External.as_str(),
                );
                plan.record(snapshot, SettingKey::DataCaching, bool_value(false));
                plan.record(snapshot, SettingKey::NameFilesAsHashes, bool_value(false));
                plan.record(snapshot, SettingKey::StripEngineCode, bool_value(false));
                plan.record(
                    snapshot,
                    SettingKey::CodeOptimization,
                    CodeOptimization::BuildTimes.as_str(),
                );
            }
            BuildVariant::Release => {
                plan.record(
                    snapshot,
                    SettingKey::CompressionFormat,
                    CompressionFormat::Brotli.as_str(),
                );
                plan.record(
                    snapshot,
                    SettingKey::ExceptionSupport,
                    release_exception_support(snapshot).as_str(),
                );
                plan.record(
                    snapshot,
                    SettingKey::DebugSymbolMode,
                    DebugSymbolMode::Off.as_str(),
                );
                plan.record(snapshot, SettingKey::DataCaching, bool_value(true));
                plan.record(snapshot, SettingKey::NameFilesAsHashes, bool_value(true));
                plan.record(snapshot, SettingKey::StripEngineCode, bool_value(true));
                plan.record(
                    snapshot,
                    SettingKey::CodeOptimization,
                    CodeOptimization::DiskSizeLto.as_str(),
                );
                plan.record(snapshot, SettingKey::WebAssemblyBigInt, bool_value(true));
                plan.record(snapshot, SettingKey::WebAssemblyTable, bool_value(true));
                plan.record(snapshot, SettingKey::Wasm2023, bool_value(true));
            }
        }

        plan.record(
            snapshot,
            SettingKey::WebGlTextureSubtarget,
            TextureSubtarget::Dxt.as_str(),
        );

        plan
    }
}

/// Release builds narrow exception support but never relax an already stricter mode.
fn release_exception_support(snapshot: &SettingsSnapshot) -> ExceptionSupport {
    let target = ExceptionSupport::ExplicitlyThrownExceptionsOnly;
    match snapshot
        .get(SettingKey::ExceptionSupport)
        .and_then(ExceptionSupport::parse)
    {
        Some(initial) if initial.is_at_least_as_strict_as(target) => initial,
        _ => target,
    }
}
