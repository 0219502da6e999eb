//! Property-based tests for settings planning, restore and summary building

use proptest::prelude::*;
use std::collections::HashMap;

use crazybuild::host::{MemorySettingsStore, PackedAsset, SettingsStore};
use crazybuild::pipeline::BuildVariant;
use crazybuild::report::{classify, dedupe_packed_assets};
use crazybuild::settings::{ExceptionSupport, OptimizationPlanner, SettingKey, SettingsSnapshot};

fn any_key() -> impl Strategy<Value = SettingKey> {
    prop::sample::select(SettingKey::ALL.to_vec())
}

fn any_variant() -> impl Strategy<Value = BuildVariant> {
    prop_oneof![Just(BuildVariant::Development), Just(BuildVariant::Release)]
}

fn any_exception_support() -> impl Strategy<Value = ExceptionSupport> {
    prop_oneof![
        Just(ExceptionSupport::None),
        Just(ExceptionSupport::ExplicitlyThrownExceptionsOnly),
        Just(ExceptionSupport::FullWithoutStacktrace),
        Just(ExceptionSupport::FullWithStacktrace),
    ]
}

/// A value for every key
fn any_settings() -> impl Strategy<Value = Vec<(SettingKey, String)>> {
    prop::collection::vec("[A-Za-z0-9]{1,12}", SettingKey::ALL.len()).prop_map(|values| {
        SettingKey::ALL
            .iter()
            .copied()
            .zip(values)
            .collect::<Vec<_>>()
    })
}

fn values_of(store: &MemorySettingsStore) -> Vec<(SettingKey, String)> {
    SettingKey::ALL
        .iter()
        .map(|key| (*key, store.get(*key).unwrap()))
        .collect()
}

proptest! {
    #[test]
    fn restore_undoes_any_writes(
        initial in any_settings(),
        writes in prop::collection::vec((any_key(), "[a-z]{0,8}"), 0..30),
    ) {
        let store = MemorySettingsStore::with_values(initial.clone());
        let snapshot = SettingsSnapshot::capture(&store).unwrap();

        for (key, value) in &writes {
            store.set(*key, value).unwrap();
        }
        let report = snapshot.restore(&store);

        prop_assert!(report.is_complete());
        prop_assert_eq!(values_of(&store), initial);
    }

    #[test]
    fn planning_is_deterministic_and_records_initial_values(
        initial in any_settings(),
        variant in any_variant(),
    ) {
        let store = MemorySettingsStore::with_values(initial.clone());
        let snapshot = SettingsSnapshot::capture(&store).unwrap();

        let plan = OptimizationPlanner::plan(variant, &snapshot);

        prop_assert_eq!(&plan, &OptimizationPlanner::plan(variant, &snapshot));
        prop_assert!(store.writes().is_empty());
        prop_assert_eq!(plan.changes.len(), plan.optimizations.len());
        let initial: HashMap<&str, &str> = initial
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
            .collect();
        for option in &plan.optimizations {
            prop_assert_eq!(initial[option.optimization.as_str()], option.initial_value.as_str());
        }
    }

    #[test]
    fn release_never_relaxes_exception_support(initial in any_exception_support()) {
        let store = MemorySettingsStore::with_engine_defaults();
        store.set(SettingKey::ExceptionSupport, initial.as_str()).unwrap();
        let snapshot = SettingsSnapshot::capture(&store).unwrap();

        let plan = OptimizationPlanner::plan(BuildVariant::Release, &snapshot);
        let planned = plan
            .value_of(SettingKey::ExceptionSupport)
            .and_then(ExceptionSupport::parse)
            .unwrap();

        prop_assert!(planned.is_at_least_as_strict_as(initial));
        prop_assert!(
            planned.is_at_least_as_strict_as(ExceptionSupport::ExplicitlyThrownExceptionsOnly)
        );
    }

    #[test]
    fn packaged_files_are_unique_and_largest_first(
        assets in prop::collection::vec(
            (prop::sample::select(vec!["", "Assets/a.png", "Assets/b.ogg", "Assets/c.fbx"]), 0u64..10_000),
            0..40,
        ),
    ) {
        let packed: Vec<PackedAsset> = assets
            .iter()
            .map(|(path, size)| PackedAsset {
                source_asset_path: path.to_string(),
                packed_size: *size,
            })
            .collect();

        let files = dedupe_packed_assets(&packed);

        prop_assert!(files.windows(2).all(|pair| pair[0].size >= pair[1].size));
        prop_assert!(files.iter().all(|f| !f.path.is_empty()));
        for file in &files {
            let largest = assets
                .iter()
                .filter(|(path, _)| *path == file.path)
                .map(|(_, size)| *size)
                .max();
            prop_assert_eq!(Some(file.size), largest);
            prop_assert_eq!(files.iter().filter(|f| f.path == file.path).count(), 1);
        }
    }

    #[test]
    fn artifact_classification_ignores_case(
        stem in "[a-zA-Z0-9_]{1,10}",
        suffix in prop::sample::select(vec![".data", ".data.br", ".wasm", ".wasm.br", ".loader.js", ".framework.js.br"]),
    ) {
        let lower = format!("{}{}", stem, suffix);
        let upper = lower.to_ascii_uppercase();
        prop_assert!(classify(&lower).is_some());
        prop_assert_eq!(classify(&lower), classify(&upper));
    }
}
