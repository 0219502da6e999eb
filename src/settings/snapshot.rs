//! Capture and restore of global build settings
//!
//! [`SettingsSnapshot`] records the values of a fixed key set before a build changes them.
//! [`SnapshotGuard`] ties the restore to scope exit so the store is put back on success,
//! failure, early return and panic unwinding alike.
//!
//! # Examples
//!
//! ```
//! use crazybuild::host::{MemorySettingsStore, SettingsStore};
//! use crazybuild::settings::{SettingKey, SettingsSnapshot};
//!
//! let store = MemorySettingsStore::with_engine_defaults();
//! {
//!     let _guard = SettingsSnapshot::scoped(&store)?;
//!     store.set(SettingKey::CompressionFormat, "Brotli")?;
//! }
//! assert_eq!(store.get(SettingKey::CompressionFormat)?, "Gzip");
//! # Ok::<(), crazybuild::host::SettingsError>(())
//! ```

use serde::Serialize;

use super::keys::SettingKey;
use crate::host::{SettingsError, SettingsStore};

/// Initial values of a set of settings, owned for the duration of one build
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingsSnapshot {
    values: Vec<(SettingKey, String)>,
}

/// A key that could not be written back
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RestoreFailure {
    /// Key whose restore failed
    pub key: SettingKey,
    /// Error reported by the store
    pub message: String,
}

/// Outcome of a restore
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RestoreReport {
    /// Keys written back successfully
    pub restored: Vec<SettingKey>,
    /// Keys that kept their build-time value
    pub failures: Vec<RestoreFailure>,
}

impl RestoreReport {
    /// True when every captured key was written back
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

impl SettingsSnapshot {
    /// Read every key in [`SettingKey::ALL`]
    pub fn capture<S: SettingsStore + ?Sized>(store: &S) -> Result<Self, SettingsError> {
        Self::capture_keys(store, &SettingKey::ALL)
    }

    /// Read only `keys`, in the given order
    pub fn capture_keys<S: SettingsStore + ?Sized>(
        store: &S,
        keys: &[SettingKey],
    ) -> Result<Self, SettingsError> {
        let values = keys
            .iter()
            .map(|&key| store.get(key).map(|value| (key, value)))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { values })
    }

    /// Capture every key and restore automatically when the guard goes out of scope
    pub fn scoped<S: SettingsStore + ?Sized>(
        store: &S,
    ) -> Result<SnapshotGuard<'_, S>, SettingsError> {
        Ok(SnapshotGuard::new(store, Self::capture(store)?))
    }

    /// Captured value of `key`
    pub fn get(&self, key: SettingKey) -> Option<&str> {
        self.values
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Captured keys in capture order
    pub fn keys(&self) -> impl Iterator<Item = SettingKey> + '_ {
        self.values.iter().map(|(k, _)| *k)
    }

    /// Number of captured keys
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True when nothing was captured
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Write every captured value back verbatim.
    ///
    /// Every key is attempted even when an earlier one fails. Failures are logged and
    /// returned in the report, never raised.
    pub fn restore<S: SettingsStore + ?Sized>(&self, store: &S) -> RestoreReport {
        let mut report = RestoreReport::default();
        for (key, value) in &self.values {
            match store.set(*key, value) {
                Ok(()) => report.restored.push(*key),
                Err(e) => {
                    log::warn!("Could not restore setting '{}' to '{}': {}", key, value, e);
                    report.failures.push(RestoreFailure {
                        key: *key,
                        message: e.to_string(),
                    });
                }
            }
        }
        log::debug!(
            "Restored {}/{} settings",
            report.restored.len(),
            self.values.len()
        );
        report
    }
}

/// Restores its snapshot exactly once: explicitly via [`SnapshotGuard::restore`] or on drop
pub struct SnapshotGuard<'a, S: SettingsStore + ?Sized> {
    store: &'a S,
    snapshot: SettingsSnapshot,
    restored: bool,
}

impl<'a, S: SettingsStore + ?Sized> SnapshotGuard<'a, S> {
    /// Guard an existing snapshot
    pub fn new(store: &'a S, snapshot: SettingsSnapshot) -> Self {
        Self {
            store,
            snapshot,
            restored: false,
        }
    }

    /// The guarded snapshot
    pub fn snapshot(&self) -> &SettingsSnapshot {
        &self.snapshot
    }

    /// Restore now and return the report
    pub fn restore(mut self) -> RestoreReport {
        self.restored = true;
        self.snapshot.restore(self.store)
    }
}

impl<S: SettingsStore + ?Sized> Drop for SnapshotGuard<'_, S> {
    fn drop(&mut self) {
        if !self.restored {
            self.restored = true;
            let report = self.snapshot.restore(self.store);
            if !report.is_complete() {
                log::warn!(
                    "{} setting(s) could not be restored during unwind",
                    report.failures.len()
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::MemorySettingsStore;

    #[test]
    fn test_capture_reads_every_key() {
        let store = MemorySettingsStore::with_engine_defaults();
        let snapshot = SettingsSnapshot::capture(&store).unwrap();

        assert_eq!(snapshot.len(), SettingKey::ALL.len());
        assert_eq!(snapshot.get(SettingKey::CompressionFormat), Some("Gzip"));
    }

    #[test]
    fn test_capture_missing_key_fails() {
        let store = MemorySettingsStore::with_values([(SettingKey::DataCaching, "True")]);
        assert!(SettingsSnapshot::capture(&store).is_err());
    }

    #[test]
    fn test_capture_keys_reads_subset_in_order() {
        let store = MemorySettingsStore::with_engine_defaults();
        let snapshot = SettingsSnapshot::capture_keys(
            &store,
            &[SettingKey::MaximumMemorySize, SettingKey::WebGlTextureSubtarget],
        )
        .unwrap();

        let keys: Vec<_> = snapshot.keys().collect();
        assert_eq!(
            keys,
            vec![SettingKey::MaximumMemorySize, SettingKey::WebGlTextureSubtarget]
        );
        assert_eq!(snapshot.get(SettingKey::CompressionFormat), None);
    }

    #[test]
    fn test_restore_writes_back_modified_values() {
        let store = MemorySettingsStore::with_engine_defaults();
        let snapshot = SettingsSnapshot::capture(&store).unwrap();

        store.set(SettingKey::CompressionFormat, "Brotli").unwrap();
        store.set(SettingKey::Wasm2023, "True").unwrap();

        let report = snapshot.restore(&store);
        assert!(report.is_complete());
        assert_eq!(store.get(SettingKey::CompressionFormat).unwrap(), "Gzip");
        assert_eq!(store.get(SettingKey::Wasm2023).unwrap(), "False");
    }

    #[test]
    fn test_restore_continues_after_failure() {
        let store = MemorySettingsStore::with_engine_defaults();
        let snapshot = SettingsSnapshot::capture(&store).unwrap();

        store.set(SettingKey::CompressionFormat, "Brotli").unwrap();
        store.set(SettingKey::DataCaching, "False").unwrap();
        store.reject_writes_to(SettingKey::CompressionFormat);

        let report = snapshot.restore(&store);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].key, SettingKey::CompressionFormat);
        assert_eq!(report.restored.len(), SettingKey::ALL.len() - 1);
        // Later keys still restored
        assert_eq!(store.get(SettingKey::DataCaching).unwrap(), "True");
    }

    #[test]
    fn test_guard_restores_on_drop() {
        let store = MemorySettingsStore::with_engine_defaults();
        {
            let _guard = SettingsSnapshot::scoped(&store).unwrap();
            store.set(SettingKey::ShowSplashScreen, "False").unwrap();
        }
        assert_eq!(store.get(SettingKey::ShowSplashScreen).unwrap(), "True");
    }

    #[test]
    fn test_guard_explicit_restore_happens_once() {
        let store = MemorySettingsStore::with_engine_defaults();
        let guard = SettingsSnapshot::scoped(&store).unwrap();
        store.set(SettingKey::ShowSplashScreen, "False").unwrap();

        let writes_before = store.writes().len();
        let report = guard.restore();

        assert!(report.is_complete());
        assert_eq!(
            store.writes().len() - writes_before,
            SettingKey::ALL.len(),
            "drop after explicit restore must not write again"
        );
    }

    #[test]
    fn test_guard_restores_during_panic_unwind() {
        let store = MemorySettingsStore::with_engine_defaults();

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _guard = SettingsSnapshot::scoped(&store).unwrap();
            store.set(SettingKey::CodeOptimization, "DiskSizeLTO").unwrap();
            panic!("toolchain crashed");
        }));

        assert!(result.is_err());
        assert_eq!(
            store.get(SettingKey::CodeOptimization).unwrap(),
            "RuntimeSpeed"
        );
    }
}
