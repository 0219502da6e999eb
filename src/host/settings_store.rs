//! Global player settings store
//!
//! The store is process-wide mutable state shared with the rest of the editor. The pipeline
//! is its only writer while a build runs; the snapshot in [`crate::settings`] owns the
//! initial values for that window.

use parking_lot::RwLock;
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::infra::{FileSystem, RealFileSystem};
use crate::settings::SettingKey;

/// Errors raised by a settings store
#[derive(Error, Debug)]
pub enum SettingsError {
    /// The key has no value in the store
    #[error("setting '{0}' is not defined")]
    Missing(SettingKey),

    /// The store rejected a write
    #[error("setting '{key}' could not be written: {reason}")]
    Rejected {
        /// Key being written
        key: SettingKey,
        /// Reason given by the store
        reason: String,
    },

    /// Backing file could not be read or written
    #[error("settings file {path}: {source}")]
    Io {
        /// Settings file path
        path: PathBuf,
        #[source]
        /// IO error source
        source: std::io::Error,
    },

    /// Backing file is not valid JSON
    #[error("settings file {path} is malformed: {source}")]
    Malformed {
        /// Settings file path
        path: PathBuf,
        #[source]
        /// Parse error
        source: serde_json::Error,
    },
}

/// Read/write access to named global build settings
pub trait SettingsStore {
    /// Current value of `key`
    fn get(&self, key: SettingKey) -> Result<String, SettingsError>;

    /// Overwrite the value of `key`
    fn set(&self, key: SettingKey, value: &str) -> Result<(), SettingsError>;

    /// Persist pending changes
    fn flush(&self) -> Result<(), SettingsError> {
        Ok(())
    }
}

impl<S: SettingsStore + ?Sized> SettingsStore for &S {
    fn get(&self, key: SettingKey) -> Result<String, SettingsError> {
        (**self).get(key)
    }

    fn set(&self, key: SettingKey, value: &str) -> Result<(), SettingsError> {
        (**self).set(key, value)
    }

    fn flush(&self) -> Result<(), SettingsError> {
        (**self).flush()
    }
}

/// In-memory settings store
///
/// Keys listed with [`MemorySettingsStore::reject_writes_to`] fail every `set`, which lets
/// tests exercise partial restore.
#[derive(Debug, Default)]
pub struct MemorySettingsStore {
    values: RwLock<BTreeMap<SettingKey, String>>,
    rejected: RwLock<HashSet<SettingKey>>,
    writes: RwLock<Vec<(SettingKey, String)>>,
    flushes: RwLock<usize>,
}

impl MemorySettingsStore {
    /// Empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with `values`
    pub fn with_values<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = (SettingKey, V)>,
        V: Into<String>,
    {
        let store = Self::new();
        {
            let mut map = store.values.write();
            for (key, value) in values {
                map.insert(key, value.into());
            }
        }
        store
    }

    /// Store with the values a fresh WebGL project starts with
    pub fn with_engine_defaults() -> Self {
        Self::with_values(SettingKey::ALL.map(|key| (key, key.engine_default())))
    }

    /// Make every subsequent write to `key` fail
    pub fn reject_writes_to(&self, key: SettingKey) {
        self.rejected.write().insert(key);
    }

    /// Copy of all current values
    pub fn values(&self) -> BTreeMap<SettingKey, String> {
        self.values.read().clone()
    }

    /// Every successful write in order
    pub fn writes(&self) -> Vec<(SettingKey, String)> {
        self.writes.read().clone()
    }

    /// Number of `flush` calls
    pub fn flush_count(&self) -> usize {
        *self.flushes.read()
    }
}

impl SettingsStore for MemorySettingsStore {
    fn get(&self, key: SettingKey) -> Result<String, SettingsError> {
        self.values
            .read()
            .get(&key)
            .cloned()
            .ok_or(SettingsError::Missing(key))
    }

    fn set(&self, key: SettingKey, value: &str) -> Result<(), SettingsError> {
        if self.rejected.read().contains(&key) {
            return Err(SettingsError::Rejected {
                key,
                reason: "write rejected".to_string(),
            });
        }
        self.values.write().insert(key, value.to_string());
        self.writes.write().push((key, value.to_string()));
        Ok(())
    }

    fn flush(&self) -> Result<(), SettingsError> {
        *self.flushes.write() += 1;
        Ok(())
    }
}

/// Settings store backed by a JSON object file
///
/// The external build command reads the same file, so every `set` is written through
/// immediately. Unknown keys in the file are preserved. Keys absent from the file read as
/// their engine default.
pub struct FileSettingsStore<FS: FileSystem = RealFileSystem> {
    path: PathBuf,
    fs: FS,
    values: RwLock<Option<serde_json::Map<String, serde_json::Value>>>,
}

impl FileSettingsStore<RealFileSystem> {
    /// Store backed by the file at `path`
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self::with_fs(path, RealFileSystem)
    }
}

impl<FS: FileSystem> FileSettingsStore<FS> {
    /// Store with a custom filesystem implementation
    pub fn with_fs(path: impl AsRef<Path>, fs: FS) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            fs,
            values: RwLock::new(None),
        }
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<serde_json::Map<String, serde_json::Value>, SettingsError> {
        let contents = match self.fs.read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(serde_json::Map::new())
            }
            Err(source) => {
                return Err(SettingsError::Io {
                    path: self.path.clone(),
                    source,
                })
            }
        };
        serde_json::from_str(&contents).map_err(|source| SettingsError::Malformed {
            path: self.path.clone(),
            source,
        })
    }

    fn with_values<R>(
        &self,
        f: impl FnOnce(&mut serde_json::Map<String, serde_json::Value>) -> R,
    ) -> Result<R, SettingsError> {
        let mut guard = self.values.write();
        if guard.is_none() {
            *guard = Some(self.load()?);
        }
        match guard.as_mut() {
            Some(values) => Ok(f(values)),
            None => Ok(f(&mut serde_json::Map::new())),
        }
    }

    fn persist(&self) -> Result<(), SettingsError> {
        let guard = self.values.read();
        let Some(values) = guard.as_ref() else {
            return Ok(());
        };
        let json = serde_json::to_string_pretty(values).map_err(|source| {
            SettingsError::Malformed {
                path: self.path.clone(),
                source,
            }
        })?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            self.fs
                .create_dir_all(parent)
                .map_err(|source| SettingsError::Io {
                    path: self.path.clone(),
                    source,
                })?;
        }
        self.fs
            .write(&self.path, json)
            .map_err(|source| SettingsError::Io {
                path: self.path.clone(),
                source,
            })
    }
}

impl<FS: FileSystem> SettingsStore for FileSettingsStore<FS> {
    fn get(&self, key: SettingKey) -> Result<String, SettingsError> {
        let value = self.with_values(|values| values.get(key.as_str()).cloned())?;
        match value {
            Some(serde_json::Value::String(s)) => Ok(s),
            Some(serde_json::Value::Bool(b)) => Ok(crate::settings::bool_value(b).to_string()),
            Some(serde_json::Value::Number(n)) => Ok(n.to_string()),
            None => Ok(key.engine_default().to_string()),
            Some(_) => Err(SettingsError::Missing(key)),
        }
    }

    fn set(&self, key: SettingKey, value: &str) -> Result<(), SettingsError> {
        self.with_values(|values| {
            values.insert(
                key.as_str().to_string(),
                serde_json::Value::String(value.to_string()),
            );
        })?;
        self.persist()
    }

    fn flush(&self) -> Result<(), SettingsError> {
        self.persist()
    }
}
