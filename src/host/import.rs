//! Per-asset import configuration
//!
//! The analyzer reads import settings to classify packaged files and writes single changes
//! back when a fix is applied. [`ManifestAssetCatalog`] keeps the settings in a JSON file
//! keyed by project-relative asset path:
//!
//! ```json
//! {
//!   "Assets/Textures/hero.png": {
//!     "kind": "texture", "sourceWidth": 2048, "sourceHeight": 2048,
//!     "maxTextureSize": 2048, "isReadable": false, "mipmapEnabled": true
//!   },
//!   "Assets/Audio/theme.ogg": {
//!     "kind": "audio", "lengthSeconds": 15.0, "forceToMono": false, "quality": 0.9
//!   }
//! }
//! ```

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::infra::{FileSystem, RealFileSystem};

/// Texture import configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextureImport {
    /// Width of the source image
    pub source_width: u32,
    /// Height of the source image
    pub source_height: u32,
    /// Largest imported dimension
    pub max_texture_size: u32,
    /// CPU-side copy kept in memory
    #[serde(default)]
    pub is_readable: bool,
    /// Mipmaps generated on import
    #[serde(default)]
    pub mipmap_enabled: bool,
}

impl TextureImport {
    /// Imported dimensions: the source scaled so the larger side fits `max_texture_size`
    pub fn imported_dimensions(&self) -> (u32, u32) {
        let larger = self.source_width.max(self.source_height);
        if larger <= self.max_texture_size || larger == 0 {
            return (self.source_width, self.source_height);
        }
        let scale = f64::from(self.max_texture_size) / f64::from(larger);
        let fit = |side: u32| ((f64::from(side) * scale).round() as u32).max(1);
        (fit(self.source_width), fit(self.source_height))
    }
}

/// Audio import configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioImport {
    /// Clip length in seconds
    pub length_seconds: f32,
    /// Downmixed to mono on import
    #[serde(default)]
    pub force_to_mono: bool,
    /// Compression quality in `0.0..=1.0`
    pub quality: f32,
}

/// Model import configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelImport {
    /// CPU-side mesh copy kept in memory
    #[serde(default)]
    pub is_readable: bool,
}

/// Import settings of one asset
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ImportSettings {
    /// Texture
    Texture(TextureImport),
    /// Audio clip
    Audio(AudioImport),
    /// 3D model
    Model(ModelImport),
}

impl ImportSettings {
    fn kind(&self) -> &'static str {
        match self {
            Self::Texture(_) => "texture",
            Self::Audio(_) => "audio",
            Self::Model(_) => "model",
        }
    }
}

/// A single import setting change
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ImportChange {
    /// Downmix audio to mono
    ForceToMono,
    /// Set audio compression quality
    SetAudioQuality(f32),
    /// Set the texture's max imported size
    SetMaxTextureSize(u32),
    /// Drop the CPU-side texture copy
    DisableTextureReadWrite,
    /// Stop generating mipmaps
    DisableMipmaps,
    /// Drop the CPU-side mesh copy
    DisableMeshReadWrite,
}

impl ImportChange {
    fn expected_kind(&self) -> &'static str {
        match self {
            Self::ForceToMono | Self::SetAudioQuality(_) => "audio",
            Self::SetMaxTextureSize(_) | Self::DisableTextureReadWrite | Self::DisableMipmaps => {
                "texture"
            }
            Self::DisableMeshReadWrite => "model",
        }
    }

    fn apply_to(&self, settings: &mut ImportSettings) -> bool {
        match (self, settings) {
            (Self::ForceToMono, ImportSettings::Audio(a)) => a.force_to_mono = true,
            (Self::SetAudioQuality(q), ImportSettings::Audio(a)) => a.quality = *q,
            (Self::SetMaxTextureSize(s), ImportSettings::Texture(t)) => t.max_texture_size = *s,
            (Self::DisableTextureReadWrite, ImportSettings::Texture(t)) => t.is_readable = false,
            (Self::DisableMipmaps, ImportSettings::Texture(t)) => t.mipmap_enabled = false,
            (Self::DisableMeshReadWrite, ImportSettings::Model(m)) => m.is_readable = false,
            _ => return false,
        }
        true
    }
}

/// Errors raised by an asset importer
#[derive(Error, Debug)]
pub enum ImportError {
    /// No import settings for the asset
    #[error("no importer for asset '{0}'")]
    NotFound(String),

    /// The change does not fit the asset's importer
    #[error("asset '{path}' is a {actual}, expected a {expected}")]
    KindMismatch {
        /// Asset path
        path: String,
        /// Importer kind the change needs
        expected: &'static str,
        /// Importer kind found
        actual: &'static str,
    },

    /// Manifest file could not be read or written
    #[error("import manifest {path}: {source}")]
    Io {
        /// Manifest path
        path: PathBuf,
        #[source]
        /// IO error source
        source: std::io::Error,
    },

    /// Manifest file is not valid JSON
    #[error("import manifest {path} is malformed: {source}")]
    Malformed {
        /// Manifest path
        path: PathBuf,
        #[source]
        /// Parse error
        source: serde_json::Error,
    },
}

/// Read and change per-asset import settings
pub trait AssetImporter {
    /// Import settings of the asset at `path`, `None` when it has no known importer
    fn import_settings(&self, path: &str) -> Result<Option<ImportSettings>, ImportError>;

    /// Apply one change and reimport the asset
    fn apply(&self, path: &str, change: ImportChange) -> Result<(), ImportError>;
}

impl<A: AssetImporter + ?Sized> AssetImporter for &A {
    fn import_settings(&self, path: &str) -> Result<Option<ImportSettings>, ImportError> {
        (**self).import_settings(path)
    }

    fn apply(&self, path: &str, change: ImportChange) -> Result<(), ImportError> {
        (**self).apply(path, change)
    }
}

fn apply_change(
    assets: &mut BTreeMap<String, ImportSettings>,
    path: &str,
    change: ImportChange,
) -> Result<(), ImportError> {
    let settings = assets
        .get_mut(path)
        .ok_or_else(|| ImportError::NotFound(path.to_string()))?;
    let actual = settings.kind();
    if !change.apply_to(settings) {
        return Err(ImportError::KindMismatch {
            path: path.to_string(),
            expected: change.expected_kind(),
            actual,
        });
    }
    Ok(())
}

/// In-memory asset catalog
#[derive(Debug, Default)]
pub struct MemoryAssetCatalog {
    assets: RwLock<BTreeMap<String, ImportSettings>>,
    applied: RwLock<Vec<(String, ImportChange)>>,
}

impl MemoryAssetCatalog {
    /// Empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Register or replace the settings of an asset
    pub fn insert(&self, path: impl Into<String>, settings: ImportSettings) {
        self.assets.write().insert(path.into(), settings);
    }

    /// Every change applied so far, in order
    pub fn applied(&self) -> Vec<(String, ImportChange)> {
        self.applied.read().clone()
    }
}

impl AssetImporter for MemoryAssetCatalog {
    fn import_settings(&self, path: &str) -> Result<Option<ImportSettings>, ImportError> {
        Ok(self.assets.read().get(path).copied())
    }

    fn apply(&self, path: &str, change: ImportChange) -> Result<(), ImportError> {
        apply_change(&mut self.assets.write(), path, change)?;
        self.applied.write().push((path.to_string(), change));
        Ok(())
    }
}

/// Asset catalog backed by a JSON manifest, saved after every applied change
pub struct ManifestAssetCatalog<FS: FileSystem = RealFileSystem> {
    path: PathBuf,
    fs: FS,
    assets: RwLock<BTreeMap<String, ImportSettings>>,
}

impl ManifestAssetCatalog<RealFileSystem> {
    /// Load the manifest at `path`; a missing file yields an empty catalog
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ImportError> {
        Self::load_with_fs(path, RealFileSystem)
    }
}

impl<FS: FileSystem> ManifestAssetCatalog<FS> {
    /// Load the manifest with a custom filesystem implementation
    pub fn load_with_fs(path: impl AsRef<Path>, fs: FS) -> Result<Self, ImportError> {
        let path = path.as_ref().to_path_buf();
        let assets = if fs.exists(&path) {
            let contents = fs.read_to_string(&path).map_err(|source| ImportError::Io {
                path: path.clone(),
                source,
            })?;
            serde_json::from_str(&contents).map_err(|source| ImportError::Malformed {
                path: path.clone(),
                source,
            })?
        } else {
            log::debug!("No import manifest at {}", path.display());
            BTreeMap::new()
        };
        Ok(Self {
            path,
            fs,
            assets: RwLock::new(assets),
        })
    }

    /// Number of assets in the manifest
    pub fn len(&self) -> usize {
        self.assets.read().len()
    }

    /// True when the manifest lists no assets
    pub fn is_empty(&self) -> bool {
        self.assets.read().is_empty()
    }

    fn save(&self, assets: &BTreeMap<String, ImportSettings>) -> Result<(), ImportError> {
        let json =
            serde_json::to_string_pretty(assets).map_err(|source| ImportError::Malformed {
                path: self.path.clone(),
                source,
            })?;
        self.fs
            .write(&self.path, json)
            .map_err(|source| ImportError::Io {
                path: self.path.clone(),
                source,
            })
    }
}

impl<FS: FileSystem> AssetImporter for ManifestAssetCatalog<FS> {
    fn import_settings(&self, path: &str) -> Result<Option<ImportSettings>, ImportError> {
        Ok(self.assets.read().get(path).copied())
    }

    fn apply(&self, path: &str, change: ImportChange) -> Result<(), ImportError> {
        let mut assets = self.assets.write();
        apply_change(&mut assets, path, change)?;
        log::info!("Reimporting {} ({:?})", path, change);
        self.save(&assets)
    }
}
