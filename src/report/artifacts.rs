//! Classification and sizing of build artifacts

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

use crate::host::{Decompressor, OutputFile};
use crate::infra::FileSystem;

/// Role of a generated file in the packaged build
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ArtifactType {
    /// Asset data
    #[serde(rename = "data")]
    Data,
    /// JavaScript framework glue
    #[serde(rename = "framework")]
    Framework,
    /// Loader script
    #[serde(rename = "loader")]
    Loader,
    /// WebAssembly code
    #[serde(rename = "wasm")]
    Wasm,
    /// Asset data with ASTC textures
    #[serde(rename = "data_astc")]
    DataAstc,
    /// wasm built with a 512 MB heap ceiling
    #[serde(rename = "wasm_max_512mb")]
    WasmMax512mb,
    /// wasm built with a 1024 MB heap ceiling
    #[serde(rename = "wasm_max_1024mb")]
    WasmMax1024mb,
}

impl ArtifactType {
    /// Name used in reports
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Data => "data",
            Self::Framework => "framework",
            Self::Loader => "loader",
            Self::Wasm => "wasm",
            Self::DataAstc => "data_astc",
            Self::WasmMax512mb => "wasm_max_512mb",
            Self::WasmMax1024mb => "wasm_max_1024mb",
        }
    }
}

impl fmt::Display for ArtifactType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Suffix table for the four main files; first match wins
const MAIN_FILE_PATTERNS: [(&str, ArtifactType); 7] = [
    (".data.br", ArtifactType::Data),
    (".data", ArtifactType::Data),
    (".framework.js.br", ArtifactType::Framework),
    (".framework.js", ArtifactType::Framework),
    (".loader.js", ArtifactType::Loader),
    (".wasm.br", ArtifactType::Wasm),
    (".wasm", ArtifactType::Wasm),
];

/// One generated file as listed in the build report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildArtifactDescriptor {
    /// File name without directory
    pub filename: String,
    /// Role of the file
    #[serde(rename = "type")]
    pub artifact_type: ArtifactType,
    /// Size after decompression; equals `size` for uncompressed files
    pub uncompressed_size: u64,
    /// Size on disk
    pub size: u64,
}

/// Main-file type of `filename`, case-insensitive
pub fn classify(filename: &str) -> Option<ArtifactType> {
    let lower = filename.to_ascii_lowercase();
    MAIN_FILE_PATTERNS
        .iter()
        .find(|(suffix, _)| lower.ends_with(suffix))
        .map(|(_, kind)| *kind)
}

fn is_compressed(filename: &str) -> bool {
    filename.to_ascii_lowercase().ends_with(".br")
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Main files among `files`, sorted by type.
///
/// When a type has both compressed and uncompressed entries only the compressed ones are
/// kept, so the list describes what is actually served.
pub fn select_main_files(files: &[OutputFile]) -> Vec<(&OutputFile, ArtifactType)> {
    let mut selected: Vec<(&OutputFile, ArtifactType)> = files
        .iter()
        .filter_map(|f| classify(&file_name(&f.path)).map(|kind| (f, kind)))
        .collect();

    let compressed_types: Vec<ArtifactType> = selected
        .iter()
        .filter(|(f, _)| is_compressed(&file_name(&f.path)))
        .map(|(_, kind)| *kind)
        .collect();
    selected.retain(|(f, kind)| {
        !compressed_types.contains(kind) || is_compressed(&file_name(&f.path))
    });

    selected.sort_by_key(|(_, kind)| *kind);
    selected
}

/// Measures on-disk and uncompressed sizes of artifacts
pub struct ArtifactSizer<'a, FS: FileSystem> {
    fs: &'a FS,
    decompressor: &'a dyn Decompressor,
}

impl<'a, FS: FileSystem> ArtifactSizer<'a, FS> {
    /// Create a sizer
    pub fn new(fs: &'a FS, decompressor: &'a dyn Decompressor) -> Self {
        Self { fs, decompressor }
    }

    /// Uncompressed size of the file at `path`; `fallback` is its compressed size.
    ///
    /// A `.br` file that cannot be decompressed is reported at its compressed size.
    pub fn uncompressed_size(&self, path: &Path, fallback: u64) -> u64 {
        let name = file_name(path);
        if !is_compressed(&name) {
            return self.fs.metadata(path).map(|m| m.len()).unwrap_or(fallback);
        }
        let measured = self
            .fs
            .open(path)
            .and_then(|mut file| self.decompressor.decompressed_size(&mut file));
        match measured {
            Ok(size) => size,
            Err(e) => {
                log::warn!("Could not get uncompressed size for {}: {}", name, e);
                fallback
            }
        }
    }

    /// Descriptors for the main files among `files`
    pub fn main_files(&self, files: &[OutputFile]) -> Vec<BuildArtifactDescriptor> {
        select_main_files(files)
            .into_iter()
            .map(|(file, kind)| BuildArtifactDescriptor {
                filename: file_name(&file.path),
                artifact_type: kind,
                uncompressed_size: self.uncompressed_size(&file.path, file.size),
                size: file.size,
            })
            .collect()
    }

    /// Descriptor for a secondary artifact in `build_dir`, `None` when the file is missing
    pub fn extra_file(
        &self,
        build_dir: &Path,
        filename: &str,
        kind: ArtifactType,
    ) -> Option<BuildArtifactDescriptor> {
        let path = build_dir.join(filename);
        let size = match self.fs.metadata(&path) {
            Ok(meta) => meta.len(),
            Err(e) => {
                log::warn!("Skipping {} in build report: {}", path.display(), e);
                return None;
            }
        };
        Some(BuildArtifactDescriptor {
            filename: filename.to_string(),
            artifact_type: kind,
            uncompressed_size: self.uncompressed_size(&path, size),
            size,
        })
    }
}
