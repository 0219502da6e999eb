//! Test fixture helpers for creating game projects and fake build output
//!
//! [`GameProject`] owns a temporary project root laid out the way the CLI expects.
//! [`FakeToolchain`] stands in for the engine: every call writes a loader script plus
//! brotli-compressed data, framework and wasm files, and records the player settings it
//! saw so tests can check what each pass was built with.

#![allow(dead_code)]

use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use crazybuild::cmd::ProjectContext;
use crazybuild::config::CONFIG_FILE_NAME;
use crazybuild::host::{
    AudioImport, BuildRequest, BuildStatus, BuildStep, FileSettingsStore, HostError,
    ImportSettings, MessageSeverity, OutputFile, PackedAsset, SettingsStore, StepMessage,
    TextureImport, Toolchain, ToolchainReport,
};
use crazybuild::report::{
    BuildReport, BuildReportSummary, PackagedFileSummary, SummaryStore, REPORT_FILE_NAME,
};
use crazybuild::settings::SettingKey;

/// Uncompressed length of `game.data.br`
pub const DATA_LEN: usize = 40_000;
/// Uncompressed length of `game.framework.js.br`
pub const FRAMEWORK_LEN: usize = 12_000;
/// Uncompressed length of `game.wasm.br`
pub const WASM_LEN: usize = 30_000;
/// Length of the uncompressed `game.loader.js`
pub const LOADER_LEN: usize = 600;

/// Brotli-compress `data` with the settings the engine uses for web builds
pub fn brotli_compress(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    {
        let mut writer = brotli::CompressorWriter::new(&mut out, 4096, 5, 22);
        writer.write_all(data).expect("compress into memory");
    }
    out
}

/// Deterministic, compressible payload of `len` bytes
pub fn payload(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i % 251) as u8).collect()
}

/// A brotli stream cut in half, which fails to decompress
pub fn truncated_brotli() -> Vec<u8> {
    let data: Vec<u8> = (0..50_000u32).flat_map(|i| i.to_le_bytes()).collect();
    let mut compressed = brotli_compress(&data);
    compressed.truncate(compressed.len() / 2);
    compressed
}

/// `.crazybuild.toml` building `scenes` with default paths
pub fn config_with_scenes(scenes: &[&str]) -> String {
    let mut config = String::from("[build]\noutput_root = \"Builds\"\ncache_dir = \"Library\"\n");
    for scene in scenes {
        config.push_str(&format!("\n[[scenes]]\npath = \"{}\"\n", scene));
    }
    config
}

/// Stereo clip long enough to count as background music
pub fn long_stereo_audio() -> ImportSettings {
    ImportSettings::Audio(AudioImport {
        length_seconds: 15.0,
        force_to_mono: false,
        quality: 0.9,
    })
}

/// Square texture imported at `size`
pub fn texture(size: u32) -> ImportSettings {
    ImportSettings::Texture(TextureImport {
        source_width: size,
        source_height: size,
        max_texture_size: size,
        is_readable: false,
        mipmap_enabled: false,
    })
}

/// Summary listing `files` as packaged assets
pub fn summary_of(files: &[(&str, u64)]) -> BuildReportSummary {
    BuildReportSummary {
        packaged_files: files
            .iter()
            .map(|(path, size)| PackagedFileSummary {
                path: path.to_string(),
                size: *size,
            })
            .collect(),
        build_date_iso: "2024-05-01T10:00:00+00:00".to_string(),
        duration_seconds: 95.0,
        total_size: files.iter().map(|(_, size)| size).sum(),
        initial_load_size: 1_000_000,
    }
}

/// A temporary game project root
pub struct GameProject {
    dir: TempDir,
}

impl GameProject {
    /// Empty project without a config file
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("create temp project"),
        }
    }

    /// Project whose config builds `scenes`
    pub fn with_scenes(scenes: &[&str]) -> Self {
        let project = Self::new();
        project.write_config(&config_with_scenes(scenes));
        project
    }

    /// Project root
    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Overwrite `.crazybuild.toml`
    pub fn write_config(&self, contents: &str) {
        fs::write(self.root().join(CONFIG_FILE_NAME), contents).expect("write config");
    }

    /// Write the import manifest with `assets`
    pub fn write_imports(&self, assets: &[(&str, ImportSettings)]) {
        let manifest: BTreeMap<&str, ImportSettings> = assets.iter().copied().collect();
        let path = self.imports_path();
        fs::create_dir_all(path.parent().expect("manifest has a parent")).expect("mkdir");
        fs::write(&path, serde_json::to_string_pretty(&manifest).expect("serialize"))
            .expect("write manifest");
    }

    /// Import settings currently stored in the manifest
    pub fn read_imports(&self) -> BTreeMap<String, ImportSettings> {
        let contents = fs::read_to_string(self.imports_path()).expect("read manifest");
        serde_json::from_str(&contents).expect("parse manifest")
    }

    /// Persist `summary` where the last Release build would have
    pub fn write_summary(&self, summary: &BuildReportSummary) {
        SummaryStore::new(self.root().join("Library"))
            .save(summary)
            .expect("save summary");
    }

    /// Summary persisted by the last Release build
    pub fn read_summary(&self) -> Option<BuildReportSummary> {
        SummaryStore::new(self.root().join("Library"))
            .load()
            .expect("load summary")
    }

    /// Loaded project context
    pub fn context(&self) -> ProjectContext {
        ProjectContext::load(self.root()).expect("load project context")
    }

    /// Player settings file
    pub fn settings_path(&self) -> PathBuf {
        self.root().join("ProjectSettings/crazybuild-settings.json")
    }

    /// Import manifest file
    pub fn imports_path(&self) -> PathBuf {
        self.root().join("ProjectSettings/crazybuild-imports.json")
    }

    /// Output folder of Release builds
    pub fn release_dir(&self) -> PathBuf {
        self.root().join("Builds/CrazyGamesRelease")
    }

    /// Output folder of Development builds
    pub fn development_dir(&self) -> PathBuf {
        self.root().join("Builds/CrazyGamesDevelopment")
    }

    /// Build report written into the Release folder
    pub fn read_report(&self) -> BuildReport {
        let contents =
            fs::read_to_string(self.release_dir().join(REPORT_FILE_NAME)).expect("read report");
        serde_json::from_str(&contents).expect("parse report")
    }

    /// Current value of every setting in the settings file
    pub fn settings(&self) -> BTreeMap<SettingKey, String> {
        let store = FileSettingsStore::new(self.settings_path());
        SettingKey::ALL
            .iter()
            .map(|key| (*key, store.get(*key).expect("read setting")))
            .collect()
    }
}

/// Engine default of every setting
pub fn engine_defaults() -> BTreeMap<SettingKey, String> {
    SettingKey::ALL
        .iter()
        .map(|key| (*key, key.engine_default().to_string()))
        .collect()
}

/// One call to [`FakeToolchain::build_player`]
#[derive(Debug, Clone)]
pub struct Invocation {
    /// The request as received
    pub request: BuildRequest,
    /// `webGLTextureSubtarget` at the time of the call
    pub texture_subtarget: Option<String>,
    /// `maximumMemorySize` at the time of the call
    pub maximum_memory: Option<String>,
}

/// Toolchain writing a fixed WebGL output tree
pub struct FakeToolchain {
    settings_file: Option<PathBuf>,
    failing_calls: Vec<usize>,
    truncated_framework: bool,
    packed_assets: Vec<PackedAsset>,
    invocations: Mutex<Vec<Invocation>>,
}

impl FakeToolchain {
    /// Toolchain that succeeds on every call
    pub fn new() -> Self {
        Self {
            settings_file: None,
            failing_calls: Vec::new(),
            truncated_framework: false,
            packed_assets: Vec::new(),
            invocations: Mutex::new(Vec::new()),
        }
    }

    /// Record the settings in `path` on every call
    pub fn observing_settings(mut self, path: PathBuf) -> Self {
        self.settings_file = Some(path);
        self
    }

    /// Report a failed build on the `index`-th call, counting from zero
    pub fn failing_call(mut self, index: usize) -> Self {
        self.failing_calls.push(index);
        self
    }

    /// Write a framework file that cannot be decompressed
    pub fn with_truncated_framework(mut self) -> Self {
        self.truncated_framework = true;
        self
    }

    /// Report `assets` as packed source assets
    pub fn with_packed_assets(mut self, assets: &[(&str, u64)]) -> Self {
        self.packed_assets = assets
            .iter()
            .map(|(path, size)| PackedAsset {
                source_asset_path: path.to_string(),
                packed_size: *size,
            })
            .collect();
        self
    }

    /// Every call so far, in order
    pub fn invocations(&self) -> Vec<Invocation> {
        self.invocations.lock().clone()
    }

    fn setting(&self, key: SettingKey) -> Option<String> {
        let path = self.settings_file.as_ref()?;
        FileSettingsStore::new(path).get(key).ok()
    }

    fn write(dir: &Path, name: &str, contents: &[u8]) -> Result<OutputFile, HostError> {
        let path = dir.join(name);
        fs::write(&path, contents)?;
        Ok(OutputFile {
            path,
            size: contents.len() as u64,
        })
    }
}

impl Toolchain for FakeToolchain {
    fn build_player(&self, request: &BuildRequest) -> Result<ToolchainReport, HostError> {
        let index = {
            let mut invocations = self.invocations.lock();
            invocations.push(Invocation {
                request: request.clone(),
                texture_subtarget: self.setting(SettingKey::WebGlTextureSubtarget),
                maximum_memory: self.setting(SettingKey::MaximumMemorySize),
            });
            invocations.len() - 1
        };

        if self.failing_calls.contains(&index) {
            return Ok(ToolchainReport {
                status: BuildStatus::Failed,
                output_path: request.output_path.clone(),
                steps: vec![BuildStep {
                    name: "Compile scripts".to_string(),
                    messages: vec![
                        StepMessage {
                            severity: MessageSeverity::Warning,
                            content: "Obsolete API used".to_string(),
                        },
                        StepMessage {
                            severity: MessageSeverity::Error,
                            content: "Shader compilation failed".to_string(),
                        },
                    ],
                }],
                ..ToolchainReport::default()
            });
        }

        let build_dir = request.output_path.join("Build");
        fs::create_dir_all(&build_dir)?;
        let framework = if self.truncated_framework {
            truncated_brotli()
        } else {
            brotli_compress(&payload(FRAMEWORK_LEN))
        };
        let files = vec![
            Self::write(&build_dir, "game.loader.js", &payload(LOADER_LEN))?,
            Self::write(&build_dir, "game.framework.js.br", &framework)?,
            Self::write(&build_dir, "game.data.br", &brotli_compress(&payload(DATA_LEN)))?,
            Self::write(&build_dir, "game.wasm.br", &brotli_compress(&payload(WASM_LEN)))?,
        ];
        let total_size = files.iter().map(|f| f.size).sum();

        Ok(ToolchainReport {
            status: BuildStatus::Succeeded,
            output_path: request.output_path.clone(),
            files,
            steps: vec![BuildStep {
                name: "Build player".to_string(),
                messages: Vec::new(),
            }],
            packed_assets: self.packed_assets.clone(),
            total_time: 42.0,
            total_size,
            engine_version: Some("2022.3.20f1".to_string()),
        })
    }
}
