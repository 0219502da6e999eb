//! Configuration file loading and creation

use super::file::{ConfigFile, CONFIG_FILE_NAME};
use super::template::DEFAULT_CONFIG_TEMPLATE;
use super::validator::validate;
use crate::infra::{FileSystem, RealFileSystem};
use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};

/// Handles loading and creating `.crazybuild.toml`
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load config from `.crazybuild.toml` in the given directory
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use crazybuild::config::ConfigLoader;
    /// use std::path::Path;
    ///
    /// let config = ConfigLoader::load(Path::new("."))?;
    /// println!("{} scene(s) in the build list", config.scenes.len());
    /// # Ok::<(), anyhow::Error>(())
    /// ```
    pub fn load(project_root: &Path) -> Result<ConfigFile> {
        Self::load_with_fs(project_root, &RealFileSystem)
    }

    /// Load config with a custom filesystem implementation
    pub fn load_with_fs<FS: FileSystem>(project_root: &Path, fs: &FS) -> Result<ConfigFile> {
        let config_path = project_root.join(CONFIG_FILE_NAME);

        let contents = match fs.read_to_string(&config_path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::debug!("No {} in {}, using defaults", CONFIG_FILE_NAME, project_root.display());
                return Ok(ConfigFile::default());
            }
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to read {}", config_path.display()));
            }
        };

        let config: ConfigFile = toml_edit::de::from_str(&contents)
            .with_context(|| format!("Failed to parse {}", config_path.display()))?;

        let result = validate(&config, false);
        for warning in result.warnings() {
            log::warn!("{}: {}", warning.field, warning.message);
        }
        if let Some(error) = result.errors().first() {
            bail!("Invalid {}: {}: {}", CONFIG_FILE_NAME, error.field, error.message);
        }

        Ok(config)
    }

    /// Write the commented default config into `project_root`.
    ///
    /// An existing file is only replaced when `force` is set.
    pub fn init(project_root: &Path, force: bool) -> Result<PathBuf> {
        Self::init_with_fs(project_root, force, &RealFileSystem)
    }

    /// [`ConfigLoader::init`] with a custom filesystem implementation
    pub fn init_with_fs<FS: FileSystem>(
        project_root: &Path,
        force: bool,
        fs: &FS,
    ) -> Result<PathBuf> {
        let config_path = project_root.join(CONFIG_FILE_NAME);
        if !force && fs.exists(&config_path) {
            bail!("{} already exists", config_path.display());
        }
        fs.write(&config_path, DEFAULT_CONFIG_TEMPLATE)
            .with_context(|| format!("Failed to write {}", config_path.display()))?;
        Ok(config_path)
    }

    /// Check if config file exists in project
    pub fn exists(project_root: &Path) -> bool {
        project_root.join(CONFIG_FILE_NAME).exists()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::io;

    struct MockFileSystem {
        file_content: Option<String>,
        should_fail_read: bool,
        written_content: Mutex<Option<String>>,
    }

    impl MockFileSystem {
        fn new() -> Self {
            Self {
                file_content: None,
                should_fail_read: false,
                written_content: Mutex::new(None),
            }
        }

        fn with_content(content: &str) -> Self {
            Self {
                file_content: Some(content.to_string()),
                ..Self::new()
            }
        }

        fn with_read_error() -> Self {
            Self {
                should_fail_read: true,
                ..Self::new()
            }
        }
    }

    impl FileSystem for MockFileSystem {
        fn copy(&self, _from: &Path, _to: &Path) -> io::Result<u64> {
            unimplemented!()
        }

        fn create_dir_all(&self, _path: &Path) -> io::Result<()> {
            unimplemented!()
        }

        fn remove_dir_all(&self, _path: &Path) -> io::Result<()> {
            unimplemented!()
        }

        fn remove_file(&self, _path: &Path) -> io::Result<()> {
            unimplemented!()
        }

        fn exists(&self, _path: &Path) -> bool {
            self.file_content.is_some()
        }

        fn metadata(&self, _path: &Path) -> io::Result<std::fs::Metadata> {
            unimplemented!()
        }

        fn open(&self, _path: &Path) -> io::Result<std::fs::File> {
            unimplemented!()
        }

        fn read_to_string(&self, _path: &Path) -> io::Result<String> {
            if self.should_fail_read {
                return Err(io::Error::new(
                    io::ErrorKind::PermissionDenied,
                    "permission denied",
                ));
            }
            self.file_content
                .clone()
                .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "file not found"))
        }

        fn write(&self, _path: &Path, contents: impl AsRef<[u8]>) -> io::Result<()> {
            *self.written_content.lock() =
                Some(String::from_utf8_lossy(contents.as_ref()).to_string());
            Ok(())
        }
    }

    #[test]
    fn test_loader_loads_from_valid_toml() {
        let temp = tempfile::tempdir().unwrap();
        std::fs::write(
            temp.path().join(CONFIG_FILE_NAME),
            "[toolchain]\ncommand = \"unity-build\"\n\n[[scenes]]\npath = \"Assets/Main.unity\"\n",
        )
        .unwrap();

        let config = ConfigLoader::load(temp.path()).unwrap();

        assert_eq!(config.toolchain.command, "unity-build");
        assert_eq!(config.scenes[0].path, "Assets/Main.unity");
    }

    #[test]
    fn test_loader_with_missing_file_uses_defaults() {
        let fs = MockFileSystem::new();
        let config = ConfigLoader::load_with_fs(Path::new("/game"), &fs).unwrap();
        assert_eq!(config, ConfigFile::default());
    }

    #[test]
    fn test_loader_with_invalid_toml_returns_error() {
        let fs = MockFileSystem::with_content("invalid { toml syntax");
        let err = ConfigLoader::load_with_fs(Path::new("/game"), &fs).unwrap_err();
        assert!(err.to_string().contains("Failed to parse"));
    }

    #[test]
    fn test_loader_propagates_read_errors() {
        let fs = MockFileSystem::with_read_error();
        let err = ConfigLoader::load_with_fs(Path::new("/game"), &fs).unwrap_err();
        assert!(err.to_string().contains("Failed to read"));
    }

    #[test]
    fn test_loader_rejects_non_positive_timestep() {
        let fs = MockFileSystem::with_content("[project]\nfixed_timestep = 0.0\n");
        let err = ConfigLoader::load_with_fs(Path::new("/game"), &fs).unwrap_err();
        assert!(err.to_string().contains("fixed_timestep"));
    }

    #[test]
    fn test_init_writes_template() {
        let fs = MockFileSystem::new();
        let path = ConfigLoader::init_with_fs(Path::new("/game"), false, &fs).unwrap();

        assert_eq!(path, Path::new("/game").join(CONFIG_FILE_NAME));
        assert_eq!(
            fs.written_content.lock().as_deref(),
            Some(DEFAULT_CONFIG_TEMPLATE)
        );
    }

    #[test]
    fn test_init_refuses_to_overwrite_without_force() {
        let fs = MockFileSystem::with_content("");
        assert!(ConfigLoader::init_with_fs(Path::new("/game"), false, &fs).is_err());
        assert!(fs.written_content.lock().is_none());

        ConfigLoader::init_with_fs(Path::new("/game"), true, &fs).unwrap();
        assert!(fs.written_content.lock().is_some());
    }
}
