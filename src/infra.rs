//! Infrastructure traits for abstracting I/O operations.
//!
//! Build orchestration touches the filesystem (stale output directories, secondary build
//! artifacts, report files) and spawns the external build command. Both are hidden behind
//! traits so the pipeline can be driven against temp directories and scripted commands.

use std::ffi::OsStr;
use std::fs::{File, Metadata};
use std::io;
use std::path::Path;
use std::process::{Command, Output};

/// Trait for abstracting filesystem operations.
pub trait FileSystem {
    /// Copy a file from one location to another, overwriting the destination.
    fn copy(&self, from: &Path, to: &Path) -> io::Result<u64>;

    /// Create a directory and all missing parent directories.
    fn create_dir_all(&self, path: &Path) -> io::Result<()>;

    /// Recursively delete a directory.
    ///
    /// A missing directory is not an error, so cleanup can be retried freely.
    fn remove_dir_all(&self, path: &Path) -> io::Result<()>;

    /// Delete a file. A missing file is not an error.
    fn remove_file(&self, path: &Path) -> io::Result<()>;

    /// Whether a file or directory exists at `path`.
    fn exists(&self, path: &Path) -> bool;

    /// Get metadata for a file or directory.
    fn metadata(&self, path: &Path) -> io::Result<Metadata>;

    /// Open a file for streaming reads.
    fn open(&self, path: &Path) -> io::Result<File>;

    /// Read the entire contents of a file into a string.
    fn read_to_string(&self, path: &Path) -> io::Result<String>;

    /// Write a slice of bytes to a file.
    fn write(&self, path: &Path, contents: impl AsRef<[u8]>) -> io::Result<()>;
}

/// Real filesystem implementation that delegates to std::fs.
#[derive(Debug, Clone, Copy, Default)]
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn copy(&self, from: &Path, to: &Path) -> io::Result<u64> {
        std::fs::copy(from, to)
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        std::fs::create_dir_all(path)
    }

    fn remove_dir_all(&self, path: &Path) -> io::Result<()> {
        match std::fs::remove_dir_all(path) {
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            other => other,
        }
    }

    fn remove_file(&self, path: &Path) -> io::Result<()> {
        match std::fs::remove_file(path) {
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            other => other,
        }
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn metadata(&self, path: &Path) -> io::Result<Metadata> {
        std::fs::metadata(path)
    }

    fn open(&self, path: &Path) -> io::Result<File> {
        File::open(path)
    }

    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }

    fn write(&self, path: &Path, contents: impl AsRef<[u8]>) -> io::Result<()> {
        std::fs::write(path, contents)
    }
}

/// Trait for abstracting command execution.
pub trait CommandExecutor {
    /// Execute a command and return its output (stdout, stderr, status).
    fn output(&self, cmd: &mut Command) -> io::Result<Output>;

    /// Execute a command built with a closure and return its output.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use crazybuild::infra::{CommandExecutor, RealCommandExecutor};
    ///
    /// let executor = RealCommandExecutor;
    /// let output = executor.execute(|cmd| {
    ///     cmd.arg("-batchmode")
    ///        .env("CRAZYBUILD_OUTPUT", "Builds/CrazyGamesRelease")
    /// }, "unity")?;
    /// # Ok::<(), std::io::Error>(())
    /// ```
    fn execute<F, P>(&self, builder: F, program: P) -> io::Result<Output>
    where
        F: FnOnce(&mut Command) -> &mut Command,
        P: AsRef<OsStr>,
    {
        let mut cmd = Command::new(program);
        builder(&mut cmd);
        self.output(&mut cmd)
    }
}

/// Real command executor that delegates to std::process::Command.
#[derive(Debug, Clone, Copy, Default)]
pub struct RealCommandExecutor;

impl CommandExecutor for RealCommandExecutor {
    fn output(&self, cmd: &mut Command) -> io::Result<Output> {
        cmd.output()
    }
}

/// Create an ExitStatus with the given exit code for use in test mocks.
#[cfg(all(test, unix))]
pub fn mock_exit_status(code: i32) -> std::process::ExitStatus {
    use std::os::unix::process::ExitStatusExt;
    std::process::ExitStatus::from_raw(code << 8)
}

#[cfg(all(test, windows))]
pub fn mock_exit_status(code: i32) -> std::process::ExitStatus {
    use std::os::windows::process::ExitStatusExt;
    std::process::ExitStatus::from_raw(code as u32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use tempfile::TempDir;

    #[test]
    fn test_real_filesystem_write_and_read() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("report.json");

        let fs = RealFileSystem;
        fs.write(&file_path, b"{\"ok\":true}").unwrap();

        assert_eq!(fs.read_to_string(&file_path).unwrap(), "{\"ok\":true}");
    }

    #[test]
    fn test_real_filesystem_copy_overwrites_destination() {
        let temp_dir = TempDir::new().unwrap();
        let source = temp_dir.path().join("game.data.br");
        let dest = temp_dir.path().join("astc_game.data.br");

        let fs = RealFileSystem;
        fs.write(&source, b"new content").unwrap();
        fs.write(&dest, b"old").unwrap();

        let bytes_copied = fs.copy(&source, &dest).unwrap();
        assert_eq!(bytes_copied, 11);
        assert_eq!(fs.read_to_string(&dest).unwrap(), "new content");
    }

    #[test]
    fn test_remove_dir_all_tolerates_missing_directory() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("Builds_cg_intermediate_build");

        let fs = RealFileSystem;
        assert!(fs.remove_dir_all(&missing).is_ok());
        // Retrying is equally harmless
        assert!(fs.remove_dir_all(&missing).is_ok());
    }

    #[test]
    fn test_remove_file_tolerates_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("report.json");

        let fs = RealFileSystem;
        fs.write(&path, b"{}").unwrap();
        fs.remove_file(&path).unwrap();
        assert!(!fs.exists(&path));
        assert!(fs.remove_file(&path).is_ok());
    }

    #[test]
    fn test_remove_dir_all_deletes_nested_content() {
        let temp_dir = TempDir::new().unwrap();
        let nested = temp_dir.path().join("out").join("Build");

        let fs = RealFileSystem;
        fs.create_dir_all(&nested).unwrap();
        fs.write(&nested.join("game.wasm"), b"wasm").unwrap();

        fs.remove_dir_all(&temp_dir.path().join("out")).unwrap();
        assert!(!fs.exists(&temp_dir.path().join("out")));
    }

    #[test]
    fn test_open_streams_file_content() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("stream.bin");

        let fs = RealFileSystem;
        fs.write(&path, [1u8, 2, 3, 4]).unwrap();

        let mut buf = Vec::new();
        fs.open(&path).unwrap().read_to_end(&mut buf).unwrap();
        assert_eq!(buf, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_real_filesystem_metadata_reports_length() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("game.loader.js");

        let fs = RealFileSystem;
        fs.write(&file_path, b"content").unwrap();

        let metadata = fs.metadata(&file_path).unwrap();
        assert!(metadata.is_file());
        assert_eq!(metadata.len(), 7);
    }

    #[test]
    fn test_real_filesystem_copy_nonexistent_file_returns_error() {
        let temp_dir = TempDir::new().unwrap();
        let fs = RealFileSystem;

        let result = fs.copy(
            Path::new("/nonexistent.data.br"),
            &temp_dir.path().join("dest"),
        );
        assert!(result.is_err());
    }

    #[test]
    #[cfg(unix)]
    fn test_real_command_executor_output_captures_stdout() {
        let executor = RealCommandExecutor;
        let output = executor.execute(|cmd| cmd.arg("hello"), "echo").unwrap();

        assert!(output.status.success());
        assert!(String::from_utf8_lossy(&output.stdout).contains("hello"));
    }

    #[test]
    fn test_real_command_executor_nonexistent_command_returns_error() {
        let executor = RealCommandExecutor;
        let mut cmd = Command::new("nonexistent_build_command_xyz_123");

        assert!(executor.output(&mut cmd).is_err());
    }

    #[test]
    #[cfg(unix)]
    fn test_mock_exit_status_encodes_code() {
        assert!(mock_exit_status(0).success());
        assert_eq!(mock_exit_status(3).code(), Some(3));
    }
}
