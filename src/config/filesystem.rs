//! Filesystem and environment abstraction for testability.

use std::path::{Path, PathBuf};

/// Trait for the host interactions config resolution needs.
pub trait FileSystem {
    /// Read file contents as a string.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read.
    fn read_to_string(&self, path: &Path) -> std::io::Result<String>;

    /// Check if a path exists.
    fn exists(&self, path: &Path) -> bool;

    /// Check if a path is a directory.
    fn is_dir(&self, path: &Path) -> bool;

    /// Platform-specific configuration directory for harvx:
    /// - Linux: `$XDG_CONFIG_HOME/harvx` (or `~/.config/harvx`)
    /// - Windows: `%APPDATA%\harvx`
    /// - macOS: `~/Library/Application Support/harvx`
    fn config_dir(&self) -> Option<PathBuf>;

    /// Read a process environment variable.
    fn env_var(&self, name: &str) -> Option<String>;
}

/// Real filesystem implementation.
#[derive(Debug, Default, Clone, Copy)]
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn read_to_string(&self, path: &Path) -> std::io::Result<String> {
        std::fs::read_to_string(path)
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn config_dir(&self) -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "harvx")
            .map(|dirs| dirs.config_dir().to_path_buf())
    }

    fn env_var(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}
