//! In-memory filesystem/environment double for config tests.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use super::filesystem::FileSystem;

#[derive(Debug, Default, Clone)]
pub struct MockFileSystem {
    files: HashMap<PathBuf, String>,
    dirs: Vec<PathBuf>,
    config_dir: Option<PathBuf>,
    env: HashMap<String, String>,
}

impl MockFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_file(mut self, path: &str, content: &str) -> Self {
        let path = PathBuf::from(path);
        if let Some(parent) = path.parent() {
            let mut dir = parent.to_path_buf();
            loop {
                if !self.dirs.contains(&dir) {
                    self.dirs.push(dir.clone());
                }
                match dir.parent() {
                    Some(p) => dir = p.to_path_buf(),
                    None => break,
                }
            }
        }
        self.files.insert(path, content.to_string());
        self
    }

    #[must_use]
    pub fn with_dir(mut self, path: &str) -> Self {
        self.dirs.push(PathBuf::from(path));
        self
    }

    #[must_use]
    pub fn with_config_dir(mut self, path: &str) -> Self {
        self.config_dir = Some(PathBuf::from(path));
        self
    }

    #[must_use]
    pub fn with_env(mut self, name: &str, value: &str) -> Self {
        self.env.insert(name.to_string(), value.to_string());
        self
    }
}

impl FileSystem for MockFileSystem {
    fn read_to_string(&self, path: &Path) -> std::io::Result<String> {
        self.files.get(path).cloned().ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::NotFound, "no such mock file")
        })
    }

    fn exists(&self, path: &Path) -> bool {
        self.files.contains_key(path) || self.dirs.iter().any(|d| d == path)
    }

    fn is_dir(&self, path: &Path) -> bool {
        self.dirs.iter().any(|d| d == path)
    }

    fn config_dir(&self) -> Option<PathBuf> {
        self.config_dir.clone()
    }

    fn env_var(&self, name: &str) -> Option<String> {
        self.env.get(name).cloned()
    }
}
