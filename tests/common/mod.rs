#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// A scratch repository for driving config resolution and the pipeline
/// end to end. Entries are laid out relative to the discovery root, with
/// intermediate directories appearing on demand — the same shape the
/// walker expects of a real checkout.
pub struct TestFixture {
    root: TempDir,
}

impl TestFixture {
    pub fn new() -> Self {
        Self {
            root: TempDir::new().expect("temp discovery root"),
        }
    }

    /// The discovery root handed to `ConfigResolver::resolve` and
    /// `pipeline::run`.
    pub fn path(&self) -> &Path {
        self.root.path()
    }

    /// Absolute path of an entry under the root.
    pub fn join(&self, rel: &str) -> PathBuf {
        self.root.path().join(rel)
    }

    /// Lay down a file under the root.
    pub fn create_file(&self, rel: &str, content: &str) {
        let path = self.join(rel);
        let parent = path.parent().expect("fixture entries sit under the root");
        fs::create_dir_all(parent).expect("fixture directory");
        fs::write(&path, content).expect("fixture file");
    }

    /// Create an empty directory tree under the root.
    pub fn create_dir(&self, rel: &str) {
        fs::create_dir_all(self.join(rel)).expect("fixture directory");
    }

    /// Write the `harvx.toml` the repo-config layer finds via its upward
    /// walk from the discovery root.
    pub fn create_config(&self, content: &str) {
        self.create_file("harvx.toml", content);
    }
}
