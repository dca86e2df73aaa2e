//! Git-tracked-file restriction.

use std::collections::HashSet;
use std::path::Path;

use gix::bstr::ByteSlice;

use crate::error::{HarvxError, Result};
use crate::path_utils::normalize_separators;

/// The set of index-tracked paths, relative to the discovery root with
/// forward slashes. Loaded once per run.
#[derive(Debug)]
pub struct TrackedSet {
    paths: HashSet<String>,
}

impl TrackedSet {
    /// Read the git index of the repository containing `root`.
    ///
    /// # Errors
    /// Returns a git error when `root` is not inside a repository or the
    /// index cannot be read.
    pub fn load(root: &Path) -> Result<Self> {
        let repo = gix::discover(root)
            .map_err(|e| HarvxError::Git(format!("failed to discover git repository: {e}")))?;
        let workdir = repo
            .workdir()
            .ok_or_else(|| HarvxError::Git("repository has no working directory".to_string()))?
            .to_path_buf();
        let index = repo
            .index_or_empty()
            .map_err(|e| HarvxError::Git(format!("failed to read git index: {e}")))?;

        let workdir_abs = dunce::canonicalize(&workdir).unwrap_or(workdir);
        let root_abs = dunce::canonicalize(root).unwrap_or_else(|_| root.to_path_buf());
        let prefix = root_abs
            .strip_prefix(&workdir_abs)
            .map(|p| normalize_separators(&p.to_string_lossy()))
            .unwrap_or_default();

        let mut paths = HashSet::new();
        for entry in index.entries() {
            let entry_path = entry.path(&index);
            let entry_path = entry_path.to_str_lossy();
            if prefix.is_empty() {
                paths.insert(entry_path.into_owned());
            } else if let Some(rel) = entry_path.strip_prefix(&format!("{prefix}/")) {
                paths.insert(rel.to_string());
            }
        }
        Ok(Self { paths })
    }

    #[must_use]
    pub fn contains(&self, rel: &str) -> bool {
        self.paths.contains(rel)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn load_outside_a_repository_is_a_git_error() {
        let dir = TempDir::new().unwrap();
        let err = TrackedSet::load(dir.path()).unwrap_err();
        assert!(matches!(err, HarvxError::Git(_)));
    }
}
