//! State snapshots for diff collaborators.
//!
//! The core pipeline only writes the boundary artifact:
//! `.harvx/state/<sanitized-profile>.json`, atomically, mode 0644. Diffing
//! against a previous snapshot is out of scope here.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::descriptor::FileDescriptor;
use crate::error::{HarvxError, Result};
use crate::output::write_atomic;

const STATE_DIR: &str = ".harvx/state";

/// Snapshot format version.
pub const STATE_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StateSnapshot {
    pub version: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generated_at: Option<String>,
    pub profile: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub git_branch: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub git_head_sha: Option<String>,
    pub files: BTreeMap<String, StateEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StateEntry {
    /// Zero-padded 16-hex-char hash of the processed content.
    pub content_hash: String,
    pub size: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mod_time: Option<u64>,
}

/// Replace anything outside `[a-zA-Z0-9_-]` so profile names are safe as
/// filenames.
#[must_use]
pub fn sanitize_profile_name(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// `<root>/.harvx/state/<sanitized-profile>.json`.
#[must_use]
pub fn snapshot_path(root: &Path, profile: &str) -> PathBuf {
    root.join(STATE_DIR)
        .join(format!("{}.json", sanitize_profile_name(profile)))
}

/// Assemble a snapshot from the included descriptors. Git branch and head
/// are best-effort; a missing repository leaves them unset.
#[must_use]
pub fn build_snapshot(
    root: &Path,
    profile: &str,
    generated_at: Option<&str>,
    files: &[FileDescriptor],
) -> StateSnapshot {
    let (git_branch, git_head_sha) = git_context(root);
    let entries = files
        .iter()
        .map(|fd| {
            let mod_time = std::fs::metadata(&fd.abs_path)
                .and_then(|m| m.modified())
                .ok()
                .and_then(|t| t.duration_since(std::time::UNIX_EPOCH).ok())
                .map(|d| d.as_secs());
            (
                fd.path.clone(),
                StateEntry {
                    content_hash: format!("{:016x}", fd.content_hash),
                    size: fd.size,
                    mod_time,
                },
            )
        })
        .collect();
    StateSnapshot {
        version: STATE_VERSION,
        generated_at: generated_at.map(String::from),
        profile: profile.to_string(),
        git_branch,
        git_head_sha,
        files: entries,
    }
}

/// Build and atomically write the snapshot; returns its path.
pub fn write_snapshot(
    root: &Path,
    profile: &str,
    generated_at: Option<&str>,
    files: &[FileDescriptor],
) -> Result<PathBuf> {
    let snapshot = build_snapshot(root, profile, generated_at, files);
    let path = snapshot_path(root, profile);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| HarvxError::io_with_context(e, parent.to_path_buf(), "create state dir"))?;
    }
    let json = serde_json::to_string_pretty(&snapshot)?;
    write_atomic(&path, json.as_bytes())?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let _ = std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o644));
    }
    Ok(path)
}

fn git_context(root: &Path) -> (Option<String>, Option<String>) {
    let Ok(repo) = gix::discover(root) else {
        return (None, None);
    };
    let branch = repo
        .head_name()
        .ok()
        .flatten()
        .map(|name| name.shorten().to_string());
    let head = repo.head_id().ok().map(|id| id.to_string());
    (branch, head)
}
