//! Atomic output writing.
//!
//! The temp file is created next to the destination so the final rename
//! never crosses a filesystem. A failed rename over an existing file
//! (Windows semantics) falls back to remove-then-rename.

use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::{HarvxError, Result};

/// Where rendered output goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputTarget {
    File(PathBuf),
    Stdout,
}

/// Write `bytes` to `path` via a sibling temp file plus rename.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let dir = path.parent().filter(|p| !p.as_os_str().is_empty());
    let file_name = path
        .file_name()
        .ok_or_else(|| HarvxError::Config(format!("invalid output path: {}", path.display())))?;
    let tmp = match dir {
        Some(dir) => dir.join(format!(".{}.tmp", file_name.to_string_lossy())),
        None => PathBuf::from(format!(".{}.tmp", file_name.to_string_lossy())),
    };

    std::fs::write(&tmp, bytes)
        .map_err(|e| HarvxError::io_with_context(e, tmp.clone(), "write temp file"))?;

    match std::fs::rename(&tmp, path) {
        Ok(()) => Ok(()),
        Err(rename_err) => {
            // Windows refuses to rename over an existing destination.
            if path.exists() && std::fs::remove_file(path).is_ok() {
                std::fs::rename(&tmp, path).map_err(|e| {
                    let _ = std::fs::remove_file(&tmp);
                    HarvxError::io_with_context(e, path.to_path_buf(), "rename output")
                })
            } else {
                let _ = std::fs::remove_file(&tmp);
                Err(HarvxError::io_with_context(
                    rename_err,
                    path.to_path_buf(),
                    "rename output",
                ))
            }
        }
    }
}

/// Write rendered bytes to the selected target. Stdout mode leaves all
/// diagnostics on stderr so the document stays pipeable.
pub fn write_output(target: &OutputTarget, bytes: &[u8]) -> Result<()> {
    match target {
        OutputTarget::File(path) => write_atomic(path, bytes),
        OutputTarget::Stdout => {
            let mut stdout = std::io::stdout().lock();
            stdout
                .write_all(bytes)
                .and_then(|()| stdout.flush())
                .map_err(|e| HarvxError::Io {
                    source: e,
                    path: None,
                    operation: Some("write stdout"),
                })
        }
    }
}
