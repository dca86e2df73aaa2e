//! The per-file record passed between pipeline stages.

use std::path::PathBuf;

/// Tier assigned to files no tier pattern matches.
pub const DEFAULT_TIER: u8 = 2;

/// Highest valid tier number.
pub const MAX_TIER: u8 = 5;

/// A discovered file flowing through the pipeline.
///
/// Created by discovery, mutated by at most one stage at a time: relevance
/// assigns `tier`, redaction rewrites `content` and sets `redactions`,
/// compression may replace `content`, token counting writes `token_count`.
/// `content` always holds the *processed* text; original bytes are never
/// retained once a stage has transformed them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDescriptor {
    /// Path relative to the discovery root, forward slashes on every platform.
    pub path: String,
    /// Absolute filesystem path used for I/O.
    pub abs_path: PathBuf,
    /// Byte length at stat time.
    pub size: u64,
    pub tier: u8,
    /// Token count of `content` (not the original bytes).
    pub token_count: usize,
    /// 64-bit hash of the processed content.
    pub content_hash: u64,
    pub content: String,
    pub is_compressed: bool,
    pub is_binary: bool,
    pub is_symlink: bool,
    /// Matched the built-in sensitive-file set but was re-included by the
    /// profile; triggers heightened redaction scanning.
    pub sensitive: bool,
    /// Number of redaction markers applied to this file.
    pub redactions: usize,
    /// Language tag derived from the extension; empty when unknown.
    pub language: String,
    /// Non-fatal per-file failure (e.g. read error). Excludes the file from
    /// rendered output without aborting the pipeline.
    pub error: Option<String>,
}

impl Default for FileDescriptor {
    fn default() -> Self {
        Self {
            path: String::new(),
            abs_path: PathBuf::new(),
            size: 0,
            tier: DEFAULT_TIER,
            token_count: 0,
            content_hash: 0,
            content: String::new(),
            is_compressed: false,
            is_binary: false,
            is_symlink: false,
            sensitive: false,
            redactions: 0,
            language: String::new(),
            error: None,
        }
    }
}

impl FileDescriptor {
    #[must_use]
    pub fn new(path: String, abs_path: PathBuf, size: u64) -> Self {
        Self {
            path,
            abs_path,
            size,
            ..Self::default()
        }
    }

    /// Whether this file may appear in rendered output.
    #[must_use]
    pub const fn renderable(&self) -> bool {
        !self.is_binary && self.error.is_none()
    }
}
