mod binary;
mod filter;
mod git;
mod ignore_chain;
mod walker;

pub use binary::{BINARY_SNIFF_LEN, exceeds_size_limit, is_binary_file};
pub use filter::PatternFilter;
pub use git::TrackedSet;
pub use ignore_chain::{
    DEFAULT_IGNORE_DIRS, HARVX_IGNORE_NAME, IgnoreChain, SENSITIVE_PATTERNS, Verdict,
    sensitive_matcher,
};

use std::collections::BTreeMap;
use std::path::Path;

use crate::config::Profile;
use crate::descriptor::FileDescriptor;
use crate::error::Result;
use crate::language::LanguageRegistry;
use crate::pipeline::CancelToken;

/// Why a path was dropped during discovery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SkipReason {
    /// Excluded by the ignore chain.
    Ignored,
    /// Matched the built-in sensitive-file set.
    Sensitive,
    /// Rejected by the include/exclude/extension filter.
    Filtered,
    /// Not in the git index while `git_tracked_only` is set.
    NotTracked,
    /// Over the large-file threshold.
    TooLarge,
    /// Null byte in the sniff window.
    Binary,
    SymlinkLoop,
    SymlinkDangling,
}

impl SkipReason {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ignored => "ignored",
            Self::Sensitive => "sensitive",
            Self::Filtered => "filtered",
            Self::NotTracked => "not_tracked",
            Self::TooLarge => "too_large",
            Self::Binary => "binary",
            Self::SymlinkLoop => "symlink_loop",
            Self::SymlinkDangling => "symlink_dangling",
        }
    }
}

#[derive(Debug, Clone)]
pub struct SkippedFile {
    pub path: String,
    pub reason: SkipReason,
}

/// Aggregate skip counts by reason.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SkipStats {
    pub by_reason: BTreeMap<&'static str, usize>,
    pub total: usize,
}

/// Output of the discovery stage.
#[derive(Debug)]
pub struct DiscoveryResult {
    /// Surviving descriptors, sorted ascending by relative path.
    pub files: Vec<FileDescriptor>,
    pub skipped: Vec<SkippedFile>,
    pub warnings: Vec<String>,
}

impl DiscoveryResult {
    #[must_use]
    pub fn stats(&self) -> SkipStats {
        let mut stats = SkipStats::default();
        for skip in &self.skipped {
            *stats.by_reason.entry(skip.reason.as_str()).or_insert(0) += 1;
            stats.total += 1;
        }
        stats
    }
}

/// Walk `root` according to the profile, then load surviving files'
/// contents in parallel.
///
/// # Errors
/// Fatal when `root` is not a directory, a profile glob fails to compile,
/// the git index is required but unreadable, or the run is cancelled.
/// Per-file I/O failures are recorded on the descriptors instead.
pub fn discover(
    root: &Path,
    profile: &Profile,
    registry: &LanguageRegistry,
    cancel: &CancelToken,
) -> Result<DiscoveryResult> {
    let chain = IgnoreChain::new(&profile.ignore, profile.use_gitignore)?;
    let filter = PatternFilter::new(&profile.include, &profile.exclude, &profile.extensions)?;
    let tracked = if profile.git_tracked_only {
        Some(TrackedSet::load(root)?)
    } else {
        None
    };

    let walker = walker::Walker::new(
        root.to_path_buf(),
        chain,
        &filter,
        registry,
        tracked,
        profile.max_file_size,
        cancel,
    )
    .run()?;

    let mut result = DiscoveryResult {
        files: walker.files,
        skipped: walker.skipped,
        warnings: walker.warnings,
    };
    walker::load_contents(&mut result.files, cancel)?;

    tracing::debug!(
        files = result.files.len(),
        skipped = result.skipped.len(),
        "discovery complete"
    );
    Ok(result)
}

#[cfg(test)]
#[path = "walker_tests.rs"]
mod walker_tests;
