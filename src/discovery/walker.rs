//! The two-phase filesystem walk.
//!
//! Phase 1 traverses depth-first, single-threaded, with entries sorted by
//! name so the result is deterministic regardless of platform iteration
//! order. Phase 2 loads surviving files' bytes on a rayon pool. Per-file
//! failures never abort the run; they land on the descriptor's `error`.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use rayon::prelude::*;

use crate::descriptor::FileDescriptor;
use crate::error::{HarvxError, Result};
use crate::language::LanguageRegistry;
use crate::path_utils::relative_display;
use crate::pipeline::CancelToken;

use super::binary::{exceeds_size_limit, is_binary_file};
use super::filter::PatternFilter;
use super::git::TrackedSet;
use super::ignore_chain::{GIT_DIR_NAME, IgnoreChain, Verdict};
use super::{SkipReason, SkippedFile};

pub(crate) struct Walker<'a> {
    root: PathBuf,
    chain: IgnoreChain,
    filter: &'a PatternFilter,
    registry: &'a LanguageRegistry,
    tracked: Option<TrackedSet>,
    max_file_size: u64,
    cancel: &'a CancelToken,
    visited_dirs: HashSet<PathBuf>,
    pub(crate) files: Vec<FileDescriptor>,
    pub(crate) skipped: Vec<SkippedFile>,
    pub(crate) warnings: Vec<String>,
}

impl<'a> Walker<'a> {
    pub(crate) fn new(
        root: PathBuf,
        chain: IgnoreChain,
        filter: &'a PatternFilter,
        registry: &'a LanguageRegistry,
        tracked: Option<TrackedSet>,
        max_file_size: u64,
        cancel: &'a CancelToken,
    ) -> Self {
        Self {
            root,
            chain,
            filter,
            registry,
            tracked,
            max_file_size,
            cancel,
            visited_dirs: HashSet::new(),
            files: Vec::new(),
            skipped: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub(crate) fn run(mut self) -> Result<Self> {
        if !self.root.is_dir() {
            return Err(HarvxError::RootNotADirectory(self.root.clone()));
        }
        let root = self.root.clone();
        self.walk_dir(&root)?;
        self.files.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(self)
    }

    fn walk_dir(&mut self, dir: &Path) -> Result<()> {
        self.cancel.check()?;

        // Cycle guard: symlinked directories resolve to a canonical path
        // already on the visited set.
        let canonical = dunce::canonicalize(dir).unwrap_or_else(|_| dir.to_path_buf());
        if !self.visited_dirs.insert(canonical) {
            self.skipped.push(SkippedFile {
                path: relative_display(dir, &self.root),
                reason: SkipReason::SymlinkLoop,
            });
            return Ok(());
        }

        self.chain.enter_dir(dir);
        let result = self.walk_entries(dir);
        self.chain.exit_dir();
        result
    }

    fn walk_entries(&mut self, dir: &Path) -> Result<()> {
        let entries = match std::fs::read_dir(dir) {
            Ok(rd) => rd,
            Err(err) => {
                tracing::debug!(dir = %dir.display(), error = %err, "unreadable directory");
                return Ok(());
            }
        };
        let mut entries: Vec<_> = entries.filter_map(std::result::Result::ok).collect();
        entries.sort_by_key(std::fs::DirEntry::file_name);

        for entry in entries {
            self.cancel.check()?;
            let path = entry.path();
            let Ok(meta) = entry.metadata() else {
                self.push_errored(&path, "failed to stat");
                continue;
            };
            if meta.file_type().is_symlink() {
                self.process_symlink(&path)?;
            } else if meta.is_dir() {
                self.process_dir(&path)?;
            } else if meta.is_file() {
                self.process_file(&path, meta.len(), false);
            }
        }
        Ok(())
    }

    fn process_dir(&mut self, path: &Path) -> Result<()> {
        if path.file_name().is_some_and(|n| n == GIT_DIR_NAME) {
            return Ok(());
        }
        let rel = relative_display(path, &self.root);
        let decision = self.chain.decide(path, &rel, true);
        if self.chain.should_prune(decision) {
            return Ok(());
        }
        self.walk_dir(path)
    }

    fn process_symlink(&mut self, path: &Path) -> Result<()> {
        let rel = relative_display(path, &self.root);
        let Ok(meta) = std::fs::metadata(path) else {
            self.skipped.push(SkippedFile {
                path: rel,
                reason: SkipReason::SymlinkDangling,
            });
            return Ok(());
        };
        if meta.is_dir() {
            match dunce::canonicalize(path) {
                Ok(canonical) if self.visited_dirs.contains(&canonical) => {
                    self.skipped.push(SkippedFile {
                        path: rel,
                        reason: SkipReason::SymlinkLoop,
                    });
                    Ok(())
                }
                Ok(_) => self.process_dir(path),
                Err(_) => {
                    self.skipped.push(SkippedFile {
                        path: rel,
                        reason: SkipReason::SymlinkDangling,
                    });
                    Ok(())
                }
            }
        } else {
            self.process_file(path, meta.len(), true);
            Ok(())
        }
    }

    fn process_file(&mut self, path: &Path, size: u64, is_symlink: bool) {
        let rel = relative_display(path, &self.root);
        let sensitive = self.chain.is_sensitive(&rel);

        let decision = self.chain.decide(path, &rel, false);
        if decision.verdict == Verdict::Ignore {
            if decision.by_sensitive && self.filter.include_matches(&rel) {
                self.warnings
                    .push(format!("sensitive file included by profile override: {rel}"));
            } else {
                self.skipped.push(SkippedFile {
                    path: rel,
                    reason: if decision.by_sensitive {
                        SkipReason::Sensitive
                    } else {
                        SkipReason::Ignored
                    },
                });
                return;
            }
        }

        if !self.filter.should_include(&rel) {
            self.skipped.push(SkippedFile {
                path: rel,
                reason: SkipReason::Filtered,
            });
            return;
        }

        if let Some(tracked) = &self.tracked
            && !tracked.contains(&rel)
        {
            self.skipped.push(SkippedFile {
                path: rel,
                reason: SkipReason::NotTracked,
            });
            return;
        }

        if exceeds_size_limit(size, self.max_file_size) {
            self.skipped.push(SkippedFile {
                path: rel,
                reason: SkipReason::TooLarge,
            });
            return;
        }

        match is_binary_file(path) {
            Ok(true) => {
                self.skipped.push(SkippedFile {
                    path: rel,
                    reason: SkipReason::Binary,
                });
            }
            Ok(false) => {
                let mut fd = FileDescriptor::new(rel.clone(), path.to_path_buf(), size);
                fd.is_symlink = is_symlink;
                fd.sensitive = sensitive;
                fd.language = self.registry.detect(&rel).to_string();
                self.files.push(fd);
            }
            Err(err) => {
                self.push_errored(path, &err.to_string());
            }
        }
    }

    fn push_errored(&mut self, path: &Path, error: &str) {
        let rel = relative_display(path, &self.root);
        let mut fd = FileDescriptor::new(rel, path.to_path_buf(), 0);
        fd.error = Some(error.to_string());
        self.files.push(fd);
    }
}

/// Phase 2: load surviving files' bytes on a bounded pool. Each worker
/// writes only its own descriptor.
pub(crate) fn load_contents(files: &mut [FileDescriptor], cancel: &CancelToken) -> Result<()> {
    files.par_iter_mut().for_each(|fd| {
        if cancel.is_cancelled() || fd.error.is_some() {
            return;
        }
        match std::fs::read(&fd.abs_path) {
            Ok(bytes) => fd.content = String::from_utf8_lossy(&bytes).into_owned(),
            Err(err) => fd.error = Some(err.to_string()),
        }
    });
    cancel.check()
}
