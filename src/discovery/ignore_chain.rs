//! The hierarchical ignore chain.
//!
//! Ordered members: default-ignore (build/VCS/cache directories plus the
//! sensitive-file set), profile-ignore, hierarchical `.gitignore`s, then
//! hierarchical `.harvxignore`s. Each member speaks gitignore: patterns,
//! `!` negation, trailing-`/` directory-only, `**`, comments.
//!
//! Verdict folding is last-definitive-match-wins across members in chain
//! order, so a `.harvxignore` negation re-admits a path a `.gitignore`
//! excluded. A member with no opinion leaves the previous verdict intact.

use std::path::Path;

use ignore::gitignore::{Gitignore, GitignoreBuilder};

use crate::error::{HarvxError, Result};

/// Paths the default member always excludes: build/VCS/cache directories
/// plus VCS metadata files.
pub const DEFAULT_IGNORE_DIRS: &[&str] = &[
    ".git/",
    ".hg/",
    ".svn/",
    "node_modules/",
    "target/",
    "dist/",
    "build/",
    "out/",
    ".venv/",
    "venv/",
    "__pycache__/",
    ".idea/",
    ".vscode/",
    ".next/",
    ".cache/",
    ".tox/",
    ".mypy_cache/",
    ".pytest_cache/",
    ".gradle/",
    "coverage/",
    ".terraform/",
    ".gitignore",
    ".gitattributes",
    ".gitmodules",
    ".harvxignore",
    ".DS_Store",
];

/// File patterns that mark a path as sensitive. Skipped by default; a
/// profile `include` glob re-admits them under heightened redaction.
pub const SENSITIVE_PATTERNS: &[&str] = &[
    ".env*",
    "*.pem",
    "*.key",
    "*.p12",
    "*.pfx",
    "*.jks",
    "*.keystore",
    "id_rsa*",
    "id_ecdsa*",
    "id_ed25519*",
    "*secret*",
    "*credential*",
    "*password*",
    ".htpasswd",
    ".netrc",
];

/// Ignore filename honored alongside `.gitignore`.
pub const HARVX_IGNORE_NAME: &str = ".harvxignore";

/// Chain member ranks, in evaluation order.
const RANK_DEFAULT: usize = 0;
const RANK_PROFILE: usize = 1;
const RANK_GITIGNORE: usize = 2;
const RANK_HARVXIGNORE: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    None,
    Ignore,
    Whitelist,
}

/// The folded decision for one path.
#[derive(Debug, Clone, Copy)]
pub struct ChainDecision {
    pub verdict: Verdict,
    /// Rank of the member that produced the final definitive verdict.
    rank: usize,
    /// Whether the deciding ignore came from the sensitive-file set.
    pub by_sensitive: bool,
}

struct Frame {
    pushed_git: bool,
    pushed_harvx: bool,
}

/// Compile a gitignore-semantics matcher from literal pattern lines.
/// Rooted at the empty path so it matches relative candidate paths.
pub fn matcher_from_patterns(patterns: &[impl AsRef<str>]) -> Result<Gitignore> {
    let mut builder = GitignoreBuilder::new("");
    for pattern in patterns {
        builder
            .add_line(None, pattern.as_ref())
            .map_err(|e| HarvxError::Config(format!(
                "invalid ignore pattern '{}': {e}",
                pattern.as_ref()
            )))?;
    }
    builder
        .build()
        .map_err(|e| HarvxError::Config(format!("failed to build ignore matcher: {e}")))
}

/// The sensitive-file matcher, shared with the redaction engine for
/// heightened-mode detection.
pub fn sensitive_matcher() -> Gitignore {
    // The pattern set is a compile-time constant; building cannot fail.
    matcher_from_patterns(SENSITIVE_PATTERNS).unwrap_or_else(|_| Gitignore::empty())
}

pub struct IgnoreChain {
    default_dirs: Gitignore,
    sensitive: Gitignore,
    profile: Option<Gitignore>,
    use_gitignore: bool,
    git_stack: Vec<Gitignore>,
    harvx_stack: Vec<Gitignore>,
    frames: Vec<Frame>,
}

impl IgnoreChain {
    pub fn new(profile_ignore: &[String], use_gitignore: bool) -> Result<Self> {
        let profile = if profile_ignore.is_empty() {
            None
        } else {
            Some(matcher_from_patterns(profile_ignore)?)
        };
        Ok(Self {
            default_dirs: matcher_from_patterns(DEFAULT_IGNORE_DIRS)?,
            sensitive: matcher_from_patterns(SENSITIVE_PATTERNS)?,
            profile,
            use_gitignore,
            git_stack: Vec::new(),
            harvx_stack: Vec::new(),
            frames: Vec::new(),
        })
    }

    /// Load this directory's ignore files onto the hierarchy stacks.
    pub fn enter_dir(&mut self, dir: &Path) {
        let pushed_git = self.use_gitignore && self.push_file(dir, ".gitignore", true);
        let pushed_harvx = self.push_file(dir, HARVX_IGNORE_NAME, false);
        self.frames.push(Frame {
            pushed_git,
            pushed_harvx,
        });
    }

    pub fn exit_dir(&mut self) {
        if let Some(frame) = self.frames.pop() {
            if frame.pushed_git {
                self.git_stack.pop();
            }
            if frame.pushed_harvx {
                self.harvx_stack.pop();
            }
        }
    }

    fn push_file(&mut self, dir: &Path, name: &str, git: bool) -> bool {
        let path = dir.join(name);
        if !path.is_file() {
            return false;
        }
        let mut builder = GitignoreBuilder::new(dir);
        if let Some(err) = builder.add(&path) {
            tracing::warn!(path = %path.display(), error = %err, "skipping unreadable ignore file");
            return false;
        }
        match builder.build() {
            Ok(matcher) => {
                if git {
                    self.git_stack.push(matcher);
                } else {
                    self.harvx_stack.push(matcher);
                }
                true
            }
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "skipping invalid ignore file");
                false
            }
        }
    }

    /// Fold the chain for one path. `abs` feeds the per-directory file
    /// members (rooted at their directory); `rel` feeds the pattern-list
    /// members (rooted at the walk root).
    pub fn decide(&self, abs: &Path, rel: &str, is_dir: bool) -> ChainDecision {
        let mut decision = ChainDecision {
            verdict: Verdict::None,
            rank: RANK_DEFAULT,
            by_sensitive: false,
        };

        Self::fold(&mut decision, &self.default_dirs, rel, is_dir, RANK_DEFAULT, false);
        if !is_dir {
            Self::fold(&mut decision, &self.sensitive, rel, is_dir, RANK_DEFAULT, true);
        }
        if let Some(profile) = &self.profile {
            Self::fold(&mut decision, profile, rel, is_dir, RANK_PROFILE, false);
        }
        for member in &self.git_stack {
            Self::fold_path(&mut decision, member, abs, is_dir, RANK_GITIGNORE);
        }
        for member in &self.harvx_stack {
            Self::fold_path(&mut decision, member, abs, is_dir, RANK_HARVXIGNORE);
        }

        decision
    }

    // Parent-aware matching so a file under an ignored directory still
    // reads as ignored when a later whitelist forced the walker to descend.
    fn fold(
        decision: &mut ChainDecision,
        member: &Gitignore,
        rel: &str,
        is_dir: bool,
        rank: usize,
        sensitive: bool,
    ) {
        match member.matched_path_or_any_parents(rel, is_dir) {
            ignore::Match::None => {}
            ignore::Match::Ignore(_) => {
                decision.verdict = Verdict::Ignore;
                decision.rank = rank;
                decision.by_sensitive = sensitive;
            }
            ignore::Match::Whitelist(_) => {
                decision.verdict = Verdict::Whitelist;
                decision.rank = rank;
                decision.by_sensitive = false;
            }
        }
    }

    fn fold_path(
        decision: &mut ChainDecision,
        member: &Gitignore,
        abs: &Path,
        is_dir: bool,
        rank: usize,
    ) {
        match member.matched_path_or_any_parents(abs, is_dir) {
            ignore::Match::None => {}
            ignore::Match::Ignore(_) => {
                decision.verdict = Verdict::Ignore;
                decision.rank = rank;
                decision.by_sensitive = false;
            }
            ignore::Match::Whitelist(_) => {
                decision.verdict = Verdict::Whitelist;
                decision.rank = rank;
                decision.by_sensitive = false;
            }
        }
    }

    /// Whether an ignored directory may be pruned outright. Descends instead
    /// when any member ranked after the deciding one carries negations, so a
    /// deeper whitelist can still re-admit content (scenario: `.gitignore`
    /// excludes `dist/` while `.harvxignore` re-admits `dist/out.js`).
    pub fn should_prune(&self, decision: ChainDecision) -> bool {
        if decision.verdict != Verdict::Ignore {
            return false;
        }
        !self.whitelists_after(decision.rank)
    }

    fn whitelists_after(&self, rank: usize) -> bool {
        let profile_whitelists = self
            .profile
            .as_ref()
            .is_some_and(|m| m.num_whitelists() > 0);
        let git_whitelists = self.git_stack.iter().any(|m| m.num_whitelists() > 0);
        let harvx_whitelists = self.harvx_stack.iter().any(|m| m.num_whitelists() > 0);
        match rank {
            RANK_DEFAULT => profile_whitelists || git_whitelists || harvx_whitelists,
            RANK_PROFILE => git_whitelists || harvx_whitelists,
            RANK_GITIGNORE => harvx_whitelists,
            _ => false,
        }
    }

    /// Whether the path matches the sensitive-file set, regardless of the
    /// chain outcome. Drives heightened redaction.
    pub fn is_sensitive(&self, rel: &str) -> bool {
        matches!(self.sensitive.matched(rel, false), ignore::Match::Ignore(_))
    }
}

/// Marker for pruned paths kept out of [`IgnoreChain`]: `.git` is special-
/// cased by the walker and never consulted against the chain.
pub const GIT_DIR_NAME: &str = ".git";

#[cfg(test)]
#[path = "ignore_chain_tests.rs"]
mod tests;
