//! Relevance classification: glob-based tier assignment.
//!
//! Tiers are evaluated ascending and patterns in definition order; the
//! first tier with any matching pattern wins, so higher-priority tiers
//! never lose to lower ones. Unmatched files land on
//! [`DEFAULT_TIER`](crate::descriptor::DEFAULT_TIER).

use globset::{Glob, GlobMatcher};

use crate::config::{Profile, TierConfig};
use crate::descriptor::{DEFAULT_TIER, FileDescriptor};
use crate::error::{HarvxError, Result};

/// One tier's glob patterns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TierDefinition {
    pub tier: u8,
    pub patterns: Vec<String>,
}

/// Diagnostic output of [`TierMatcher::explain`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TierExplanation {
    pub tier: u8,
    /// The winning (tier, pattern) pair; `None` for the tier-2 default.
    pub matched: Option<(u8, String)>,
    /// Every (tier, pattern) pair that would have matched.
    pub candidates: Vec<(u8, String)>,
}

struct CompiledTier {
    tier: u8,
    patterns: Vec<(String, GlobMatcher)>,
}

pub struct TierMatcher {
    tiers: Vec<CompiledTier>,
}

impl TierMatcher {
    /// Compile tier definitions, sorted ascending by tier number.
    ///
    /// # Errors
    /// Returns an error for globs that do not compile.
    pub fn new(definitions: &[TierDefinition]) -> Result<Self> {
        let mut sorted: Vec<&TierDefinition> = definitions.iter().collect();
        sorted.sort_by_key(|d| d.tier);

        let mut tiers = Vec::with_capacity(sorted.len());
        for definition in sorted {
            let mut patterns = Vec::with_capacity(definition.patterns.len());
            for pattern in &definition.patterns {
                let matcher = Glob::new(pattern)
                    .map_err(|e| HarvxError::InvalidPattern {
                        pattern: pattern.clone(),
                        source: e,
                    })?
                    .compile_matcher();
                patterns.push((pattern.clone(), matcher));
            }
            tiers.push(CompiledTier {
                tier: definition.tier,
                patterns,
            });
        }
        Ok(Self { tiers })
    }

    /// Build from a profile: its `[[tiers]]` table when present, otherwise
    /// the built-in defaults. `priority_files` prepend to tier 0.
    pub fn from_profile(profile: &Profile) -> Result<Self> {
        let mut definitions = if profile.tiers.is_empty() {
            default_tiers()
        } else {
            profile
                .tiers
                .iter()
                .map(|t: &TierConfig| TierDefinition {
                    tier: t.tier,
                    patterns: t.patterns.clone(),
                })
                .collect()
        };
        if !profile.priority_files.is_empty() {
            definitions.insert(
                0,
                TierDefinition {
                    tier: 0,
                    patterns: profile.priority_files.clone(),
                },
            );
        }
        Self::new(&definitions)
    }

    /// First-match-wins tier for a relative path.
    #[must_use]
    pub fn classify(&self, path: &str) -> u8 {
        for tier in &self.tiers {
            for (_, matcher) in &tier.patterns {
                if matcher.is_match(path) {
                    return tier.tier;
                }
            }
        }
        DEFAULT_TIER
    }

    /// The chosen tier, the winning pattern, and every candidate pair.
    #[must_use]
    pub fn explain(&self, path: &str) -> TierExplanation {
        let mut matched = None;
        let mut candidates = Vec::new();
        for tier in &self.tiers {
            for (pattern, matcher) in &tier.patterns {
                if matcher.is_match(path) {
                    if matched.is_none() {
                        matched = Some((tier.tier, pattern.clone()));
                    }
                    candidates.push((tier.tier, pattern.clone()));
                }
            }
        }
        TierExplanation {
            tier: matched.as_ref().map_or(DEFAULT_TIER, |(t, _)| *t),
            matched,
            candidates,
        }
    }

    /// Assign tiers and produce the stable (tier, path) order. The input
    /// slice is never mutated.
    #[must_use]
    pub fn sorted_by_relevance(&self, files: &[FileDescriptor]) -> Vec<FileDescriptor> {
        let mut out: Vec<FileDescriptor> = files
            .iter()
            .map(|fd| {
                let mut fd = fd.clone();
                fd.tier = self.classify(&fd.path);
                fd
            })
            .collect();
        out.sort_by(|a, b| a.tier.cmp(&b.tier).then_with(|| a.path.cmp(&b.path)));
        out
    }
}

/// Built-in tier table, used when the profile supplies none.
#[must_use]
pub fn default_tiers() -> Vec<TierDefinition> {
    let patterns = |items: &[&str]| items.iter().map(|s| (*s).to_string()).collect::<Vec<_>>();
    vec![
        TierDefinition {
            tier: 0,
            patterns: patterns(&[
                "CLAUDE.md",
                "AGENTS.md",
                "package.json",
                "go.mod",
                "Cargo.toml",
                "pyproject.toml",
                "Gemfile",
                "Dockerfile",
                "Makefile",
                "*.config.*",
            ]),
        },
        TierDefinition {
            tier: 1,
            patterns: patterns(&[
                "src/**",
                "app/**",
                "internal/**",
                "lib/**",
                "cmd/**",
                "pkg/**",
            ]),
        },
        TierDefinition {
            tier: 3,
            patterns: patterns(&[
                "**/*_test.*",
                "**/*.test.*",
                "**/*.spec.*",
                "**/__tests__/**",
                "tests/**",
                "test/**",
            ]),
        },
        TierDefinition {
            tier: 4,
            patterns: patterns(&["**/*.md", "docs/**", "README*", "LICENSE*"]),
        },
        TierDefinition {
            tier: 5,
            patterns: patterns(&[
                ".github/**",
                ".gitlab-ci.yml",
                "*.lock",
                "package-lock.json",
                "yarn.lock",
                "pnpm-lock.yaml",
                "vendor/**",
                "**/*.min.js",
                "**/*.snap",
            ]),
        },
    ]
}

#[cfg(test)]
#[path = "relevance_tests.rs"]
mod tests;
