//! Include/exclude/extension filtering.
//!
//! Include and extension filters are OR-combined; exclude patterns always
//! win. Globs use `/` separators on every platform.

use globset::{Glob, GlobSet, GlobSetBuilder};

use crate::error::{HarvxError, Result};

#[derive(Debug)]
pub struct PatternFilter {
    include: GlobSet,
    include_empty: bool,
    exclude: GlobSet,
    extensions: Vec<String>,
}

impl PatternFilter {
    /// Compile the filter.
    ///
    /// # Errors
    /// Returns an error if any pattern is invalid.
    pub fn new(include: &[String], exclude: &[String], extensions: &[String]) -> Result<Self> {
        Ok(Self {
            include: build_set(include)?,
            include_empty: include.is_empty(),
            exclude: build_set(exclude)?,
            extensions: extensions
                .iter()
                .map(|e| e.trim_start_matches('.').to_ascii_lowercase())
                .collect(),
        })
    }

    /// Whether a relative path passes the filter.
    #[must_use]
    pub fn should_include(&self, rel: &str) -> bool {
        if self.exclude.is_match(rel) {
            return false;
        }
        if self.include_empty && self.extensions.is_empty() {
            return true;
        }
        self.include_matches(rel) || self.has_valid_extension(rel)
    }

    /// Whether an explicit include glob matches. Used to re-admit
    /// sensitive files the default ignore would drop.
    #[must_use]
    pub fn include_matches(&self, rel: &str) -> bool {
        !self.include_empty && self.include.is_match(rel)
    }

    fn has_valid_extension(&self, rel: &str) -> bool {
        if self.extensions.is_empty() {
            return false;
        }
        let filename = rel.rsplit('/').next().unwrap_or(rel);
        filename
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .is_some_and(|ext| self.extensions.contains(&ext))
    }
}

fn build_set(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern).map_err(|e| HarvxError::InvalidPattern {
            pattern: pattern.clone(),
            source: e,
        })?;
        builder.add(glob);
    }
    builder.build().map_err(|e| HarvxError::InvalidPattern {
        pattern: "combined patterns".to_string(),
        source: e,
    })
}

#[cfg(test)]
#[path = "filter_tests.rs"]
mod tests;
