//! Token budget enforcement.
//!
//! Runs single-threaded over the relevance-sorted slice. The `skip`
//! strategy keeps scanning past files that do not fit so smaller later
//! files still make it in; `truncate` cuts the first misfit down to the
//! largest whole-line prefix that fits and excludes everything after it.
//! Input descriptors are never mutated; truncation produces a shallow copy.

use std::collections::BTreeMap;

use crate::descriptor::FileDescriptor;
use crate::tokenizer::Tokenizer;

/// Fixed token estimate for the document header and directory tree.
pub const OVERHEAD_BASE: usize = 200;

/// Additional per-file token estimate for section headers.
pub const OVERHEAD_PER_FILE: usize = 35;

/// Tokens reserved for the truncation marker itself.
pub const TRUNCATION_RESERVE: usize = 20;

/// Estimated tokens consumed outside file content.
#[must_use]
pub const fn estimate_overhead(file_count: usize) -> usize {
    OVERHEAD_BASE + OVERHEAD_PER_FILE * file_count
}

/// Render the literal truncation marker.
#[must_use]
pub fn truncation_marker(shown: usize, original: usize) -> String {
    format!("<!-- Content truncated: {shown} of {original} tokens shown -->")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BudgetStrategy {
    #[default]
    Skip,
    Truncate,
}

impl BudgetStrategy {
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "skip" => Some(Self::Skip),
            "truncate" => Some(Self::Truncate),
            _ => None,
        }
    }
}

/// Per-tier slice of the included set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TierTotals {
    pub files: usize,
    pub tokens: usize,
}

/// Result of budget enforcement. `included` and `excluded` partition the
/// input; at most one included file is truncated.
#[derive(Debug)]
pub struct BudgetOutcome {
    pub included: Vec<FileDescriptor>,
    pub excluded: Vec<FileDescriptor>,
    /// Path of the single truncated file, if any.
    pub truncated: Option<String>,
    /// Σ included token counts.
    pub total_tokens: usize,
    pub overhead: usize,
    /// May be negative when the overhead alone exceeds the budget.
    pub budget_remaining: i64,
    pub tier_summary: BTreeMap<u8, TierTotals>,
}

pub struct BudgetEnforcer {
    max_tokens: i64,
    strategy: BudgetStrategy,
}

impl BudgetEnforcer {
    #[must_use]
    pub const fn new(max_tokens: i64, strategy: BudgetStrategy) -> Self {
        Self {
            max_tokens,
            strategy,
        }
    }

    /// Apply the budget to relevance-ordered descriptors.
    ///
    /// `max_tokens <= 0` disables enforcement entirely.
    #[must_use]
    pub fn enforce(
        &self,
        files: Vec<FileDescriptor>,
        tokenizer: &dyn Tokenizer,
    ) -> BudgetOutcome {
        if self.max_tokens <= 0 {
            return Self::pass_through(files);
        }

        let overhead = estimate_overhead(files.len());
        #[allow(clippy::cast_possible_wrap)]
        let remaining = self.max_tokens - overhead as i64;

        let outcome = match self.strategy {
            BudgetStrategy::Skip => Self::enforce_skip(files, remaining),
            BudgetStrategy::Truncate => Self::enforce_truncate(files, remaining, tokenizer),
        };

        let total_tokens: usize = outcome.0.iter().map(|f| f.token_count).sum();
        let tier_summary = summarize(&outcome.0);
        #[allow(clippy::cast_possible_wrap)]
        let budget_remaining = remaining - total_tokens as i64;
        BudgetOutcome {
            included: outcome.0,
            excluded: outcome.1,
            truncated: outcome.2,
            total_tokens,
            overhead,
            budget_remaining,
            tier_summary,
        }
    }

    fn pass_through(files: Vec<FileDescriptor>) -> BudgetOutcome {
        let total_tokens = files.iter().map(|f| f.token_count).sum();
        let tier_summary = summarize(&files);
        BudgetOutcome {
            included: files,
            excluded: Vec::new(),
            truncated: None,
            total_tokens,
            overhead: 0,
            budget_remaining: 0,
            tier_summary,
        }
    }

    fn enforce_skip(
        files: Vec<FileDescriptor>,
        remaining: i64,
    ) -> (Vec<FileDescriptor>, Vec<FileDescriptor>, Option<String>) {
        let mut included = Vec::new();
        let mut excluded = Vec::new();
        let mut used: i64 = 0;
        for fd in files {
            #[allow(clippy::cast_possible_wrap)]
            let cost = fd.token_count as i64;
            if used + cost <= remaining {
                used += cost;
                included.push(fd);
            } else {
                excluded.push(fd);
            }
        }
        (included, excluded, None)
    }

    fn enforce_truncate(
        files: Vec<FileDescriptor>,
        remaining: i64,
        tokenizer: &dyn Tokenizer,
    ) -> (Vec<FileDescriptor>, Vec<FileDescriptor>, Option<String>) {
        let mut included = Vec::new();
        let mut excluded = Vec::new();
        let mut truncated = None;
        let mut used: i64 = 0;
        let mut iter = files.into_iter();

        for fd in iter.by_ref() {
            #[allow(clippy::cast_possible_wrap)]
            let cost = fd.token_count as i64;
            if used + cost <= remaining {
                used += cost;
                included.push(fd);
                continue;
            }

            // First misfit: truncate it if the marker reservation fits,
            // then stop taking files.
            let headroom = remaining - used;
            #[allow(clippy::cast_possible_wrap)]
            if headroom >= TRUNCATION_RESERVE as i64 {
                #[allow(clippy::cast_sign_loss)]
                let limit = (headroom - TRUNCATION_RESERVE as i64) as usize;
                let copy = truncate_to_fit(&fd, limit, tokenizer);
                truncated = Some(copy.path.clone());
                included.push(copy);
            } else {
                excluded.push(fd);
            }
            break;
        }

        excluded.extend(iter);
        (included, excluded, truncated)
    }
}

/// Shallow-copy `fd` with the largest whole-line prefix whose token count
/// fits `limit`, the marker appended. Bisects on line count so multi-byte
/// sequences and code lines are never split.
fn truncate_to_fit(
    fd: &FileDescriptor,
    limit: usize,
    tokenizer: &dyn Tokenizer,
) -> FileDescriptor {
    let lines: Vec<&str> = fd.content.split_inclusive('\n').collect();
    let mut lo = 0usize;
    let mut hi = lines.len();
    while lo < hi {
        let mid = lo + (hi - lo).div_ceil(2);
        let prefix: String = lines[..mid].concat();
        if tokenizer.count(&prefix) <= limit {
            lo = mid;
        } else {
            hi = mid - 1;
        }
    }

    let mut content: String = lines[..lo].concat();
    let shown = tokenizer.count(&content);
    if !content.is_empty() && !content.ends_with('\n') {
        content.push('\n');
    }
    content.push_str(&truncation_marker(shown, fd.token_count));

    let mut copy = fd.clone();
    copy.content = content;
    copy.token_count = shown;
    copy
}

fn summarize(files: &[FileDescriptor]) -> BTreeMap<u8, TierTotals> {
    let mut summary: BTreeMap<u8, TierTotals> = BTreeMap::new();
    for fd in files {
        let entry = summary.entry(fd.tier).or_default();
        entry.files += 1;
        entry.tokens += fd.token_count;
    }
    summary
}

#[cfg(test)]
#[path = "budget_tests.rs"]
mod tests;
