use serde::{Deserialize, Serialize};

/// A fully-resolved profile: every layer merged, no `extends` link left.
///
/// Enumerated fields (`format`, `target`, `tokenizer`, `budget_strategy`,
/// `redaction.confidence_threshold`, `log_format`) are kept as strings so
/// post-merge validation can report the field path and a suggestion instead
/// of an opaque deserialization failure.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[allow(clippy::struct_excessive_bools)]
pub struct Profile {
    #[serde(default = "default_format")]
    pub format: String,

    #[serde(default)]
    pub target: String,

    #[serde(default = "default_tokenizer")]
    pub tokenizer: String,

    #[serde(default)]
    pub max_tokens: i64,

    #[serde(default = "default_budget_strategy")]
    pub budget_strategy: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,

    #[serde(default)]
    pub stdout: bool,

    #[serde(default)]
    pub compress: bool,

    #[serde(default = "default_true")]
    pub redact: bool,

    #[serde(default)]
    pub metadata: bool,

    #[serde(default)]
    pub line_numbers: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tree_depth: Option<usize>,

    #[serde(default)]
    pub ignore: Vec<String>,

    #[serde(default)]
    pub include: Vec<String>,

    #[serde(default)]
    pub exclude: Vec<String>,

    #[serde(default)]
    pub extensions: Vec<String>,

    #[serde(default)]
    pub priority_files: Vec<String>,

    #[serde(default = "default_max_file_size")]
    pub max_file_size: u64,

    #[serde(default)]
    pub git_tracked_only: bool,

    #[serde(default = "default_true")]
    pub use_gitignore: bool,

    #[serde(default = "default_log_format")]
    pub log_format: String,

    #[serde(default)]
    pub debug: bool,

    #[serde(default)]
    pub verbose: bool,

    #[serde(default)]
    pub quiet: bool,

    // Table-valued fields last so TOML serialization stays valid.
    #[serde(default)]
    pub tiers: Vec<TierConfig>,

    #[serde(default)]
    pub redaction: RedactionConfig,
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            format: default_format(),
            target: String::new(),
            tokenizer: default_tokenizer(),
            max_tokens: 0,
            budget_strategy: default_budget_strategy(),
            output: None,
            stdout: false,
            compress: false,
            redact: true,
            metadata: false,
            line_numbers: false,
            tree_depth: None,
            ignore: Vec::new(),
            include: Vec::new(),
            exclude: Vec::new(),
            extensions: Vec::new(),
            priority_files: Vec::new(),
            max_file_size: default_max_file_size(),
            git_tracked_only: false,
            use_gitignore: true,
            log_format: default_log_format(),
            debug: false,
            verbose: false,
            quiet: false,
            tiers: Vec::new(),
            redaction: RedactionConfig::default(),
        }
    }
}

/// One `[[tiers]]` entry: glob patterns assigning files to a priority tier.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TierConfig {
    pub tier: u8,
    #[serde(default)]
    pub patterns: Vec<String>,
}

/// The nested `[redaction]` table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RedactionConfig {
    #[serde(default = "default_confidence")]
    pub confidence_threshold: String,

    #[serde(default)]
    pub exclude_paths: Vec<String>,

    #[serde(default)]
    pub fail_on_redaction: bool,

    #[serde(default = "default_true")]
    pub entropy: bool,
}

impl Default for RedactionConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: default_confidence(),
            exclude_paths: Vec::new(),
            fail_on_redaction: false,
            entropy: true,
        }
    }
}

fn default_format() -> String {
    "markdown".to_string()
}

fn default_tokenizer() -> String {
    "cl100k_base".to_string()
}

fn default_budget_strategy() -> String {
    "skip".to_string()
}

fn default_confidence() -> String {
    "medium".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

const fn default_true() -> bool {
    true
}

/// Default large-file threshold: 1 MiB. `0` disables the check.
pub const fn default_max_file_size() -> u64 {
    1_048_576
}

/// Upper bound accepted for `max_tokens`.
pub const MAX_TOKENS_CEILING: i64 = 2_000_000;

/// `max_tokens` values above this are legal but draw a lint warning.
pub const MAX_TOKENS_LINT: i64 = 500_000;

/// Top-level keys a profile table may carry. Used for unknown-key warnings.
pub const KNOWN_PROFILE_KEYS: &[&str] = &[
    "extends",
    "format",
    "target",
    "tokenizer",
    "max_tokens",
    "budget_strategy",
    "output",
    "stdout",
    "compress",
    "redact",
    "metadata",
    "line_numbers",
    "tree_depth",
    "ignore",
    "include",
    "exclude",
    "extensions",
    "priority_files",
    "max_file_size",
    "git_tracked_only",
    "use_gitignore",
    "tiers",
    "redaction",
    "log_format",
    "debug",
    "verbose",
    "quiet",
];

/// Keys of the nested `[redaction]` table.
pub const KNOWN_REDACTION_KEYS: &[&str] = &[
    "confidence_threshold",
    "exclude_paths",
    "fail_on_redaction",
    "entropy",
];

/// Keys of a `[[tiers]]` entry.
pub const KNOWN_TIER_KEYS: &[&str] = &["tier", "patterns"];

#[cfg(test)]
#[path = "model_tests.rs"]
mod tests;
