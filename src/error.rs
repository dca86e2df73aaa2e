use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum HarvxError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Circular profile inheritance: {}", chain.join(" -> "))]
    CircularInheritance { chain: Vec<String> },

    #[error("Profile '{name}' extends unknown profile '{parent}' (available: {})", available.join(", "))]
    MissingParent {
        name: String,
        parent: String,
        available: Vec<String>,
    },

    #[error("Invalid glob pattern: {pattern}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: globset::Error,
    },

    #[error("Invalid value for {var}: '{value}' ({reason})")]
    InvalidEnvValue {
        var: String,
        value: String,
        reason: String,
    },

    #[error("Failed to access file: {path}")]
    FileAccess {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{}", format_io_error(source, path, operation))]
    Io {
        #[source]
        source: std::io::Error,
        path: Option<PathBuf>,
        operation: Option<&'static str>,
    },

    #[error("Not a directory: {0}")]
    RootNotADirectory(PathBuf),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("JSON serialization error: {0}")]
    JsonSerialize(#[from] serde_json::Error),

    #[error("Git error: {0}")]
    Git(String),

    #[error("Unknown tokenizer '{0}' (expected cl100k_base, o200k_base, or none)")]
    UnknownTokenizer(String),

    #[error("Tokenizer '{name}' failed to initialize: {reason}")]
    TokenizerInit { name: String, reason: String },

    #[error("operation cancelled")]
    Cancelled,
}

/// Formats IO error with optional context for display.
/// Uses references to Options as required by thiserror's `#[error(...)]` macro expansion.
#[allow(clippy::ref_option, clippy::ref_option_ref)]
fn format_io_error(
    source: &std::io::Error,
    path: &Option<PathBuf>,
    operation: &Option<&'static str>,
) -> String {
    match (path.as_ref(), *operation) {
        (Some(p), Some(op)) => format!("IO error ({op} '{}'): {source}", p.display()),
        (Some(p), None) => format!("IO error ('{}'): {source}", p.display()),
        (None, Some(op)) => format!("IO error ({op}): {source}"),
        (None, None) => format!("IO error: {source}"),
    }
}

impl From<std::io::Error> for HarvxError {
    fn from(e: std::io::Error) -> Self {
        Self::Io {
            source: e,
            path: None,
            operation: None,
        }
    }
}

impl HarvxError {
    /// Creates an IO error with path context.
    #[must_use]
    pub const fn io_with_path(source: std::io::Error, path: PathBuf) -> Self {
        Self::Io {
            source,
            path: Some(path),
            operation: None,
        }
    }

    /// Creates an IO error with path and operation context.
    #[must_use]
    pub const fn io_with_context(
        source: std::io::Error,
        path: PathBuf,
        operation: &'static str,
    ) -> Self {
        Self::Io {
            source,
            path: Some(path),
            operation: Some(operation),
        }
    }

    /// Returns the error type as a short string identifier.
    #[must_use]
    pub const fn error_type(&self) -> &'static str {
        match self {
            Self::Config(_) | Self::CircularInheritance { .. } | Self::MissingParent { .. } => {
                "Config"
            }
            Self::InvalidPattern { .. } => "InvalidPattern",
            Self::InvalidEnvValue { .. } => "Env",
            Self::FileAccess { .. } => "FileAccess",
            Self::Io { .. } | Self::RootNotADirectory(_) => "IO",
            Self::TomlParse(_) => "TOML",
            Self::JsonSerialize(_) => "JSON",
            Self::Git(_) => "Git",
            Self::UnknownTokenizer(_) | Self::TokenizerInit { .. } => "Tokenizer",
            Self::Cancelled => "Cancelled",
        }
    }

    /// Returns an actionable suggestion for resolving the error.
    #[must_use]
    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            Self::Config(_) => Some("Check the config file format and value ranges in harvx.toml"),
            Self::CircularInheritance { .. } => {
                Some("Break the extends cycle so each profile inherits from at most one ancestor chain")
            }
            Self::MissingParent { .. } => {
                Some("Fix the extends reference or define the missing [profile.<name>] table")
            }
            Self::InvalidPattern { .. } => Some(
                "Check glob pattern syntax: use '*' for wildcards, '**' for recursive matching",
            ),
            Self::InvalidEnvValue { .. } => {
                Some("Booleans accept true|1|yes / false|0|no; numbers must be plain integers")
            }
            Self::FileAccess { source, .. } | Self::Io { source, .. } => {
                Self::io_suggestion(source.kind())
            }
            Self::RootNotADirectory(_) => Some("Pass an existing directory as the target"),
            Self::TomlParse(_) => {
                Some("Check TOML syntax: ensure proper quoting and bracket matching")
            }
            Self::JsonSerialize(_) => {
                Some("Check for non-serializable data types or malformed structures")
            }
            Self::Git(_) => Some("Ensure the directory is a git repository, or disable git_tracked_only"),
            Self::UnknownTokenizer(_) => {
                Some("Valid tokenizer names are cl100k_base, o200k_base, and none")
            }
            Self::TokenizerInit { .. } | Self::Cancelled => None,
        }
    }

    /// Returns a suggestion based on IO error kind.
    const fn io_suggestion(kind: std::io::ErrorKind) -> Option<&'static str> {
        match kind {
            std::io::ErrorKind::NotFound => Some("Verify the file path exists"),
            std::io::ErrorKind::PermissionDenied => {
                Some("Check file permissions or run with appropriate access rights")
            }
            std::io::ErrorKind::InvalidData => {
                Some("The file may be corrupted or in an unexpected format")
            }
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, HarvxError>;
