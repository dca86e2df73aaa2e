//! Environment layer: `HARVX_*` variables mapped to dotted config keys.

use crate::error::{HarvxError, Result};

use super::filesystem::FileSystem;

/// Prefix for all recognized environment variables.
pub const ENV_PREFIX: &str = "HARVX_";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EnvKind {
    Text,
    Boolean,
    Integer,
}

/// Variables overlaying the resolved profile. `HARVX_PROFILE` and
/// `HARVX_DIR` are process-level selectors, not profile keys, and are read
/// separately.
const PROFILE_VARS: &[(&str, &str, EnvKind)] = &[
    ("HARVX_MAX_TOKENS", "max_tokens", EnvKind::Integer),
    ("HARVX_FORMAT", "format", EnvKind::Text),
    ("HARVX_TARGET", "target", EnvKind::Text),
    ("HARVX_TOKENIZER", "tokenizer", EnvKind::Text),
    ("HARVX_COMPRESS", "compress", EnvKind::Boolean),
    ("HARVX_REDACT", "redact", EnvKind::Boolean),
    ("HARVX_STDOUT", "stdout", EnvKind::Boolean),
    ("HARVX_LOG_FORMAT", "log_format", EnvKind::Text),
    ("HARVX_DEBUG", "debug", EnvKind::Boolean),
    ("HARVX_OUTPUT", "output", EnvKind::Text),
    ("HARVX_VERBOSE", "verbose", EnvKind::Boolean),
    ("HARVX_QUIET", "quiet", EnvKind::Boolean),
];

/// Parse a boolean environment value. Accepts `true|1|yes` and
/// `false|0|no`, case-insensitive.
#[must_use]
pub fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}

/// Build the environment layer as a TOML table.
///
/// # Errors
/// Returns [`HarvxError::InvalidEnvValue`] for values that do not parse as
/// the key's type.
pub fn env_layer(fs: &dyn FileSystem) -> Result<toml::Value> {
    let mut table = toml::Table::new();
    for &(var, key, kind) in PROFILE_VARS {
        let Some(raw) = fs.env_var(var) else {
            continue;
        };
        let value = match kind {
            EnvKind::Text => toml::Value::String(raw),
            EnvKind::Boolean => {
                let parsed = parse_bool(&raw).ok_or_else(|| HarvxError::InvalidEnvValue {
                    var: var.to_string(),
                    value: raw.clone(),
                    reason: "expected a boolean".to_string(),
                })?;
                toml::Value::Boolean(parsed)
            }
            EnvKind::Integer => {
                let parsed: i64 = raw.parse().map_err(|_| HarvxError::InvalidEnvValue {
                    var: var.to_string(),
                    value: raw.clone(),
                    reason: "expected an integer".to_string(),
                })?;
                toml::Value::Integer(parsed)
            }
        };
        table.insert(key.to_string(), value);
    }
    Ok(toml::Value::Table(table))
}

/// The profile name selected via `HARVX_PROFILE`, if any.
#[must_use]
pub fn env_profile(fs: &dyn FileSystem) -> Option<String> {
    fs.env_var("HARVX_PROFILE").filter(|v| !v.is_empty())
}

/// The target directory selected via `HARVX_DIR`, if any.
#[must_use]
pub fn env_dir(fs: &dyn FileSystem) -> Option<String> {
    fs.env_var("HARVX_DIR").filter(|v| !v.is_empty())
}

#[cfg(test)]
#[path = "env_tests.rs"]
mod tests;
