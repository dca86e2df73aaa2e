//! Post-merge semantic validation and non-fatal lints.

use crate::error::{HarvxError, Result};

use super::model::{MAX_TOKENS_CEILING, MAX_TOKENS_LINT, Profile};
use crate::descriptor::MAX_TIER;

const VALID_FORMATS: &[&str] = &["markdown", "xml"];
const VALID_TOKENIZERS: &[&str] = &["cl100k_base", "o200k_base", "none"];
const VALID_TARGETS: &[&str] = &["claude", "chatgpt", "generic", ""];
const VALID_CONFIDENCE: &[&str] = &["high", "medium", "low"];
const VALID_STRATEGIES: &[&str] = &["skip", "truncate"];
const VALID_LOG_FORMATS: &[&str] = &["text", "json"];

/// Validates semantic correctness of a resolved profile.
///
/// # Errors
/// Returns a `Config` error naming the field for out-of-range values, or an
/// `InvalidPattern` error for globs that do not compile.
pub fn validate_profile(profile: &Profile) -> Result<()> {
    validate_enum("format", &profile.format, VALID_FORMATS)?;
    validate_enum("tokenizer", &profile.tokenizer, VALID_TOKENIZERS)?;
    validate_enum("target", &profile.target, VALID_TARGETS)?;
    validate_enum("budget_strategy", &profile.budget_strategy, VALID_STRATEGIES)?;
    validate_enum(
        "redaction.confidence_threshold",
        &profile.redaction.confidence_threshold,
        VALID_CONFIDENCE,
    )?;
    validate_enum("log_format", &profile.log_format, VALID_LOG_FORMATS)?;

    if !(0..=MAX_TOKENS_CEILING).contains(&profile.max_tokens) {
        return Err(HarvxError::Config(format!(
            "max_tokens must be between 0 and {MAX_TOKENS_CEILING}, got {}",
            profile.max_tokens
        )));
    }

    if profile.stdout && profile.output.is_some() {
        return Err(HarvxError::Config(
            "stdout and output are mutually exclusive".to_string(),
        ));
    }

    validate_globs(&profile.ignore)?;
    validate_globs(&profile.include)?;
    validate_globs(&profile.exclude)?;
    validate_globs(&profile.priority_files)?;
    validate_globs(&profile.redaction.exclude_paths)?;
    for tier in &profile.tiers {
        if tier.tier > MAX_TIER {
            return Err(HarvxError::Config(format!(
                "tiers: tier must be between 0 and {MAX_TIER}, got {}",
                tier.tier
            )));
        }
        validate_globs(&tier.patterns)?;
    }

    Ok(())
}

fn validate_enum(field: &str, value: &str, valid: &[&str]) -> Result<()> {
    if valid.contains(&value) {
        return Ok(());
    }
    let shown: Vec<&str> = valid.iter().copied().filter(|v| !v.is_empty()).collect();
    Err(HarvxError::Config(format!(
        "{field} has invalid value '{value}'. Valid values: {}",
        shown.join(", ")
    )))
}

fn validate_globs(patterns: &[String]) -> Result<()> {
    for pattern in patterns {
        globset::Glob::new(pattern).map_err(|e| HarvxError::InvalidPattern {
            pattern: pattern.clone(),
            source: e,
        })?;
    }
    Ok(())
}

/// Non-fatal profile lints. Returned as human-readable warnings.
#[must_use]
pub fn lint_profile(profile: &Profile) -> Vec<String> {
    let mut warnings = Vec::new();

    // A pattern listed under two tiers only ever matches in the lower one.
    for (i, a) in profile.tiers.iter().enumerate() {
        for b in profile.tiers.iter().skip(i + 1) {
            if a.tier == b.tier {
                continue;
            }
            for pattern in &a.patterns {
                if b.patterns.contains(pattern) {
                    warnings.push(format!(
                        "pattern '{pattern}' appears in both tier {} and tier {}; the lower tier wins",
                        a.tier, b.tier
                    ));
                }
            }
        }
    }

    for pattern in &profile.priority_files {
        if profile.ignore.contains(pattern) {
            warnings.push(format!(
                "priority_files entry '{pattern}' is also listed in ignore and will never match"
            ));
        }
    }

    for pattern in &profile.redaction.exclude_paths {
        if profile.ignore.contains(pattern) {
            warnings.push(format!(
                "redaction.exclude_paths entry '{pattern}' is redundant: the path is already ignored"
            ));
        }
    }

    if profile.max_tokens > MAX_TOKENS_LINT {
        warnings.push(format!(
            "max_tokens {} exceeds {MAX_TOKENS_LINT}; most models reject contexts this large",
            profile.max_tokens
        ));
    }

    warnings
}

#[cfg(test)]
#[path = "validation_tests.rs"]
mod tests;
