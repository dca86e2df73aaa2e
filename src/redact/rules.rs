//! The compiled secret-pattern registry.
//!
//! Rules follow the Gitleaks corpus shape: cheap keyword triggers gate a
//! linear-time regex (the `regex` crate supports neither backreferences nor
//! lookaround, which is exactly the property the per-line scanner needs),
//! plus an optional post-match validator standing in for lookaround logic.

use regex::Regex;

use crate::error::{HarvxError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Confidence {
    Low,
    Medium,
    High,
}

impl Confidence {
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "high" => Some(Self::High),
            "medium" => Some(Self::Medium),
            "low" => Some(Self::Low),
            _ => None,
        }
    }

    /// One step down, for heightened scanning. `Low` stays `Low`.
    #[must_use]
    pub const fn lowered(self) -> Self {
        match self {
            Self::High => Self::Medium,
            Self::Medium | Self::Low => Self::Low,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }
}

/// Secret type reported for entropy-only hits.
pub const HIGH_ENTROPY_TYPE: &str = "high_entropy";

/// Secret type reported for multi-line PEM blocks.
pub const PRIVATE_KEY_BLOCK_TYPE: &str = "private_key_block";

pub struct RedactionRule {
    pub id: &'static str,
    pub secret_type: &'static str,
    /// Lowercase substrings; at least one must appear in a line before the
    /// regex runs.
    pub keywords: &'static [&'static str],
    pub pattern: Regex,
    pub confidence: Confidence,
    /// Capture group holding the secret span; 0 is the whole match.
    pub group: usize,
    pub validate: Option<fn(&str) -> bool>,
}

fn rule(
    id: &'static str,
    secret_type: &'static str,
    keywords: &'static [&'static str],
    pattern: &str,
    confidence: Confidence,
    group: usize,
    validate: Option<fn(&str) -> bool>,
) -> Result<RedactionRule> {
    Ok(RedactionRule {
        id,
        secret_type,
        keywords,
        pattern: Regex::new(pattern)
            .map_err(|e| HarvxError::Config(format!("redaction rule '{id}': {e}")))?,
        confidence,
        group,
        validate,
    })
}

fn jwt_shape(candidate: &str) -> bool {
    let segments: Vec<&str> = candidate.split('.').collect();
    segments.len() == 3 && segments.iter().all(|s| s.len() >= 8)
}

/// The built-in rule corpus. Stripe *test* keys are intentionally absent.
pub fn builtin_rules() -> Result<Vec<RedactionRule>> {
    Ok(vec![
        rule(
            "aws-access-key-id",
            "aws_access_key",
            &["akia", "asia", "abia", "acca"],
            r"\b(?:AKIA|ASIA|ABIA|ACCA)[0-9A-Z]{16}\b",
            Confidence::High,
            0,
            None,
        )?,
        rule(
            "aws-secret-key",
            "aws_secret_key",
            &["aws"],
            r#"(?i)aws[_.-]?secret[_.-]?(?:access[_.-]?)?key['"]?\s*[:=]\s*['"]?([A-Za-z0-9/+=]{40})"#,
            Confidence::High,
            1,
            None,
        )?,
        rule(
            "github-token",
            "github_token",
            &["ghp_", "gho_", "ghu_", "ghs_", "ghr_", "github_pat_"],
            r"\b(?:gh[pousr]_[A-Za-z0-9]{36}|github_pat_[A-Za-z0-9_]{82})\b",
            Confidence::High,
            0,
            None,
        )?,
        rule(
            "stripe-live-key",
            "stripe_live_key",
            &["sk_live_", "rk_live_"],
            r"\b[sr]k_live_[A-Za-z0-9]{20,99}\b",
            Confidence::High,
            0,
            None,
        )?,
        rule(
            "slack-token",
            "slack_token",
            &["xoxb-", "xoxa-", "xoxp-", "xoxr-", "xoxs-"],
            r"\bxox[baprs]-[A-Za-z0-9-]{10,250}\b",
            Confidence::High,
            0,
            None,
        )?,
        rule(
            "slack-webhook",
            "slack_webhook",
            &["hooks.slack.com"],
            r"https://hooks\.slack\.com/services/T[A-Za-z0-9_]+/B[A-Za-z0-9_]+/[A-Za-z0-9_]+",
            Confidence::High,
            0,
            None,
        )?,
        rule(
            "google-api-key",
            "google_api_key",
            &["aiza"],
            r"\bAIza[0-9A-Za-z_-]{35}\b",
            Confidence::High,
            0,
            None,
        )?,
        rule(
            "jwt",
            "jwt",
            &["eyj"],
            r"\beyJ[A-Za-z0-9_-]{8,}\.[A-Za-z0-9_-]{8,}\.[A-Za-z0-9_-]{8,}\b",
            Confidence::Medium,
            0,
            Some(jwt_shape),
        )?,
        rule(
            "connection-string",
            "connection_string",
            &["://"],
            r"(?i)\b[a-z][a-z0-9+.-]*://[^/\s:@'\x22]+:([^@\s'\x22]{3,})@",
            Confidence::Medium,
            1,
            None,
        )?,
        rule(
            "generic-api-key",
            "generic_api_key",
            &["key", "token", "secret"],
            r#"(?i)\b(?:api[_-]?key|api[_-]?token|auth[_-]?token|access[_-]?token|client[_-]?secret)['"]?\s*[:=]\s*['"]?([A-Za-z0-9_\-]{20,80})"#,
            Confidence::Low,
            1,
            None,
        )?,
    ])
}

#[cfg(test)]
#[path = "rules_tests.rs"]
mod tests;
