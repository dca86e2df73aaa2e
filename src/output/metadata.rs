//! The `<output>.meta.json` sidecar.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::descriptor::FileDescriptor;
use crate::error::Result;
use crate::redact::RedactionReport;

use super::SummaryStats;

#[derive(Debug, Serialize)]
pub struct MetadataSidecar {
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generated_at: Option<String>,
    pub profile: String,
    pub tokenizer: String,
    pub format: String,
    pub target: String,
    pub content_hash: String,
    pub statistics: SidecarStatistics,
    /// Per-file entries, sorted by path.
    pub files: Vec<SidecarFile>,
}

#[derive(Debug, Serialize)]
pub struct SidecarStatistics {
    pub total_files: usize,
    pub total_tokens: usize,
    pub total_bytes: u64,
    /// Percentage of the budget consumed; `null` when no budget is set.
    pub budget_used_percent: Option<f64>,
    pub tier_histogram: BTreeMap<String, usize>,
    pub redactions_total: usize,
    pub redactions_by_type: BTreeMap<String, usize>,
    pub compressed_files: usize,
    pub generation_time_ms: u128,
}

#[derive(Debug, Serialize)]
pub struct SidecarFile {
    pub path: String,
    pub tier: u8,
    pub tokens: usize,
    pub bytes: u64,
    pub redactions: usize,
    pub compressed: bool,
    pub language: String,
}

/// `<output>.meta.json` beside the primary document.
#[must_use]
pub fn sidecar_path(output: &Path) -> PathBuf {
    let mut name = output.as_os_str().to_os_string();
    name.push(".meta.json");
    PathBuf::from(name)
}

/// Everything the pipeline assembles for one sidecar document.
pub struct SidecarInputs<'a> {
    pub files: &'a [FileDescriptor],
    pub stats: &'a SummaryStats,
    pub redaction: &'a RedactionReport,
    pub generated_at: Option<&'a str>,
    pub profile: &'a str,
    pub tokenizer: &'a str,
    pub format: &'a str,
    pub target: &'a str,
    pub content_hash: &'a str,
    pub max_tokens: i64,
    pub generation_time_ms: u128,
}

/// Assemble the sidecar document.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn build_sidecar(inputs: &SidecarInputs<'_>) -> MetadataSidecar {
    let stats = inputs.stats;
    let budget_used_percent = if inputs.max_tokens > 0 {
        Some((stats.total_tokens as f64 / inputs.max_tokens as f64) * 100.0)
    } else {
        None
    };

    let mut sidecar_files: Vec<SidecarFile> = inputs
        .files
        .iter()
        .map(|fd| SidecarFile {
            path: fd.path.clone(),
            tier: fd.tier,
            tokens: fd.token_count,
            bytes: fd.size,
            redactions: fd.redactions,
            compressed: fd.is_compressed,
            language: fd.language.clone(),
        })
        .collect();
    sidecar_files.sort_by(|a, b| a.path.cmp(&b.path));

    MetadataSidecar {
        version: env!("CARGO_PKG_VERSION").to_string(),
        generated_at: inputs.generated_at.map(String::from),
        profile: inputs.profile.to_string(),
        tokenizer: inputs.tokenizer.to_string(),
        format: inputs.format.to_string(),
        target: inputs.target.to_string(),
        content_hash: inputs.content_hash.to_string(),
        statistics: SidecarStatistics {
            total_files: stats.total_files,
            total_tokens: stats.total_tokens,
            total_bytes: stats.total_bytes,
            budget_used_percent,
            tier_histogram: stats
                .tier_histogram
                .iter()
                .map(|(tier, count)| (tier.to_string(), *count))
                .collect(),
            redactions_total: inputs.redaction.total,
            redactions_by_type: inputs
                .redaction
                .by_type
                .iter()
                .map(|(k, v)| (k.clone(), *v))
                .collect(),
            compressed_files: stats.compressed_files,
            generation_time_ms: inputs.generation_time_ms,
        },
        files: sidecar_files,
    }
}

/// Pretty-print with two-space indentation.
pub fn render_sidecar(sidecar: &MetadataSidecar) -> Result<String> {
    Ok(serde_json::to_string_pretty(sidecar)?)
}
