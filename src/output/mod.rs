mod hash;
mod markdown;
mod metadata;
mod tree;
mod writer;
mod xml;

pub use hash::{content_fingerprint, file_hash};
pub use markdown::MarkdownRenderer;
pub use metadata::{MetadataSidecar, SidecarInputs, build_sidecar, render_sidecar, sidecar_path};
pub use tree::{TreeOptions, render_tree};
pub use writer::{OutputTarget, write_atomic, write_output};
pub use xml::XmlRenderer;

use std::collections::BTreeMap;

use crate::descriptor::FileDescriptor;

/// Aggregate figures shown in the summary section.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SummaryStats {
    pub total_files: usize,
    pub total_tokens: usize,
    pub total_bytes: u64,
    pub tier_histogram: BTreeMap<u8, usize>,
    pub redactions_total: usize,
    pub compressed_files: usize,
    pub skipped_files: usize,
}

impl SummaryStats {
    /// Derive the summary from the included set plus run-level counters.
    #[must_use]
    pub fn from_files(files: &[FileDescriptor], redactions_total: usize, skipped_files: usize) -> Self {
        let mut tier_histogram: BTreeMap<u8, usize> = BTreeMap::new();
        for fd in files {
            *tier_histogram.entry(fd.tier).or_insert(0) += 1;
        }
        Self {
            total_files: files.len(),
            total_tokens: files.iter().map(|f| f.token_count).sum(),
            total_bytes: files.iter().map(|f| f.size).sum(),
            tier_histogram,
            redactions_total,
            compressed_files: files.iter().filter(|f| f.is_compressed).count(),
            skipped_files,
        }
    }
}

/// Everything a renderer needs. Files arrive in relevance order; the
/// timestamp is caller-supplied so rendering stays deterministic.
pub struct RenderContext<'a> {
    pub project: &'a str,
    pub generated_at: Option<&'a str>,
    pub profile_name: &'a str,
    pub tokenizer_name: &'a str,
    pub content_hash: &'a str,
    pub files: &'a [FileDescriptor],
    pub stats: &'a SummaryStats,
    pub tree: &'a str,
    pub line_numbers: bool,
}

/// A document renderer. The output string is canonical for a given
/// (included set, config) pair.
pub trait Renderer {
    fn render(&self, ctx: &RenderContext<'_>) -> String;

    /// The config value selecting this renderer.
    fn format(&self) -> &'static str;
}

/// Look up a renderer by validated format name.
#[must_use]
pub fn renderer_for(format: &str) -> Box<dyn Renderer> {
    match format {
        "xml" => Box::new(XmlRenderer),
        _ => Box::new(MarkdownRenderer),
    }
}
