//! The Markdown document renderer.

use std::fmt::Write;

use super::{RenderContext, Renderer};

pub struct MarkdownRenderer;

impl MarkdownRenderer {
    /// A fence longer than any backtick run in `content`, so embedded
    /// fences never terminate the block early.
    fn fence_for(content: &str) -> String {
        let mut longest = 0usize;
        let mut current = 0usize;
        for c in content.chars() {
            if c == '`' {
                current += 1;
                longest = longest.max(current);
            } else {
                current = 0;
            }
        }
        "`".repeat((longest + 1).max(3))
    }

    fn write_file_section(out: &mut String, ctx: &RenderContext<'_>, index: usize) {
        let fd = &ctx.files[index];
        let fence = Self::fence_for(&fd.content);
        let _ = writeln!(out, "## File: {}", fd.path);
        let _ = writeln!(out);
        let _ = writeln!(out, "{fence}{}", fd.language);
        if ctx.line_numbers {
            for (no, line) in fd.content.lines().enumerate() {
                let _ = writeln!(out, "{:>4} | {line}", no + 1);
            }
        } else {
            out.push_str(&fd.content);
            if !fd.content.is_empty() && !fd.content.ends_with('\n') {
                out.push('\n');
            }
        }
        let _ = writeln!(out, "{fence}");
        let _ = writeln!(out);
    }
}

impl Renderer for MarkdownRenderer {
    fn render(&self, ctx: &RenderContext<'_>) -> String {
        let mut out = String::new();

        let _ = writeln!(out, "# Repository: {}", ctx.project);
        let _ = writeln!(out);
        if let Some(ts) = ctx.generated_at {
            let _ = writeln!(out, "- Generated: {ts}");
        }
        let _ = writeln!(out, "- Profile: {}", ctx.profile_name);
        let _ = writeln!(out, "- Tokenizer: {}", ctx.tokenizer_name);
        let _ = writeln!(out, "- Content hash: {}", ctx.content_hash);
        let _ = writeln!(out);

        let _ = writeln!(out, "## Summary");
        let _ = writeln!(out);
        let _ = writeln!(out, "- Files: {}", ctx.stats.total_files);
        let _ = writeln!(out, "- Tokens: {}", ctx.stats.total_tokens);
        let _ = writeln!(out, "- Bytes: {}", ctx.stats.total_bytes);
        let _ = writeln!(out, "- Redactions: {}", ctx.stats.redactions_total);
        if ctx.stats.compressed_files > 0 {
            let _ = writeln!(out, "- Compressed files: {}", ctx.stats.compressed_files);
        }
        if ctx.stats.skipped_files > 0 {
            let _ = writeln!(out, "- Skipped files: {}", ctx.stats.skipped_files);
        }
        let _ = writeln!(out);
        let _ = writeln!(out, "| Tier | Files |");
        let _ = writeln!(out, "|-----:|------:|");
        for (tier, count) in &ctx.stats.tier_histogram {
            let _ = writeln!(out, "| {tier} | {count} |");
        }
        let _ = writeln!(out);

        let _ = writeln!(out, "## Directory Structure");
        let _ = writeln!(out);
        let _ = writeln!(out, "```");
        out.push_str(ctx.tree);
        let _ = writeln!(out, "```");
        let _ = writeln!(out);

        for index in 0..ctx.files.len() {
            Self::write_file_section(&mut out, ctx, index);
        }

        out
    }

    fn format(&self) -> &'static str {
        "markdown"
    }
}

#[cfg(test)]
#[path = "markdown_tests.rs"]
mod tests;
