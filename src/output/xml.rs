//! The XML document renderer.
//!
//! Content travels in CDATA sections; any embedded `]]>` terminator is
//! split across sections so the document stays well-formed.

use std::fmt::Write;

use super::{RenderContext, Renderer};

pub struct XmlRenderer;

/// Escape text for use inside an attribute value.
fn escape_attr(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Escape text for element bodies.
fn escape_text(s: &str) -> String {
    s.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

/// Wrap content in CDATA, splitting on the `]]>` terminator.
#[must_use]
pub fn cdata(content: &str) -> String {
    format!("<![CDATA[{}]]>", content.replace("]]>", "]]]]><![CDATA[>"))
}

impl Renderer for XmlRenderer {
    fn render(&self, ctx: &RenderContext<'_>) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "<repository>");

        let _ = writeln!(out, "  <metadata>");
        let _ = writeln!(out, "    <project>{}</project>", escape_text(ctx.project));
        if let Some(ts) = ctx.generated_at {
            let _ = writeln!(out, "    <generated_at>{}</generated_at>", escape_text(ts));
        }
        let _ = writeln!(
            out,
            "    <profile>{}</profile>",
            escape_text(ctx.profile_name)
        );
        let _ = writeln!(
            out,
            "    <tokenizer>{}</tokenizer>",
            escape_text(ctx.tokenizer_name)
        );
        let _ = writeln!(
            out,
            "    <content_hash>{}</content_hash>",
            escape_text(ctx.content_hash)
        );
        let _ = writeln!(out, "  </metadata>");

        let _ = writeln!(out, "  <file_summary>");
        let _ = writeln!(
            out,
            "    <total_files>{}</total_files>",
            ctx.stats.total_files
        );
        let _ = writeln!(
            out,
            "    <total_tokens>{}</total_tokens>",
            ctx.stats.total_tokens
        );
        let _ = writeln!(
            out,
            "    <total_bytes>{}</total_bytes>",
            ctx.stats.total_bytes
        );
        let _ = writeln!(
            out,
            "    <redactions>{}</redactions>",
            ctx.stats.redactions_total
        );
        let _ = writeln!(out, "  </file_summary>");

        let _ = writeln!(out, "  <directory_structure>{}</directory_structure>", cdata(ctx.tree));

        let _ = writeln!(out, "  <files>");
        for fd in ctx.files {
            let _ = writeln!(
                out,
                "    <file path=\"{}\" tier=\"{}\" tokens=\"{}\" size=\"{}\">",
                escape_attr(&fd.path),
                fd.tier,
                fd.token_count,
                fd.size
            );
            let _ = writeln!(out, "      <content>{}</content>", cdata(&fd.content));
            let _ = writeln!(out, "    </file>");
        }
        let _ = writeln!(out, "  </files>");

        let _ = writeln!(out, "  <statistics>");
        for (tier, count) in &ctx.stats.tier_histogram {
            let _ = writeln!(out, "    <tier number=\"{tier}\" files=\"{count}\"/>");
        }
        if ctx.stats.compressed_files > 0 {
            let _ = writeln!(
                out,
                "    <compressed_files>{}</compressed_files>",
                ctx.stats.compressed_files
            );
        }
        if ctx.stats.skipped_files > 0 {
            let _ = writeln!(
                out,
                "    <skipped_files>{}</skipped_files>",
                ctx.stats.skipped_files
            );
        }
        let _ = writeln!(out, "  </statistics>");

        let _ = writeln!(out, "</repository>");
        out
    }

    fn format(&self) -> &'static str {
        "xml"
    }
}

#[cfg(test)]
#[path = "xml_tests.rs"]
mod tests;
