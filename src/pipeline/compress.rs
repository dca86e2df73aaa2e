//! The structural-compression boundary.
//!
//! Compression itself is an external collaborator; the pipeline defines
//! the interface and the orchestration. Implementations return verbatim
//! source slices at AST node boundaries, must observe their own per-file
//! timeout, and any failure leaves the original content intact.

use crate::descriptor::FileDescriptor;
use crate::error::Result;

use super::CancelToken;

/// Marker prepended to content replaced by signatures.
pub const COMPRESSION_MARKER: &str = "<!-- Compressed: signatures only -->";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignatureKind {
    DocComment,
    Import,
    FunctionSignature,
    TypeHeader,
    TypeAlias,
    Constant,
}

/// One verbatim slice of the source.
#[derive(Debug, Clone)]
pub struct Signature {
    pub kind: SignatureKind,
    pub source: String,
}

#[derive(Debug, Clone)]
pub struct CompressionOutput {
    pub signatures: Vec<Signature>,
    pub language: String,
    pub original_size: usize,
    pub output_size: usize,
}

pub trait Compressor: Send + Sync {
    /// Extract signatures from `source`. Implementations observe the
    /// ambient cancellation token and their own per-file timeout.
    ///
    /// # Errors
    /// Any error (parse failure, timeout) is non-fatal to the pipeline.
    fn compress(&self, cancel: &CancelToken, source: &[u8]) -> Result<CompressionOutput>;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompressionStats {
    pub compressed: usize,
    pub failed: usize,
}

/// Run the compressor over every renderable descriptor. Failures and
/// empty outputs retain the original content.
pub fn apply(
    files: &mut [FileDescriptor],
    compressor: &dyn Compressor,
    cancel: &CancelToken,
) -> Result<CompressionStats> {
    let mut stats = CompressionStats::default();
    for fd in files.iter_mut() {
        cancel.check()?;
        if !fd.renderable() {
            continue;
        }
        match compressor.compress(cancel, fd.content.as_bytes()) {
            Ok(output) if !output.signatures.is_empty() => {
                let mut content = String::from(COMPRESSION_MARKER);
                content.push('\n');
                for signature in &output.signatures {
                    content.push('\n');
                    content.push_str(&signature.source);
                }
                fd.content = content;
                fd.is_compressed = true;
                stats.compressed += 1;
            }
            Ok(_) => {}
            Err(err) => {
                stats.failed += 1;
                tracing::debug!(path = %fd.path, error = %err, "compression failed; keeping original content");
            }
        }
    }
    Ok(stats)
}
