//! Pluggable token counting.
//!
//! Two real BPE encodings (`cl100k_base`, `o200k_base`) loaded once at
//! construction, plus the `none` estimator (`len / 4`) for runs where
//! speed beats accuracy. Counting is `Send + Sync`; the parallel pass
//! writes each descriptor's `token_count` exclusively.

use std::sync::Arc;

use rayon::prelude::*;

use crate::descriptor::FileDescriptor;
use crate::error::{HarvxError, Result};
use crate::pipeline::CancelToken;

/// Name selected when the profile leaves the tokenizer empty.
pub const DEFAULT_TOKENIZER: &str = "cl100k_base";

pub trait Tokenizer: Send + Sync + std::fmt::Debug {
    /// Token count of `text`. Never fails; empty input is 0.
    fn count(&self, text: &str) -> usize;

    fn name(&self) -> &str;
}

/// `none`: a character estimator, one token per four bytes.
#[derive(Debug)]
pub struct CharEstimateTokenizer;

impl Tokenizer for CharEstimateTokenizer {
    fn count(&self, text: &str) -> usize {
        text.len() / 4
    }

    fn name(&self) -> &str {
        "none"
    }
}

/// BPE-backed tokenizer. The encoding is embedded in the binary and
/// constructed once; `count` is safe to call from any worker.
pub struct BpeTokenizer {
    bpe: tiktoken_rs::CoreBPE,
    name: &'static str,
}

impl std::fmt::Debug for BpeTokenizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BpeTokenizer").field("name", &self.name).finish()
    }
}

impl BpeTokenizer {
    fn new(name: &'static str) -> Result<Self> {
        let bpe = match name {
            "cl100k_base" => tiktoken_rs::cl100k_base(),
            "o200k_base" => tiktoken_rs::o200k_base(),
            other => return Err(HarvxError::UnknownTokenizer(other.to_string())),
        }
        .map_err(|e| HarvxError::TokenizerInit {
            name: name.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self { bpe, name })
    }
}

impl Tokenizer for BpeTokenizer {
    fn count(&self, text: &str) -> usize {
        if text.is_empty() {
            return 0;
        }
        self.bpe.encode_with_special_tokens(text).len()
    }

    fn name(&self) -> &str {
        self.name
    }
}

/// Construct a tokenizer by name. The empty string selects
/// [`DEFAULT_TOKENIZER`]; unknown names fail here, never during `count`.
pub fn create_tokenizer(name: &str) -> Result<Arc<dyn Tokenizer>> {
    match name {
        "" | "cl100k_base" => Ok(Arc::new(BpeTokenizer::new("cl100k_base")?)),
        "o200k_base" => Ok(Arc::new(BpeTokenizer::new("o200k_base")?)),
        "none" => Ok(Arc::new(CharEstimateTokenizer)),
        other => Err(HarvxError::UnknownTokenizer(other.to_string())),
    }
}

/// Count every descriptor's content on a bounded pool, writing
/// `token_count` in place. Returns the total.
///
/// # Errors
/// Only on cancellation; counting itself never fails.
pub fn count_all(
    files: &mut [FileDescriptor],
    tokenizer: &dyn Tokenizer,
    cancel: &CancelToken,
) -> Result<usize> {
    files.par_iter_mut().for_each(|fd| {
        if cancel.is_cancelled() {
            return;
        }
        fd.token_count = tokenizer.count(&fd.content);
    });
    cancel.check()?;
    Ok(files.iter().map(|fd| fd.token_count).sum())
}

#[cfg(test)]
#[path = "tokenizer_tests.rs"]
mod tests;
