//! Shannon entropy, the secondary detection signal.
//!
//! Ordinary prose and identifiers sit around 3.5–4.0 bits/char; random
//! key material lands at 4.5–5.5. Tokens shorter than [`MIN_TOKEN_LEN`]
//! carry too little signal and are never scored.

use std::collections::HashMap;

/// Bits/char at or above which a token is treated as secret material.
pub const ENTROPY_THRESHOLD: f64 = 4.5;

/// Minimum token length worth scoring.
pub const MIN_TOKEN_LEN: usize = 20;

/// Shannon entropy over the character distribution, in bits per char.
#[must_use]
pub fn shannon_entropy(token: &str) -> f64 {
    if token.is_empty() {
        return 0.0;
    }
    let mut counts: HashMap<char, usize> = HashMap::new();
    let mut len = 0usize;
    for c in token.chars() {
        *counts.entry(c).or_insert(0) += 1;
        len += 1;
    }
    #[allow(clippy::cast_precision_loss)]
    let len = len as f64;
    counts
        .values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)]
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Heuristic exemption for dictionary-like tokens: consecutive vowels or a
/// bigram repeating three or more times read as words, not key material.
#[must_use]
pub fn is_dictionary_like(token: &str) -> bool {
    let lower = token.to_ascii_lowercase();
    let bytes = lower.as_bytes();

    let is_vowel = |b: u8| matches!(b, b'a' | b'e' | b'i' | b'o' | b'u');
    if bytes.windows(2).any(|w| is_vowel(w[0]) && is_vowel(w[1])) {
        return true;
    }

    let mut bigrams: HashMap<&[u8], usize> = HashMap::new();
    for w in bytes.windows(2) {
        let n = bigrams.entry(w).or_insert(0);
        *n += 1;
        if *n >= 3 {
            return true;
        }
    }
    false
}

/// Whether a candidate token reads as a secret: long enough, high entropy,
/// and not dictionary-like.
#[must_use]
pub fn is_high_entropy(token: &str) -> bool {
    token.len() >= MIN_TOKEN_LEN
        && shannon_entropy(token) >= ENTROPY_THRESHOLD
        && !is_dictionary_like(token)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_and_uniform_strings_have_zero_entropy() {
        assert_eq!(shannon_entropy(""), 0.0);
        assert_eq!(shannon_entropy("aaaaaaaa"), 0.0);
    }

    #[test]
    fn english_words_sit_below_the_threshold() {
        for text in ["configuration_value_name", "please_update_the_config"] {
            assert!(shannon_entropy(text) < ENTROPY_THRESHOLD, "{text}");
        }
    }

    #[test]
    fn random_key_material_crosses_the_threshold() {
        // 40 chars of mixed-case alphanumerics, no repeats to speak of.
        let token = "xK9mQ2vR7pL4wN8jT3bZ6hD1fG5sY0cV9kM2qW7r";
        assert!(shannon_entropy(token) >= ENTROPY_THRESHOLD);
        assert!(is_high_entropy(token));
    }

    #[test]
    fn short_tokens_are_never_flagged() {
        assert!(!is_high_entropy("xK9mQ2vR7pL4wN8"));
    }

    #[test]
    fn consecutive_vowels_exempt_a_token() {
        assert!(is_dictionary_like("configurationValue"));
        assert!(is_dictionary_like("ServiceAccountEmail1"));
    }

    #[test]
    fn repeated_bigrams_exempt_a_token() {
        assert!(is_dictionary_like("abcabcabcxyzxyzxyzqq"));
    }

    #[test]
    fn random_material_is_not_dictionary_like() {
        assert!(!is_dictionary_like("xK9mQ2vR7pL4wN8jT3bZ"));
    }
}
