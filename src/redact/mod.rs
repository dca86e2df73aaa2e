mod engine;
mod entropy;
mod rules;

pub use engine::{RedactionMatch, RedactionReport, Redactor, marker};
pub use entropy::{ENTROPY_THRESHOLD, MIN_TOKEN_LEN, is_high_entropy, shannon_entropy};
pub use rules::{
    Confidence, HIGH_ENTROPY_TYPE, PRIVATE_KEY_BLOCK_TYPE, RedactionRule, builtin_rules,
};
