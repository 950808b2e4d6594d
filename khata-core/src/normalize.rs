//! Normalizer — canonicalizes merchant names and free-form transaction
//! text into comparison keys.
//!
//! Semantically equivalent inputs ("  Swiggy ", "SWIGGY") must collapse to
//! the same key. Digits are kept: erasing account-number fragments here
//! could coincidentally collapse unrelated texts onto a shared generic key
//! ("a/c xx"), which is the validator's problem to judge, not ours to hide.

use serde::{Deserialize, Serialize};

/// Default character budget at which upstream callers (SMS/notification
/// previews) hard-cut description text.
pub const DEFAULT_TRUNCATION_LIMIT: usize = 50;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizerConfig {
    /// Inputs at least this many characters long are suspected of having
    /// been hard-cut by the caller when they also end mid-token.
    pub truncation_limit: usize,
}

impl Default for NormalizerConfig {
    fn default() -> Self {
        Self {
            truncation_limit: DEFAULT_TRUNCATION_LIMIT,
        }
    }
}

/// Output of normalization: the canonical key plus an advisory truncation
/// flag consumed by the specificity validator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Normalized {
    pub key: String,
    pub looks_truncated: bool,
}

#[derive(Debug, Clone, Default)]
pub struct Normalizer {
    config: NormalizerConfig,
}

impl Normalizer {
    pub fn new(config: NormalizerConfig) -> Self {
        Self { config }
    }

    /// Normalize without a caller-side length hint; truncation is inferred
    /// heuristically.
    pub fn normalize(&self, input: &str) -> Normalized {
        self.normalize_hinted(input, None)
    }

    /// Normalize with an optional hint giving the length the text had
    /// before the caller truncated it. A hint longer than the input is a
    /// definite truncation signal; otherwise we fall back to the heuristic:
    /// the input is at least `truncation_limit` characters and ends
    /// mid-token.
    pub fn normalize_hinted(&self, input: &str, untruncated_len: Option<usize>) -> Normalized {
        let key = canonical_key(input);
        let char_count = input.chars().count();
        let hinted = untruncated_len.is_some_and(|n| n > char_count);
        let at_limit = char_count >= self.config.truncation_limit;
        Normalized {
            key,
            looks_truncated: hinted || (at_limit && ends_mid_token(input)),
        }
    }
}

/// Lowercase, collapse whitespace runs, and strip punctuation from token
/// edges while keeping internal punctuation ("a/c", "50.00", "domino's").
pub fn canonical_key(input: &str) -> String {
    input
        .to_lowercase()
        .split_whitespace()
        .map(|tok| tok.trim_matches(|c: char| !c.is_alphanumeric()))
        .filter(|tok| !tok.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// True when the text stops abruptly inside a token: the last character is
/// alphanumeric, so is the one before it, and there is no terminal
/// punctuation or whitespace closing the text.
fn ends_mid_token(input: &str) -> bool {
    let mut rev = input.chars().rev();
    match (rev.next(), rev.next()) {
        (Some(last), Some(prev)) => last.is_alphanumeric() && prev.is_alphanumeric(),
        _ => false,
    }
}
