//! SpecificityValidator — decides whether a normalized key is safe to
//! persist as a matching rule.
//!
//! The failure mode this guards against: a bank SMS hard-cut mid-word
//! ("...debited from HDFC Bank A/c xx1") gets learned as a rule, and every
//! later SMS sharing the same boilerplate fragments silently inherits its
//! category. Keys that are short, built from banking boilerplate, or cut
//! mid-token are refused here, before they ever reach the store.

use serde::{Deserialize, Serialize};

/// Default minimum key length. Short fragments ("rs 50", "upi") are shared
/// across unrelated messages; single-word merchant names ("swiggy") must
/// still clear the bar.
pub const DEFAULT_MIN_KEY_LENGTH: usize = 5;
/// Default minimum count of non-boilerplate alphabetic tokens a key must
/// retain once boilerplate applies to it at all.
pub const DEFAULT_MIN_SIGNAL_TOKENS: usize = 2;
/// Default minimum letter count for a token to count as merchant signal.
pub const DEFAULT_MIN_SIGNAL_TOKEN_LENGTH: usize = 3;

fn default_boilerplate() -> Vec<String> {
    [
        // phrases
        "debited from",
        "credited to",
        "generic purchase",
        "avl bal",
        // banking vocabulary
        "a/c",
        "acct",
        "account",
        "debited",
        "credited",
        "debit",
        "credit",
        "purchase",
        "transaction",
        "txn",
        "payment",
        "upi",
        "neft",
        "imps",
        "ref",
        "rs",
        "inr",
        "bank",
        "card",
        "info",
        "bal",
        "balance",
        // common bank names (the merchant is never the bank)
        "hdfc",
        "icici",
        "sbi",
        "axis",
        "kotak",
        // connective words
        "for",
        "from",
        "to",
        "on",
        "at",
        "the",
        "your",
        "via",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_sender_prefixes() -> Vec<String> {
    ["vm-", "vk-", "ad-", "jd-", "tm-", "bz-"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

/// Thresholds and vocabulary for the specificity check. Tuning concerns,
/// not correctness concerns: every field is serde-overridable from data.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpecificityConfig {
    pub min_key_length: usize,
    pub min_signal_tokens: usize,
    pub min_signal_token_length: usize,
    /// Lowercase words and multi-word phrases that carry no merchant
    /// signal; matched against whole tokens, never substrings.
    pub boilerplate: Vec<String>,
    /// Lowercase SMS sender-code prefixes ("vm-"); a token starting with
    /// one is routing metadata, not a merchant.
    pub sender_prefixes: Vec<String>,
}

impl Default for SpecificityConfig {
    fn default() -> Self {
        Self {
            min_key_length: DEFAULT_MIN_KEY_LENGTH,
            min_signal_tokens: DEFAULT_MIN_SIGNAL_TOKENS,
            min_signal_token_length: DEFAULT_MIN_SIGNAL_TOKEN_LENGTH,
            boilerplate: default_boilerplate(),
            sender_prefixes: default_sender_prefixes(),
        }
    }
}

/// Machine-readable reason a key was refused.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
    EmptyOrTooShort,
    BoilerplateOnly,
    UnsafeTruncation,
}

/// Validation outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Accepted,
    Rejected(RejectReason),
}

impl Verdict {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Verdict::Accepted)
    }
}

/// Pure key-admission check: no side effects, no persisted state.
#[derive(Debug, Clone, Default)]
pub struct SpecificityValidator {
    config: SpecificityConfig,
}

impl SpecificityValidator {
    pub fn new(config: SpecificityConfig) -> Self {
        Self { config }
    }

    /// Apply the rejection rules in order; first match wins.
    pub fn validate(&self, key: &str, looks_truncated: bool) -> Verdict {
        if key.chars().count() < self.config.min_key_length {
            return Verdict::Rejected(RejectReason::EmptyOrTooShort);
        }

        let scan = self.scan_signal(key);
        // A key untouched by boilerplate/digit removal is pure merchant
        // signal ("swiggy", "tea stall") even below the token floor. Only
        // keys the vocabulary actually bit into can be boilerplate-only.
        if scan.removed_any && scan.signal_tokens < self.config.min_signal_tokens {
            return Verdict::Rejected(RejectReason::BoilerplateOnly);
        }

        if looks_truncated && !self.ends_on_clean_boundary(key) {
            return Verdict::Rejected(RejectReason::UnsafeTruncation);
        }

        Verdict::Accepted
    }

    /// Count tokens that survive boilerplate, sender-prefix, and digit
    /// removal, and whether anything was removed at all.
    fn scan_signal(&self, key: &str) -> SignalScan {
        let tokens: Vec<&str> = key.split_whitespace().collect();
        let mut consumed = vec![false; tokens.len()];
        let mut removed_any = false;

        for phrase in &self.config.boilerplate {
            let words: Vec<&str> = phrase.split_whitespace().collect();
            if words.is_empty() {
                continue;
            }
            let mut i = 0;
            while i + words.len() <= tokens.len() {
                let span = i..i + words.len();
                let free = !consumed[span.clone()].iter().any(|c| *c);
                let matches = tokens[span.clone()]
                    .iter()
                    .zip(&words)
                    .all(|(tok, word)| tok.eq_ignore_ascii_case(word));
                if free && matches {
                    for c in &mut consumed[span] {
                        *c = true;
                    }
                    removed_any = true;
                    i += words.len();
                } else {
                    i += 1;
                }
            }
        }

        for (i, tok) in tokens.iter().enumerate() {
            if consumed[i] {
                continue;
            }
            if self
                .config
                .sender_prefixes
                .iter()
                .any(|p| tok.starts_with(p.as_str()))
            {
                consumed[i] = true;
                removed_any = true;
            }
        }

        let mut signal_tokens = 0;
        for (i, tok) in tokens.iter().enumerate() {
            if consumed[i] {
                continue;
            }
            let stripped: String = tok.chars().filter(|c| !c.is_ascii_digit()).collect();
            if stripped.len() != tok.len() {
                removed_any = true;
            }
            let letters = stripped.chars().filter(|c| c.is_alphabetic()).count();
            if letters >= self.config.min_signal_token_length {
                signal_tokens += 1;
            }
        }

        SignalScan {
            signal_tokens,
            removed_any,
        }
    }

    /// A truncation-suspect key is only safe when its tail reads as a
    /// complete word or number: all digits, or an alphabetic word of at
    /// least the signal-token length. A short or mixed alphanumeric tail
    /// ("xx", "xx1") reads as a cut fragment.
    fn ends_on_clean_boundary(&self, key: &str) -> bool {
        let Some(last) = key.split_whitespace().last() else {
            return false;
        };
        if last.chars().all(|c| c.is_ascii_digit()) {
            return true;
        }
        last.chars().all(|c| !c.is_ascii_digit())
            && last.chars().filter(|c| c.is_alphabetic()).count()
                >= self.config.min_signal_token_length
    }
}

struct SignalScan {
    signal_tokens: usize,
    removed_any: bool,
}
