//! Matcher — resolves a category for an incoming transaction by probing a
//! rule snapshot with candidate keys.
//!
//! Probe order, stopping at the first hit:
//! 1. exact match on the normalized merchant name (authoritative);
//! 2. exact match on the normalized raw description;
//! 3. longest rule key that is a substring of the normalized description.
//!
//! No match is not an error; it means "leave for review".

use serde::{Deserialize, Serialize};

use khata_core::specificity::DEFAULT_MIN_KEY_LENGTH;
use khata_core::{Normalizer, Rule};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MatcherConfig {
    /// Floor on rule-key length for the substring probe. Keys this short
    /// cannot be created through the validator; the floor re-checks against
    /// stale or migrated data.
    pub min_match_substring_length: usize,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            min_match_substring_length: DEFAULT_MIN_KEY_LENGTH,
        }
    }
}

/// Find the best-matching rule for the given merchant and/or raw text.
/// Read-only over the snapshot.
pub fn find_match<'a>(
    rules: &'a [Rule],
    merchant: Option<&str>,
    raw_text: Option<&str>,
    normalizer: &Normalizer,
    config: &MatcherConfig,
) -> Option<&'a Rule> {
    if let Some(merchant) = merchant {
        let key = normalizer.normalize(merchant).key;
        if !key.is_empty() {
            if let Some(rule) = rules.iter().find(|r| r.key == key) {
                return Some(rule);
            }
        }
    }

    let raw_key = raw_text.map(|t| normalizer.normalize(t).key)?;
    if raw_key.is_empty() {
        return None;
    }
    if let Some(rule) = rules.iter().find(|r| r.key == raw_key) {
        return Some(rule);
    }

    // Substring scan: prefer the longest (most specific) key, so a short,
    // incidentally-shared fragment never outranks a merchant-specific one.
    rules
        .iter()
        .filter(|r| r.key.chars().count() >= config.min_match_substring_length)
        .filter(|r| raw_key.contains(&r.key))
        .max_by_key(|r| r.key.chars().count())
}
