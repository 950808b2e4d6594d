//! Persisted merchant rule type: a learned mapping from a normalized
//! text pattern to a spending category.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A learned key -> category mapping.
///
/// `key` is the normalized pattern and the rule's identity within the store;
/// `raw_pattern` keeps the pre-normalization text for diagnostics/editing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Rule {
    pub key: String,
    pub category: String,
    pub raw_pattern: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Rule {
    /// Create a fresh rule with both timestamps set to `now`.
    pub fn new(
        key: impl Into<String>,
        category: impl Into<String>,
        raw_pattern: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            key: key.into(),
            category: category.into(),
            raw_pattern: raw_pattern.into(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Re-categorize in place. `created_at` is preserved, `updated_at` moves.
    pub fn recategorize(&mut self, category: impl Into<String>, now: DateTime<Utc>) {
        self.category = category.into();
        self.updated_at = now;
    }
}
