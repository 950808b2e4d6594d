//! RulesService — the façade external collaborators call.
//!
//! Learning: normalize -> validate -> upsert (or refuse). Refusal only
//! prevents future auto-matching; the caller's immediate categorization of
//! the transaction at hand is its own business and is never affected.
//!
//! Matching: normalize -> probe a fresh store snapshot.

use tracing::{debug, info};

use khata_core::{Normalizer, RejectReason, Rule, SpecificityValidator, Verdict};

use crate::config::RulesConfig;
use crate::error::PersistenceError;
use crate::matcher::{self, MatcherConfig};
use crate::storage::KeyValueStorage;
use crate::store::RuleStore;

/// Terminal state of one learning attempt. Both variants are success from
/// the caller's perspective; they differ only in side effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LearnOutcome {
    /// The rule was persisted (created or re-categorized).
    Learned,
    /// The specificity check refused the key; nothing was written.
    Rejected(RejectReason),
}

impl LearnOutcome {
    pub fn is_learned(&self) -> bool {
        matches!(self, LearnOutcome::Learned)
    }
}

pub struct RulesService<S> {
    store: RuleStore<S>,
    normalizer: Normalizer,
    validator: SpecificityValidator,
    matcher_config: MatcherConfig,
}

impl<S: KeyValueStorage> RulesService<S> {
    /// Build the engine over an injected storage with default tuning.
    pub fn new(storage: S) -> Self {
        Self::with_config(storage, RulesConfig::default())
    }

    pub fn with_config(storage: S, config: RulesConfig) -> Self {
        Self {
            store: RuleStore::new(storage, config.store),
            normalizer: Normalizer::new(config.normalizer),
            validator: SpecificityValidator::new(config.specificity),
            matcher_config: config.matcher,
        }
    }

    /// Learn a rule mapping `text` (a merchant name or raw description) to
    /// `category`, unless the key is too generic to generalize safely.
    pub async fn set_category_with_rule(
        &self,
        text: &str,
        category: &str,
    ) -> Result<LearnOutcome, PersistenceError> {
        self.set_category_with_rule_hinted(text, category, None).await
    }

    /// As [`set_category_with_rule`](Self::set_category_with_rule), with the
    /// caller's untruncated-length hint when it hard-cut the text upstream.
    pub async fn set_category_with_rule_hinted(
        &self,
        text: &str,
        category: &str,
        untruncated_len: Option<usize>,
    ) -> Result<LearnOutcome, PersistenceError> {
        let normalized = self.normalizer.normalize_hinted(text, untruncated_len);
        match self
            .validator
            .validate(&normalized.key, normalized.looks_truncated)
        {
            Verdict::Rejected(reason) => {
                debug!(key = %normalized.key, ?reason, "rule refused by specificity check");
                Ok(LearnOutcome::Rejected(reason))
            }
            Verdict::Accepted => {
                self.store.upsert(&normalized.key, category, text).await?;
                info!(key = %normalized.key, category, "rule learned");
                Ok(LearnOutcome::Learned)
            }
        }
    }

    /// Resolve a category for an incoming transaction. Computed over a
    /// fresh snapshot; `None` means "leave as needs-review".
    pub async fn find_category(
        &self,
        merchant: Option<&str>,
        raw_text: Option<&str>,
    ) -> Option<String> {
        let rules = self.store.all().await;
        matcher::find_match(
            &rules,
            merchant,
            raw_text,
            &self.normalizer,
            &self.matcher_config,
        )
        .map(|r| r.category.clone())
    }

    /// Current persisted rules.
    pub async fn rules(&self) -> Vec<Rule> {
        self.store.all().await
    }

    /// Management action: forget the rule `text` normalizes to. Reports
    /// whether a rule existed.
    pub async fn delete_rule(&self, text: &str) -> Result<bool, PersistenceError> {
        let key = self.normalizer.normalize(text).key;
        if key.is_empty() {
            return Ok(false);
        }
        self.store.delete(&key).await
    }
}
