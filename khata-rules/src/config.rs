//! Aggregate engine configuration.
//!
//! Thresholds and vocabulary are policy, not structure: everything here is
//! defaulted and serde-overridable so tuning never needs a code change.

use serde::{Deserialize, Serialize};

use khata_core::{NormalizerConfig, SpecificityConfig};

use crate::matcher::MatcherConfig;
use crate::store::StoreConfig;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RulesConfig {
    pub normalizer: NormalizerConfig,
    pub specificity: SpecificityConfig,
    pub matcher: MatcherConfig,
    pub store: StoreConfig,
}
