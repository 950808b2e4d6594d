//! khata-core: data model and pure logic for the merchant rule
//! auto-categorization engine — normalization and specificity validation.

pub mod normalize;
pub mod rule;
pub mod specificity;

pub use normalize::{Normalized, Normalizer, NormalizerConfig, canonical_key};
pub use rule::Rule;
pub use specificity::{RejectReason, SpecificityConfig, SpecificityValidator, Verdict};
