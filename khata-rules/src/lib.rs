//! khata-rules: merchant rule auto-categorization engine — learns a
//! reusable text -> category mapping from a single user correction, and
//! refuses to learn keys too generic to generalize safely.

pub mod config;
pub mod error;
pub mod matcher;
pub mod service;
pub mod storage;
pub mod store;

pub use config::RulesConfig;
pub use error::PersistenceError;
pub use matcher::MatcherConfig;
pub use service::{LearnOutcome, RulesService};
pub use storage::{KeyValueStorage, MemoryStorage};
pub use store::{RuleStore, StoreConfig};
