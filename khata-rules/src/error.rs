//! Engine error taxonomy.
//!
//! Only persistence failures surface as errors. A rejected learning is a
//! normal outcome (`LearnOutcome::Rejected`), and a corrupt stored blob
//! degrades to "no rules learned yet" inside the store.

use std::time::Duration;

use thiserror::Error;

/// Failure of the storage collaborator during a rule-store operation. The
/// operation aborts with no partial write; callers may retry.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("storage read failed: {source}")]
    Read {
        #[source]
        source: anyhow::Error,
    },

    #[error("storage write failed: {source}")]
    Write {
        #[source]
        source: anyhow::Error,
    },

    #[error("storage call exceeded {timeout:?}")]
    Timeout { timeout: Duration },
}
