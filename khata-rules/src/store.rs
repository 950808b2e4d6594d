//! RuleStore — durable key -> Rule map over a key-value storage
//! collaborator.
//!
//! The whole collection lives as one JSON array under a single storage key,
//! loaded in full and rewritten in full on every mutation. Adequate because
//! learned rules number in the tens to low hundreds per user.
//!
//! Mutations are a read-modify-write of that blob, so they hold a single
//! write lock: two racing upserts would otherwise interleave and silently
//! drop one update.

use std::time::Duration;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tokio::time::timeout;
use tracing::warn;

use khata_core::Rule;

use crate::error::PersistenceError;
use crate::storage::KeyValueStorage;

/// Storage key the serialized rule collection lives under.
pub const DEFAULT_STORAGE_KEY: &str = "merchant_rules_v1";
const DEFAULT_OP_TIMEOUT_MS: u64 = 3_000;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub storage_key: String,
    /// Bound on a single storage get/set; an elapsed timeout aborts the
    /// operation with no partial effect.
    pub op_timeout_ms: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            op_timeout_ms: DEFAULT_OP_TIMEOUT_MS,
        }
    }
}

impl StoreConfig {
    pub fn op_timeout(&self) -> Duration {
        Duration::from_millis(self.op_timeout_ms)
    }
}

pub struct RuleStore<S> {
    storage: S,
    config: StoreConfig,
    write_lock: Mutex<()>,
}

impl<S: KeyValueStorage> RuleStore<S> {
    pub fn new(storage: S, config: StoreConfig) -> Self {
        Self {
            storage,
            config,
            write_lock: Mutex::new(()),
        }
    }

    /// Current persisted collection. Read failure and corrupt payloads both
    /// degrade to an empty list: no persisted rules is a normal state, and
    /// a broken read must never crash a match.
    pub async fn all(&self) -> Vec<Rule> {
        match self.load().await {
            Ok(rules) => rules,
            Err(err) => {
                warn!(error = %err, "rule read degraded to empty set");
                Vec::new()
            }
        }
    }

    /// Insert or replace the rule for `key`. Serialized among writers;
    /// call N+1's read observes call N's completed write.
    pub async fn upsert(
        &self,
        key: &str,
        category: &str,
        raw_pattern: &str,
    ) -> Result<(), PersistenceError> {
        let _guard = self.write_lock.lock().await;
        let mut rules = self.load().await?;
        let now = Utc::now();
        match rules.iter_mut().find(|r| r.key == key) {
            Some(rule) => rule.recategorize(category, now),
            None => rules.push(Rule::new(key, category, raw_pattern, now)),
        }
        self.write(&rules).await
    }

    /// Remove the rule for `key`, reporting whether one existed.
    pub async fn delete(&self, key: &str) -> Result<bool, PersistenceError> {
        let _guard = self.write_lock.lock().await;
        let mut rules = self.load().await?;
        let before = rules.len();
        rules.retain(|r| r.key != key);
        if rules.len() == before {
            return Ok(false);
        }
        self.write(&rules).await?;
        Ok(true)
    }

    /// Strict on I/O (a failed or timed-out read aborts the caller, so a
    /// mutation can never clobber state it could not see), tolerant of
    /// corrupt payloads (warn and treat as empty).
    async fn load(&self) -> Result<Vec<Rule>, PersistenceError> {
        let read = timeout(self.config.op_timeout(), self.storage.get(&self.config.storage_key));
        let blob = match read.await {
            Err(_) => {
                return Err(PersistenceError::Timeout {
                    timeout: self.config.op_timeout(),
                });
            }
            Ok(Err(source)) => return Err(PersistenceError::Read { source }),
            Ok(Ok(None)) => return Ok(Vec::new()),
            Ok(Ok(Some(blob))) => blob,
        };
        match serde_json::from_str::<Vec<Rule>>(&blob) {
            Ok(rules) => Ok(rules),
            Err(err) => {
                warn!(error = %err, "stored rules failed to parse; treating as empty");
                Ok(Vec::new())
            }
        }
    }

    async fn write(&self, rules: &[Rule]) -> Result<(), PersistenceError> {
        let blob = serde_json::to_string(rules)
            .map_err(|e| PersistenceError::Write { source: e.into() })?;
        let write = timeout(
            self.config.op_timeout(),
            self.storage.set(&self.config.storage_key, &blob),
        );
        match write.await {
            Err(_) => Err(PersistenceError::Timeout {
                timeout: self.config.op_timeout(),
            }),
            Ok(Err(source)) => Err(PersistenceError::Write { source }),
            Ok(Ok(())) => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    fn store() -> (RuleStore<MemoryStorage>, MemoryStorage) {
        let storage = MemoryStorage::new();
        (
            RuleStore::new(storage.clone(), StoreConfig::default()),
            storage,
        )
    }

    #[tokio::test]
    async fn test_upsert_inserts_then_replaces() {
        let (store, _) = store();
        store.upsert("swiggy", "food", "Swiggy").await.unwrap();
        store
            .upsert("swiggy", "entertainment", "Swiggy")
            .await
            .unwrap();

        let rules = store.all().await;
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].category, "entertainment");
        assert_eq!(rules[0].raw_pattern, "Swiggy");
        assert!(rules[0].updated_at >= rules[0].created_at);
    }

    #[tokio::test]
    async fn test_delete_removes_only_named_key() {
        let (store, _) = store();
        store.upsert("swiggy", "food", "Swiggy").await.unwrap();
        store.upsert("tea stall", "food", "Tea Stall").await.unwrap();

        assert!(store.delete("swiggy").await.unwrap());
        assert!(!store.delete("swiggy").await.unwrap());

        let rules = store.all().await;
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].key, "tea stall");
    }

    #[tokio::test]
    async fn test_corrupt_blob_degrades_to_empty() {
        let (store, storage) = store();
        storage.seed(DEFAULT_STORAGE_KEY, "{not json").await;
        assert!(store.all().await.is_empty());

        // A following upsert rebuilds a clean collection.
        store.upsert("swiggy", "food", "Swiggy").await.unwrap();
        assert_eq!(store.all().await.len(), 1);
    }

    #[tokio::test]
    async fn test_persisted_shape_is_one_json_array() {
        let (store, storage) = store();
        store.upsert("swiggy", "food", "Swiggy").await.unwrap();
        let blob = storage.get(DEFAULT_STORAGE_KEY).await.unwrap().unwrap();
        let parsed: Vec<Rule> = serde_json::from_str(&blob).unwrap();
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].key, "swiggy");
    }
}
