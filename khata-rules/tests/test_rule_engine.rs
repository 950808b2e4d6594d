use std::sync::Arc;
use std::time::Duration;

use anyhow::{Result, anyhow};
use khata_core::RejectReason;
use khata_rules::{
    KeyValueStorage, LearnOutcome, MemoryStorage, PersistenceError, RulesConfig, RulesService,
};

fn service() -> RulesService<MemoryStorage> {
    RulesService::new(MemoryStorage::new())
}

/// Learning the same input twice yields exactly one rule.
#[tokio::test]
async fn test_learning_is_idempotent() {
    let svc = service();
    assert!(svc
        .set_category_with_rule("Swiggy", "misc")
        .await
        .unwrap()
        .is_learned());
    assert!(svc
        .set_category_with_rule("Swiggy", "misc")
        .await
        .unwrap()
        .is_learned());

    let rules = svc.rules().await;
    assert_eq!(rules.len(), 1);
    assert_eq!(rules[0].key, "swiggy");
}

/// Too-short and boilerplate-only inputs never change the store.
#[tokio::test]
async fn test_generic_inputs_leave_store_unchanged() {
    let svc = service();
    for text in ["", "   ", "Rs 50", "debited", "debited from A/c"] {
        let outcome = svc.set_category_with_rule(text, "misc").await.unwrap();
        assert!(!outcome.is_learned(), "{text:?} should have been refused");
    }
    assert!(svc.rules().await.is_empty());
}

/// Regression: a bank SMS hard-cut at 50 characters must not become a
/// rule, and unrelated future SMS sharing its boilerplate must stay
/// uncategorized.
#[tokio::test]
async fn test_truncated_sms_never_becomes_a_rule() {
    let svc = service();
    let description_bad: String =
        "VM-HDFCBK: Rs 50.00 debited from HDFC Bank A/c xx1234 for Generic Purchase on 12-10-24."
            .chars()
            .take(50)
            .collect();

    let outcome = svc
        .set_category_with_rule(&description_bad, "misc")
        .await
        .unwrap();
    assert!(!outcome.is_learned());
    assert_eq!(svc.rules().await.len(), 0);

    let got = svc
        .find_category(
            Some("Tea Stall"),
            Some("VM-HDFCBK: Rs 100.00 debited from HDFC Bank A/c xx1234 for Tea Stall."),
        )
        .await;
    assert_eq!(got, None);
}

/// An exact merchant match is authoritative regardless of the raw text.
#[tokio::test]
async fn test_merchant_match_ignores_unrelated_raw_text() {
    let svc = service();
    assert!(svc
        .set_category_with_rule("Swiggy", "food")
        .await
        .unwrap()
        .is_learned());

    let got = svc
        .find_category(
            Some("Swiggy"),
            Some("VM-ICICI: Rs 999 debited for something else entirely"),
        )
        .await;
    assert_eq!(got, Some("food".to_string()));
}

/// Re-learning the same key replaces the category in place.
#[tokio::test]
async fn test_last_write_wins() {
    let svc = service();
    svc.set_category_with_rule("Swiggy", "food").await.unwrap();
    svc.set_category_with_rule("Swiggy", "entertainment")
        .await
        .unwrap();

    let rules = svc.rules().await;
    assert_eq!(rules.len(), 1);
    assert_eq!(rules[0].key, "swiggy");
    assert_eq!(rules[0].category, "entertainment");
}

/// Among substring matches, the longest (most specific) key wins.
#[tokio::test]
async fn test_longest_substring_match_wins() {
    let svc = service();
    assert!(svc
        .set_category_with_rule("Swiggy Order", "food")
        .await
        .unwrap()
        .is_learned());
    assert!(svc
        .set_category_with_rule("HDFC Bank Swiggy Order", "entertainment")
        .await
        .unwrap()
        .is_learned());

    let got = svc
        .find_category(None, Some("paid via HDFC Bank Swiggy Order 12345 success"))
        .await;
    assert_eq!(got, Some("entertainment".to_string()));
}

/// N concurrent learns with distinct inputs all land; no lost updates.
#[tokio::test]
async fn test_concurrent_learns_do_not_lose_updates() {
    let svc = Arc::new(service());
    let merchants = [
        "Alpha Bakery",
        "Bravo Grocers",
        "Charlie Cafe",
        "Delta Pharmacy",
        "Echo Cinemas",
        "Foxtrot Fuels",
        "Golf Stationers",
        "Hotel Niwas",
    ];

    let mut handles = Vec::new();
    for merchant in merchants {
        let svc = Arc::clone(&svc);
        handles.push(tokio::spawn(async move {
            svc.set_category_with_rule(merchant, "misc").await
        }));
    }
    for handle in handles {
        assert!(handle.await.unwrap().unwrap().is_learned());
    }

    assert_eq!(svc.rules().await.len(), merchants.len());
}

/// A hint that the caller cut the text upstream triggers the truncation
/// guard even below the heuristic length limit.
#[tokio::test]
async fn test_untruncated_length_hint_is_honored() {
    let svc = service();
    let outcome = svc
        .set_category_with_rule_hinted("Sharma Kirana St", "groceries", Some(120))
        .await
        .unwrap();
    assert_eq!(outcome, LearnOutcome::Rejected(RejectReason::UnsafeTruncation));
    assert!(svc.rules().await.is_empty());
}

/// Corrupt persisted state degrades to "no rules learned yet" and is
/// recoverable by the next learn.
#[tokio::test]
async fn test_corrupt_store_degrades_then_recovers() {
    let storage = MemoryStorage::new();
    storage.seed("merchant_rules_v1", "[[[ not json").await;
    let svc = RulesService::new(storage);

    assert!(svc.rules().await.is_empty());
    assert_eq!(svc.find_category(Some("Swiggy"), None).await, None);

    svc.set_category_with_rule("Swiggy", "food").await.unwrap();
    assert_eq!(svc.rules().await.len(), 1);
}

/// Forgetting a rule removes it from matching.
#[tokio::test]
async fn test_delete_rule_roundtrip() {
    let svc = service();
    svc.set_category_with_rule("Swiggy", "food").await.unwrap();
    assert!(svc.delete_rule("Swiggy").await.unwrap());
    assert!(!svc.delete_rule("Swiggy").await.unwrap());
    assert_eq!(svc.find_category(Some("Swiggy"), None).await, None);
}

/// Storage that fails every call.
#[derive(Clone)]
struct FailingStorage;

impl KeyValueStorage for FailingStorage {
    async fn get(&self, _key: &str) -> Result<Option<String>> {
        Err(anyhow!("disk on fire"))
    }

    async fn set(&self, _key: &str, _value: &str) -> Result<()> {
        Err(anyhow!("disk on fire"))
    }
}

/// A failed storage read aborts the learn with a persistence error;
/// matching degrades to no match instead of failing.
#[tokio::test]
async fn test_storage_failure_surfaces_on_write_path_only() {
    let svc = RulesService::new(FailingStorage);

    let err = svc
        .set_category_with_rule("Swiggy", "food")
        .await
        .unwrap_err();
    assert!(matches!(err, PersistenceError::Read { .. }));

    assert_eq!(svc.find_category(Some("Swiggy"), None).await, None);
    assert!(svc.rules().await.is_empty());
}

/// Storage that never answers.
#[derive(Clone)]
struct StalledStorage;

impl KeyValueStorage for StalledStorage {
    async fn get(&self, _key: &str) -> Result<Option<String>> {
        tokio::time::sleep(Duration::from_secs(3600)).await;
        Ok(None)
    }

    async fn set(&self, _key: &str, _value: &str) -> Result<()> {
        tokio::time::sleep(Duration::from_secs(3600)).await;
        Ok(())
    }
}

/// A stalled storage call trips the bounded timeout and aborts cleanly.
#[tokio::test(start_paused = true)]
async fn test_stalled_storage_times_out() {
    let svc = RulesService::with_config(StalledStorage, RulesConfig::default());

    let err = svc
        .set_category_with_rule("Swiggy", "food")
        .await
        .unwrap_err();
    assert!(matches!(err, PersistenceError::Timeout { .. }));
}
