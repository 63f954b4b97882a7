use serde_json::json;

use super::cycle::run_cycle;
use crate::logic::model::{AnomalyScorer, DecisionModel, ModelError};
use crate::logic::store::{LeakStatus, MemoryStore, SensorEntry};

/// Stub model returning a fixed decision score
struct FixedScore(f64);

impl DecisionModel for FixedScore {
    fn decision_function(&self, _features: &[f64]) -> Result<f64, ModelError> {
        Ok(self.0)
    }
}

struct FailingModel;

impl DecisionModel for FailingModel {
    fn decision_function(&self, _features: &[f64]) -> Result<f64, ModelError> {
        Err(ModelError("bad feature shape".to_string()))
    }
}

fn entry(value: serde_json::Value) -> SensorEntry {
    serde_json::from_value(value).unwrap()
}

#[tokio::test]
async fn test_unprocessed_entry_gets_annotated() {
    let store = MemoryStore::new();
    store.insert_with_key("pump-1", entry(json!({ "flowRate": 30.0, "prev_flow": 50.0 })));

    let scorer = AnomalyScorer::new(FixedScore(-0.3));
    let report = run_cycle(&store, &scorer, 50.0).await.unwrap();

    assert_eq!(report.fetched, 1);
    assert_eq!(report.annotated, 1);
    assert_eq!(report.leaks, 1);
    assert_eq!(report.failures, 0);

    let annotated = store.get("pump-1").unwrap();
    assert_eq!(annotated.status, Some(LeakStatus::Leak));
    assert_eq!(annotated.confidence, Some(70.0));
    assert_eq!(annotated.estimated_loss, Some(40.0));
    // The reading itself is untouched by the partial update
    assert_eq!(annotated.flow_rate, Some(30.0));
}

#[tokio::test]
async fn test_processed_entry_is_left_alone() {
    let store = MemoryStore::new();
    store.insert_with_key(
        "pump-2",
        entry(json!({
            "flowRate": 48.0,
            "status": "Normal",
            "confidence": 93.5,
            "estimated_loss": 4.0,
            "timestamp": "2026-08-06T22:00:00Z"
        })),
    );

    // A scorer that would flag everything, to prove it never runs
    let scorer = AnomalyScorer::new(FixedScore(-0.9));
    let report = run_cycle(&store, &scorer, 50.0).await.unwrap();

    assert_eq!(report.skipped, 1);
    assert_eq!(report.annotated, 0);

    let untouched = store.get("pump-2").unwrap();
    assert_eq!(untouched.status, Some(LeakStatus::Normal));
    assert_eq!(untouched.confidence, Some(93.5));
    assert_eq!(untouched.timestamp.as_deref(), Some("2026-08-06T22:00:00Z"));
}

#[tokio::test]
async fn test_empty_store_performs_no_writes() {
    let store = MemoryStore::new();
    let scorer = AnomalyScorer::new(FixedScore(0.0));

    let report = run_cycle(&store, &scorer, 50.0).await.unwrap();

    assert_eq!(report.fetched, 0);
    assert_eq!(report.annotated, 0);
    assert!(store.is_empty());
}

#[tokio::test]
async fn test_scoring_failure_skips_only_that_entry() {
    let store = MemoryStore::new();
    store.insert_with_key("bad", entry(json!({ "flowRate": 10.0 })));

    let scorer = AnomalyScorer::new(FailingModel);
    let report = run_cycle(&store, &scorer, 50.0).await.unwrap();

    assert_eq!(report.failures, 1);
    assert_eq!(report.annotated, 0);

    // Entry stays unprocessed and is eligible for retry next cycle
    assert!(!store.get("bad").unwrap().is_processed());
}

#[tokio::test]
async fn test_mixed_cycle_annotates_only_fresh_entries() {
    let store = MemoryStore::new();
    store.insert_with_key("fresh", entry(json!({ "flowRate": 44.0, "prev_flow": 46.0 })));
    store.insert_with_key(
        "done",
        entry(json!({ "flowRate": 50.0, "status": "Normal", "confidence": 90.0 })),
    );

    let scorer = AnomalyScorer::new(FixedScore(0.05));
    let report = run_cycle(&store, &scorer, 50.0).await.unwrap();

    assert_eq!(report.fetched, 2);
    assert_eq!(report.skipped, 1);
    assert_eq!(report.annotated, 1);
    assert_eq!(report.leaks, 0);

    let annotated = store.get("fresh").unwrap();
    assert_eq!(annotated.status, Some(LeakStatus::Normal));
    assert_eq!(annotated.confidence, Some(95.0));
    assert_eq!(annotated.estimated_loss, Some(12.0));
}

#[tokio::test]
async fn test_annotation_defaults_timestamp_when_entry_has_none() {
    let store = MemoryStore::new();
    store.insert_with_key("no-ts", entry(json!({ "flowRate": 20.0 })));

    let scorer = AnomalyScorer::new(FixedScore(0.0));
    run_cycle(&store, &scorer, 50.0).await.unwrap();

    let annotated = store.get("no-ts").unwrap();
    assert!(annotated.timestamp.is_some());
}

#[tokio::test]
async fn test_annotation_carries_entry_timestamp_through() {
    let store = MemoryStore::new();
    store.insert_with_key(
        "with-ts",
        entry(json!({ "flowRate": 20.0, "timestamp": "2026-08-07T08:15:00Z" })),
    );

    let scorer = AnomalyScorer::new(FixedScore(0.0));
    run_cycle(&store, &scorer, 50.0).await.unwrap();

    let annotated = store.get("with-ts").unwrap();
    assert_eq!(annotated.timestamp.as_deref(), Some("2026-08-07T08:15:00Z"));
}
