//! In-memory store backend.
//!
//! Mirrors the merge semantics of the realtime store for unit tests and
//! local development without network access.

use std::collections::HashMap;

use parking_lot::RwLock;
use uuid::Uuid;

use super::types::{Annotation, SensorEntry};
use super::{SensorStore, StoreError};

#[derive(Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, SensorEntry>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an entry under a generated key, returning the key
    pub fn insert(&self, entry: SensorEntry) -> String {
        let key = Uuid::new_v4().to_string();
        self.entries.write().insert(key.clone(), entry);
        key
    }

    /// Insert an entry under a caller-chosen key
    pub fn insert_with_key(&self, key: &str, entry: SensorEntry) {
        self.entries.write().insert(key.to_string(), entry);
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    pub fn get(&self, key: &str) -> Option<SensorEntry> {
        self.entries.read().get(key).cloned()
    }
}

impl SensorStore for MemoryStore {
    async fn fetch_all(&self) -> Result<HashMap<String, SensorEntry>, StoreError> {
        Ok(self.entries.read().clone())
    }

    async fn update(&self, key: &str, annotation: &Annotation) -> Result<(), StoreError> {
        let mut entries = self.entries.write();
        // The realtime store upserts on PATCH; mirror that here
        let entry = entries.entry(key.to_string()).or_default();
        entry.apply_annotation(annotation);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::store::LeakStatus;
    use serde_json::json;

    #[tokio::test]
    async fn test_update_merges_without_dropping_fields() {
        let store = MemoryStore::new();
        let entry: SensorEntry = serde_json::from_value(json!({
            "flowRate": 12.0,
            "deviceId": "well-7"
        }))
        .unwrap();
        let key = store.insert(entry);

        store
            .update(
                &key,
                &Annotation {
                    status: LeakStatus::Leak,
                    confidence: 61.25,
                    estimated_loss: 76.0,
                    timestamp: "2026-08-07T09:30:00Z".to_string(),
                },
            )
            .await
            .unwrap();

        let stored = store.get(&key).unwrap();
        assert_eq!(stored.flow_rate, Some(12.0));
        assert_eq!(stored.extra["deviceId"], json!("well-7"));
        assert_eq!(stored.status, Some(LeakStatus::Leak));
        assert_eq!(stored.confidence, Some(61.25));
    }

    #[tokio::test]
    async fn test_fetch_all_returns_inserted_entries() {
        let store = MemoryStore::new();
        store.insert_with_key("a", SensorEntry::default());
        store.insert_with_key("b", SensorEntry::default());

        let all = store.fetch_all().await.unwrap();
        assert_eq!(all.len(), 2);
        assert!(all.contains_key("a"));
    }
}
