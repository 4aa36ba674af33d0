//! In-memory audit log

use async_trait::async_trait;
use dashmap::DashMap;
use parking_lot::Mutex;
use serde_json::Value;
use std::sync::Arc;
use uuid::Uuid;

use crate::error::Result;
use crate::log::AuditLog;

/// Process-local audit log.
///
/// Collections keep insertion order so `find_one` returns the oldest match,
/// matching the hosted store's query-with-limit-1 behavior.
#[derive(Clone)]
pub struct InMemoryAuditLog {
    collections: Arc<DashMap<String, Mutex<Vec<(String, Value)>>>>,
}

impl InMemoryAuditLog {
    pub fn new() -> Self {
        InMemoryAuditLog {
            collections: Arc::new(DashMap::new()),
        }
    }

    /// Snapshot of a collection's documents, for tests and diagnostics.
    pub fn documents(&self, collection: &str) -> Vec<Value> {
        self.collections
            .get(collection)
            .map(|entry| entry.lock().iter().map(|(_, doc)| doc.clone()).collect())
            .unwrap_or_default()
    }

    fn with_collection<R>(&self, collection: &str, f: impl FnOnce(&mut Vec<(String, Value)>) -> R) -> R {
        let entry = self
            .collections
            .entry(collection.to_string())
            .or_insert_with(|| Mutex::new(Vec::new()));
        let mut docs = entry.lock();
        f(&mut docs)
    }
}

fn matches(doc: &Value, field: &str, value: &Value) -> bool {
    doc.get(field) == Some(value)
}

fn merge(doc: &mut Value, patch: Value) {
    if let (Some(target), Value::Object(fields)) = (doc.as_object_mut(), patch) {
        for (k, v) in fields {
            target.insert(k, v);
        }
    }
}

#[async_trait]
impl AuditLog for InMemoryAuditLog {
    async fn append(&self, collection: &str, doc: Value) -> Result<()> {
        self.with_collection(collection, |docs| {
            docs.push((Uuid::new_v4().to_string(), doc));
        });
        Ok(())
    }

    async fn set(&self, collection: &str, key: &str, doc: Value) -> Result<()> {
        self.with_collection(collection, |docs| {
            match docs.iter_mut().find(|(k, _)| k == key) {
                Some((_, existing)) => *existing = doc,
                None => docs.push((key.to_string(), doc)),
            }
        });
        Ok(())
    }

    async fn get(&self, collection: &str, key: &str) -> Result<Option<Value>> {
        Ok(self.with_collection(collection, |docs| {
            docs.iter().find(|(k, _)| k == key).map(|(_, doc)| doc.clone())
        }))
    }

    async fn find_one(
        &self,
        collection: &str,
        field: &str,
        value: &Value,
    ) -> Result<Option<Value>> {
        Ok(self.with_collection(collection, |docs| {
            docs.iter()
                .find(|(_, doc)| matches(doc, field, value))
                .map(|(_, doc)| doc.clone())
        }))
    }

    async fn update_one(
        &self,
        collection: &str,
        field: &str,
        value: &Value,
        patch: Value,
    ) -> Result<bool> {
        Ok(self.with_collection(collection, |docs| {
            match docs.iter_mut().find(|(_, doc)| matches(doc, field, value)) {
                Some((_, doc)) => {
                    merge(doc, patch);
                    true
                }
                None => false,
            }
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn set_then_get_returns_same_document() {
        let log = InMemoryAuditLog::new();
        log.set("call_mappings", "CA1", json!({"record_id": "L1"}))
            .await
            .unwrap();
        let doc = log.get("call_mappings", "CA1").await.unwrap();
        assert_eq!(doc, Some(json!({"record_id": "L1"})));
    }

    #[tokio::test]
    async fn get_unwritten_key_is_absent() {
        let log = InMemoryAuditLog::new();
        assert_eq!(log.get("call_mappings", "CA-missing").await.unwrap(), None);
    }

    #[tokio::test]
    async fn set_is_last_write_wins() {
        let log = InMemoryAuditLog::new();
        log.set("call_mappings", "CA1", json!({"record_id": "L1"}))
            .await
            .unwrap();
        log.set("call_mappings", "CA1", json!({"record_id": "L2"}))
            .await
            .unwrap();
        let doc = log.get("call_mappings", "CA1").await.unwrap().unwrap();
        assert_eq!(doc["record_id"], "L2");
    }

    #[tokio::test]
    async fn find_one_returns_oldest_match() {
        let log = InMemoryAuditLog::new();
        log.append("call_logs", json!({"CallSid": "CA1", "CallStatus": "initiated"}))
            .await
            .unwrap();
        log.append("call_logs", json!({"CallSid": "CA1", "CallStatus": "completed"}))
            .await
            .unwrap();
        let doc = log
            .find_one("call_logs", "CallSid", &json!("CA1"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(doc["CallStatus"], "initiated");
    }

    #[tokio::test]
    async fn update_one_merges_patch_and_reports_miss() {
        let log = InMemoryAuditLog::new();
        log.append("call_logs", json!({"CallSid": "CA1", "CallStatus": "completed"}))
            .await
            .unwrap();

        let updated = log
            .update_one(
                "call_logs",
                "CallSid",
                &json!("CA1"),
                json!({"RecordingSid": "RE1"}),
            )
            .await
            .unwrap();
        assert!(updated);

        let doc = log
            .find_one("call_logs", "CallSid", &json!("CA1"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(doc["CallStatus"], "completed");
        assert_eq!(doc["RecordingSid"], "RE1");

        let missed = log
            .update_one("call_logs", "CallSid", &json!("CA2"), json!({"x": 1}))
            .await
            .unwrap();
        assert!(!missed);
    }
}
