//! Audit log trait

use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;

/// Shared-state policy: simple key-based put/get, no cross-key
/// transactions, no compare-and-swap. Concurrent writers to the same key
/// are last-write-wins.
#[async_trait]
pub trait AuditLog: Send + Sync {
    /// Append a document to a collection under a store-minted id.
    async fn append(&self, collection: &str, doc: Value) -> Result<()>;

    /// Upsert a document under an explicit key.
    async fn set(&self, collection: &str, key: &str, doc: Value) -> Result<()>;

    /// Point lookup by key. Absence is a normal outcome.
    async fn get(&self, collection: &str, key: &str) -> Result<Option<Value>>;

    /// First document whose top-level `field` equals `value`, in insertion
    /// order.
    async fn find_one(&self, collection: &str, field: &str, value: &Value)
        -> Result<Option<Value>>;

    /// Merge `patch` into the first document whose top-level `field` equals
    /// `value`. Returns whether a document was updated.
    async fn update_one(
        &self,
        collection: &str,
        field: &str,
        value: &Value,
        patch: Value,
    ) -> Result<bool>;
}
