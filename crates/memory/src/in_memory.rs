//! In-memory relationship store: useful for testing and ephemeral sessions.

use async_trait::async_trait;
use lucan_core::error::MemoryError;
use lucan_core::relationship::{
    sanitize_name, timestamp_now, RelationshipRecord, RelationshipStore,
};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Keeps records in a map keyed by sanitized name. Nothing is persisted.
pub struct InMemoryRelationshipStore {
    records: Arc<RwLock<HashMap<String, RelationshipRecord>>>,
}

impl InMemoryRelationshipStore {
    pub fn new() -> Self {
        Self {
            records: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Seed the store with existing records.
    pub fn with_records(records: impl IntoIterator<Item = RelationshipRecord>) -> Self {
        let map = records
            .into_iter()
            .map(|r| (sanitize_name(&r.name), r))
            .collect();
        Self {
            records: Arc::new(RwLock::new(map)),
        }
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

impl Default for InMemoryRelationshipStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RelationshipStore for InMemoryRelationshipStore {
    fn name(&self) -> &str {
        "in_memory"
    }

    async fn add_note(
        &self,
        name: &str,
        relationship_type: &str,
        note: &str,
    ) -> Result<RelationshipRecord, MemoryError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(MemoryError::InvalidKey("Name cannot be empty".into()));
        }
        let key = sanitize_name(name);
        if key.is_empty() {
            return Err(MemoryError::InvalidKey(format!(
                "Name '{name}' has no usable characters"
            )));
        }

        let now = timestamp_now();
        let mut records = self.records.write().await;
        let record = records
            .entry(key)
            .or_insert_with(|| RelationshipRecord::new(name, relationship_type, &now));
        record.apply_note(relationship_type, note, &now);
        Ok(record.clone())
    }

    async fn get_notes(&self, name: &str) -> Result<Option<RelationshipRecord>, MemoryError> {
        Ok(self.records.read().await.get(&sanitize_name(name)).cloned())
    }

    async fn list(&self) -> Result<Vec<RelationshipRecord>, MemoryError> {
        let mut records: Vec<RelationshipRecord> =
            self.records.read().await.values().cloned().collect();
        records.sort_by_key(|r| r.name.to_lowercase());
        Ok(records)
    }
}
