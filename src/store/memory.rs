use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use tokio::sync::RwLock;

use super::{CollectionStore, Record, StoreError};

/// In-memory collection store for tests and local development.
#[derive(Debug, Default)]
pub struct InMemoryCollectionStore {
    collections: RwLock<HashMap<String, HashMap<String, Value>>>,
}

impl InMemoryCollectionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records currently held in a collection. Test helper.
    pub async fn count(&self, collection: &str) -> usize {
        let collections = self.collections.read().await;
        collections.get(collection).map_or(0, HashMap::len)
    }
}

#[async_trait]
impl CollectionStore for InMemoryCollectionStore {
    async fn fetch_all(&self, collection: &str) -> Result<Vec<Record>, StoreError> {
        let collections = self.collections.read().await;
        let mut records: Vec<Record> = collections
            .get(collection)
            .map(|records| {
                records
                    .iter()
                    .map(|(id, fields)| Record {
                        id: id.clone(),
                        fields: fields.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default();
        // HashMap iteration order is arbitrary; keep reads deterministic.
        records.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(records)
    }

    async fn put(&self, collection: &str, id: &str, fields: &Value) -> Result<(), StoreError> {
        if id.is_empty() {
            return Err(StoreError::MissingId);
        }
        let mut collections = self.collections.write().await;
        collections
            .entry(collection.to_string())
            .or_default()
            .insert(id.to_string(), fields.clone());
        Ok(())
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        let mut collections = self.collections.write().await;
        if let Some(records) = collections.get_mut(collection) {
            records.remove(id);
        }
        Ok(())
    }
}
