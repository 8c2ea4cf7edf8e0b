use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, warn};

use super::{CollectionStore, Record, StoreError};

/// HTTP-backed collection store speaking the Firebase-RTDB REST dialect:
/// `GET {base}/{collection}.json` returns a map of id to record,
/// `PUT`/`DELETE {base}/{collection}/{id}.json` write one record.
pub struct HttpCollectionStore {
    client: reqwest::Client,
    base_url: String,
}

impl HttpCollectionStore {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}.json", self.base_url, path)
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response, StoreError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(%status, "Store request failed");
            return Err(StoreError::Unavailable(format!(
                "store request failed ({}): {}",
                status, body
            )));
        }
        Ok(response)
    }
}

#[async_trait]
impl CollectionStore for HttpCollectionStore {
    async fn fetch_all(&self, collection: &str) -> Result<Vec<Record>, StoreError> {
        let response = self
            .client
            .get(self.url(collection))
            .send()
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        let response = Self::check(response).await?;

        // The store returns `null` for an empty collection.
        let snapshot: Value = response
            .json()
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        let mut records = match snapshot {
            Value::Object(map) => map
                .into_iter()
                .map(|(id, fields)| Record { id, fields })
                .collect(),
            Value::Null => Vec::new(),
            other => {
                return Err(StoreError::Unavailable(format!(
                    "unexpected snapshot shape for {}: {}",
                    collection, other
                )))
            }
        };
        records.sort_by(|a: &Record, b: &Record| a.id.cmp(&b.id));
        debug!(collection, count = records.len(), "Fetched collection");
        Ok(records)
    }

    async fn put(&self, collection: &str, id: &str, fields: &Value) -> Result<(), StoreError> {
        if id.is_empty() {
            return Err(StoreError::MissingId);
        }
        let response = self
            .client
            .put(self.url(&format!("{}/{}", collection, id)))
            .json(fields)
            .send()
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        Self::check(response).await?;
        Ok(())
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        if id.is_empty() {
            return Ok(());
        }
        let response = self
            .client
            .delete(self.url(&format!("{}/{}", collection, id)))
            .send()
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        Self::check(response).await?;
        Ok(())
    }
}
