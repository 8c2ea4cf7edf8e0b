// Remote collection store abstraction.
//
// The store is a namespaced key-value service: each collection maps record
// ids to JSON documents. The production backend speaks a Firebase-RTDB-style
// REST dialect (see `remote`); tests and local development use the in-memory
// implementation.

mod memory;
mod remote;

pub use memory::InMemoryCollectionStore;
pub use remote::HttpCollectionStore;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

/// One record as returned by a collection read: the store keys records by id
/// and the id is folded back into the record on the way out.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub id: String,
    pub fields: Value,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Cannot persist record without an id")]
    MissingId,
}

/// Per-collection read/write/delete against the backing store.
///
/// Collections are small and fully loaded; there is no pagination. Writes are
/// upserts by id, last-write-wins. The admission transaction's atomicity is
/// enforced on the in-process best-score index, not here.
#[async_trait]
pub trait CollectionStore: Send + Sync {
    /// Lists every record in a collection. An absent collection is empty.
    async fn fetch_all(&self, collection: &str) -> Result<Vec<Record>, StoreError>;

    /// Upserts one record by id.
    async fn put(&self, collection: &str, id: &str, fields: &Value) -> Result<(), StoreError>;

    /// Deletes one record by id. Deleting an absent record is a no-op.
    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError>;
}

pub mod collections {
    pub const GAMES: &str = "games";
    pub const LOCATIONS: &str = "locations";
    pub const SUBMISSIONS: &str = "submissions";
    pub const HIGHSCORES: &str = "highscores";
}
