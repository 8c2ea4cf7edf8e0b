use std::sync::Arc;
use tracing::{error, info};

use crate::catalog::repository::{CatalogRepository, InMemoryCatalogRepository};
use crate::catalog::service::CatalogService;
use crate::scores::index::InMemoryBestScoreIndex;
use crate::scores::log::InMemorySubmissionLog;
use crate::scores::service::ScoreService;
use crate::seed;
use crate::shared::AppState;
use crate::store::CollectionStore;

/// Assembles the application state and hydrates it.
///
/// With a store, the in-memory log, index, and catalog are loaded from the
/// remote collections; if that initial load fails the service starts on the
/// seed dataset instead, still store-backed, and a later resync can recover.
/// Without a store the seed dataset is used and the state is read-only.
pub async fn init_state(
    store: Option<Arc<dyn CollectionStore>>,
    api_password: Option<String>,
) -> AppState {
    let catalog: Arc<dyn CatalogRepository> = Arc::new(InMemoryCatalogRepository::new());
    let log = Arc::new(InMemorySubmissionLog::new());
    let index = Arc::new(InMemoryBestScoreIndex::new());

    let state = AppState::new(
        Arc::clone(&catalog),
        log.clone(),
        index.clone(),
        store.clone(),
        api_password,
    );

    if let Some(store) = store {
        let scores = ScoreService::new(log.clone(), index.clone(), Some(store.clone()));
        let catalog_service = CatalogService::new(
            Arc::clone(&catalog),
            ScoreService::new(log.clone(), index.clone(), Some(store.clone())),
            Some(store),
        );

        let loaded = match (catalog_service.resync().await, scores.resync().await) {
            (Ok(()), Ok(count)) => {
                info!(submissions = count, "Hydrated state from store");
                true
            }
            (catalog_result, scores_result) => {
                if let Err(e) = catalog_result {
                    error!(error = %e, "Catalog hydration from store failed");
                }
                if let Err(e) = scores_result {
                    error!(error = %e, "Submission hydration from store failed");
                }
                false
            }
        };
        if !loaded {
            info!("Falling back to seed dataset");
            hydrate_seed(&state).await;
        }
    } else {
        hydrate_seed(&state).await;
    }

    state
}

async fn hydrate_seed(state: &AppState) {
    // Seeding only touches in-memory state; these calls cannot fail.
    let _ = state
        .catalog
        .replace_all(seed::seed_games(), seed::seed_locations())
        .await;
    let scores = ScoreService::new(
        Arc::clone(&state.submission_log),
        Arc::clone(&state.best_scores),
        None,
    );
    let _ = scores.hydrate(seed::seed_submissions()).await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scores::models::IdentityKey;
    use crate::store::{collections, InMemoryCollectionStore};
    use serde_json::json;

    #[tokio::test]
    async fn without_store_state_is_seeded_and_read_only() {
        let state = init_state(None, Some("pw".to_string())).await;

        assert!(state.store.is_none());
        assert!(!state.catalog.list_games().await.unwrap().is_empty());
        assert!(!state.submission_log.list().await.unwrap().is_empty());

        // Seed submissions are reflected in the index.
        let key = IdentityKey::new("PAC", "ARC1", "ana");
        assert!(state.best_scores.lookup(&key).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn with_store_state_is_hydrated_from_collections() {
        let store = Arc::new(InMemoryCollectionStore::new());
        store
            .put(collections::GAMES, "PAC", &json!({"id": "PAC", "name": "Pac-Man"}))
            .await
            .unwrap();
        store
            .put(
                collections::SUBMISSIONS,
                "sub-1",
                &json!({
                    "id": "sub-1",
                    "timestamp": "2024-01-01T00:00:00Z",
                    "gamertag": "Rex",
                    "score": 100,
                    "gameId": "PAC",
                    "locationId": "ARC1",
                    "mode": null
                }),
            )
            .await
            .unwrap();

        let state = init_state(Some(store), Some("pw".to_string())).await;

        let games = state.catalog.list_games().await.unwrap();
        assert_eq!(games.len(), 1);
        let log = state.submission_log.list().await.unwrap();
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].id, "sub-1");

        let key = IdentityKey::new("PAC", "ARC1", "rex");
        let entry = state.best_scores.lookup(&key).await.unwrap().unwrap();
        assert_eq!(entry.submission_id, "sub-1");
    }

    #[tokio::test]
    async fn empty_store_means_empty_state_not_seed() {
        let store = Arc::new(InMemoryCollectionStore::new());
        let state = init_state(Some(store), None).await;

        // An empty store is a valid (empty) dataset, not a failure.
        assert!(state.catalog.list_games().await.unwrap().is_empty());
        assert!(state.submission_log.list().await.unwrap().is_empty());
    }
}
