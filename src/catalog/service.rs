use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use super::models::{derive_game_id, Game, Location};
use super::repository::CatalogRepository;
use super::types::{AddGameRequest, AddLocationRequest};
use crate::scores::service::ScoreService;
use crate::shared::AppError;
use crate::store::{collections, CollectionStore};

/// Result of a catalog insertion. Duplicate ids and empty names are silent
/// no-ops rather than errors, matching the interactive client's behavior.
#[derive(Debug, Clone, PartialEq)]
pub enum AddOutcome<T> {
    Created(T),
    /// A record with the same id already exists; nothing was written.
    AlreadyExists,
    /// The request was incomplete (empty name or id); nothing was written.
    Incomplete,
}

/// Result of a catalog removal, reporting the cascade size.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoveOutcome {
    pub removed: bool,
    pub submissions_removed: usize,
}

/// Service for game/location catalog mutations and their cascades into the
/// submission log and best-score index.
pub struct CatalogService {
    catalog: Arc<dyn CatalogRepository>,
    scores: ScoreService,
    store: Option<Arc<dyn CollectionStore>>,
}

impl CatalogService {
    pub fn new(
        catalog: Arc<dyn CatalogRepository>,
        scores: ScoreService,
        store: Option<Arc<dyn CollectionStore>>,
    ) -> Self {
        Self {
            catalog,
            scores,
            store,
        }
    }

    fn store(&self) -> Result<&Arc<dyn CollectionStore>, AppError> {
        self.store.as_ref().ok_or(AppError::NotConfigured)
    }

    /// Adds a game. The id defaults to `code`, then to an uppercase-kebab
    /// derivation of the name.
    #[instrument(skip(self, request))]
    pub async fn add_game(&self, request: AddGameRequest) -> Result<AddOutcome<Game>, AppError> {
        let store = self.store()?;

        let name = request.name.as_deref().unwrap_or("").trim().to_string();
        if name.is_empty() {
            return Ok(AddOutcome::Incomplete);
        }

        let id = [request.id, request.code]
            .into_iter()
            .flatten()
            .map(|v| v.trim().to_string())
            .find(|v| !v.is_empty())
            .unwrap_or_else(|| derive_game_id(&name));

        if self.catalog.get_game(&id).await?.is_some() {
            debug!(game_id = %id, "Game already exists, skipping");
            return Ok(AddOutcome::AlreadyExists);
        }

        let mut game = Game::new(&id, &name);
        for mode in request.modes.unwrap_or_default() {
            let mode = mode.trim().to_string();
            if !mode.is_empty() && !game.modes.contains(&mode) {
                game.modes.push(mode);
            }
        }

        self.catalog.upsert_game(&game).await?;
        self.persist_game(store, &game).await?;
        info!(game_id = %game.id, "Game added");
        Ok(AddOutcome::Created(game))
    }

    /// Adds a location. Both id and name are required; duplicates no-op.
    #[instrument(skip(self, request))]
    pub async fn add_location(
        &self,
        request: AddLocationRequest,
    ) -> Result<AddOutcome<Location>, AppError> {
        let store = self.store()?;

        let id = request.id.as_deref().unwrap_or("").trim().to_string();
        let name = request.name.as_deref().unwrap_or("").trim().to_string();
        if id.is_empty() || name.is_empty() {
            return Ok(AddOutcome::Incomplete);
        }
        if self.catalog.get_location(&id).await?.is_some() {
            debug!(location_id = %id, "Location already exists, skipping");
            return Ok(AddOutcome::AlreadyExists);
        }

        let location = Location::new(&id, &name);
        self.catalog.upsert_location(&location).await?;
        let record =
            serde_json::to_value(&location).map_err(|e| AppError::Internal(e.to_string()))?;
        store.put(collections::LOCATIONS, &location.id, &record).await?;
        info!(location_id = %location.id, "Location added");
        Ok(AddOutcome::Created(location))
    }

    /// Adds a mode to a game's ordered mode set. Adding an existing mode is
    /// a no-op.
    #[instrument(skip(self))]
    pub async fn add_mode(&self, game_id: &str, mode: &str) -> Result<Game, AppError> {
        let store = self.store()?;
        let mut game = self
            .catalog
            .get_game(game_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("game {}", game_id)))?;

        let mode = mode.trim();
        if !mode.is_empty() && !game.modes.iter().any(|m| m == mode) {
            game.modes.push(mode.to_string());
            self.catalog.upsert_game(&game).await?;
            self.persist_game(store, &game).await?;
        }
        Ok(game)
    }

    /// Removes a mode from a game. Removing an absent mode is a no-op.
    #[instrument(skip(self))]
    pub async fn remove_mode(&self, game_id: &str, mode: &str) -> Result<Game, AppError> {
        let store = self.store()?;
        let mut game = self
            .catalog
            .get_game(game_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("game {}", game_id)))?;

        let mode = mode.trim();
        if game.modes.iter().any(|m| m == mode) {
            game.modes.retain(|m| m != mode);
            self.catalog.upsert_game(&game).await?;
            self.persist_game(store, &game).await?;
        }
        Ok(game)
    }

    /// Removes a game and cascades: dependent submissions leave the log, the
    /// best-score index entries they held are pruned, and every deletion is
    /// mirrored to the store.
    #[instrument(skip(self))]
    pub async fn remove_game(&self, id: &str) -> Result<RemoveOutcome, AppError> {
        let store = self.store()?;

        let removed = self.catalog.remove_game(id).await?.is_some();
        let submissions_removed = self.scores.cascade_remove_by_game(id).await?;
        store.delete(collections::GAMES, id).await?;

        info!(game_id = id, removed, submissions_removed, "Game removed");
        Ok(RemoveOutcome {
            removed,
            submissions_removed,
        })
    }

    /// Removes a location with the same cascade contract as `remove_game`.
    #[instrument(skip(self))]
    pub async fn remove_location(&self, id: &str) -> Result<RemoveOutcome, AppError> {
        let store = self.store()?;

        let removed = self.catalog.remove_location(id).await?.is_some();
        let submissions_removed = self.scores.cascade_remove_by_location(id).await?;
        store.delete(collections::LOCATIONS, id).await?;

        info!(location_id = id, removed, submissions_removed, "Location removed");
        Ok(RemoveOutcome {
            removed,
            submissions_removed,
        })
    }

    /// Reloads games and locations from the store.
    #[instrument(skip(self))]
    pub async fn resync(&self) -> Result<(), AppError> {
        let store = self.store()?;

        let mut games = Vec::new();
        for record in store.fetch_all(collections::GAMES).await? {
            match serde_json::from_value::<Game>(record.fields.clone()) {
                Ok(game) => games.push(game),
                Err(e) => warn!(id = %record.id, error = %e, "Skipping malformed game record"),
            }
        }
        let mut locations = Vec::new();
        for record in store.fetch_all(collections::LOCATIONS).await? {
            match serde_json::from_value::<Location>(record.fields.clone()) {
                Ok(location) => locations.push(location),
                Err(e) => {
                    warn!(id = %record.id, error = %e, "Skipping malformed location record")
                }
            }
        }

        info!(
            games = games.len(),
            locations = locations.len(),
            "Resynced catalog from store"
        );
        self.catalog.replace_all(games, locations).await?;
        Ok(())
    }

    async fn persist_game(
        &self,
        store: &Arc<dyn CollectionStore>,
        game: &Game,
    ) -> Result<(), AppError> {
        let record = serde_json::to_value(game).map_err(|e| AppError::Internal(e.to_string()))?;
        store.put(collections::GAMES, &game.id, &record).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::repository::InMemoryCatalogRepository;
    use crate::scores::admission::ScoreCandidate;
    use crate::scores::index::{BestScoreIndex, InMemoryBestScoreIndex};
    use crate::scores::log::{InMemorySubmissionLog, SubmissionLog};
    use crate::scores::models::IdentityKey;
    use crate::store::InMemoryCollectionStore;
    use serde_json::json;

    struct Fixture {
        catalog: Arc<InMemoryCatalogRepository>,
        log: Arc<InMemorySubmissionLog>,
        index: Arc<InMemoryBestScoreIndex>,
        store: Arc<InMemoryCollectionStore>,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                catalog: Arc::new(InMemoryCatalogRepository::new()),
                log: Arc::new(InMemorySubmissionLog::new()),
                index: Arc::new(InMemoryBestScoreIndex::new()),
                store: Arc::new(InMemoryCollectionStore::new()),
            }
        }

        fn catalog_service(&self) -> CatalogService {
            CatalogService::new(
                self.catalog.clone(),
                self.score_service(),
                Some(self.store.clone()),
            )
        }

        fn score_service(&self) -> ScoreService {
            ScoreService::new(
                self.log.clone(),
                self.index.clone(),
                Some(self.store.clone()),
            )
        }
    }

    fn game_request(name: &str) -> AddGameRequest {
        AddGameRequest {
            id: None,
            code: None,
            name: Some(name.to_string()),
            modes: None,
        }
    }

    fn candidate(tag: &str, game_id: &str, location_id: &str, score: u64) -> ScoreCandidate {
        ScoreCandidate {
            gamertag: Some(tag.to_string()),
            score: Some(json!(score)),
            game_id: Some(game_id.to_string()),
            location_id: Some(location_id.to_string()),
            mode: None,
        }
    }

    #[tokio::test]
    async fn add_game_derives_id_from_name() {
        let fx = Fixture::new();
        let service = fx.catalog_service();

        let outcome = service.add_game(game_request("Donkey Kong")).await.unwrap();
        match outcome {
            AddOutcome::Created(game) => assert_eq!(game.id, "DONKEY-KONG"),
            other => panic!("expected creation, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn add_game_prefers_explicit_id_then_code() {
        let fx = Fixture::new();
        let service = fx.catalog_service();

        let mut request = game_request("Pac-Man");
        request.code = Some("PAC".to_string());
        match service.add_game(request).await.unwrap() {
            AddOutcome::Created(game) => assert_eq!(game.id, "PAC"),
            other => panic!("expected creation, got {:?}", other),
        }

        let mut request = game_request("Dig Dug");
        request.id = Some("DIG".to_string());
        request.code = Some("IGNORED".to_string());
        match service.add_game(request).await.unwrap() {
            AddOutcome::Created(game) => assert_eq!(game.id, "DIG"),
            other => panic!("expected creation, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn duplicate_game_and_empty_name_are_noops() {
        let fx = Fixture::new();
        let service = fx.catalog_service();

        service.add_game(game_request("Galaga")).await.unwrap();
        let dup = service.add_game(game_request("Galaga")).await.unwrap();
        assert_eq!(dup, AddOutcome::AlreadyExists);

        let blank = service.add_game(game_request("   ")).await.unwrap();
        assert_eq!(blank, AddOutcome::Incomplete);

        assert_eq!(fx.catalog.list_games().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn modes_behave_as_an_insertion_ordered_set() {
        let fx = Fixture::new();
        let service = fx.catalog_service();
        service.add_game(game_request("Tekken")).await.unwrap();

        service.add_mode("TEKKEN", "arcade").await.unwrap();
        service.add_mode("TEKKEN", "versus").await.unwrap();
        let game = service.add_mode("TEKKEN", "arcade").await.unwrap();
        assert_eq!(game.modes, vec!["arcade".to_string(), "versus".to_string()]);

        let game = service.remove_mode("TEKKEN", "arcade").await.unwrap();
        assert_eq!(game.modes, vec!["versus".to_string()]);

        // Removing an absent mode is a no-op.
        let game = service.remove_mode("TEKKEN", "arcade").await.unwrap();
        assert_eq!(game.modes, vec!["versus".to_string()]);
    }

    #[tokio::test]
    async fn mode_mutation_on_unknown_game_is_not_found() {
        let fx = Fixture::new();
        let service = fx.catalog_service();
        let result = service.add_mode("NOPE", "arcade").await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn remove_game_cascades_into_log_and_index() {
        let fx = Fixture::new();
        let catalog_service = fx.catalog_service();
        let score_service = fx.score_service();

        let mut request = game_request("Pac-Man");
        request.code = Some("PAC".to_string());
        catalog_service.add_game(request).await.unwrap();

        score_service
            .submit(candidate("Rex", "PAC", "ARC1", 100))
            .await
            .unwrap();
        score_service
            .submit(candidate("Ana", "PAC", "ARC2", 80))
            .await
            .unwrap();
        score_service
            .submit(candidate("Rex", "DIG", "ARC1", 60))
            .await
            .unwrap();

        let outcome = catalog_service.remove_game("PAC").await.unwrap();
        assert!(outcome.removed);
        assert_eq!(outcome.submissions_removed, 2);

        let remaining = fx.log.list().await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].game_id, "DIG");

        // Index entries for the removed game are pruned, the survivor stays.
        assert!(fx
            .index
            .lookup(&IdentityKey::new("PAC", "ARC1", "rex"))
            .await
            .unwrap()
            .is_none());
        assert!(fx
            .index
            .lookup(&IdentityKey::new("DIG", "ARC1", "rex"))
            .await
            .unwrap()
            .is_some());
    }

    #[tokio::test]
    async fn remove_location_cascades_too() {
        let fx = Fixture::new();
        let catalog_service = fx.catalog_service();
        let score_service = fx.score_service();

        catalog_service
            .add_location(AddLocationRequest {
                id: Some("ARC1".to_string()),
                name: Some("Flynn's".to_string()),
            })
            .await
            .unwrap();
        score_service
            .submit(candidate("Rex", "PAC", "ARC1", 100))
            .await
            .unwrap();
        score_service
            .submit(candidate("Rex", "PAC", "ARC2", 100))
            .await
            .unwrap();

        let outcome = catalog_service.remove_location("ARC1").await.unwrap();
        assert!(outcome.removed);
        assert_eq!(outcome.submissions_removed, 1);
        assert_eq!(fx.log.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn without_a_store_catalog_mutations_are_rejected() {
        let fx = Fixture::new();
        let service = CatalogService::new(
            fx.catalog.clone(),
            ScoreService::new(fx.log.clone(), fx.index.clone(), None),
            None,
        );

        let result = service.add_game(game_request("Pac-Man")).await;
        assert!(matches!(result, Err(AppError::NotConfigured)));
        let result = service.remove_game("PAC").await;
        assert!(matches!(result, Err(AppError::NotConfigured)));
    }

    #[tokio::test]
    async fn resync_replaces_catalog_from_store() {
        let fx = Fixture::new();
        let service = fx.catalog_service();
        service.add_game(game_request("Pac-Man")).await.unwrap();

        // Drop in-memory state, then recover.
        fx.catalog.replace_all(Vec::new(), Vec::new()).await.unwrap();
        service.resync().await.unwrap();

        let games = fx.catalog.list_games().await.unwrap();
        assert_eq!(games.len(), 1);
        assert_eq!(games[0].name, "Pac-Man");
    }
}
