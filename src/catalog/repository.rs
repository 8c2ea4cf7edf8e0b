use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use super::models::{Game, Location};
use crate::shared::AppError;

/// Storage for the game/location catalog. Catalog writes are rare and
/// last-write-wins; no invariant spans concurrent catalog writers.
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    async fn list_games(&self) -> Result<Vec<Game>, AppError>;
    async fn get_game(&self, id: &str) -> Result<Option<Game>, AppError>;
    async fn upsert_game(&self, game: &Game) -> Result<(), AppError>;
    async fn remove_game(&self, id: &str) -> Result<Option<Game>, AppError>;

    async fn list_locations(&self) -> Result<Vec<Location>, AppError>;
    async fn get_location(&self, id: &str) -> Result<Option<Location>, AppError>;
    async fn upsert_location(&self, location: &Location) -> Result<(), AppError>;
    async fn remove_location(&self, id: &str) -> Result<Option<Location>, AppError>;

    /// Replaces the whole catalog, e.g. after a resync from the store.
    async fn replace_all(
        &self,
        games: Vec<Game>,
        locations: Vec<Location>,
    ) -> Result<(), AppError>;
}

/// In-memory implementation; insertion order of games and locations is
/// preserved for listing.
#[derive(Debug, Default)]
pub struct InMemoryCatalogRepository {
    inner: RwLock<CatalogState>,
}

#[derive(Debug, Default)]
struct CatalogState {
    games: Vec<Game>,
    locations: Vec<Location>,
}

impl InMemoryCatalogRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CatalogRepository for InMemoryCatalogRepository {
    async fn list_games(&self) -> Result<Vec<Game>, AppError> {
        Ok(self.inner.read().await.games.clone())
    }

    async fn get_game(&self, id: &str) -> Result<Option<Game>, AppError> {
        let state = self.inner.read().await;
        Ok(state.games.iter().find(|g| g.id == id).cloned())
    }

    async fn upsert_game(&self, game: &Game) -> Result<(), AppError> {
        let mut state = self.inner.write().await;
        match state.games.iter_mut().find(|g| g.id == game.id) {
            Some(existing) => *existing = game.clone(),
            None => state.games.push(game.clone()),
        }
        Ok(())
    }

    async fn remove_game(&self, id: &str) -> Result<Option<Game>, AppError> {
        let mut state = self.inner.write().await;
        let idx = state.games.iter().position(|g| g.id == id);
        Ok(idx.map(|i| state.games.remove(i)))
    }

    async fn list_locations(&self) -> Result<Vec<Location>, AppError> {
        Ok(self.inner.read().await.locations.clone())
    }

    async fn get_location(&self, id: &str) -> Result<Option<Location>, AppError> {
        let state = self.inner.read().await;
        Ok(state.locations.iter().find(|l| l.id == id).cloned())
    }

    async fn upsert_location(&self, location: &Location) -> Result<(), AppError> {
        let mut state = self.inner.write().await;
        match state.locations.iter_mut().find(|l| l.id == location.id) {
            Some(existing) => *existing = location.clone(),
            None => state.locations.push(location.clone()),
        }
        Ok(())
    }

    async fn remove_location(&self, id: &str) -> Result<Option<Location>, AppError> {
        let mut state = self.inner.write().await;
        let idx = state.locations.iter().position(|l| l.id == id);
        Ok(idx.map(|i| state.locations.remove(i)))
    }

    async fn replace_all(
        &self,
        games: Vec<Game>,
        locations: Vec<Location>,
    ) -> Result<(), AppError> {
        let mut state = self.inner.write().await;
        state.games = games;
        state.locations = locations;
        Ok(())
    }
}
