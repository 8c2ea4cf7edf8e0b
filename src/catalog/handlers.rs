use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use tracing::instrument;

use super::models::{Game, Location};
use super::service::{AddOutcome, CatalogService};
use super::types::{
    AddGameRequest, AddGameResponse, AddLocationRequest, AddLocationResponse, AddModeRequest,
    RemoveResponse,
};
use crate::scores::service::ScoreService;
use crate::shared::{AppError, AppState};

fn catalog_service(state: &AppState) -> CatalogService {
    let scores = ScoreService::new(
        Arc::clone(&state.submission_log),
        Arc::clone(&state.best_scores),
        state.store.clone(),
    );
    CatalogService::new(Arc::clone(&state.catalog), scores, state.store.clone())
}

/// GET /api/games
#[instrument(name = "list_games", skip(state))]
pub async fn list_games(State(state): State<AppState>) -> Result<Json<Vec<Game>>, AppError> {
    Ok(Json(state.catalog.list_games().await?))
}

/// GET /api/locations
#[instrument(name = "list_locations", skip(state))]
pub async fn list_locations(
    State(state): State<AppState>,
) -> Result<Json<Vec<Location>>, AppError> {
    Ok(Json(state.catalog.list_locations().await?))
}

/// POST /api/games
///
/// Duplicate ids and empty names report `created: false` with 200 instead of
/// an error.
#[instrument(name = "add_game", skip(state, request))]
pub async fn add_game(
    State(state): State<AppState>,
    Json(request): Json<AddGameRequest>,
) -> Result<(StatusCode, Json<AddGameResponse>), AppError> {
    let outcome = catalog_service(&state).add_game(request).await?;
    Ok(match outcome {
        AddOutcome::Created(game) => (
            StatusCode::CREATED,
            Json(AddGameResponse {
                created: true,
                game: Some(game),
            }),
        ),
        AddOutcome::AlreadyExists | AddOutcome::Incomplete => (
            StatusCode::OK,
            Json(AddGameResponse {
                created: false,
                game: None,
            }),
        ),
    })
}

/// DELETE /api/games/{id}
///
/// Cascades into the submission log and best-score index.
#[instrument(name = "remove_game", skip(state))]
pub async fn remove_game(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<RemoveResponse>, AppError> {
    let outcome = catalog_service(&state).remove_game(&id).await?;
    Ok(Json(RemoveResponse {
        removed: outcome.removed,
        submissions_removed: outcome.submissions_removed,
    }))
}

/// POST /api/games/{id}/modes
#[instrument(name = "add_mode", skip(state, request))]
pub async fn add_mode(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<AddModeRequest>,
) -> Result<Json<Game>, AppError> {
    let game = catalog_service(&state).add_mode(&id, &request.mode).await?;
    Ok(Json(game))
}

/// DELETE /api/games/{id}/modes/{mode}
#[instrument(name = "remove_mode", skip(state))]
pub async fn remove_mode(
    State(state): State<AppState>,
    Path((id, mode)): Path<(String, String)>,
) -> Result<Json<Game>, AppError> {
    let game = catalog_service(&state).remove_mode(&id, &mode).await?;
    Ok(Json(game))
}

/// POST /api/locations
#[instrument(name = "add_location", skip(state, request))]
pub async fn add_location(
    State(state): State<AppState>,
    Json(request): Json<AddLocationRequest>,
) -> Result<(StatusCode, Json<AddLocationResponse>), AppError> {
    let outcome = catalog_service(&state).add_location(request).await?;
    Ok(match outcome {
        AddOutcome::Created(location) => (
            StatusCode::CREATED,
            Json(AddLocationResponse {
                created: true,
                location: Some(location),
            }),
        ),
        AddOutcome::AlreadyExists | AddOutcome::Incomplete => (
            StatusCode::OK,
            Json(AddLocationResponse {
                created: false,
                location: None,
            }),
        ),
    })
}

/// DELETE /api/locations/{id}
///
/// Cascades like game removal.
#[instrument(name = "remove_location", skip(state))]
pub async fn remove_location(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<RemoveResponse>, AppError> {
    let outcome = catalog_service(&state).remove_location(&id).await?;
    Ok(Json(RemoveResponse {
        removed: outcome.removed,
        submissions_removed: outcome.submissions_removed,
    }))
}
