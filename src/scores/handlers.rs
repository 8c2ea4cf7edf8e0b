use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::sync::Arc;
use tracing::{info, instrument, warn};

use super::service::ScoreService;
use super::types::{MaintenanceResponse, ScoreSubmitRequest, ScoreSubmitResponse};
use crate::leaderboard::{self, GameBoard, SubmissionView};
use crate::shared::{AppError, AppState};

fn score_service(state: &AppState) -> ScoreService {
    ScoreService::new(
        Arc::clone(&state.submission_log),
        Arc::clone(&state.best_scores),
        state.store.clone(),
    )
}

/// Shared-secret gate for the submission endpoint. The expected password is
/// resolved at startup (see `Config`); an unconfigured gate refuses every
/// submission rather than letting them through.
fn require_password(expected: Option<&str>, provided: Option<&str>) -> Result<(), AppError> {
    let expected = expected.filter(|p| !p.is_empty());
    let Some(expected) = expected else {
        warn!("Score submission attempted but no API password is configured");
        return Err(AppError::PasswordNotConfigured);
    };
    match provided.filter(|p| !p.is_empty()) {
        None => Err(AppError::MissingPassword),
        Some(provided) if provided != expected => Err(AppError::InvalidPassword),
        Some(_) => Ok(()),
    }
}

/// HTTP handler for score submission
///
/// POST /api/scores
/// Returns 201 with the accepted submission; 400 on validation failure,
/// 401 on password failure, 409 when the score does not beat the current
/// best for its identity key.
#[instrument(name = "submit_score", skip(state, payload))]
pub async fn submit_score(
    State(state): State<AppState>,
    payload: Result<Json<ScoreSubmitRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ScoreSubmitResponse>), AppError> {
    let Json(request) = payload.map_err(|_| AppError::InvalidJson)?;

    require_password(state.api_password.as_deref(), request.password.as_deref())?;

    let submission = score_service(&state)
        .submit(request.into_candidate())
        .await?;

    info!(submission_id = %submission.id, score = submission.score, "Score accepted");
    Ok((
        StatusCode::CREATED,
        Json(ScoreSubmitResponse {
            success: true,
            submission,
        }),
    ))
}

/// Fallback for non-POST methods on the submission route: 405 with an
/// explicit Allow header.
pub async fn scores_method_not_allowed() -> Response {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        [(header::ALLOW, "POST")],
        Json(json!({ "success": false, "error": "Method not allowed" })),
    )
        .into_response()
}

/// GET /api/highscores
///
/// Every game with its current top-10 board, recomputed from the log.
#[instrument(name = "list_highscores", skip(state))]
pub async fn list_highscores(
    State(state): State<AppState>,
) -> Result<Json<Vec<GameBoard>>, AppError> {
    let games = state.catalog.list_games().await?;
    let submissions = state.submission_log.list().await?;
    Ok(Json(leaderboard::highscores_by_game(&games, &submissions)))
}

/// GET /api/submissions
///
/// All submissions newest first, enriched with game and location names.
#[instrument(name = "list_submissions", skip(state))]
pub async fn list_submissions(
    State(state): State<AppState>,
) -> Result<Json<Vec<SubmissionView>>, AppError> {
    let games = state.catalog.list_games().await?;
    let locations = state.catalog.list_locations().await?;
    let submissions = state.submission_log.list().await?;
    Ok(Json(leaderboard::with_meta(
        &submissions,
        &games,
        &locations,
    )))
}

/// DELETE /api/submissions/{id}
#[instrument(name = "delete_submission", skip(state))]
pub async fn delete_submission(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    score_service(&state).delete_submission(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/maintenance/resync
///
/// Reloads the submission log from the store and rebuilds the index from it.
/// Recovery path for callers that treat a store failure as requiring a full
/// resync.
#[instrument(name = "resync", skip(state))]
pub async fn resync(
    State(state): State<AppState>,
) -> Result<Json<MaintenanceResponse>, AppError> {
    let count = score_service(&state).resync().await?;
    Ok(Json(MaintenanceResponse {
        success: true,
        count,
    }))
}

/// POST /api/maintenance/rebuild-index
///
/// Rebuilds the best-score index in place from the current log, pruning any
/// entry whose submission no longer exists.
#[instrument(name = "rebuild_index", skip(state))]
pub async fn rebuild_index(
    State(state): State<AppState>,
) -> Result<Json<MaintenanceResponse>, AppError> {
    let count = score_service(&state).rebuild_index().await?;
    Ok(Json(MaintenanceResponse {
        success: true,
        count,
    }))
}
