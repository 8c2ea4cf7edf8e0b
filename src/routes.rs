use axum::{
    routing::{delete, get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::catalog;
use crate::scores;
use crate::shared::AppState;

/// Builds the full application router.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(
            "/api/scores",
            post(scores::submit_score).fallback(scores::scores_method_not_allowed),
        )
        .route("/api/highscores", get(scores::list_highscores))
        .route("/api/submissions", get(scores::list_submissions))
        .route("/api/submissions/:id", delete(scores::delete_submission))
        .route(
            "/api/games",
            post(catalog::add_game).get(catalog::list_games),
        )
        .route("/api/games/:id", delete(catalog::remove_game))
        .route("/api/games/:id/modes", post(catalog::add_mode))
        .route(
            "/api/games/:id/modes/:mode",
            delete(catalog::remove_mode),
        )
        .route(
            "/api/locations",
            post(catalog::add_location).get(catalog::list_locations),
        )
        .route("/api/locations/:id", delete(catalog::remove_location))
        .route("/api/maintenance/resync", post(scores::resync))
        .route(
            "/api/maintenance/rebuild-index",
            post(scores::rebuild_index),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
