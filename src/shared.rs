use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;

use crate::catalog::repository::CatalogRepository;
use crate::scores::admission::RejectReason;
use crate::scores::index::BestScoreIndex;
use crate::scores::log::SubmissionLog;
use crate::store::{CollectionStore, StoreError};

/// Shared application state containing all dependencies
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<dyn CatalogRepository>,
    pub submission_log: Arc<dyn SubmissionLog>,
    pub best_scores: Arc<dyn BestScoreIndex>,
    /// Remote collection store. `None` means no store is configured: the
    /// service runs read-only on the seed dataset and rejects mutations.
    pub store: Option<Arc<dyn CollectionStore>>,
    /// Resolved API password for the submission endpoint. `None` means the
    /// gate itself is unconfigured and every submission is refused.
    pub api_password: Option<String>,
}

impl AppState {
    pub fn new(
        catalog: Arc<dyn CatalogRepository>,
        submission_log: Arc<dyn SubmissionLog>,
        best_scores: Arc<dyn BestScoreIndex>,
        store: Option<Arc<dyn CollectionStore>>,
        api_password: Option<String>,
    ) -> Self {
        Self {
            catalog,
            submission_log,
            best_scores,
            store,
            api_password,
        }
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Missing fields: {}", .0.join(", "))]
    MissingFields(Vec<String>),

    #[error("Invalid JSON body")]
    InvalidJson,

    #[error("Missing API password.")]
    MissingPassword,

    #[error("Invalid API password.")]
    InvalidPassword,

    #[error("API password not configured.")]
    PasswordNotConfigured,

    #[error("Score {submitted} does not beat the current best of {best}")]
    ScoreTooLow { submitted: u64, best: u64 },

    #[error("No remote store configured; running read-only on seed data")]
    NotConfigured,

    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl From<RejectReason> for AppError {
    fn from(reason: RejectReason) -> Self {
        match reason {
            RejectReason::MissingFields(fields) => AppError::MissingFields(fields),
            RejectReason::ScoreTooLow { submitted, best } => {
                AppError::ScoreTooLow { submitted, best }
            }
        }
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        AppError::StoreUnavailable(err.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self {
            AppError::MissingFields(_) | AppError::InvalidJson => StatusCode::BAD_REQUEST,
            AppError::MissingPassword
            | AppError::InvalidPassword
            | AppError::PasswordNotConfigured => StatusCode::UNAUTHORIZED,
            AppError::ScoreTooLow { .. } => StatusCode::CONFLICT,
            AppError::NotConfigured => StatusCode::SERVICE_UNAVAILABLE,
            AppError::StoreUnavailable(_) => StatusCode::BAD_GATEWAY,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({
            "success": false,
            "error": self.to_string(),
        }));

        (status, body).into_response()
    }
}
