use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::admission::ScoreCandidate;
use super::models::Submission;

/// Request payload for the score submission endpoint. Every field is
/// optional at the transport level; the admission engine decides what is
/// missing. `score` stays raw JSON so the coercion rules apply to strings
/// and numbers alike.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreSubmitRequest {
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub gamertag: Option<String>,
    #[serde(default)]
    pub score: Option<Value>,
    #[serde(default)]
    pub game_id: Option<String>,
    #[serde(default)]
    pub location_id: Option<String>,
    #[serde(default)]
    pub mode: Option<String>,
}

impl ScoreSubmitRequest {
    pub fn into_candidate(self) -> ScoreCandidate {
        ScoreCandidate {
            gamertag: self.gamertag,
            score: self.score,
            game_id: self.game_id,
            location_id: self.location_id,
            mode: self.mode,
        }
    }
}

/// Success response for an accepted submission.
#[derive(Debug, Serialize)]
pub struct ScoreSubmitResponse {
    pub success: bool,
    pub submission: Submission,
}

/// Response for the maintenance endpoints.
#[derive(Debug, Serialize)]
pub struct MaintenanceResponse {
    pub success: bool,
    pub count: usize,
}
