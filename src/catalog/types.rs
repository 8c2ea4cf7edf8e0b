use serde::{Deserialize, Serialize};

use super::models::{Game, Location};

/// Request payload for adding a game. The id falls back to `code`, then to
/// a derivation of `name`.
#[derive(Debug, Default, Deserialize)]
pub struct AddGameRequest {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub modes: Option<Vec<String>>,
}

/// Request payload for adding a location.
#[derive(Debug, Default, Deserialize)]
pub struct AddLocationRequest {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

/// Request payload for adding a mode to a game.
#[derive(Debug, Deserialize)]
pub struct AddModeRequest {
    pub mode: String,
}

/// Response for catalog insertions; duplicate/incomplete requests report
/// `created: false` with no record instead of failing.
#[derive(Debug, Serialize)]
pub struct AddGameResponse {
    pub created: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub game: Option<Game>,
}

#[derive(Debug, Serialize)]
pub struct AddLocationResponse {
    pub created: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
}

/// Response for catalog removals, reporting the cascade size.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveResponse {
    pub removed: bool,
    pub submissions_removed: usize,
}
