use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// A single accepted score submission. Immutable once accepted; a higher
/// score for the same identity replaces the whole record (delete + re-create).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Submission {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub gamertag: String,
    pub score: u64,
    #[serde(rename = "gameId")]
    pub game_id: String,
    #[serde(rename = "locationId")]
    pub location_id: String,
    #[serde(default)]
    pub mode: Option<String>,
}

impl Submission {
    pub fn identity_key(&self) -> IdentityKey {
        IdentityKey::new(&self.game_id, &self.location_id, &self.gamertag)
    }
}

/// Generates a fresh submission id. Ids are never reused.
pub fn new_submission_id() -> String {
    format!("sub-{}", Uuid::new_v4())
}

/// The equivalence class "same player, same game, same location".
/// Gamertag comparison is case- and whitespace-insensitive; the display
/// casing lives on the Submission, only the key is normalized.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IdentityKey(String);

impl IdentityKey {
    pub fn new(game_id: &str, location_id: &str, gamertag: &str) -> Self {
        let tag = gamertag.trim().to_lowercase();
        IdentityKey(format!("{}::{}::{}", game_id, location_id, tag))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IdentityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Best-score index entry: the currently winning submission for one key.
/// Derived data; the submission log is authoritative and the index can be
/// rebuilt from it (see `rebuild_index`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexEntry {
    #[serde(rename = "submissionId")]
    pub submission_id: String,
    pub score: u64,
}
