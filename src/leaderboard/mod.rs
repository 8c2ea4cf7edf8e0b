// Aggregation/view layer: pure functions recomputed on every read. Nothing
// here mutates or caches; the submission log and catalog are borrowed.

use serde::Serialize;

use crate::catalog::models::{Game, Location};
use crate::scores::models::Submission;

/// Board size for per-game leaderboards.
pub const DEFAULT_TOP_N: usize = 10;

/// One game with its current top-N scores.
#[derive(Debug, Serialize)]
pub struct GameBoard {
    #[serde(flatten)]
    pub game: Game,
    pub scores: Vec<Submission>,
}

/// A submission joined with its game and location names. Dangling references
/// (left by a non-cascaded delete) fall back to the raw id.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionView {
    #[serde(flatten)]
    pub submission: Submission,
    pub game_name: String,
    pub location_name: String,
}

/// Top-N submissions for one game, sorted by score descending. The sort is
/// stable, so equal scores keep their log (insertion) order; no further
/// tie-break is defined.
pub fn top_scores(submissions: &[Submission], game_id: &str, n: usize) -> Vec<Submission> {
    let mut scores: Vec<Submission> = submissions
        .iter()
        .filter(|s| s.game_id == game_id)
        .cloned()
        .collect();
    scores.sort_by(|a, b| b.score.cmp(&a.score));
    scores.truncate(n);
    scores
}

/// Every game with its top-10 board.
pub fn highscores_by_game(games: &[Game], submissions: &[Submission]) -> Vec<GameBoard> {
    games
        .iter()
        .map(|game| GameBoard {
            game: game.clone(),
            scores: top_scores(submissions, &game.id, DEFAULT_TOP_N),
        })
        .collect()
}

/// Enriches submissions with catalog names, preserving the input order.
pub fn with_meta(
    submissions: &[Submission],
    games: &[Game],
    locations: &[Location],
) -> Vec<SubmissionView> {
    submissions
        .iter()
        .map(|submission| {
            let game_name = games
                .iter()
                .find(|g| g.id == submission.game_id)
                .map(|g| g.name.clone())
                .unwrap_or_else(|| submission.game_id.clone());
            let location_name = locations
                .iter()
                .find(|l| l.id == submission.location_id)
                .map(|l| l.name.clone())
                .unwrap_or_else(|| submission.location_id.clone());
            SubmissionView {
                submission: submission.clone(),
                game_name,
                location_name,
            }
        })
        .collect()
}
