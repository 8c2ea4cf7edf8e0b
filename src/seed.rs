// Static fallback dataset for read-only mode, mirroring the shape of the
// remote collections.

use chrono::{DateTime, Utc};

use crate::catalog::models::{Game, Location};
use crate::scores::models::Submission;

pub fn seed_games() -> Vec<Game> {
    vec![
        game("PAC", "Pac-Man", &[]),
        game("DIG", "Dig Dug", &[]),
        game("SF2", "Street Fighter II", &["arcade", "versus"]),
    ]
}

pub fn seed_locations() -> Vec<Location> {
    vec![
        Location::new("ARC1", "Flynn's Arcade"),
        Location::new("ARC2", "Barcade Downtown"),
    ]
}

pub fn seed_submissions() -> Vec<Submission> {
    vec![
        submission("seed-0003", 1_700_003_000, "Maya", 61_450, "SF2", "ARC2"),
        submission("seed-0002", 1_700_002_000, "Rex", 54_210, "DIG", "ARC1"),
        submission("seed-0001", 1_700_001_000, "Ana", 87_300, "PAC", "ARC1"),
    ]
}

fn game(id: &str, name: &str, modes: &[&str]) -> Game {
    let mut game = Game::new(id, name);
    game.modes = modes.iter().map(|m| m.to_string()).collect();
    game
}

fn submission(
    id: &str,
    at_secs: i64,
    gamertag: &str,
    score: u64,
    game_id: &str,
    location_id: &str,
) -> Submission {
    Submission {
        id: id.to_string(),
        timestamp: DateTime::<Utc>::from_timestamp(at_secs, 0).unwrap_or_default(),
        gamertag: gamertag.to_string(),
        score,
        game_id: game_id.to_string(),
        location_id: location_id.to_string(),
        mode: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scores::index::rebuild_index;

    #[test]
    fn seed_references_are_consistent() {
        let games = seed_games();
        let locations = seed_locations();
        for submission in seed_submissions() {
            assert!(games.iter().any(|g| g.id == submission.game_id));
            assert!(locations.iter().any(|l| l.id == submission.location_id));
        }
    }

    #[test]
    fn seed_has_one_live_submission_per_identity() {
        let submissions = seed_submissions();
        let index = rebuild_index(&submissions);
        assert_eq!(index.len(), submissions.len());
    }
}
