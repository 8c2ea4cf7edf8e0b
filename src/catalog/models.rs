use serde::{Deserialize, Serialize};

/// A cabinet/title submissions are recorded against. `modes` behaves as a
/// set with insertion order preserved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Game {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub modes: Vec<String>,
}

impl Game {
    pub fn new(id: &str, name: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            modes: Vec::new(),
        }
    }
}

/// An arcade location. Referenced by submissions via `location_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub id: String,
    pub name: String,
}

impl Location {
    pub fn new(id: &str, name: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
        }
    }
}

/// Derives a game id from its display name when neither an explicit id nor a
/// code is given: uppercase, runs of whitespace collapsed to single dashes.
/// Deterministic for a given name.
pub fn derive_game_id(name: &str) -> String {
    name.trim()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
        .to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("Donkey Kong", "DONKEY-KONG")]
    #[case("  Pac  Man  ", "PAC-MAN")]
    #[case("galaga", "GALAGA")]
    fn derives_uppercase_kebab_ids(#[case] name: &str, #[case] expected: &str) {
        assert_eq!(derive_game_id(name), expected);
    }

    #[test]
    fn derivation_is_deterministic() {
        assert_eq!(derive_game_id("Street Fighter"), derive_game_id("Street Fighter"));
    }
}
