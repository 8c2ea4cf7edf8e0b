use chrono::Utc;
use serde_json::Value;

use super::models::{new_submission_id, IdentityKey, IndexEntry, Submission};

/// Raw submission payload as received from any ingress path, before
/// validation. Every field is optional so the engine, not the transport,
/// decides what "missing" means.
#[derive(Debug, Clone, Default)]
pub struct ScoreCandidate {
    pub gamertag: Option<String>,
    pub score: Option<Value>,
    pub game_id: Option<String>,
    pub location_id: Option<String>,
    pub mode: Option<String>,
}

impl ScoreCandidate {
    pub fn identity_key(&self) -> Option<IdentityKey> {
        match (&self.game_id, &self.location_id, &self.gamertag) {
            (Some(game), Some(location), Some(tag)) => {
                Some(IdentityKey::new(game, location, tag))
            }
            _ => None,
        }
    }
}

/// Why a candidate was turned away.
#[derive(Debug, Clone, PartialEq)]
pub enum RejectReason {
    /// Required fields absent or empty, in canonical field order.
    MissingFields(Vec<String>),
    /// An existing best for the same identity key is at least as high.
    /// Ties do not replace.
    ScoreTooLow { submitted: u64, best: u64 },
}

/// Decision of the admission engine.
#[derive(Debug, Clone, PartialEq)]
pub enum AdmissionOutcome {
    Accepted {
        submission: Submission,
        /// Id of the prior best submission this one replaces, to be deleted
        /// by the caller once the new record is persisted.
        supersedes: Option<String>,
    },
    Rejected(RejectReason),
}

/// The single admission rule, shared by every ingress path.
///
/// Pure function of the candidate and the current best for its identity key:
/// no best means accept; a strictly higher score accepts and marks the old
/// submission for deletion; anything else rejects. Persisting the result and
/// updating the index are the caller's job (see `ScoreService::submit`).
pub fn admit(candidate: &ScoreCandidate, current_best: Option<&IndexEntry>) -> AdmissionOutcome {
    let missing = missing_fields(candidate);
    if !missing.is_empty() {
        return AdmissionOutcome::Rejected(RejectReason::MissingFields(missing));
    }

    let score = coerce_score(candidate.score.as_ref());

    if let Some(best) = current_best {
        if score <= best.score {
            return AdmissionOutcome::Rejected(RejectReason::ScoreTooLow {
                submitted: score,
                best: best.score,
            });
        }
    }

    // Unwraps are safe past the missing-fields check.
    let gamertag = candidate.gamertag.as_deref().unwrap_or_default().trim();
    let submission = Submission {
        id: new_submission_id(),
        timestamp: Utc::now(),
        gamertag: gamertag.to_string(),
        score,
        game_id: candidate.game_id.clone().unwrap_or_default(),
        location_id: candidate.location_id.clone().unwrap_or_default(),
        mode: candidate
            .mode
            .as_deref()
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .map(str::to_string),
    };

    AdmissionOutcome::Accepted {
        submission,
        supersedes: current_best.map(|best| best.submission_id.clone()),
    }
}

fn missing_fields(candidate: &ScoreCandidate) -> Vec<String> {
    let mut missing = Vec::new();
    if is_blank(&candidate.gamertag) {
        missing.push("gamertag".to_string());
    }
    if score_missing(candidate.score.as_ref()) {
        missing.push("score".to_string());
    }
    if is_blank(&candidate.game_id) {
        missing.push("gameId".to_string());
    }
    if is_blank(&candidate.location_id) {
        missing.push("locationId".to_string());
    }
    missing
}

fn is_blank(field: &Option<String>) -> bool {
    field.as_deref().map_or(true, |v| v.trim().is_empty())
}

fn score_missing(score: Option<&Value>) -> bool {
    match score {
        None | Some(Value::Null) => true,
        // Zero is a present score, an empty string is not.
        Some(Value::String(s)) => s.trim().is_empty(),
        Some(_) => false,
    }
}

/// Score coercion carried over from the source system: non-numeric input
/// becomes 0 instead of a rejection, and negatives clamp to 0.
fn coerce_score(score: Option<&Value>) -> u64 {
    match score {
        Some(Value::Number(n)) => {
            if let Some(v) = n.as_u64() {
                v
            } else {
                n.as_f64().filter(|v| *v > 0.0).map_or(0, |v| v as u64)
            }
        }
        Some(Value::String(s)) => s
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite() && *v > 0.0)
            .map_or(0, |v| v as u64),
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    fn candidate(tag: &str, score: Value) -> ScoreCandidate {
        ScoreCandidate {
            gamertag: Some(tag.to_string()),
            score: Some(score),
            game_id: Some("PAC".to_string()),
            location_id: Some("ARC1".to_string()),
            mode: None,
        }
    }

    fn best(id: &str, score: u64) -> IndexEntry {
        IndexEntry {
            submission_id: id.to_string(),
            score,
        }
    }

    #[test]
    fn first_submission_for_a_key_is_accepted() {
        let outcome = admit(&candidate("Rex", json!(100)), None);
        match outcome {
            AdmissionOutcome::Accepted {
                submission,
                supersedes,
            } => {
                assert_eq!(submission.score, 100);
                assert_eq!(submission.gamertag, "Rex");
                assert!(supersedes.is_none());
            }
            other => panic!("expected acceptance, got {:?}", other),
        }
    }

    #[test]
    fn equal_score_is_rejected_and_one_more_is_accepted() {
        let current = best("old", 100);

        let tie = admit(&candidate("Rex", json!(100)), Some(&current));
        assert_eq!(
            tie,
            AdmissionOutcome::Rejected(RejectReason::ScoreTooLow {
                submitted: 100,
                best: 100,
            })
        );

        let over = admit(&candidate("Rex", json!(101)), Some(&current));
        match over {
            AdmissionOutcome::Accepted { supersedes, .. } => {
                assert_eq!(supersedes.as_deref(), Some("old"));
            }
            other => panic!("expected acceptance, got {:?}", other),
        }
    }

    #[test]
    fn lower_score_is_rejected() {
        let outcome = admit(&candidate("Rex", json!(50)), Some(&best("old", 100)));
        assert_eq!(
            outcome,
            AdmissionOutcome::Rejected(RejectReason::ScoreTooLow {
                submitted: 50,
                best: 100,
            })
        );
    }

    #[test]
    fn missing_fields_are_listed_in_canonical_order() {
        let empty = ScoreCandidate::default();
        let outcome = admit(&empty, None);
        assert_eq!(
            outcome,
            AdmissionOutcome::Rejected(RejectReason::MissingFields(vec![
                "gamertag".to_string(),
                "score".to_string(),
                "gameId".to_string(),
                "locationId".to_string(),
            ]))
        );
    }

    #[test]
    fn whitespace_only_required_field_counts_as_missing() {
        let mut c = candidate("Rex", json!(10));
        c.game_id = Some("   ".to_string());
        let outcome = admit(&c, None);
        assert_eq!(
            outcome,
            AdmissionOutcome::Rejected(RejectReason::MissingFields(vec![
                "gameId".to_string()
            ]))
        );
    }

    #[rstest]
    #[case(json!("abc"), 0)]
    #[case(json!("250"), 250)]
    #[case(json!(" 250 "), 250)]
    #[case(json!(-5), 0)]
    #[case(json!(12.9), 12)]
    #[case(json!(true), 0)]
    fn score_coercion(#[case] raw: Value, #[case] expected: u64) {
        match admit(&candidate("Rex", raw), None) {
            AdmissionOutcome::Accepted { submission, .. } => {
                assert_eq!(submission.score, expected);
            }
            other => panic!("expected acceptance, got {:?}", other),
        }
    }

    #[test]
    fn zero_score_is_present_not_missing() {
        let outcome = admit(&candidate("Rex", json!(0)), None);
        assert!(matches!(outcome, AdmissionOutcome::Accepted { .. }));
    }

    #[test]
    fn gamertag_is_trimmed_but_casing_is_preserved() {
        match admit(&candidate("  ReX  ", json!(10)), None) {
            AdmissionOutcome::Accepted { submission, .. } => {
                assert_eq!(submission.gamertag, "ReX");
                assert_eq!(
                    submission.identity_key(),
                    IdentityKey::new("PAC", "ARC1", "rex")
                );
            }
            other => panic!("expected acceptance, got {:?}", other),
        }
    }

    #[test]
    fn empty_mode_becomes_none() {
        let mut c = candidate("Rex", json!(10));
        c.mode = Some("  ".to_string());
        match admit(&c, None) {
            AdmissionOutcome::Accepted { submission, .. } => {
                assert_eq!(submission.mode, None);
            }
            other => panic!("expected acceptance, got {:?}", other),
        }
    }
}
