use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use super::admission::{admit, AdmissionOutcome, ScoreCandidate};
use super::index::{rebuild_index, BestScoreIndex, CasOutcome};
use super::log::SubmissionLog;
use super::models::{IndexEntry, Submission};
use crate::shared::AppError;
use crate::store::{collections, CollectionStore};

/// Upper bound on CAS retries when submissions race for one identity key.
const MAX_ADMISSION_ATTEMPTS: usize = 8;

/// Service for the submission lifecycle: admission, the best-score index
/// transaction, and mirroring accepted state to the remote store.
///
/// In-memory state is mutated optimistically; a store failure after the
/// in-memory commit surfaces as `StoreUnavailable` without rollback, and
/// `resync` is the recovery path for callers that need strict consistency.
pub struct ScoreService {
    log: Arc<dyn SubmissionLog>,
    index: Arc<dyn BestScoreIndex>,
    store: Option<Arc<dyn CollectionStore>>,
}

impl ScoreService {
    pub fn new(
        log: Arc<dyn SubmissionLog>,
        index: Arc<dyn BestScoreIndex>,
        store: Option<Arc<dyn CollectionStore>>,
    ) -> Self {
        Self { log, index, store }
    }

    fn store(&self) -> Result<&Arc<dyn CollectionStore>, AppError> {
        self.store.as_ref().ok_or(AppError::NotConfigured)
    }

    /// Runs the full admission transaction for one candidate.
    ///
    /// The read of the current best and the write of the new best are a
    /// conditional-write loop against the index, so two racers for the same
    /// key converge on the higher score regardless of arrival order and the
    /// index never points at a deleted submission.
    #[instrument(skip(self, candidate))]
    pub async fn submit(&self, candidate: ScoreCandidate) -> Result<Submission, AppError> {
        let store = self.store()?;

        let key = match candidate.identity_key() {
            Some(key) => key,
            None => {
                // Required fields are missing; admission reports which.
                match admit(&candidate, None) {
                    AdmissionOutcome::Rejected(reason) => return Err(reason.into()),
                    AdmissionOutcome::Accepted { .. } => {
                        return Err(AppError::Internal(
                            "admission accepted a candidate without an identity key".to_string(),
                        ))
                    }
                }
            }
        };

        for attempt in 0..MAX_ADMISSION_ATTEMPTS {
            let current = self.index.lookup(&key).await?;

            let (submission, supersedes) = match admit(&candidate, current.as_ref()) {
                AdmissionOutcome::Accepted {
                    submission,
                    supersedes,
                } => (submission, supersedes),
                AdmissionOutcome::Rejected(reason) => {
                    debug!(key = %key, ?reason, "Submission rejected");
                    return Err(reason.into());
                }
            };

            let entry = IndexEntry {
                submission_id: submission.id.clone(),
                score: submission.score,
            };

            // Append before the index write: once our entry is visible, a
            // later superseder may delete our record, which requires it to
            // already be in the log.
            self.log.append(&submission).await?;

            match self
                .index
                .compare_and_swap(&key, current.as_ref(), entry.clone())
                .await?
            {
                CasOutcome::Swapped => {}
                CasOutcome::Conflict(_) => {
                    // Another submission landed between our read and write;
                    // back out the append and re-run admission against the
                    // fresh entry.
                    self.log.remove(&submission.id).await?;
                    debug!(key = %key, attempt, "Index write conflict, retrying admission");
                    continue;
                }
            }

            if let Some(old_id) = &supersedes {
                self.log.remove(old_id).await?;
            }

            info!(
                key = %key,
                submission_id = %submission.id,
                score = submission.score,
                superseded = supersedes.as_deref().unwrap_or("none"),
                "Submission accepted"
            );

            // Mirror to the store after the in-memory commit.
            let record = serde_json::to_value(&submission)
                .map_err(|e| AppError::Internal(e.to_string()))?;
            store
                .put(collections::SUBMISSIONS, &submission.id, &record)
                .await?;
            if let Some(old_id) = &supersedes {
                store.delete(collections::SUBMISSIONS, old_id).await?;
            }
            let entry_record = serde_json::to_value(&entry)
                .map_err(|e| AppError::Internal(e.to_string()))?;
            store
                .put(collections::HIGHSCORES, key.as_str(), &entry_record)
                .await?;

            return Ok(submission);
        }

        Err(AppError::Internal(format!(
            "admission for {} did not settle after {} attempts",
            key, MAX_ADMISSION_ATTEMPTS
        )))
    }

    /// Explicit user deletion. Removing an absent id is a no-op. When the
    /// deleted submission is the live best for its key, the index entry is
    /// pruned as well.
    #[instrument(skip(self))]
    pub async fn delete_submission(&self, id: &str) -> Result<(), AppError> {
        let store = self.store()?;

        let Some(submission) = self.log.get(id).await? else {
            return Ok(());
        };

        self.log.remove(id).await?;
        store.delete(collections::SUBMISSIONS, id).await?;

        let key = submission.identity_key();
        if let Some(entry) = self.index.lookup(&key).await? {
            if entry.submission_id == id {
                self.index.remove(&key).await?;
                store.delete(collections::HIGHSCORES, key.as_str()).await?;
            }
        }

        info!(submission_id = id, "Submission deleted");
        Ok(())
    }

    /// Cascade for a removed game: drops dependent submissions from the log,
    /// prunes their index entries, and mirrors the deletions.
    pub async fn cascade_remove_by_game(&self, game_id: &str) -> Result<usize, AppError> {
        let removed = self.log.remove_by_game(game_id).await?;
        self.finish_cascade(removed).await
    }

    /// Cascade for a removed location; same contract as the game cascade.
    pub async fn cascade_remove_by_location(&self, location_id: &str) -> Result<usize, AppError> {
        let removed = self.log.remove_by_location(location_id).await?;
        self.finish_cascade(removed).await
    }

    async fn finish_cascade(&self, removed: Vec<Submission>) -> Result<usize, AppError> {
        let store = self.store()?;
        for submission in &removed {
            let key = submission.identity_key();
            if let Some(entry) = self.index.lookup(&key).await? {
                if entry.submission_id == submission.id {
                    self.index.remove(&key).await?;
                    store.delete(collections::HIGHSCORES, key.as_str()).await?;
                }
            }
            store.delete(collections::SUBMISSIONS, &submission.id).await?;
        }
        Ok(removed.len())
    }

    /// Reloads the submission log from the store and rebuilds the index from
    /// it. The rebuilt index also drops any entry whose submission no longer
    /// exists, so this doubles as the recovery path for dangling pointers.
    #[instrument(skip(self))]
    pub async fn resync(&self) -> Result<usize, AppError> {
        let store = self.store()?;

        let records = store.fetch_all(collections::SUBMISSIONS).await?;
        let mut submissions: Vec<Submission> = Vec::with_capacity(records.len());
        for record in records {
            match serde_json::from_value::<Submission>(record.fields.clone()) {
                Ok(submission) => submissions.push(submission),
                Err(e) => {
                    warn!(id = %record.id, error = %e, "Skipping malformed submission record")
                }
            }
        }
        // Newest first, matching the log's insertion order.
        submissions.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

        let count = submissions.len();
        let rebuilt = rebuild_index(&submissions);
        self.log.replace_all(submissions).await?;
        self.index.replace_all(rebuilt).await?;

        info!(count, "Resynced submissions from store");
        Ok(count)
    }

    /// Rebuilds the index in place from the current log contents.
    pub async fn rebuild_index(&self) -> Result<usize, AppError> {
        let submissions = self.log.list().await?;
        let rebuilt = rebuild_index(&submissions);
        let count = rebuilt.len();
        self.index.replace_all(rebuilt).await?;
        Ok(count)
    }

    /// Seeds in-memory state directly, bypassing the store. Used for the
    /// read-only fallback dataset.
    pub async fn hydrate(&self, submissions: Vec<Submission>) -> Result<(), AppError> {
        let rebuilt = rebuild_index(&submissions);
        self.log.replace_all(submissions).await?;
        self.index.replace_all(rebuilt).await?;
        Ok(())
    }
}
