use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use super::models::{IdentityKey, IndexEntry, Submission};
use crate::shared::AppError;

/// Result of a conditional index write.
#[derive(Debug, Clone, PartialEq)]
pub enum CasOutcome {
    /// The entry matched the expected value and was replaced.
    Swapped,
    /// Another writer got there first; carries what the index holds now so
    /// the caller can re-run admission against it.
    Conflict(Option<IndexEntry>),
}

/// Derived mapping from identity key to the currently winning submission.
///
/// This is the single source of truth for "is this a new high score" so
/// admission never scans the full log. It is a cache: `rebuild_index` can
/// always reconstruct it from the submission log.
#[async_trait]
pub trait BestScoreIndex: Send + Sync {
    async fn lookup(&self, key: &IdentityKey) -> Result<Option<IndexEntry>, AppError>;

    /// Atomic conditional upsert: writes `next` only if the stored entry
    /// still equals `expected`. This is the one point where a race between
    /// two submissions for the same key is observable, so the read-admit-
    /// write cycle must go through here rather than lookup-then-upsert.
    async fn compare_and_swap(
        &self,
        key: &IdentityKey,
        expected: Option<&IndexEntry>,
        next: IndexEntry,
    ) -> Result<CasOutcome, AppError>;

    /// Drops the entry for a key; absent keys are a no-op.
    async fn remove(&self, key: &IdentityKey) -> Result<(), AppError>;

    /// Full contents, for persistence mirroring and diagnostics.
    async fn snapshot(&self) -> Result<HashMap<IdentityKey, IndexEntry>, AppError>;

    /// Replaces the whole index, e.g. with the output of `rebuild_index`.
    async fn replace_all(&self, entries: HashMap<IdentityKey, IndexEntry>)
        -> Result<(), AppError>;
}

#[derive(Debug, Default)]
pub struct InMemoryBestScoreIndex {
    entries: RwLock<HashMap<IdentityKey, IndexEntry>>,
}

impl InMemoryBestScoreIndex {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BestScoreIndex for InMemoryBestScoreIndex {
    async fn lookup(&self, key: &IdentityKey) -> Result<Option<IndexEntry>, AppError> {
        let entries = self.entries.read().await;
        Ok(entries.get(key).cloned())
    }

    async fn compare_and_swap(
        &self,
        key: &IdentityKey,
        expected: Option<&IndexEntry>,
        next: IndexEntry,
    ) -> Result<CasOutcome, AppError> {
        // Single write lock covers the compare and the swap.
        let mut entries = self.entries.write().await;
        let current = entries.get(key);
        if current != expected {
            return Ok(CasOutcome::Conflict(current.cloned()));
        }
        entries.insert(key.clone(), next);
        Ok(CasOutcome::Swapped)
    }

    async fn remove(&self, key: &IdentityKey) -> Result<(), AppError> {
        let mut entries = self.entries.write().await;
        entries.remove(key);
        Ok(())
    }

    async fn snapshot(&self) -> Result<HashMap<IdentityKey, IndexEntry>, AppError> {
        Ok(self.entries.read().await.clone())
    }

    async fn replace_all(
        &self,
        next: HashMap<IdentityKey, IndexEntry>,
    ) -> Result<(), AppError> {
        let mut entries = self.entries.write().await;
        *entries = next;
        Ok(())
    }
}

/// Recovery path: rebuilds the index from the submission log, taking the
/// max-score submission per identity key. Ties break to the earliest
/// timestamp, then the lowest id, so a rebuild is deterministic regardless
/// of log order.
pub fn rebuild_index(submissions: &[Submission]) -> HashMap<IdentityKey, IndexEntry> {
    let mut winners: HashMap<IdentityKey, &Submission> = HashMap::new();
    for submission in submissions {
        let key = submission.identity_key();
        let replace = match winners.get(&key) {
            Some(&current) => beats(submission, current),
            None => true,
        };
        if replace {
            winners.insert(key, submission);
        }
    }
    winners
        .into_iter()
        .map(|(key, submission)| {
            (
                key,
                IndexEntry {
                    submission_id: submission.id.clone(),
                    score: submission.score,
                },
            )
        })
        .collect()
}

fn beats(challenger: &Submission, current: &Submission) -> bool {
    if challenger.score != current.score {
        return challenger.score > current.score;
    }
    if challenger.timestamp != current.timestamp {
        return challenger.timestamp < current.timestamp;
    }
    challenger.id < current.id
}
