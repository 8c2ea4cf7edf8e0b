use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use super::models::Submission;
use crate::shared::AppError;

/// The append/remove log of all individual submissions.
///
/// The log enforces no per-identity uniqueness itself; the at-most-one-live
/// invariant is maintained by the admission engine together with the
/// best-score index.
#[async_trait]
pub trait SubmissionLog: Send + Sync {
    /// All submissions, newest first.
    async fn list(&self) -> Result<Vec<Submission>, AppError>;

    async fn get(&self, id: &str) -> Result<Option<Submission>, AppError>;

    /// Prepends a submission (newest-first order).
    async fn append(&self, submission: &Submission) -> Result<(), AppError>;

    /// Removes a submission by id; absent ids are a no-op.
    async fn remove(&self, id: &str) -> Result<(), AppError>;

    /// Cascade helper: removes every submission for a game, returning the
    /// removed records so the caller can prune index entries and mirror
    /// deletes to the store.
    async fn remove_by_game(&self, game_id: &str) -> Result<Vec<Submission>, AppError>;

    /// Cascade helper for locations; same contract as `remove_by_game`.
    async fn remove_by_location(&self, location_id: &str) -> Result<Vec<Submission>, AppError>;

    /// Replaces the whole log, e.g. after a resync from the store.
    async fn replace_all(&self, submissions: Vec<Submission>) -> Result<(), AppError>;
}

/// In-memory implementation backing both the seeded read-only mode and the
/// read-through cache in front of the remote store.
#[derive(Debug, Default)]
pub struct InMemorySubmissionLog {
    submissions: RwLock<Vec<Submission>>,
}

impl InMemorySubmissionLog {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SubmissionLog for InMemorySubmissionLog {
    async fn list(&self) -> Result<Vec<Submission>, AppError> {
        Ok(self.submissions.read().await.clone())
    }

    async fn get(&self, id: &str) -> Result<Option<Submission>, AppError> {
        let submissions = self.submissions.read().await;
        Ok(submissions.iter().find(|s| s.id == id).cloned())
    }

    async fn append(&self, submission: &Submission) -> Result<(), AppError> {
        let mut submissions = self.submissions.write().await;
        submissions.insert(0, submission.clone());
        Ok(())
    }

    async fn remove(&self, id: &str) -> Result<(), AppError> {
        let mut submissions = self.submissions.write().await;
        submissions.retain(|s| s.id != id);
        Ok(())
    }

    async fn remove_by_game(&self, game_id: &str) -> Result<Vec<Submission>, AppError> {
        let mut submissions = self.submissions.write().await;
        let (removed, kept): (Vec<_>, Vec<_>) =
            std::mem::take(&mut *submissions)
                .into_iter()
                .partition(|s| s.game_id == game_id);
        *submissions = kept;
        debug!(game_id, removed = removed.len(), "Cascade-removed submissions");
        Ok(removed)
    }

    async fn remove_by_location(&self, location_id: &str) -> Result<Vec<Submission>, AppError> {
        let mut submissions = self.submissions.write().await;
        let (removed, kept): (Vec<_>, Vec<_>) =
            std::mem::take(&mut *submissions)
                .into_iter()
                .partition(|s| s.location_id == location_id);
        *submissions = kept;
        debug!(location_id, removed = removed.len(), "Cascade-removed submissions");
        Ok(removed)
    }

    async fn replace_all(&self, next: Vec<Submission>) -> Result<(), AppError> {
        let mut submissions = self.submissions.write().await;
        *submissions = next;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn sample(id: &str, game_id: &str, location_id: &str) -> Submission {
        Submission {
            id: id.to_string(),
            timestamp: Utc::now(),
            gamertag: "rex".to_string(),
            score: 100,
            game_id: game_id.to_string(),
            location_id: location_id.to_string(),
            mode: None,
        }
    }

    #[tokio::test]
    async fn append_keeps_newest_first() {
        let log = InMemorySubmissionLog::new();
        log.append(&sample("a", "PAC", "ARC1")).await.unwrap();
        log.append(&sample("b", "PAC", "ARC1")).await.unwrap();

        let listed = log.list().await.unwrap();
        assert_eq!(listed[0].id, "b");
        assert_eq!(listed[1].id, "a");
    }

    #[tokio::test]
    async fn remove_by_game_partitions_the_log() {
        let log = InMemorySubmissionLog::new();
        log.append(&sample("a", "PAC", "ARC1")).await.unwrap();
        log.append(&sample("b", "DIG", "ARC1")).await.unwrap();
        log.append(&sample("c", "PAC", "ARC2")).await.unwrap();

        let removed = log.remove_by_game("PAC").await.unwrap();
        assert_eq!(removed.len(), 2);

        let kept = log.list().await.unwrap();
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].id, "b");
    }

    #[tokio::test]
    async fn remove_by_location_partitions_the_log() {
        let log = InMemorySubmissionLog::new();
        log.append(&sample("a", "PAC", "ARC1")).await.unwrap();
        log.append(&sample("b", "PAC", "ARC2")).await.unwrap();

        let removed = log.remove_by_location("ARC2").await.unwrap();
        assert_eq!(removed.len(), 1);
        assert_eq!(removed[0].id, "b");
        assert_eq!(log.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn remove_of_absent_id_is_noop() {
        let log = InMemorySubmissionLog::new();
        log.append(&sample("a", "PAC", "ARC1")).await.unwrap();
        log.remove("zzz").await.unwrap();
        assert_eq!(log.list().await.unwrap().len(), 1);
    }
}
