//! Submission recorder
//!
//! Persists graded submissions and keeps each user's solved-problem set up
//! to date. Storage failures are surfaced to the caller, never retried
//! silently.

use brainbox_core::domain::submission::{EvaluatedSubmission, RecordId};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info};

use crate::repository::{StoreError, SubmissionRepository, UserRepository};

/// Effect of a submission on the user's solved set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SolveProgress {
    /// Correct, and the problem was not solved before
    NewlySolved,
    /// Correct, but the problem was already in the solved set
    AlreadySolved,
    /// Incorrect; the solved set was not touched
    NotSolved,
}

/// Outcome of recording a submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordReceipt {
    pub id: RecordId,
    pub progress: SolveProgress,
}

/// Errors raised while recording
#[derive(Debug, Error)]
pub enum RecordError {
    /// The submission itself could not be stored
    #[error("failed to store submission: {0}")]
    Persistence(#[source] StoreError),

    /// The submission was stored, but the solved set could not be updated
    #[error("submission {record_id} stored, but updating solved problems failed: {source}")]
    Progress {
        record_id: RecordId,
        #[source]
        source: StoreError,
    },
}

/// Records submissions and solved problems
pub struct SubmissionRecorder {
    submissions: Arc<dyn SubmissionRepository>,
    users: Arc<dyn UserRepository>,
}

impl SubmissionRecorder {
    /// Creates a new submission recorder
    pub fn new(submissions: Arc<dyn SubmissionRepository>, users: Arc<dyn UserRepository>) -> Self {
        Self { submissions, users }
    }

    /// Stores `evaluated` and, if correct, adds its problem to the user's solved set
    ///
    /// Re-solving a problem leaves the solved set unchanged and reports
    /// `AlreadySolved`.
    pub async fn record(
        &self,
        evaluated: EvaluatedSubmission,
    ) -> Result<RecordReceipt, RecordError> {
        let user_id = evaluated.user_id.clone();
        let problem_id = evaluated.problem_id.clone();
        let is_correct = evaluated.is_correct;

        let id = self.submissions.create(evaluated).await.map_err(|e| {
            error!(
                "Failed to store submission of {} by {}: {}",
                problem_id, user_id, e
            );
            RecordError::Persistence(e)
        })?;

        info!(
            "Recorded submission {} ({} by {}, correct: {})",
            id, problem_id, user_id, is_correct
        );

        if !is_correct {
            return Ok(RecordReceipt {
                id,
                progress: SolveProgress::NotSolved,
            });
        }

        let progress = match self.update_solved(&user_id, &problem_id).await {
            Ok(progress) => progress,
            Err(source) => {
                error!("Failed to update solved set of {}: {}", user_id, source);
                return Err(RecordError::Progress {
                    record_id: id,
                    source,
                });
            }
        };

        Ok(RecordReceipt { id, progress })
    }

    /// Read, check membership, append only if absent
    async fn update_solved(
        &self,
        user_id: &str,
        problem_id: &str,
    ) -> Result<SolveProgress, StoreError> {
        let progress = self.users.progress(user_id).await?;

        if progress.has_solved(problem_id) {
            info!("{} had already solved {}", user_id, problem_id);
            return Ok(SolveProgress::AlreadySolved);
        }

        self.users.add_solved(user_id, problem_id).await?;
        info!("{} solved {} for the first time", user_id, problem_id);
        Ok(SolveProgress::NewlySolved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::{MemoryStore, StoreResult};
    use async_trait::async_trait;
    use brainbox_core::domain::language::Language;
    use brainbox_core::domain::submission::StoredSubmission;
    use brainbox_core::domain::user::UserProgress;
    use std::collections::BTreeSet;

    fn submission(problem_id: &str, is_correct: bool) -> EvaluatedSubmission {
        EvaluatedSubmission {
            problem_id: problem_id.to_string(),
            user_id: "u1".to_string(),
            language: Language::Python3,
            code: "print('hi')".to_string(),
            input: String::new(),
            raw_output: "hi".to_string(),
            is_correct,
            submitted_at: chrono::Utc::now(),
            score: None,
        }
    }

    fn recorder(store: &Arc<MemoryStore>) -> SubmissionRecorder {
        SubmissionRecorder::new(store.clone(), store.clone())
    }

    #[tokio::test]
    async fn test_correct_submission_solves_problem() {
        let store = Arc::new(MemoryStore::new());
        let receipt = recorder(&store).record(submission("p1", true)).await.unwrap();

        assert_eq!(receipt.progress, SolveProgress::NewlySolved);
        assert!(store.progress("u1").await.unwrap().has_solved("p1"));
        assert_eq!(store.submission_count(), 1);
    }

    #[tokio::test]
    async fn test_resolving_is_idempotent() {
        let store = Arc::new(MemoryStore::new());
        let recorder = recorder(&store);

        let first = recorder.record(submission("p1", true)).await.unwrap();
        let second = recorder.record(submission("p1", true)).await.unwrap();

        assert_eq!(first.progress, SolveProgress::NewlySolved);
        assert_eq!(second.progress, SolveProgress::AlreadySolved);
        assert_ne!(first.id, second.id);

        let progress = store.progress("u1").await.unwrap();
        assert_eq!(progress.solved, BTreeSet::from(["p1".to_string()]));
        assert_eq!(store.submission_count(), 2);
    }

    #[tokio::test]
    async fn test_incorrect_submission_leaves_solved_set() {
        let store = Arc::new(MemoryStore::new());
        let receipt = recorder(&store).record(submission("p1", false)).await.unwrap();

        assert_eq!(receipt.progress, SolveProgress::NotSolved);
        assert!(store.progress("u1").await.unwrap().solved.is_empty());
        assert_eq!(store.submission_count(), 1);
    }

    struct BrokenSubmissions;

    #[async_trait]
    impl SubmissionRepository for BrokenSubmissions {
        async fn create(&self, _submission: EvaluatedSubmission) -> StoreResult<RecordId> {
            Err(StoreError::Backend {
                status: 503,
                message: "unavailable".to_string(),
            })
        }

        async fn get(&self, id: &RecordId) -> StoreResult<StoredSubmission> {
            Err(StoreError::not_found("submission", id.as_str()))
        }

        async fn list(&self, _user_id: Option<&str>) -> StoreResult<Vec<StoredSubmission>> {
            Ok(Vec::new())
        }

        async fn set_score(&self, id: &RecordId, _score: u32) -> StoreResult<()> {
            Err(StoreError::not_found("submission", id.as_str()))
        }
    }

    #[tokio::test]
    async fn test_storage_failure_surfaced_and_solved_set_untouched() {
        let users = Arc::new(MemoryStore::new());
        let recorder = SubmissionRecorder::new(Arc::new(BrokenSubmissions), users.clone());

        let err = recorder.record(submission("p1", true)).await.unwrap_err();
        assert!(matches!(err, RecordError::Persistence(_)));
        assert!(users.progress("u1").await.unwrap().solved.is_empty());
    }

    struct BrokenUsers;

    #[async_trait]
    impl UserRepository for BrokenUsers {
        async fn progress(&self, _user_id: &str) -> StoreResult<UserProgress> {
            Err(StoreError::Decode("bad user document".to_string()))
        }

        async fn add_solved(&self, _user_id: &str, _problem_id: &str) -> StoreResult<()> {
            unreachable!("read fails first")
        }
    }

    #[tokio::test]
    async fn test_progress_failure_reports_stored_record() {
        let submissions = Arc::new(MemoryStore::new());
        let recorder = SubmissionRecorder::new(submissions.clone(), Arc::new(BrokenUsers));

        match recorder.record(submission("p1", true)).await.unwrap_err() {
            RecordError::Progress { record_id, .. } => {
                let stored = SubmissionRepository::get(submissions.as_ref(), &record_id)
                    .await
                    .unwrap();
                assert!(stored.submission.is_correct);
            }
            other => panic!("expected progress error, got {:?}", other),
        }
    }
}
