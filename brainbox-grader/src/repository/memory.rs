//! In-memory store
//!
//! Implements every repository over mutex-guarded collections. Nothing is
//! persisted; used by tests and local demos.

use async_trait::async_trait;
use brainbox_core::domain::problem::{Problem, ProblemPatch};
use brainbox_core::domain::submission::{EvaluatedSubmission, RecordId, StoredSubmission};
use brainbox_core::domain::user::UserProgress;
use std::collections::{BTreeSet, HashMap};
use std::sync::Mutex;
use uuid::Uuid;

use super::{ProblemRepository, StoreError, StoreResult, SubmissionRepository, UserRepository};

/// Thread-safe in-memory implementation of all repositories
#[derive(Default)]
pub struct MemoryStore {
    problems: Mutex<HashMap<String, Problem>>,
    solved: Mutex<HashMap<String, BTreeSet<String>>>,
    submissions: Mutex<Vec<StoredSubmission>>,
}

impl MemoryStore {
    /// Creates an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store seeded with problems
    pub fn with_problems(problems: impl IntoIterator<Item = Problem>) -> Self {
        let store = Self::new();
        {
            let mut map = store.problems.lock().unwrap();
            for problem in problems {
                map.insert(problem.id.clone(), problem);
            }
        }
        store
    }

    /// Number of stored submissions
    pub fn submission_count(&self) -> usize {
        self.submissions.lock().unwrap().len()
    }
}

#[async_trait]
impl ProblemRepository for MemoryStore {
    async fn get(&self, id: &str) -> StoreResult<Problem> {
        self.problems
            .lock()
            .unwrap()
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::not_found("problem", id))
    }

    async fn list(&self) -> StoreResult<Vec<Problem>> {
        let mut problems: Vec<Problem> = self.problems.lock().unwrap().values().cloned().collect();
        problems.sort_by(|a, b| a.order.cmp(&b.order).then_with(|| a.id.cmp(&b.id)));
        Ok(problems)
    }

    async fn create(&self, problem: Problem) -> StoreResult<()> {
        let mut problems = self.problems.lock().unwrap();
        if problems.contains_key(&problem.id) {
            return Err(StoreError::already_exists("problem", problem.id));
        }
        problems.insert(problem.id.clone(), problem);
        Ok(())
    }

    async fn update(&self, id: &str, patch: ProblemPatch) -> StoreResult<Problem> {
        let mut problems = self.problems.lock().unwrap();
        let problem = problems
            .get_mut(id)
            .ok_or_else(|| StoreError::not_found("problem", id))?;
        problem.apply(patch);
        Ok(problem.clone())
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn progress(&self, user_id: &str) -> StoreResult<UserProgress> {
        let solved = self
            .solved
            .lock()
            .unwrap()
            .get(user_id)
            .cloned()
            .unwrap_or_default();
        Ok(UserProgress {
            user_id: user_id.to_string(),
            solved,
        })
    }

    async fn add_solved(&self, user_id: &str, problem_id: &str) -> StoreResult<()> {
        self.solved
            .lock()
            .unwrap()
            .entry(user_id.to_string())
            .or_default()
            .insert(problem_id.to_string());
        Ok(())
    }
}

#[async_trait]
impl SubmissionRepository for MemoryStore {
    async fn create(&self, submission: EvaluatedSubmission) -> StoreResult<RecordId> {
        let id = RecordId(Uuid::new_v4().to_string());
        self.submissions.lock().unwrap().push(StoredSubmission {
            id: id.clone(),
            submission,
        });
        Ok(id)
    }

    async fn get(&self, id: &RecordId) -> StoreResult<StoredSubmission> {
        self.submissions
            .lock()
            .unwrap()
            .iter()
            .find(|s| &s.id == id)
            .cloned()
            .ok_or_else(|| StoreError::not_found("submission", id.as_str()))
    }

    async fn list(&self, user_id: Option<&str>) -> StoreResult<Vec<StoredSubmission>> {
        let submissions = self.submissions.lock().unwrap();
        // Stored in insertion order; newest first means reverse
        Ok(submissions
            .iter()
            .rev()
            .filter(|s| user_id.is_none_or(|u| s.submission.user_id == u))
            .cloned()
            .collect())
    }

    async fn set_score(&self, id: &RecordId, score: u32) -> StoreResult<()> {
        let mut submissions = self.submissions.lock().unwrap();
        let stored = submissions
            .iter_mut()
            .find(|s| &s.id == id)
            .ok_or_else(|| StoreError::not_found("submission", id.as_str()))?;
        stored.submission.score = Some(score);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use brainbox_core::domain::language::Language;

    fn problem(id: &str, order: i64) -> Problem {
        Problem {
            id: id.to_string(),
            title: id.to_uppercase(),
            category: "Math".to_string(),
            difficulty: "Easy".to_string(),
            description: String::new(),
            test_input: String::new(),
            expected_output: "42".to_string(),
            order,
            likes: 0,
            dislikes: 0,
            video_id: None,
            link: None,
        }
    }

    fn submission(user: &str) -> EvaluatedSubmission {
        EvaluatedSubmission {
            problem_id: "p1".to_string(),
            user_id: user.to_string(),
            language: Language::Python3,
            code: "print(42)".to_string(),
            input: String::new(),
            raw_output: "42".to_string(),
            is_correct: true,
            submitted_at: chrono::Utc::now(),
            score: None,
        }
    }

    #[tokio::test]
    async fn test_problems_listed_by_order() {
        let store = MemoryStore::with_problems([problem("c", 3), problem("a", 1), problem("b", 2)]);
        let ids: Vec<String> = ProblemRepository::list(&store)
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.id)
            .collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_create_problem_rejects_duplicate() {
        let store = MemoryStore::with_problems([problem("a", 1)]);
        let err = ProblemRepository::create(&store, problem("a", 2))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::AlreadyExists { .. }));
    }

    #[tokio::test]
    async fn test_update_missing_problem() {
        let store = MemoryStore::new();
        let err = store
            .update("nope", ProblemPatch::default())
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_add_solved_is_set_union() {
        let store = MemoryStore::new();
        store.add_solved("u1", "p1").await.unwrap();
        store.add_solved("u1", "p1").await.unwrap();
        store.add_solved("u1", "p2").await.unwrap();

        let progress = store.progress("u1").await.unwrap();
        assert_eq!(progress.user_id, "u1");
        assert_eq!(progress.solved.len(), 2);
        assert!(store.progress("u2").await.unwrap().solved.is_empty());
    }

    #[tokio::test]
    async fn test_submissions_newest_first_and_filtered() {
        let store = MemoryStore::new();
        let first = SubmissionRepository::create(&store, submission("u1")).await.unwrap();
        let _other = SubmissionRepository::create(&store, submission("u2")).await.unwrap();
        let last = SubmissionRepository::create(&store, submission("u1")).await.unwrap();

        let mine = SubmissionRepository::list(&store, Some("u1")).await.unwrap();
        let ids: Vec<RecordId> = mine.into_iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![last, first]);

        assert_eq!(SubmissionRepository::list(&store, None).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_set_score_only_touches_score() {
        let store = MemoryStore::new();
        let id = SubmissionRepository::create(&store, submission("u1")).await.unwrap();
        store.set_score(&id, 8).await.unwrap();

        let stored = SubmissionRepository::get(&store, &id).await.unwrap();
        assert_eq!(stored.submission.score, Some(8));
        assert!(stored.submission.is_correct);
        assert_eq!(stored.submission.code, "print(42)");
    }
}
