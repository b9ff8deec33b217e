//! User domain types

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// The signed-in user on whose behalf the pipeline runs
///
/// Passed explicitly into the workflow instead of being read from ambient
/// authentication state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub user_id: String,
}

impl Session {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
        }
    }
}

/// A user's progress: the set of problems solved at least once
///
/// Append-only from the grader's point of view.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProgress {
    pub user_id: String,
    pub solved: BTreeSet<String>,
}

impl UserProgress {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            solved: BTreeSet::new(),
        }
    }

    pub fn has_solved(&self, problem_id: &str) -> bool {
        self.solved.contains(problem_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_membership() {
        let mut progress = UserProgress::new("u1");
        assert!(!progress.has_solved("p1"));

        progress.solved.insert("p1".to_string());
        assert!(progress.has_solved("p1"));
        assert!(!progress.has_solved("p2"));
    }
}
