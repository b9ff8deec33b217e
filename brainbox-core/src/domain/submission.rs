//! Submission domain types

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::language::Language;

/// Identifier of a stored submission, generated by the submission store
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(pub String);

impl RecordId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for RecordId {
    fn from(s: String) -> Self {
        RecordId(s)
    }
}

impl From<&str> for RecordId {
    fn from(s: &str) -> Self {
        RecordId(s.to_string())
    }
}

/// A graded submission
///
/// Created once per "submit" run and never modified afterwards, except for
/// `score`, which a reviewer may assign later.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluatedSubmission {
    pub problem_id: String,
    pub user_id: String,
    pub language: Language,
    pub code: String,
    pub input: String,
    /// Rendered output envelope shown to the student
    pub raw_output: String,
    /// Always derived by the result evaluator, never copied from the judge label
    pub is_correct: bool,
    pub submitted_at: chrono::DateTime<chrono::Utc>,
    /// Instructor-assigned score
    pub score: Option<u32>,
}

/// A submission together with its store identifier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredSubmission {
    pub id: RecordId,
    #[serde(flatten)]
    pub submission: EvaluatedSubmission,
}
