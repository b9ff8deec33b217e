//! Problem domain types

use serde::{Deserialize, Serialize};

/// A practice problem as stored in the problem store
///
/// The grader only reads `test_input` and `expected_output`; the rest is
/// display metadata managed by faculty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Problem {
    pub id: String,
    pub title: String,
    pub category: String,
    pub difficulty: String,
    pub description: String,
    pub test_input: String,
    pub expected_output: String,
    pub order: i64,
    #[serde(default)]
    pub likes: i64,
    #[serde(default)]
    pub dislikes: i64,
    pub video_id: Option<String>,
    pub link: Option<String>,
}

/// Partial update of a problem's editable fields
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProblemPatch {
    pub title: Option<String>,
    pub category: Option<String>,
    pub difficulty: Option<String>,
    pub description: Option<String>,
    pub test_input: Option<String>,
    pub expected_output: Option<String>,
    pub order: Option<i64>,
    pub video_id: Option<String>,
    pub link: Option<String>,
}

impl ProblemPatch {
    /// True when the patch changes nothing
    pub fn is_empty(&self) -> bool {
        *self == ProblemPatch::default()
    }
}

impl Problem {
    /// Applies a patch, leaving unset fields untouched
    pub fn apply(&mut self, patch: ProblemPatch) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(category) = patch.category {
            self.category = category;
        }
        if let Some(difficulty) = patch.difficulty {
            self.difficulty = difficulty;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(test_input) = patch.test_input {
            self.test_input = test_input;
        }
        if let Some(expected_output) = patch.expected_output {
            self.expected_output = expected_output;
        }
        if let Some(order) = patch.order {
            self.order = order;
        }
        if patch.video_id.is_some() {
            self.video_id = patch.video_id;
        }
        if patch.link.is_some() {
            self.link = patch.link;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn problem() -> Problem {
        Problem {
            id: "two-sum".to_string(),
            title: "Two Sum".to_string(),
            category: "Array".to_string(),
            difficulty: "Easy".to_string(),
            description: "Add two numbers".to_string(),
            test_input: "1 2".to_string(),
            expected_output: "3".to_string(),
            order: 1,
            likes: 0,
            dislikes: 0,
            video_id: None,
            link: None,
        }
    }

    #[test]
    fn test_apply_patch() {
        let mut p = problem();
        p.apply(ProblemPatch {
            expected_output: Some("4".to_string()),
            order: Some(7),
            ..Default::default()
        });

        assert_eq!(p.expected_output, "4");
        assert_eq!(p.order, 7);
        assert_eq!(p.title, "Two Sum");
        assert_eq!(p.test_input, "1 2");
    }

    #[test]
    fn test_empty_patch() {
        assert!(ProblemPatch::default().is_empty());
        let patch = ProblemPatch {
            link: Some("https://example.com".to_string()),
            ..Default::default()
        };
        assert!(!patch.is_empty());
    }
}
