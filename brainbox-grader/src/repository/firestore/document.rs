//! Firestore document encoding
//!
//! Firestore's REST API wraps every field in a typed value object
//! (`{"stringValue": "..."}`, `{"integerValue": "42"}`, ...). This module
//! holds those wire types and the mapping between documents and the domain
//! types, using the field names the web client writes.

use brainbox_core::domain::language::Language;
use brainbox_core::domain::problem::Problem;
use brainbox_core::domain::submission::{EvaluatedSubmission, RecordId, StoredSubmission};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::{BTreeMap, BTreeSet};

use crate::repository::{StoreError, StoreResult};

/// A typed Firestore value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Value {
    NullValue(Option<()>),
    BooleanValue(bool),
    /// int64, encoded as a decimal string on the wire
    IntegerValue(String),
    DoubleValue(f64),
    TimestampValue(String),
    StringValue(String),
    ArrayValue(ArrayValue),
    MapValue(MapValue),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArrayValue {
    #[serde(default)]
    pub values: Vec<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MapValue {
    #[serde(default)]
    pub fields: BTreeMap<String, Value>,
}

impl Value {
    pub fn string(s: impl Into<String>) -> Self {
        Value::StringValue(s.into())
    }

    pub fn integer(i: i64) -> Self {
        Value::IntegerValue(i.to_string())
    }

    pub fn timestamp(t: &DateTime<Utc>) -> Self {
        Value::TimestampValue(t.to_rfc3339_opts(SecondsFormat::Micros, true))
    }
}

/// A Firestore document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Full resource name; absent on documents being written
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub fields: BTreeMap<String, Value>,
}

impl Document {
    pub fn from_fields(fields: BTreeMap<String, Value>) -> Self {
        Self { name: None, fields }
    }

    /// Last segment of the resource name
    pub fn id(&self) -> StoreResult<&str> {
        self.name
            .as_deref()
            .and_then(|n| n.rsplit('/').next())
            .filter(|id| !id.is_empty())
            .ok_or_else(|| StoreError::Decode("document has no name".to_string()))
    }

    fn field(&self, key: &str) -> Option<&Value> {
        match self.fields.get(key) {
            None | Some(Value::NullValue(_)) => None,
            Some(value) => Some(value),
        }
    }

    fn missing(&self, key: &str, expected: &str) -> StoreError {
        StoreError::Decode(format!(
            "{}: field '{}' missing or not a {}",
            self.name.as_deref().unwrap_or("<unnamed>"),
            key,
            expected
        ))
    }

    /// Optional string field
    pub fn opt_str(&self, key: &str) -> Option<String> {
        match self.field(key) {
            Some(Value::StringValue(s)) => Some(s.clone()),
            _ => None,
        }
    }

    /// String field; absent strings read as empty
    pub fn str_or_empty(&self, key: &str) -> String {
        self.opt_str(key).unwrap_or_default()
    }

    /// Optional integer field; doubles are truncated
    pub fn opt_i64(&self, key: &str) -> Option<i64> {
        match self.field(key) {
            Some(Value::IntegerValue(s)) => s.parse().ok(),
            Some(Value::DoubleValue(d)) => Some(*d as i64),
            Some(Value::StringValue(s)) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn bool(&self, key: &str) -> StoreResult<bool> {
        match self.field(key) {
            Some(Value::BooleanValue(b)) => Ok(*b),
            _ => Err(self.missing(key, "boolean")),
        }
    }

    pub fn timestamp(&self, key: &str) -> StoreResult<DateTime<Utc>> {
        match self.field(key) {
            Some(Value::TimestampValue(s)) => DateTime::parse_from_rfc3339(s)
                .map(|t| t.with_timezone(&Utc))
                .map_err(|e| StoreError::Decode(format!("field '{}': {}", key, e))),
            _ => Err(self.missing(key, "timestamp")),
        }
    }

    /// String elements of an array field; absent arrays read as empty
    pub fn string_set(&self, key: &str) -> BTreeSet<String> {
        match self.field(key) {
            Some(Value::ArrayValue(array)) => array
                .values
                .iter()
                .filter_map(|v| match v {
                    Value::StringValue(s) => Some(s.clone()),
                    _ => None,
                })
                .collect(),
            _ => BTreeSet::new(),
        }
    }
}

// =============================================================================
// Problems
// =============================================================================

/// Field paths written for a problem
pub const PROBLEM_FIELDS: [&str; 12] = [
    "id",
    "title",
    "category",
    "difficulty",
    "description",
    "test_input",
    "expected_output",
    "order",
    "likes",
    "dislikes",
    "videoId",
    "link",
];

pub fn problem_to_document(problem: &Problem) -> Document {
    let mut fields = BTreeMap::new();
    fields.insert("id".to_string(), Value::string(&problem.id));
    fields.insert("title".to_string(), Value::string(&problem.title));
    fields.insert("category".to_string(), Value::string(&problem.category));
    fields.insert("difficulty".to_string(), Value::string(&problem.difficulty));
    fields.insert("description".to_string(), Value::string(&problem.description));
    fields.insert("test_input".to_string(), Value::string(&problem.test_input));
    fields.insert(
        "expected_output".to_string(),
        Value::string(&problem.expected_output),
    );
    fields.insert("order".to_string(), Value::integer(problem.order));
    fields.insert("likes".to_string(), Value::integer(problem.likes));
    fields.insert("dislikes".to_string(), Value::integer(problem.dislikes));
    fields.insert(
        "videoId".to_string(),
        match &problem.video_id {
            Some(v) => Value::string(v),
            None => Value::NullValue(None),
        },
    );
    fields.insert(
        "link".to_string(),
        match &problem.link {
            Some(l) => Value::string(l),
            None => Value::NullValue(None),
        },
    );
    Document::from_fields(fields)
}

pub fn problem_from_document(doc: &Document) -> StoreResult<Problem> {
    let id = match doc.opt_str("id").filter(|id| !id.is_empty()) {
        Some(id) => id,
        None => doc.id()?.to_string(),
    };

    Ok(Problem {
        id,
        title: doc.str_or_empty("title"),
        category: doc.str_or_empty("category"),
        difficulty: doc.str_or_empty("difficulty"),
        description: doc.str_or_empty("description"),
        test_input: doc.str_or_empty("test_input"),
        expected_output: doc.str_or_empty("expected_output"),
        order: doc.opt_i64("order").unwrap_or_default(),
        likes: doc.opt_i64("likes").unwrap_or_default(),
        dislikes: doc.opt_i64("dislikes").unwrap_or_default(),
        video_id: doc.opt_str("videoId").filter(|v| !v.is_empty()),
        link: doc.opt_str("link").filter(|l| !l.is_empty()),
    })
}

// =============================================================================
// Submissions
// =============================================================================

pub fn submission_to_document(submission: &EvaluatedSubmission) -> Document {
    let mut fields = BTreeMap::new();
    fields.insert("userId".to_string(), Value::string(&submission.user_id));
    fields.insert("problemId".to_string(), Value::string(&submission.problem_id));
    fields.insert("code".to_string(), Value::string(&submission.code));
    fields.insert(
        "language".to_string(),
        Value::string(submission.language.code()),
    );
    fields.insert("input".to_string(), Value::string(&submission.input));
    fields.insert(
        "isCorrect".to_string(),
        Value::BooleanValue(submission.is_correct),
    );
    fields.insert("output".to_string(), Value::string(&submission.raw_output));
    fields.insert(
        "submittedAt".to_string(),
        Value::timestamp(&submission.submitted_at),
    );
    if let Some(score) = submission.score {
        fields.insert("marks".to_string(), Value::integer(score.into()));
    }
    Document::from_fields(fields)
}

pub fn submission_from_document(doc: &Document) -> StoreResult<StoredSubmission> {
    let language_name = doc.str_or_empty("language");
    let language = language_name
        .parse::<Language>()
        .map_err(|e| StoreError::Decode(e.to_string()))?;

    Ok(StoredSubmission {
        id: RecordId(doc.id()?.to_string()),
        submission: EvaluatedSubmission {
            problem_id: doc.str_or_empty("problemId"),
            user_id: doc.str_or_empty("userId"),
            language,
            code: doc.str_or_empty("code"),
            input: doc.str_or_empty("input"),
            raw_output: doc.str_or_empty("output"),
            is_correct: doc.bool("isCorrect")?,
            submitted_at: doc.timestamp("submittedAt")?,
            score: doc.opt_i64("marks").and_then(|m| u32::try_from(m).ok()),
        },
    })
}

// =============================================================================
// Writes
// =============================================================================

/// User field holding the ids of solved problems
pub const SOLVED_FIELD: &str = "solvedProblems";

/// Submission field holding the reviewer score
pub const SCORE_FIELD: &str = "marks";

/// Query of a PATCH that overwrites `fields` of an existing document only
pub fn update_query<'a>(fields: &[&'a str]) -> Vec<(&'static str, &'a str)> {
    let mut query: Vec<(&'static str, &'a str)> = fields
        .iter()
        .map(|field| ("updateMask.fieldPaths", *field))
        .collect();
    query.push(("currentDocument.exists", "true"));
    query
}

/// Commit body adding `problem_id` to the solved set of `user_document`
///
/// `appendMissingElements` is a server-side set union, so concurrent
/// appends of the same id never duplicate it.
pub fn solved_append_commit(user_document: &str, problem_id: &str) -> serde_json::Value {
    json!({
        "writes": [{
            "transform": {
                "document": user_document,
                "fieldTransforms": [{
                    "fieldPath": SOLVED_FIELD,
                    "appendMissingElements": {
                        "values": [Value::string(problem_id)]
                    }
                }]
            }
        }]
    })
}

/// Document carrying only the reviewer score
pub fn score_document(score: u32) -> Document {
    let mut fields = BTreeMap::new();
    fields.insert(SCORE_FIELD.to_string(), Value::integer(score.into()));
    Document::from_fields(fields)
}
