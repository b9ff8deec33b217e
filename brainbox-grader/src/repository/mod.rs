//! Repository layer
//!
//! Repositories abstract the external document store holding problems,
//! users and submissions. They provide focused interfaces without any
//! business logic.
//!
//! All repositories are trait-based so the workflow can run against the
//! Firestore backend in production and the in-memory backend in tests.

pub mod firestore;
pub mod memory;

use async_trait::async_trait;
use brainbox_core::domain::problem::{Problem, ProblemPatch};
use brainbox_core::domain::submission::{EvaluatedSubmission, RecordId, StoredSubmission};
use brainbox_core::domain::user::UserProgress;
use thiserror::Error;

// Re-export implementations
pub use firestore::FirestoreStore;
pub use memory::MemoryStore;

/// Result type alias for store operations
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Errors raised by a store backend
#[derive(Debug, Error)]
pub enum StoreError {
    /// The requested document does not exist
    #[error("{kind} '{id}' not found")]
    NotFound { kind: &'static str, id: String },

    /// A document with this id already exists
    #[error("{kind} '{id}' already exists")]
    AlreadyExists { kind: &'static str, id: String },

    /// The request could not be built
    #[error("invalid store request: {0}")]
    InvalidRequest(String),

    /// The backend could not be reached
    #[error("store request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// The backend rejected the operation
    #[error("store error (status {status}): {message}")]
    Backend { status: u16, message: String },

    /// A stored document could not be decoded
    #[error("malformed document: {0}")]
    Decode(String),
}

impl StoreError {
    pub fn not_found(kind: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound { kind, id: id.into() }
    }

    pub fn already_exists(kind: &'static str, id: impl Into<String>) -> Self {
        Self::AlreadyExists { kind, id: id.into() }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. } | Self::Backend { status: 404, .. })
    }
}

/// Problem catalogue, managed by faculty
#[async_trait]
pub trait ProblemRepository: Send + Sync {
    /// Fetches a problem by id
    async fn get(&self, id: &str) -> StoreResult<Problem>;

    /// Lists all problems ordered by their `order` field
    async fn list(&self) -> StoreResult<Vec<Problem>>;

    /// Creates a problem, failing if the id is taken
    async fn create(&self, problem: Problem) -> StoreResult<()>;

    /// Applies a patch to an existing problem and returns the result
    async fn update(&self, id: &str, patch: ProblemPatch) -> StoreResult<Problem>;
}

/// Per-user progress
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Reads the user's progress (nothing solved for unknown users)
    async fn progress(&self, user_id: &str) -> StoreResult<UserProgress>;

    /// Adds a problem to the user's solved set
    ///
    /// Implementations perform a set-union, so adding a present id is a no-op.
    async fn add_solved(&self, user_id: &str, problem_id: &str) -> StoreResult<()>;
}

/// Append-only submission log
#[async_trait]
pub trait SubmissionRepository: Send + Sync {
    /// Stores a new submission and returns its generated id
    async fn create(&self, submission: EvaluatedSubmission) -> StoreResult<RecordId>;

    /// Fetches a submission by id
    async fn get(&self, id: &RecordId) -> StoreResult<StoredSubmission>;

    /// Lists submissions newest first, optionally for one user
    async fn list(&self, user_id: Option<&str>) -> StoreResult<Vec<StoredSubmission>>;

    /// Sets the reviewer score; no other field changes
    async fn set_score(&self, id: &RecordId, score: u32) -> StoreResult<()>;
}
