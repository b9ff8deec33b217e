//! Firestore store
//!
//! Implements the repositories over the Firestore REST v1 API, reading and
//! writing the `problems`, `users` and `submissions` collections used by the
//! web client.

mod document;

use async_trait::async_trait;
use brainbox_core::domain::problem::{Problem, ProblemPatch};
use brainbox_core::domain::submission::{EvaluatedSubmission, RecordId, StoredSubmission};
use brainbox_core::domain::user::UserProgress;
use reqwest::{Client, IntoUrl, Method, RequestBuilder, StatusCode, Url};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::json;
use std::time::Duration;
use tracing::{debug, info};

use self::document::{
    Document, PROBLEM_FIELDS, SCORE_FIELD, SOLVED_FIELD, problem_from_document,
    problem_to_document, score_document, solved_append_commit, submission_from_document,
    submission_to_document, update_query,
};
use super::{ProblemRepository, StoreError, StoreResult, SubmissionRepository, UserRepository};

/// Production Firestore endpoint
pub const DEFAULT_ENDPOINT: &str = "https://firestore.googleapis.com/v1";

const PROBLEMS: &str = "problems";
const USERS: &str = "users";
const SUBMISSIONS: &str = "submissions";
const PAGE_SIZE: &str = "300";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Firestore-backed implementation of all repositories
#[derive(Debug, Clone)]
pub struct FirestoreStore {
    /// `projects/{project}/databases/(default)/documents`
    database_path: String,
    /// Endpoint joined with `database_path`
    documents_url: String,
    /// Web API key, sent as the `key` query parameter
    api_key: Option<String>,
    /// Firebase ID token, sent as a bearer token
    id_token: Option<String>,
    client: Client,
}

#[derive(Debug, Deserialize)]
struct ListDocumentsResponse {
    #[serde(default)]
    documents: Vec<Document>,
    #[serde(default, rename = "nextPageToken")]
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RunQueryItem {
    #[serde(default)]
    document: Option<Document>,
}

impl FirestoreStore {
    /// Creates a store for a project on the production endpoint
    pub fn new(project_id: &str, api_key: Option<String>, id_token: Option<String>) -> Self {
        Self::with_endpoint(DEFAULT_ENDPOINT, project_id, api_key, id_token)
    }

    /// Creates a store against a custom endpoint (e.g. the local emulator)
    pub fn with_endpoint(
        endpoint: &str,
        project_id: &str,
        api_key: Option<String>,
        id_token: Option<String>,
    ) -> Self {
        let database_path = format!("projects/{}/databases/(default)/documents", project_id);
        let documents_url = format!("{}/{}", endpoint.trim_end_matches('/'), database_path);
        Self {
            database_path,
            documents_url,
            api_key,
            id_token,
            client: Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()
                .unwrap_or_default(),
        }
    }

    /// URL of the documents root
    pub fn documents_url(&self) -> &str {
        &self.documents_url
    }

    fn request(&self, method: Method, url: impl IntoUrl) -> RequestBuilder {
        let mut builder = self.client.request(method, url);
        if let Some(key) = &self.api_key {
            builder = builder.query(&[("key", key)]);
        }
        if let Some(token) = &self.id_token {
            builder = builder.bearer_auth(token);
        }
        builder
    }

    /// URL of one document, with `id` percent-encoded as a single path segment
    fn document_url(&self, collection: &str, id: &str) -> StoreResult<Url> {
        let invalid = || {
            StoreError::InvalidRequest(format!("bad store URL {}", self.documents_url))
        };
        let mut url = Url::parse(&self.documents_url).map_err(|_| invalid())?;
        url.path_segments_mut()
            .map_err(|_| invalid())?
            .push(collection)
            .push(id);
        Ok(url)
    }

    /// Checks the status code and deserializes the JSON body
    async fn handle_response<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> StoreResult<T> {
        let status = response.status();

        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(StoreError::Backend {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json()
            .await
            .map_err(|e| StoreError::Decode(format!("Failed to parse JSON response: {}", e)))
    }

    /// Fetches a document, mapping 404 to `None`
    async fn get_document(&self, collection: &str, id: &str) -> StoreResult<Option<Document>> {
        let url = self.document_url(collection, id)?;
        let response = self.request(Method::GET, url).send().await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        self.handle_response(response).await.map(Some)
    }

    /// Runs a structured query and returns the matching documents
    async fn run_query(&self, structured_query: serde_json::Value) -> StoreResult<Vec<Document>> {
        let url = format!("{}:runQuery", self.documents_url);
        let response = self
            .request(Method::POST, &url)
            .json(&json!({ "structuredQuery": structured_query }))
            .send()
            .await?;

        let items: Vec<RunQueryItem> = self.handle_response(response).await?;
        Ok(items.into_iter().filter_map(|item| item.document).collect())
    }
}

#[async_trait]
impl ProblemRepository for FirestoreStore {
    async fn get(&self, id: &str) -> StoreResult<Problem> {
        let doc = self
            .get_document(PROBLEMS, id)
            .await?
            .ok_or_else(|| StoreError::not_found("problem", id))?;
        problem_from_document(&doc)
    }

    async fn list(&self) -> StoreResult<Vec<Problem>> {
        let url = format!("{}/{}", self.documents_url, PROBLEMS);
        let mut problems = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut request = self
                .request(Method::GET, &url)
                .query(&[("pageSize", PAGE_SIZE)]);
            if let Some(token) = &page_token {
                request = request.query(&[("pageToken", token)]);
            }

            let page: ListDocumentsResponse = self.handle_response(request.send().await?).await?;
            for doc in &page.documents {
                problems.push(problem_from_document(doc)?);
            }

            match page.next_page_token.filter(|t| !t.is_empty()) {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        problems.sort_by(|a, b| a.order.cmp(&b.order).then_with(|| a.id.cmp(&b.id)));
        debug!("Listed {} problems", problems.len());
        Ok(problems)
    }

    async fn create(&self, problem: Problem) -> StoreResult<()> {
        let url = format!("{}/{}", self.documents_url, PROBLEMS);
        let response = self
            .request(Method::POST, &url)
            .query(&[("documentId", problem.id.as_str())])
            .json(&problem_to_document(&problem))
            .send()
            .await?;

        if response.status() == StatusCode::CONFLICT {
            return Err(StoreError::already_exists("problem", problem.id));
        }

        let _: Document = self.handle_response(response).await?;
        info!("Created problem {}", problem.id);
        Ok(())
    }

    async fn update(&self, id: &str, patch: ProblemPatch) -> StoreResult<Problem> {
        let mut problem = ProblemRepository::get(self, id).await?;
        problem.apply(patch);

        let response = self
            .request(Method::PATCH, self.document_url(PROBLEMS, id)?)
            .query(&update_query(&PROBLEM_FIELDS))
            .json(&problem_to_document(&problem))
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(StoreError::not_found("problem", id));
        }

        let _: Document = self.handle_response(response).await?;
        info!("Updated problem {}", id);
        Ok(problem)
    }
}

#[async_trait]
impl UserRepository for FirestoreStore {
    async fn progress(&self, user_id: &str) -> StoreResult<UserProgress> {
        let solved = self
            .get_document(USERS, user_id)
            .await?
            .map(|doc| doc.string_set(SOLVED_FIELD))
            .unwrap_or_default();
        Ok(UserProgress {
            user_id: user_id.to_string(),
            solved,
        })
    }

    async fn add_solved(&self, user_id: &str, problem_id: &str) -> StoreResult<()> {
        let url = format!("{}:commit", self.documents_url);
        let user_document = format!("{}/{}/{}", self.database_path, USERS, user_id);
        let body = solved_append_commit(&user_document, problem_id);

        let response = self.request(Method::POST, &url).json(&body).send().await?;
        let _: serde_json::Value = self.handle_response(response).await?;
        debug!("Added {} to solved set of {}", problem_id, user_id);
        Ok(())
    }
}

#[async_trait]
impl SubmissionRepository for FirestoreStore {
    async fn create(&self, submission: EvaluatedSubmission) -> StoreResult<RecordId> {
        let url = format!("{}/{}", self.documents_url, SUBMISSIONS);
        let response = self
            .request(Method::POST, &url)
            .json(&submission_to_document(&submission))
            .send()
            .await?;

        let created: Document = self.handle_response(response).await?;
        Ok(RecordId(created.id()?.to_string()))
    }

    async fn get(&self, id: &RecordId) -> StoreResult<StoredSubmission> {
        let doc = self
            .get_document(SUBMISSIONS, id.as_str())
            .await?
            .ok_or_else(|| StoreError::not_found("submission", id.as_str()))?;
        submission_from_document(&doc)
    }

    async fn list(&self, user_id: Option<&str>) -> StoreResult<Vec<StoredSubmission>> {
        let mut query = json!({ "from": [{ "collectionId": SUBMISSIONS }] });
        if let Some(user_id) = user_id {
            query["where"] = json!({
                "fieldFilter": {
                    "field": { "fieldPath": "userId" },
                    "op": "EQUAL",
                    "value": { "stringValue": user_id }
                }
            });
        }

        // Sorted here rather than by the query to avoid needing a composite index
        let mut submissions = self
            .run_query(query)
            .await?
            .iter()
            .map(submission_from_document)
            .collect::<StoreResult<Vec<_>>>()?;
        submissions.sort_by(|a, b| b.submission.submitted_at.cmp(&a.submission.submitted_at));
        Ok(submissions)
    }

    async fn set_score(&self, id: &RecordId, score: u32) -> StoreResult<()> {
        let response = self
            .request(Method::PATCH, self.document_url(SUBMISSIONS, id.as_str())?)
            .query(&update_query(&[SCORE_FIELD]))
            .json(&score_document(score))
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(StoreError::not_found("submission", id.as_str()));
        }

        let _: Document = self.handle_response(response).await?;
        info!("Scored submission {}: {}", id, score);
        Ok(())
    }
}
