//! BrainBox Judge Client
//!
//! A typed HTTP client for the remote code-execution judge (HackerEarth v4
//! code-evaluation API).
//!
//! The client submits source code, reads back job statuses and downloads
//! program output. The [`Judge`] trait is the seam the grader depends on, so
//! the poller and evaluator can be exercised without a network.
//!
//! # Example
//!
//! ```no_run
//! use brainbox_core::domain::judge::SubmissionRequest;
//! use brainbox_core::domain::language::Language;
//! use brainbox_judge::{Judge, JudgeClient};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = JudgeClient::new(brainbox_judge::DEFAULT_ENDPOINT, Some("secret".into()));
//!
//!     let handle = client
//!         .submit(&SubmissionRequest::new(Language::Python3, "print('hi')", ""))
//!         .await?;
//!
//!     println!("Poll {}", handle.status_url);
//!     Ok(())
//! }
//! ```

pub mod error;
mod submissions;
mod wire;

// Re-export commonly used types
pub use error::{JudgeError, Result};

use async_trait::async_trait;
use brainbox_core::domain::judge::{JobHandle, JudgeStatus, SubmissionRequest};
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Default submissions endpoint of the HackerEarth v4 API
pub const DEFAULT_ENDPOINT: &str =
    "https://api.hackerearth.com/v4/partner/code-evaluation/submissions/";

/// Time limit on every request made by the default HTTP client
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Header carrying the client secret
pub(crate) const SECRET_HEADER: &str = "client-secret";

/// Operations the grader needs from a remote judge
#[async_trait]
pub trait Judge: Send + Sync {
    /// Submits a request for execution
    ///
    /// Fails with `Configuration` when credentials are absent (before any
    /// network call), a transport error when the call fails, or
    /// `InvalidResponse` when the judge omits the status URL. Never retried.
    async fn submit(&self, request: &SubmissionRequest) -> Result<JobHandle>;

    /// Reads the current status of a submitted job
    async fn status(&self, handle: &JobHandle) -> Result<JudgeStatus>;

    /// Downloads program output stored at a URI
    async fn fetch_output(&self, uri: &str) -> Result<String>;
}

/// HTTP client for the judge API
#[derive(Debug, Clone)]
pub struct JudgeClient {
    /// Submissions endpoint (without trailing slash)
    endpoint: String,
    /// Secret sent with every judge call
    client_secret: Option<String>,
    /// HTTP client instance
    client: Client,
}

impl JudgeClient {
    /// Create a new judge client
    ///
    /// # Arguments
    /// * `endpoint` - The submissions endpoint URL
    /// * `client_secret` - The API secret; `None` makes every call fail with a configuration error
    pub fn new(endpoint: impl Into<String>, client_secret: Option<String>) -> Self {
        let client = Client::builder()
            .timeout(DEFAULT_REQUEST_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self::with_client(endpoint, client_secret, client)
    }

    /// Create a new judge client with a custom HTTP client
    ///
    /// This allows you to configure timeouts, proxies, TLS settings, etc.
    pub fn with_client(
        endpoint: impl Into<String>,
        client_secret: Option<String>,
        client: Client,
    ) -> Self {
        let endpoint = endpoint.into();
        Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            client_secret: client_secret.filter(|s| !s.trim().is_empty()),
            client,
        }
    }

    /// Get the submissions endpoint
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Whether a client secret is configured
    pub fn has_credentials(&self) -> bool {
        self.client_secret.is_some()
    }

    /// Returns the secret or a configuration error
    fn secret(&self) -> Result<&str> {
        self.client_secret.as_deref().ok_or_else(|| {
            JudgeError::Configuration("judge client secret is not set".to_string())
        })
    }

    // =============================================================================
    // Response Handlers
    // =============================================================================

    /// Checks the status code and deserializes the JSON body
    async fn handle_response<T: DeserializeOwned>(&self, response: reqwest::Response) -> Result<T> {
        let status = response.status();

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(JudgeError::api_error(status.as_u16(), error_text));
        }

        response.json().await.map_err(|e| {
            JudgeError::InvalidResponse(format!("Failed to parse JSON response: {}", e))
        })
    }

    /// Checks the status code and returns the body as text
    async fn handle_text_response(&self, response: reqwest::Response) -> Result<String> {
        let status = response.status();

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(JudgeError::api_error(status.as_u16(), error_text));
        }

        Ok(response.text().await?)
    }
}
