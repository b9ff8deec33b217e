//! Submission-related API endpoints

use async_trait::async_trait;
use brainbox_core::domain::judge::{JobHandle, JudgeStatus, SubmissionRequest};
use tracing::{debug, info};

use crate::error::Result;
use crate::wire::{StatusResponse, SubmitPayload, SubmitResponse};
use crate::{JudgeClient, Judge, SECRET_HEADER};

#[async_trait]
impl Judge for JudgeClient {
    async fn submit(&self, request: &SubmissionRequest) -> Result<JobHandle> {
        let secret = self.secret()?;
        let url = format!("{}/", self.endpoint);

        let response = self
            .client
            .post(&url)
            .header(SECRET_HEADER, secret)
            .json(&SubmitPayload::from(request))
            .send()
            .await?;

        let body: SubmitResponse = self.handle_response(response).await?;
        let he_id = body.he_id.clone().unwrap_or_default();
        let status_url = body.status_url()?;

        info!(
            "Submitted {} source to judge (id: {})",
            request.language, he_id
        );

        Ok(JobHandle::new(status_url))
    }

    async fn status(&self, handle: &JobHandle) -> Result<JudgeStatus> {
        let secret = self.secret()?;

        let response = self
            .client
            .get(&handle.status_url)
            .header(SECRET_HEADER, secret)
            .send()
            .await?;

        let body: StatusResponse = self.handle_response(response).await?;
        let status = body.into_status()?;

        debug!("Judge status for {}: {}", handle.status_url, status.name());

        Ok(status)
    }

    async fn fetch_output(&self, uri: &str) -> Result<String> {
        // Output URIs are pre-signed; the secret is not sent to storage
        let response = self.client.get(uri).send().await?;

        self.handle_text_response(response).await
    }
}
