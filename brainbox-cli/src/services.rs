//! Service wiring
//!
//! Builds the judge client, the stores and the submission workflow from
//! the configuration.

use anyhow::Result;
use brainbox_grader::repository::{
    FirestoreStore, MemoryStore, ProblemRepository, SubmissionRepository, UserRepository,
};
use brainbox_grader::service::{ResultEvaluator, SubmissionRecorder, SubmissionWorkflow};
use brainbox_judge::{Judge, JudgeClient};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Connected collaborators
pub struct Services {
    pub judge: Arc<dyn Judge>,
    pub problems: Arc<dyn ProblemRepository>,
    pub users: Arc<dyn UserRepository>,
    pub submissions: Arc<dyn SubmissionRepository>,
}

impl Services {
    /// Connects to the judge and to the Firestore project
    ///
    /// Fails when no Firestore project is configured.
    pub fn connect(config: &brainbox_grader::Config) -> Result<Self> {
        let Some(project) = config.firestore_project_id.as_deref() else {
            anyhow::bail!("FIRESTORE_PROJECT_ID is not set; problems live in Firestore");
        };

        info!("Using Firestore project {}", project);
        let store = FirestoreStore::new(
            project,
            config.firestore_api_key.clone(),
            config.firestore_id_token.clone(),
        );
        Ok(Self::with_store(judge_client(config), Arc::new(store)))
    }

    /// Connects to the judge only, for runs that never touch a store
    pub fn judge_only(config: &brainbox_grader::Config) -> Self {
        debug!("Running without a store");
        Self::with_store(judge_client(config), Arc::new(MemoryStore::new()))
    }

    fn with_store<S>(judge: Arc<dyn Judge>, store: Arc<S>) -> Self
    where
        S: ProblemRepository + UserRepository + SubmissionRepository + 'static,
    {
        let problems: Arc<dyn ProblemRepository> = store.clone();
        let users: Arc<dyn UserRepository> = store.clone();
        let submissions: Arc<dyn SubmissionRepository> = store;
        Self {
            judge,
            problems,
            users,
            submissions,
        }
    }

    /// Submission workflow over these services
    pub fn workflow(&self, config: &brainbox_grader::Config) -> SubmissionWorkflow {
        SubmissionWorkflow::new(
            Arc::clone(&self.judge),
            Arc::clone(&self.problems),
            ResultEvaluator::new(Arc::clone(&self.judge)),
            SubmissionRecorder::new(Arc::clone(&self.submissions), Arc::clone(&self.users)),
        )
        .with_policy(config.poll_policy())
        .with_limits(config.limits())
    }
}

fn judge_client(config: &brainbox_grader::Config) -> Arc<dyn Judge> {
    let client = JudgeClient::new(config.judge_url.clone(), config.client_secret.clone());
    if !client.has_credentials() {
        warn!("HACKEREARTH_CLIENT_SECRET not set, judge calls will fail");
    }
    Arc::new(client)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connect_requires_firestore_project() {
        let err = Services::connect(&brainbox_grader::Config::default())
            .err()
            .unwrap();
        assert!(err.to_string().contains("FIRESTORE_PROJECT_ID"));
    }

    #[test]
    fn test_connect_with_project() {
        let mut config = brainbox_grader::Config::default();
        config.firestore_project_id = Some("brainbox".to_string());
        assert!(Services::connect(&config).is_ok());
    }

    #[tokio::test]
    async fn test_judge_only_has_empty_store() {
        let services = Services::judge_only(&brainbox_grader::Config::default());
        assert!(services.problems.list().await.unwrap().is_empty());
    }
}
