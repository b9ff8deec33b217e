//! Submission workflow
//!
//! Chains the pipeline for one attempt: load the problem, submit to the
//! judge, poll to completion, evaluate, and (for submissions) record.
//!
//! Judge and poller errors propagate to the caller untouched. The evaluator
//! always yields a displayable outcome. Each attempt is independent; the
//! only shared state is the external stores.

use brainbox_core::domain::judge::SubmissionRequest;
use brainbox_core::domain::language::Language;
use brainbox_core::domain::submission::EvaluatedSubmission;
use brainbox_core::domain::user::Session;
use brainbox_judge::{Judge, JudgeError};
use std::sync::Arc;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument};

use crate::repository::{ProblemRepository, StoreError};
use crate::scheduler::{PollError, PollPolicy, StatusPoller};
use crate::service::evaluator::{EvaluationOutcome, ResultEvaluator, Verdict};
use crate::service::recorder::{RecordError, RecordReceipt, SolveProgress, SubmissionRecorder};

/// Whether an attempt is persisted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// Run against the caller's input; nothing is stored
    Run,
    /// Run against the problem's test input and record the verdict
    Submit,
}

/// One attempt at a problem
#[derive(Debug, Clone)]
pub struct Attempt {
    pub problem_id: String,
    pub language: Language,
    pub source_code: String,
    /// Custom input for `Run`; ignored by `Submit`
    pub stdin: Option<String>,
    pub mode: RunMode,
}

/// Resource limits applied to every request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    pub time_limit_seconds: u32,
    pub memory_limit_kb: u32,
}

impl Default for Limits {
    fn default() -> Self {
        use brainbox_core::domain::judge::{DEFAULT_MEMORY_LIMIT_KB, DEFAULT_TIME_LIMIT_SECONDS};
        Self {
            time_limit_seconds: DEFAULT_TIME_LIMIT_SECONDS,
            memory_limit_kb: DEFAULT_MEMORY_LIMIT_KB,
        }
    }
}

/// Errors that abort an attempt before a verdict is displayed
#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("could not load problem: {0}")]
    Problem(#[source] StoreError),

    #[error(transparent)]
    Judge(#[from] JudgeError),

    #[error(transparent)]
    Poll(#[from] PollError),

    #[error(transparent)]
    Record(#[from] RecordError),
}

impl WorkflowError {
    /// Human-readable status line, distinct for every failure class
    pub fn status_message(&self) -> String {
        match self {
            WorkflowError::Problem(e) if e.is_not_found() => {
                "This problem does not exist".to_string()
            }
            WorkflowError::Problem(e) => format!("Could not load the problem: {}", e),
            WorkflowError::Judge(e) if e.is_configuration() => {
                format!("Code runner is not configured: {}", e)
            }
            WorkflowError::Judge(e) if e.is_invalid_response() => {
                format!("Code runner returned an unexpected response: {}", e)
            }
            WorkflowError::Judge(e) if e.is_transport() => {
                format!("Could not reach the code runner: {}", e)
            }
            WorkflowError::Judge(e) => format!("Code runner request failed: {}", e),
            WorkflowError::Poll(PollError::Timeout { .. }) => {
                "Timed out waiting for the code runner, please try again".to_string()
            }
            WorkflowError::Poll(PollError::Cancelled) => "Evaluation cancelled".to_string(),
            WorkflowError::Record(RecordError::Persistence(e)) => {
                format!("Your submission could not be saved: {}", e)
            }
            WorkflowError::Record(RecordError::Progress { record_id, .. }) => format!(
                "Submission {} was saved, but your progress could not be updated",
                record_id
            ),
        }
    }
}

/// Result of a finished attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowOutcome {
    pub evaluation: EvaluationOutcome,
    /// Present for `Submit` attempts
    pub receipt: Option<RecordReceipt>,
}

impl WorkflowOutcome {
    /// Human-readable status line
    pub fn status_message(&self) -> String {
        match (&self.evaluation.verdict, self.receipt.as_ref().map(|r| r.progress)) {
            (Verdict::Accepted, Some(SolveProgress::NewlySolved)) => {
                "Congratulations! Problem solved!".to_string()
            }
            (Verdict::Accepted, Some(SolveProgress::AlreadySolved)) => {
                "Correct! You've already solved this problem, but nice job!".to_string()
            }
            (Verdict::WrongAnswer, Some(_)) => {
                "Submission was not correct. Keep trying!".to_string()
            }
            (verdict, _) => verdict.describe(),
        }
    }
}

/// Runs attempts end to end
pub struct SubmissionWorkflow {
    judge: Arc<dyn Judge>,
    problems: Arc<dyn ProblemRepository>,
    poller: StatusPoller,
    evaluator: ResultEvaluator,
    recorder: SubmissionRecorder,
    policy: PollPolicy,
    limits: Limits,
}

impl SubmissionWorkflow {
    /// Creates a workflow from its collaborators
    pub fn new(
        judge: Arc<dyn Judge>,
        problems: Arc<dyn ProblemRepository>,
        evaluator: ResultEvaluator,
        recorder: SubmissionRecorder,
    ) -> Self {
        Self {
            poller: StatusPoller::new(Arc::clone(&judge)),
            judge,
            problems,
            evaluator,
            recorder,
            policy: PollPolicy::default(),
            limits: Limits::default(),
        }
    }

    /// Overrides the polling budget
    pub fn with_policy(mut self, policy: PollPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Overrides the resource limits
    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    /// Runs one attempt on behalf of `session`
    #[instrument(skip_all, fields(user = %session.user_id, problem = %attempt.problem_id))]
    pub async fn execute(
        &self,
        session: &Session,
        attempt: Attempt,
        cancel: &CancellationToken,
    ) -> Result<WorkflowOutcome, WorkflowError> {
        let problem = self
            .problems
            .get(&attempt.problem_id)
            .await
            .map_err(WorkflowError::Problem)?;

        let stdin = match attempt.mode {
            RunMode::Submit => problem.test_input.clone(),
            RunMode::Run => attempt
                .stdin
                .clone()
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| problem.test_input.clone()),
        };

        let request = SubmissionRequest::new(attempt.language, attempt.source_code.clone(), stdin)
            .with_limits(self.limits.time_limit_seconds, self.limits.memory_limit_kb);

        let status = self.run_to_completion(&request, cancel).await?;
        let evaluation = self.evaluator.evaluate(&status, &problem.expected_output).await;

        info!("Attempt evaluated: {:?}", evaluation.verdict);

        let receipt = match attempt.mode {
            RunMode::Run => None,
            RunMode::Submit => {
                let submission = EvaluatedSubmission {
                    problem_id: problem.id.clone(),
                    user_id: session.user_id.clone(),
                    language: request.language,
                    code: request.source_code,
                    input: request.stdin,
                    raw_output: evaluation.display_output.clone(),
                    is_correct: evaluation.is_correct,
                    submitted_at: chrono::Utc::now(),
                    score: None,
                };
                Some(self.recorder.record(submission).await?)
            }
        };

        Ok(WorkflowOutcome {
            evaluation,
            receipt,
        })
    }

    /// Runs source code with no problem attached and returns its display text
    pub async fn run_source(
        &self,
        request: SubmissionRequest,
        cancel: &CancellationToken,
    ) -> Result<String, WorkflowError> {
        let status = self.run_to_completion(&request, cancel).await?;
        Ok(self.evaluator.render(&status).await)
    }

    async fn run_to_completion(
        &self,
        request: &SubmissionRequest,
        cancel: &CancellationToken,
    ) -> Result<brainbox_core::domain::judge::JudgeStatus, WorkflowError> {
        let handle = self.judge.submit(request).await?;
        Ok(self.poller.poll(&handle, &self.policy, cancel).await?)
    }
}
