//! Result evaluator
//!
//! Turns a terminal judge status into a verdict. The program's actual output
//! is read from the structured run result (inline text, or downloaded from
//! the output URI) and compared against the problem's expected output. The
//! judge's own pass/fail label is never trusted, since the judge does not
//! know the expected output.
//!
//! The evaluator never fails: judge failures, compile errors and
//! unreachable output all become `is_correct = false` with a descriptive
//! display text.

use brainbox_core::domain::envelope::OutputEnvelope;
use brainbox_core::domain::judge::{JudgeStatus, RunOutput, RunResult};
use brainbox_judge::Judge;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

/// Output comparison policy
///
/// Implement this for problems that need fuzzier matching (e.g. floating
/// point tolerance).
pub trait OutputComparator: Send + Sync {
    /// Whether `actual` is an accepted answer for `expected`
    fn matches(&self, actual: &str, expected: &str) -> bool;
}

/// Default policy: trim both ends, then require exact equality
///
/// Internal whitespace and newlines are significant.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExactTrimComparator;

impl OutputComparator for ExactTrimComparator {
    fn matches(&self, actual: &str, expected: &str) -> bool {
        actual.trim() == expected.trim()
    }
}

/// Why a submission was judged the way it was
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    Accepted,
    WrongAnswer,
    CompilationError(String),
    /// The judge reported an infrastructure failure
    JudgeFailure(String),
    /// The run completed but its output could not be retrieved
    OutputUnavailable(String),
    /// The status was not terminal; the caller evaluated too early
    Pending,
}

impl Verdict {
    /// Human-readable status line, distinct for every verdict
    pub fn describe(&self) -> String {
        match self {
            Verdict::Accepted => "Accepted: output matches the expected output".to_string(),
            Verdict::WrongAnswer => {
                "Wrong answer: output does not match the expected output".to_string()
            }
            Verdict::CompilationError(_) => {
                "Compilation error: fix your code and resubmit".to_string()
            }
            Verdict::JudgeFailure(reason) => {
                format!("Your code crashed or the judge failed: {}", reason)
            }
            Verdict::OutputUnavailable(reason) => {
                format!("Could not read the program output: {}", reason)
            }
            Verdict::Pending => "Evaluation still in progress".to_string(),
        }
    }
}

/// Result of evaluating a judge status
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationOutcome {
    pub is_correct: bool,
    pub display_output: String,
    pub verdict: Verdict,
}

impl EvaluationOutcome {
    fn incorrect(verdict: Verdict, display_output: String) -> Self {
        Self {
            is_correct: false,
            display_output,
            verdict,
        }
    }
}

/// Evaluates judge results against expected outputs
pub struct ResultEvaluator {
    judge: Arc<dyn Judge>,
    comparator: Box<dyn OutputComparator>,
}

impl ResultEvaluator {
    /// Creates an evaluator with the exact-trim comparison policy
    pub fn new(judge: Arc<dyn Judge>) -> Self {
        Self::with_comparator(judge, Box::new(ExactTrimComparator))
    }

    /// Creates an evaluator with a custom comparison policy
    pub fn with_comparator(judge: Arc<dyn Judge>, comparator: Box<dyn OutputComparator>) -> Self {
        Self { judge, comparator }
    }

    /// Evaluates `status` against `expected_output`
    pub async fn evaluate(&self, status: &JudgeStatus, expected_output: &str) -> EvaluationOutcome {
        let run = match status {
            JudgeStatus::Completed(run) => run,
            JudgeStatus::Failed(reason) => {
                return EvaluationOutcome::incorrect(
                    Verdict::JudgeFailure(reason.clone()),
                    format!("Error: {}", reason),
                );
            }
            JudgeStatus::Queued | JudgeStatus::Compiling => {
                warn!("Evaluating non-terminal status {}", status.name());
                return EvaluationOutcome::incorrect(
                    Verdict::Pending,
                    format!("Error: evaluation is still {}", status.name()),
                );
            }
        };

        if !run.compiled() {
            return EvaluationOutcome::incorrect(
                Verdict::CompilationError(run.compile_status.clone()),
                format!("Compilation Error:\n{}", run.compile_status),
            );
        }

        let actual = match self.program_output(run).await {
            Ok(actual) => actual,
            Err(reason) => {
                return EvaluationOutcome::incorrect(
                    Verdict::OutputUnavailable(reason.clone()),
                    format!("Error: could not retrieve program output: {}", reason),
                );
            }
        };

        let is_correct = self.comparator.matches(&actual, expected_output);
        debug!(
            "Judge label {}, evaluated {}",
            run.status_label,
            if is_correct { "correct" } else { "incorrect" }
        );

        EvaluationOutcome {
            is_correct,
            display_output: envelope(run, actual).render(),
            verdict: if is_correct {
                Verdict::Accepted
            } else {
                Verdict::WrongAnswer
            },
        }
    }

    /// Renders a status for display without comparing it
    pub async fn render(&self, status: &JudgeStatus) -> String {
        match status {
            JudgeStatus::Completed(run) if run.compiled() => match self.program_output(run).await {
                Ok(actual) => envelope(run, actual).render(),
                Err(reason) => format!("Error: could not retrieve program output: {}", reason),
            },
            JudgeStatus::Completed(run) => format!("Compilation Error:\n{}", run.compile_status),
            JudgeStatus::Failed(reason) => format!("Error: {}", reason),
            JudgeStatus::Queued | JudgeStatus::Compiling => {
                format!("Error: evaluation is still {}", status.name())
            }
        }
    }

    /// Reads the program's stdout from the run result
    async fn program_output(&self, run: &RunResult) -> Result<String, String> {
        match &run.output {
            RunOutput::Text(text) => Ok(text.clone()),
            RunOutput::Empty => Ok(String::new()),
            RunOutput::Uri(uri) => self.judge.fetch_output(uri).await.map_err(|e| {
                warn!("Failed to fetch program output from {}: {}", uri, e);
                e.to_string()
            }),
        }
    }
}

fn envelope(run: &RunResult, program_output: String) -> OutputEnvelope {
    OutputEnvelope {
        status_label: run.status_label.clone(),
        memory_used_kb: run.memory_used_kb,
        time_used_seconds: run.time_used_seconds,
        program_output,
        stderr: run.stderr.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use brainbox_core::domain::judge::{JobHandle, SubmissionRequest};
    use brainbox_judge::JudgeError;

    /// Serves output URIs from a fixed body, or fails
    struct OutputStub {
        body: Option<String>,
    }

    #[async_trait]
    impl Judge for OutputStub {
        async fn submit(&self, _request: &SubmissionRequest) -> brainbox_judge::Result<JobHandle> {
            unreachable!("evaluator never submits")
        }

        async fn status(&self, _handle: &JobHandle) -> brainbox_judge::Result<JudgeStatus> {
            unreachable!("evaluator never polls")
        }

        async fn fetch_output(&self, _uri: &str) -> brainbox_judge::Result<String> {
            self.body
                .clone()
                .ok_or_else(|| JudgeError::api_error(403, "expired link"))
        }
    }

    fn evaluator(body: Option<&str>) -> ResultEvaluator {
        ResultEvaluator::new(Arc::new(OutputStub {
            body: body.map(str::to_string),
        }))
    }

    fn completed(output: RunOutput) -> JudgeStatus {
        JudgeStatus::Completed(RunResult {
            status_label: "AC".to_string(),
            compile_status: "OK".to_string(),
            memory_used_kb: 64.0,
            time_used_seconds: 0.1,
            output,
            stderr: None,
        })
    }

    fn inline(text: &str) -> JudgeStatus {
        completed(RunOutput::Text(text.to_string()))
    }

    #[tokio::test]
    async fn test_outer_whitespace_ignored() {
        let eval = evaluator(None);
        for (actual, expected) in [
            ("hi\n", "hi"),
            ("  hi", "hi  "),
            ("\n\t1 2 3\n\n", "1 2 3"),
            ("a\nb\n", "\na\nb"),
        ] {
            let outcome = eval.evaluate(&inline(actual), expected).await;
            assert!(outcome.is_correct, "{:?} vs {:?}", actual, expected);
            assert_eq!(outcome.verdict, Verdict::Accepted);
        }
    }

    #[tokio::test]
    async fn test_internal_whitespace_significant() {
        let eval = evaluator(None);
        for (actual, expected) in [("a  b", "a b"), ("a\nb", "a b"), ("a\r\nb", "a\nb")] {
            let outcome = eval.evaluate(&inline(actual), expected).await;
            assert!(!outcome.is_correct, "{:?} vs {:?}", actual, expected);
            assert_eq!(outcome.verdict, Verdict::WrongAnswer);
        }
    }

    #[tokio::test]
    async fn test_judge_label_not_trusted() {
        let eval = evaluator(None);
        let status = JudgeStatus::Completed(RunResult {
            status_label: "WA".to_string(),
            compile_status: "OK".to_string(),
            memory_used_kb: 1.0,
            time_used_seconds: 0.0,
            output: RunOutput::Text("42".to_string()),
            stderr: None,
        });
        assert!(eval.evaluate(&status, "42").await.is_correct);
        assert!(!eval.evaluate(&inline("41"), "42").await.is_correct);
    }

    #[tokio::test]
    async fn test_failed_status_is_incorrect_with_reason() {
        let outcome = evaluator(None)
            .evaluate(&JudgeStatus::Failed("Runtime Error".to_string()), "hi")
            .await;
        assert!(!outcome.is_correct);
        assert!(!outcome.display_output.is_empty());
        assert!(outcome.display_output.contains("Runtime Error"));
        assert_eq!(outcome.verdict, Verdict::JudgeFailure("Runtime Error".to_string()));
    }

    #[tokio::test]
    async fn test_failed_status_with_empty_reason_still_displays() {
        let outcome = evaluator(None)
            .evaluate(&JudgeStatus::Failed(String::new()), "")
            .await;
        assert!(!outcome.is_correct);
        assert!(!outcome.display_output.is_empty());
    }

    #[tokio::test]
    async fn test_output_fetched_from_uri() {
        let status = completed(RunOutput::Uri("https://storage/out".to_string()));
        let outcome = evaluator(Some("hi\n")).evaluate(&status, "hi").await;

        assert!(outcome.is_correct);
        let envelope = OutputEnvelope::parse(&outcome.display_output).unwrap();
        assert_eq!(envelope.program_output, "hi\n");
        assert_eq!(envelope.status_label, "AC");
    }

    #[tokio::test]
    async fn test_unreachable_output_is_incorrect() {
        let status = completed(RunOutput::Uri("https://storage/out".to_string()));
        let outcome = evaluator(None).evaluate(&status, "hi").await;

        assert!(!outcome.is_correct);
        assert!(matches!(outcome.verdict, Verdict::OutputUnavailable(_)));
        assert!(outcome.display_output.contains("expired link"));
    }

    #[tokio::test]
    async fn test_compile_error_never_correct() {
        let status = JudgeStatus::Completed(RunResult {
            status_label: "CE".to_string(),
            compile_status: "main.cpp:3: error: expected ';'".to_string(),
            memory_used_kb: 0.0,
            time_used_seconds: 0.0,
            output: RunOutput::Empty,
            stderr: None,
        });
        let outcome = evaluator(None).evaluate(&status, "").await;

        assert!(!outcome.is_correct);
        assert!(matches!(outcome.verdict, Verdict::CompilationError(_)));
        assert!(outcome.display_output.contains("expected ';'"));
    }

    #[tokio::test]
    async fn test_custom_comparator() {
        struct CaseInsensitive;
        impl OutputComparator for CaseInsensitive {
            fn matches(&self, actual: &str, expected: &str) -> bool {
                actual.trim().eq_ignore_ascii_case(expected.trim())
            }
        }

        let eval = ResultEvaluator::with_comparator(
            Arc::new(OutputStub { body: None }),
            Box::new(CaseInsensitive),
        );
        assert!(eval.evaluate(&inline("YES"), "yes").await.is_correct);
    }

    #[test]
    fn test_verdict_descriptions_distinct() {
        let verdicts = [
            Verdict::Accepted,
            Verdict::WrongAnswer,
            Verdict::CompilationError("x".into()),
            Verdict::JudgeFailure("x".into()),
            Verdict::OutputUnavailable("x".into()),
            Verdict::Pending,
        ];
        let descriptions: std::collections::HashSet<String> =
            verdicts.iter().map(Verdict::describe).collect();
        assert_eq!(descriptions.len(), verdicts.len());
    }
}
