//! Judge domain types
//!
//! Requests sent to the remote judge and the statuses it reports back.

use serde::{Deserialize, Serialize};

use crate::domain::language::Language;

/// Default CPU time limit per run, in seconds
pub const DEFAULT_TIME_LIMIT_SECONDS: u32 = 5;

/// Default memory limit per run, in kilobytes (256 MiB)
pub const DEFAULT_MEMORY_LIMIT_KB: u32 = 262_144;

/// A request to compile and run source code on the judge
///
/// Immutable once sent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionRequest {
    pub language: Language,
    pub source_code: String,
    pub stdin: String,
    pub time_limit_seconds: u32,
    pub memory_limit_kb: u32,
}

impl SubmissionRequest {
    /// Creates a request with the default resource limits
    pub fn new(
        language: Language,
        source_code: impl Into<String>,
        stdin: impl Into<String>,
    ) -> Self {
        Self {
            language,
            source_code: source_code.into(),
            stdin: stdin.into(),
            time_limit_seconds: DEFAULT_TIME_LIMIT_SECONDS,
            memory_limit_kb: DEFAULT_MEMORY_LIMIT_KB,
        }
    }

    /// Overrides the resource limits
    pub fn with_limits(mut self, time_limit_seconds: u32, memory_limit_kb: u32) -> Self {
        self.time_limit_seconds = time_limit_seconds;
        self.memory_limit_kb = memory_limit_kb;
        self
    }
}

/// Opaque reference to an in-flight judge execution
///
/// Produced by the judge client, consumed only by the poller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobHandle {
    pub status_url: String,
}

impl JobHandle {
    pub fn new(status_url: impl Into<String>) -> Self {
        Self {
            status_url: status_url.into(),
        }
    }
}

/// Status of a judge execution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum JudgeStatus {
    Queued,
    Compiling,
    Completed(RunResult),
    /// Infrastructure failure reported by the judge, unrelated to correctness
    Failed(String),
}

impl JudgeStatus {
    /// Whether polling can stop at this status
    pub fn is_terminal(&self) -> bool {
        matches!(self, JudgeStatus::Completed(_) | JudgeStatus::Failed(_))
    }

    /// Short name for logging
    pub fn name(&self) -> &'static str {
        match self {
            JudgeStatus::Queued => "queued",
            JudgeStatus::Compiling => "compiling",
            JudgeStatus::Completed(_) => "completed",
            JudgeStatus::Failed(_) => "failed",
        }
    }
}

/// Compile status the judge reports for a successful compilation
pub const COMPILE_STATUS_OK: &str = "OK";

/// Result of a completed run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunResult {
    /// Judge's own label, e.g. "AC", "WA", "TLE", "RE"
    pub status_label: String,
    /// "OK", or the compiler's message when compilation failed
    pub compile_status: String,
    pub memory_used_kb: f64,
    pub time_used_seconds: f64,
    pub output: RunOutput,
    pub stderr: Option<String>,
}

impl RunResult {
    /// Whether the program compiled
    pub fn compiled(&self) -> bool {
        self.compile_status.trim().eq_ignore_ascii_case(COMPILE_STATUS_OK)
    }
}

/// Where a run's stdout can be found
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunOutput {
    /// Output returned inline in the status response
    Text(String),
    /// Output stored remotely, fetched separately
    Uri(String),
    /// The run produced no output reference
    Empty,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_result(compile_status: &str) -> RunResult {
        RunResult {
            status_label: "AC".to_string(),
            compile_status: compile_status.to_string(),
            memory_used_kb: 64.0,
            time_used_seconds: 0.1,
            output: RunOutput::Empty,
            stderr: None,
        }
    }

    #[test]
    fn test_terminal_statuses() {
        assert!(!JudgeStatus::Queued.is_terminal());
        assert!(!JudgeStatus::Compiling.is_terminal());
        assert!(JudgeStatus::Failed("boom".to_string()).is_terminal());
        assert!(JudgeStatus::Completed(run_result("OK")).is_terminal());
    }

    #[test]
    fn test_compiled() {
        assert!(run_result("OK").compiled());
        assert!(run_result(" ok\n").compiled());
        assert!(!run_result("main.cpp:1: error: expected ';'").compiled());
    }

    #[test]
    fn test_request_defaults() {
        let req = SubmissionRequest::new(Language::Python3, "print(1)", "");
        assert_eq!(req.time_limit_seconds, DEFAULT_TIME_LIMIT_SECONDS);
        assert_eq!(req.memory_limit_kb, DEFAULT_MEMORY_LIMIT_KB);

        let req = req.with_limits(2, 1024);
        assert_eq!(req.time_limit_seconds, 2);
        assert_eq!(req.memory_limit_kb, 1024);
    }
}
