//! Judge wire format
//!
//! Request and response bodies of the HackerEarth v4 code-evaluation API
//! and their mapping onto the domain types.

use brainbox_core::domain::judge::{JudgeStatus, RunOutput, RunResult, SubmissionRequest};
use serde::{Deserialize, Deserializer, Serialize};
use tracing::warn;

use crate::error::{JudgeError, Result};

/// Body of a submission request
#[derive(Debug, Serialize)]
pub(crate) struct SubmitPayload<'a> {
    lang: &'a str,
    source: &'a str,
    input: &'a str,
    time_limit: u32,
    memory_limit: u32,
}

impl<'a> From<&'a SubmissionRequest> for SubmitPayload<'a> {
    fn from(req: &'a SubmissionRequest) -> Self {
        Self {
            lang: req.language.code(),
            source: &req.source_code,
            input: &req.stdin,
            time_limit: req.time_limit_seconds,
            memory_limit: req.memory_limit_kb,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct RequestStatus {
    pub code: String,
    #[serde(default)]
    pub message: Option<String>,
}

/// Response to a submission request
#[derive(Debug, Deserialize)]
pub(crate) struct SubmitResponse {
    #[serde(default)]
    pub he_id: Option<String>,
    #[serde(default)]
    pub status_update_url: Option<String>,
    #[serde(default)]
    pub request_status: Option<RequestStatus>,
}

impl SubmitResponse {
    /// Extracts the status-polling URL
    pub fn status_url(self) -> Result<String> {
        match self.status_update_url {
            Some(url) if !url.trim().is_empty() => Ok(url),
            _ => {
                let detail = self
                    .request_status
                    .map(|s| format!(" (request status {})", s.code))
                    .unwrap_or_default();
                Err(JudgeError::InvalidResponse(format!(
                    "submission response has no status_update_url{}",
                    detail
                )))
            }
        }
    }
}

/// Response of the status-polling URL
#[derive(Debug, Deserialize)]
pub(crate) struct StatusResponse {
    pub request_status: RequestStatus,
    #[serde(default)]
    pub result: Option<ResultBlock>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ResultBlock {
    #[serde(default)]
    pub compile_status: Option<String>,
    #[serde(default)]
    pub run_status: Option<RunStatus>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RunStatus {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub time_used: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub memory_used: f64,
    #[serde(default)]
    pub output: Option<String>,
    #[serde(default)]
    pub stderr: Option<String>,
}

impl StatusResponse {
    /// Maps the judge's status code onto a `JudgeStatus`
    pub fn into_status(self) -> Result<JudgeStatus> {
        match self.request_status.code.as_str() {
            "REQUEST_QUEUED" | "REQUEST_INITIATED" => Ok(JudgeStatus::Queued),
            "CODE_COMPILED" => Ok(JudgeStatus::Compiling),
            "REQUEST_COMPLETED" => {
                let result = self.result.ok_or_else(|| {
                    JudgeError::InvalidResponse("completed status has no result".to_string())
                })?;
                let run = result.run_status.ok_or_else(|| {
                    JudgeError::InvalidResponse("completed status has no run_status".to_string())
                })?;

                Ok(JudgeStatus::Completed(RunResult {
                    status_label: run.status.unwrap_or_default(),
                    compile_status: result.compile_status.unwrap_or_else(|| "OK".to_string()),
                    memory_used_kb: run.memory_used,
                    time_used_seconds: run.time_used,
                    output: classify_output(run.output),
                    stderr: run.stderr.filter(|s| !s.trim().is_empty()),
                }))
            }
            "REQUEST_FAILED" => {
                let reason = self
                    .request_status
                    .message
                    .filter(|m| !m.is_empty())
                    .or(self.message)
                    .unwrap_or_else(|| "Unknown error".to_string());
                Ok(JudgeStatus::Failed(reason))
            }
            other => {
                warn!("Unknown judge status code '{}', treating as queued", other);
                Ok(JudgeStatus::Queued)
            }
        }
    }
}

fn classify_output(output: Option<String>) -> RunOutput {
    match output {
        Some(out) if out.starts_with("http://") || out.starts_with("https://") => {
            RunOutput::Uri(out)
        }
        Some(out) if !out.is_empty() => RunOutput::Text(out),
        _ => RunOutput::Empty,
    }
}

/// Accepts a number, a numeric string, or null
fn lenient_f64<'de, D>(deserializer: D) -> std::result::Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::Number(n) => n.as_f64().unwrap_or_default(),
        serde_json::Value::String(s) => s.trim().parse().unwrap_or_default(),
        _ => 0.0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use brainbox_core::domain::language::Language;
    use serde_json::json;

    fn status(value: serde_json::Value) -> Result<JudgeStatus> {
        serde_json::from_value::<StatusResponse>(value)
            .unwrap()
            .into_status()
    }

    #[test]
    fn test_payload_fields() {
        let req = SubmissionRequest::new(Language::Python3, "print('hi')", "");
        let body = serde_json::to_value(SubmitPayload::from(&req)).unwrap();
        assert_eq!(
            body,
            json!({
                "lang": "PYTHON3",
                "source": "print('hi')",
                "input": "",
                "time_limit": 5,
                "memory_limit": 262144,
            })
        );
    }

    #[test]
    fn test_submit_response_url() {
        let resp: SubmitResponse = serde_json::from_value(json!({
            "he_id": "abc",
            "status_update_url": "https://judge/status/abc",
            "request_status": {"code": "REQUEST_QUEUED", "message": "queued"}
        }))
        .unwrap();
        assert_eq!(resp.status_url().unwrap(), "https://judge/status/abc");
    }

    #[test]
    fn test_submit_response_missing_url() {
        let resp: SubmitResponse = serde_json::from_value(json!({
            "request_status": {"code": "REQUEST_QUEUED"}
        }))
        .unwrap();
        let err = resp.status_url().unwrap_err();
        assert!(err.is_invalid_response());
        assert!(err.to_string().contains("REQUEST_QUEUED"));
    }

    #[test]
    fn test_non_terminal_codes() {
        for code in ["REQUEST_QUEUED", "REQUEST_INITIATED", "SOMETHING_NEW"] {
            let s = status(json!({"request_status": {"code": code}})).unwrap();
            assert_eq!(s, JudgeStatus::Queued);
        }
        let s = status(json!({"request_status": {"code": "CODE_COMPILED"}})).unwrap();
        assert_eq!(s, JudgeStatus::Compiling);
    }

    #[test]
    fn test_completed_with_output_uri() {
        let s = status(json!({
            "request_status": {"code": "REQUEST_COMPLETED"},
            "result": {
                "compile_status": "OK",
                "run_status": {
                    "status": "AC",
                    "time_used": "0.12",
                    "memory_used": 64,
                    "output": "https://storage/out.txt",
                    "stderr": ""
                }
            }
        }))
        .unwrap();

        match s {
            JudgeStatus::Completed(run) => {
                assert_eq!(run.status_label, "AC");
                assert_eq!(run.time_used_seconds, 0.12);
                assert_eq!(run.memory_used_kb, 64.0);
                assert_eq!(run.output, RunOutput::Uri("https://storage/out.txt".to_string()));
                assert_eq!(run.stderr, None);
                assert!(run.compiled());
            }
            other => panic!("expected completed, got {:?}", other),
        }
    }

    #[test]
    fn test_completed_without_run_status_is_invalid() {
        let err = status(json!({
            "request_status": {"code": "REQUEST_COMPLETED"},
            "result": {"compile_status": "OK"}
        }))
        .unwrap_err();
        assert!(err.is_invalid_response());
    }

    #[test]
    fn test_failed_reason() {
        let s = status(json!({
            "request_status": {"code": "REQUEST_FAILED", "message": "Runtime Error"}
        }))
        .unwrap();
        assert_eq!(s, JudgeStatus::Failed("Runtime Error".to_string()));

        let s = status(json!({
            "request_status": {"code": "REQUEST_FAILED"},
            "message": "Sandbox unavailable"
        }))
        .unwrap();
        assert_eq!(s, JudgeStatus::Failed("Sandbox unavailable".to_string()));
    }
}
