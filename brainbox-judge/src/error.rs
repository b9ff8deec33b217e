//! Error types for the judge client

use thiserror::Error;

/// Result type alias for judge operations
pub type Result<T> = std::result::Result<T, JudgeError>;

/// Errors that can occur when talking to the judge
#[derive(Debug, Error)]
pub enum JudgeError {
    /// Required credentials are missing; raised before any network call
    #[error("Judge is not configured: {0}")]
    Configuration(String),

    /// The HTTP request could not be completed
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// The judge answered with an error status code
    #[error("Judge API error (status {status}): {message}")]
    ApiError {
        /// HTTP status code
        status: u16,
        /// Error message from the API
        message: String,
    },

    /// The judge answered, but not with the documented shape
    #[error("Invalid judge response: {0}")]
    InvalidResponse(String),
}

impl JudgeError {
    /// Create an API error from status code and message
    pub fn api_error(status: u16, message: impl Into<String>) -> Self {
        Self::ApiError {
            status,
            message: message.into(),
        }
    }

    /// Check if this error is a transport failure (network or HTTP status)
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::RequestFailed(_) | Self::ApiError { .. })
    }

    /// Check if this error is a configuration error
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }

    /// Check if this error is a malformed-response error
    pub fn is_invalid_response(&self) -> bool {
        matches!(self, Self::InvalidResponse(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_classification() {
        assert!(JudgeError::api_error(502, "bad gateway").is_transport());
        assert!(JudgeError::Configuration("no secret".into()).is_configuration());
        assert!(JudgeError::InvalidResponse("no url".into()).is_invalid_response());
        assert!(!JudgeError::InvalidResponse("no url".into()).is_transport());
    }

    #[test]
    fn test_api_error_message() {
        let err = JudgeError::api_error(401, "invalid client secret");
        assert_eq!(
            err.to_string(),
            "Judge API error (status 401): invalid client secret"
        );
    }
}
