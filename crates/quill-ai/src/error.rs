//! Error types for the AI text service boundary.

use quill_core::QuillError;

/// Errors from the AI text service.
///
/// Callers surface the message verbatim; no retry policy is attached.
#[derive(Debug, thiserror::Error)]
pub enum AiError {
    #[error("API key not set: export {0}")]
    MissingApiKey(String),
    #[error("request failed: {0}")]
    Request(String),
    #[error("service returned HTTP {status}: {message}")]
    Api { status: u16, message: String },
    #[error("response contained no text")]
    EmptyResponse,
    #[error("failed to parse response: {0}")]
    Parse(String),
}

impl From<AiError> for QuillError {
    fn from(err: AiError) -> Self {
        QuillError::Ai(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ai_error_display() {
        let err = AiError::MissingApiKey("GEMINI_API_KEY".to_string());
        assert_eq!(err.to_string(), "API key not set: export GEMINI_API_KEY");

        let err = AiError::Api {
            status: 429,
            message: "RESOURCE_EXHAUSTED: quota exceeded".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "service returned HTTP 429: RESOURCE_EXHAUSTED: quota exceeded"
        );

        let err = AiError::EmptyResponse;
        assert_eq!(err.to_string(), "response contained no text");
    }

    #[test]
    fn test_ai_error_converts_to_core_error() {
        let err: QuillError = AiError::Request("connection refused".to_string()).into();
        assert!(matches!(err, QuillError::Ai(_)));
        assert!(err.to_string().contains("connection refused"));
    }
}
