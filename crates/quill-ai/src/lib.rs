//! Quill AI crate - text generation service boundary.
//!
//! Provides the TextService trait for prompt-to-response generation, a
//! MockTextService for testing, and a GeminiClient that calls the Gemini
//! REST API. The service is opaque request/response: the caller sends a
//! prompt string and gets back the response text or a descriptive error.

pub mod error;
pub mod gemini;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

pub use error::AiError;
pub use gemini::{GeminiClient, DEFAULT_MODEL};

/// Service that turns a prompt into a response text.
///
/// Implementations own transport and authentication. The trait abstracts
/// over the endpoint so tests can use the mock.
pub trait TextService: Send + Sync {
    /// Generate a response for the given prompt.
    fn generate(
        &self,
        prompt: &str,
    ) -> impl std::future::Future<Output = Result<String, AiError>> + Send;
}

/// Mock text service for testing.
///
/// Returns a canned response or a canned failure, and counts calls.
#[derive(Debug, Clone)]
pub struct MockTextService {
    response: String,
    fail_with: Option<String>,
    calls: Arc<AtomicUsize>,
}

impl MockTextService {
    /// Mock that answers every prompt with a default response.
    pub fn new() -> Self {
        Self {
            response: "Mock response text".to_string(),
            fail_with: None,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Mock with a custom canned response.
    pub fn with_response(text: &str) -> Self {
        Self {
            response: text.to_string(),
            ..Self::new()
        }
    }

    /// Mock that fails every call with the given message.
    pub fn failing(message: &str) -> Self {
        Self {
            fail_with: Some(message.to_string()),
            ..Self::new()
        }
    }

    /// Number of `generate` calls made so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Default for MockTextService {
    fn default() -> Self {
        Self::new()
    }
}

impl TextService for MockTextService {
    async fn generate(&self, _prompt: &str) -> Result<String, AiError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.fail_with {
            Some(message) => Err(AiError::Request(message.clone())),
            None => Ok(self.response.clone()),
        }
    }
}
