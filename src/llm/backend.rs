//! Generative-AI backend abstraction.
//!
//! A backend turns (document, prompt, model) into raw response text. It
//! knows nothing about analysis records; parsing and normalization happen
//! in [`super::extractor`].

use async_trait::async_trait;
use thiserror::Error;

/// Errors from AI backends.
#[derive(Debug, Error)]
pub enum AiError {
    #[error("Backend not configured: {0}")]
    NotConfigured(String),

    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("AI API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Rate limited, retry after {retry_after_secs:?}s")]
    RateLimited { retry_after_secs: Option<u64> },

    #[error("Failed to parse response: {0}")]
    Parse(String),

    #[error("Response contained no text")]
    EmptyResponse,

    #[error("Timed out after {0}s")]
    Timeout(u64),
}

/// Document content handed to a backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AiInput {
    /// Raw bytes for vision-capable models (images, unreadable PDFs).
    Inline { bytes: Vec<u8>, mime_type: String },
    /// Decoded plaintext.
    Text(String),
}

impl AiInput {
    pub fn mode(&self) -> &'static str {
        match self {
            Self::Inline { .. } => "vision",
            Self::Text(_) => "text",
        }
    }
}

/// Raw text generated by a backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AiResponse {
    pub text: String,
    /// Model that actually answered.
    pub model: String,
}

/// A generative-AI service able to analyze documents.
#[async_trait]
pub trait AiBackend: Send + Sync {
    /// Short identifier for logs (e.g. "gemini").
    fn name(&self) -> &str;

    /// Whether the backend has what it needs (credentials) to be called.
    fn is_configured(&self) -> bool;

    async fn generate(
        &self,
        input: &AiInput,
        prompt: &str,
        model: &str,
    ) -> Result<AiResponse, AiError>;
}
