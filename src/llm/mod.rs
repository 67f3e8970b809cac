//! Generative-AI document analysis.
//!
//! Supports the Google Gemini API; other providers plug in through
//! [`AiBackend`].

mod backend;
mod config;
mod extractor;
mod gemini;
mod normalize;
mod prompts;
mod retry;

pub use backend::{AiBackend, AiError, AiInput, AiResponse};
pub use config::AiConfig;
pub use extractor::{AiExtraction, AiExtractor, ExtractionParams};
pub use gemini::GeminiBackend;
pub use normalize::{extract_json_object, parse_ai_response};
pub use prompts::build_analysis_prompt;
pub use retry::{backoff_delay, parse_retry_after};
