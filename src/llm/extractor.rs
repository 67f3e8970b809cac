//! AI extraction adapter.
//!
//! Wraps an [`AiBackend`] call with prompt construction, content
//! truncation, a timeout and response normalization. Every failure is
//! logged and collapsed to `None`; callers only ever see "got an analysis"
//! or "AI unavailable".

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use tracing::{debug, info, warn};

use super::backend::{AiBackend, AiError, AiInput};
use super::config::AiConfig;
use super::normalize::{extract_json_object, normalize_payload, AiPayload};
use super::prompts::build_analysis_prompt;
use crate::models::{AnalysisDepth, DocumentAnalysis, ModelPreference};
use crate::utils::truncate_utf8;

/// Per-call parameters for an extraction.
#[derive(Debug, Clone, Copy)]
pub struct ExtractionParams<'a> {
    pub file_name: &'a str,
    pub model: ModelPreference,
    pub depth: AnalysisDepth,
    pub today: NaiveDate,
}

/// A successful AI extraction.
#[derive(Debug, Clone, PartialEq)]
pub struct AiExtraction {
    pub analysis: DocumentAnalysis,
    /// Model that produced the analysis.
    pub model: String,
}

pub struct AiExtractor {
    backend: Arc<dyn AiBackend>,
    config: AiConfig,
}

impl AiExtractor {
    pub fn new(backend: Arc<dyn AiBackend>, config: AiConfig) -> Self {
        Self { backend, config }
    }

    pub fn config(&self) -> &AiConfig {
        &self.config
    }

    /// Whether an extraction may be attempted at all.
    pub fn is_configured(&self) -> bool {
        self.config.is_configured() && self.backend.is_configured()
    }

    /// Run one extraction. `None` means the AI path is unavailable for
    /// this document; the reason has already been logged.
    pub async fn extract(&self, input: AiInput, params: ExtractionParams<'_>) -> Option<AiExtraction> {
        if !self.is_configured() {
            debug!("AI extraction skipped: {} not configured", self.backend.name());
            return None;
        }

        match self.try_extract(input, params).await {
            Ok(extraction) => {
                info!(
                    "AI analysis of {} succeeded with {}",
                    params.file_name, extraction.model
                );
                Some(extraction)
            }
            Err(e) => {
                warn!(
                    "AI analysis of {} via {} failed: {}",
                    params.file_name,
                    self.backend.name(),
                    e
                );
                None
            }
        }
    }

    async fn try_extract(
        &self,
        input: AiInput,
        params: ExtractionParams<'_>,
    ) -> Result<AiExtraction, AiError> {
        let input = match input {
            AiInput::Text(text) => {
                let truncated = truncate_utf8(&text, self.config.max_content_chars);
                if truncated.len() < text.len() {
                    debug!(
                        "Truncated {} from {} to {} bytes for AI",
                        params.file_name,
                        text.len(),
                        truncated.len()
                    );
                }
                AiInput::Text(truncated.to_string())
            }
            inline => inline,
        };

        let prompt = build_analysis_prompt(params.file_name, params.depth, params.today);
        let model = self.config.model_for(params.model);
        let timeout_secs = self.config.timeout_secs;

        let response = tokio::time::timeout(
            Duration::from_secs(timeout_secs),
            self.backend.generate(&input, &prompt, model),
        )
        .await
        .map_err(|_| AiError::Timeout(timeout_secs))??;

        let json = extract_json_object(&response.text)
            .ok_or_else(|| AiError::Parse("no JSON object in response".to_string()))?;
        let payload: AiPayload =
            serde_json::from_str(json).map_err(|e| AiError::Parse(e.to_string()))?;
        let analysis = normalize_payload(payload).ok_or_else(|| {
            AiError::Parse("response is missing documentType or documentSummary".to_string())
        })?;

        Ok(AiExtraction {
            analysis,
            model: response.model,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::llm::backend::AiResponse;

    struct Scripted {
        reply: Result<String, ()>,
        seen: Mutex<Vec<(AiInput, String)>>,
    }

    #[async_trait]
    impl AiBackend for Scripted {
        fn name(&self) -> &str {
            "scripted"
        }

        fn is_configured(&self) -> bool {
            true
        }

        async fn generate(
            &self,
            input: &AiInput,
            _prompt: &str,
            model: &str,
        ) -> Result<AiResponse, AiError> {
            self.seen
                .lock()
                .unwrap()
                .push((input.clone(), model.to_string()));
            match &self.reply {
                Ok(text) => Ok(AiResponse {
                    text: text.clone(),
                    model: model.to_string(),
                }),
                Err(()) => Err(AiError::Http("connection refused".into())),
            }
        }
    }

    fn params() -> ExtractionParams<'static> {
        ExtractionParams {
            file_name: "letter.txt",
            model: ModelPreference::Thorough,
            depth: AnalysisDepth::Standard,
            today: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
        }
    }

    fn extractor(reply: Result<String, ()>, config: AiConfig) -> (AiExtractor, Arc<Scripted>) {
        let backend = Arc::new(Scripted {
            reply,
            seen: Mutex::new(Vec::new()),
        });
        (AiExtractor::new(backend.clone(), config), backend)
    }

    #[tokio::test]
    async fn test_success_uses_preferred_model() {
        let (ex, backend) = extractor(
            Ok("```json\n{\"documentType\": \"Demand Letter\", \"documentSummary\": \"Pay.\"}\n```".into()),
            AiConfig::default().with_api_key("k"),
        );

        let result = ex.extract(AiInput::Text("hi".into()), params()).await.unwrap();
        assert_eq!(result.model, "gemini-1.5-pro");
        assert_eq!(result.analysis.document_type, "Demand Letter");
        assert_eq!(backend.seen.lock().unwrap()[0].1, "gemini-1.5-pro");
    }

    #[tokio::test]
    async fn test_failures_become_none() {
        let config = AiConfig::default().with_api_key("k");

        let (ex, _) = extractor(Err(()), config.clone());
        assert!(ex.extract(AiInput::Text("hi".into()), params()).await.is_none());

        let (ex, _) = extractor(Ok("no json at all".into()), config.clone());
        assert!(ex.extract(AiInput::Text("hi".into()), params()).await.is_none());

        let (ex, _) = extractor(Ok("{\"documentType\": 5}".into()), config);
        assert!(ex.extract(AiInput::Text("hi".into()), params()).await.is_none());
    }

    #[tokio::test]
    async fn test_unconfigured_never_calls_backend() {
        let (ex, backend) = extractor(Ok("{}".into()), AiConfig::default());
        assert!(!ex.is_configured());
        assert!(ex.extract(AiInput::Text("hi".into()), params()).await.is_none());
        assert!(backend.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_text_is_truncated() {
        let mut config = AiConfig::default().with_api_key("k");
        config.max_content_chars = 5;
        let (ex, backend) = extractor(Err(()), config);

        ex.extract(AiInput::Text("abcdefghij".into()), params()).await;
        assert_eq!(
            backend.seen.lock().unwrap()[0].0,
            AiInput::Text("abcde".into())
        );
    }
}
