//! Analysis orchestration.
//!
//! Classifies the upload, tries AI first where it is configured, degrades
//! to the deterministic regex composer where the content allows it, and
//! fails with a typed [`AnalysisError`] only when every tier for the
//! content type is exhausted.
//!
//! | Content | AI configured | AI result | Outcome                                   |
//! |---------|---------------|-----------|-------------------------------------------|
//! | image   | no            |           | `AI_NOT_CONFIGURED`                       |
//! | image   | yes           | ok / fail | `ai-vision` / `AI_ANALYSIS_FAILED`        |
//! | pdf     | no            |           | `regex-pdf` if text recovered, else `AI_NOT_CONFIGURED` |
//! | pdf     | yes           | ok / fail | `ai-pdf` / `regex-pdf` / `AI_ANALYSIS_FAILED` |
//! | text    | any           | ok / fail | `ai-text` / `regex-text`                  |

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::analysis::{compose_analysis, ComposeOptions};
use crate::extract::{decode_text, extract_pdf_text};
use crate::llm::{AiExtraction, AiExtractor, AiInput, ExtractionParams};
use crate::models::{
    AnalysisMethod, AnalysisRecord, AnalysisRequest, Diagnostics, DocumentAnalysis,
    REGEX_MODEL_ID,
};
use crate::repository::{NewAnalyzedLetter, RecordStore};
use crate::utils::{classify_content, effective_mime, ContentKind};

/// Source of the current time.
pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// Default bound on the single persistence insert.
pub const DEFAULT_STORE_TIMEOUT: Duration = Duration::from_secs(10);

/// User-visible failure of an analysis request.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("{0}")]
    Validation(String),

    #[error("{message}")]
    AiNotConfigured {
        message: String,
        hint: Option<String>,
    },

    #[error("{message}")]
    AiAnalysisFailed {
        message: String,
        hint: Option<String>,
        retryable: bool,
    },

    #[error("Internal error: {0}")]
    Internal(String),

    /// The caller went away before the AI call settled.
    #[error("Analysis cancelled")]
    Cancelled,
}

impl AnalysisError {
    pub fn error_type(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::AiNotConfigured { .. } => "AI_NOT_CONFIGURED",
            Self::AiAnalysisFailed { .. } => "AI_ANALYSIS_FAILED",
            Self::Internal(_) => "INTERNAL_ERROR",
            Self::Cancelled => "CANCELLED",
        }
    }

    pub fn status_code(&self) -> u16 {
        match self {
            Self::Validation(_) => 400,
            Self::AiNotConfigured { .. } => 503,
            Self::AiAnalysisFailed { .. } | Self::Internal(_) => 500,
            // Client closed request; never actually written.
            Self::Cancelled => 499,
        }
    }

    pub fn retryable(&self) -> bool {
        matches!(self, Self::AiAnalysisFailed { retryable: true, .. })
    }

    pub fn hint(&self) -> Option<&str> {
        match self {
            Self::AiNotConfigured { hint, .. } | Self::AiAnalysisFailed { hint, .. } => {
                hint.as_deref()
            }
            _ => None,
        }
    }
}

/// Pipeline states, logged as the request moves through them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Received,
    Classifying,
    AiAttempt,
    RegexOnly,
    Composing,
    Persisting,
    Responded,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Received => "received",
            Self::Classifying => "classifying",
            Self::AiAttempt => "ai_attempt",
            Self::RegexOnly => "regex_only",
            Self::Composing => "composing",
            Self::Persisting => "persisting",
            Self::Responded => "responded",
        }
    }
}

/// A finished analysis.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisOutcome {
    /// Row id, when the record was persisted.
    pub letter_id: Option<String>,
    pub record: AnalysisRecord,
}

/// Runs analysis requests end to end.
///
/// Holds only read-only configuration; concurrent requests share nothing.
pub struct Orchestrator {
    ai: Option<AiExtractor>,
    store: Option<Arc<dyn RecordStore>>,
    store_timeout: Duration,
    clock: Clock,
}

impl Orchestrator {
    pub fn new(ai: Option<AiExtractor>, store: Option<Arc<dyn RecordStore>>) -> Self {
        Self {
            ai,
            store,
            store_timeout: DEFAULT_STORE_TIMEOUT,
            clock: Arc::new(Utc::now),
        }
    }

    pub fn with_store_timeout(mut self, timeout: Duration) -> Self {
        self.store_timeout = timeout;
        self
    }

    pub fn with_clock(mut self, clock: impl Fn() -> DateTime<Utc> + Send + Sync + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    /// Whether requests will attempt AI extraction.
    pub fn ai_configured(&self) -> bool {
        self.available_ai().is_some()
    }

    fn available_ai(&self) -> Option<&AiExtractor> {
        self.ai.as_ref().filter(|ai| ai.is_configured())
    }

    /// Analyze one request to completion.
    pub async fn analyze(&self, request: AnalysisRequest) -> Result<AnalysisOutcome, AnalysisError> {
        self.analyze_until(request, std::future::pending()).await
    }

    /// Analyze one request, abandoning it if `cancelled` resolves before the
    /// AI call settles. A cancelled request is never persisted.
    pub async fn analyze_until<C>(
        &self,
        request: AnalysisRequest,
        cancelled: C,
    ) -> Result<AnalysisOutcome, AnalysisError>
    where
        C: Future<Output = ()>,
    {
        let mut cancelled = std::pin::pin!(cancelled);
        let name = request.file_name.clone();
        stage(Stage::Received, &name);
        request.validate().map_err(AnalysisError::Validation)?;

        let now = (self.clock)();
        let today = now.date_naive();

        stage(Stage::Classifying, &name);
        let kind = classify_content(
            &request.declared_mime_type,
            &request.file_name,
            &request.file_bytes,
        );
        let mime = effective_mime(
            &request.declared_mime_type,
            &request.file_name,
            &request.file_bytes,
        );
        let declared = request.declared_mime_type.trim();
        let file_type = if declared.is_empty() {
            mime.clone()
        } else {
            declared.to_string()
        };
        debug!("{}: classified as {} ({})", name, kind, mime);

        let params = ExtractionParams {
            file_name: &request.file_name,
            model: request.model_preference,
            depth: request.analysis_depth,
            today,
        };
        let compose = ComposeOptions {
            today,
            depth: request.analysis_depth,
        };
        let ai_configured = self.ai_configured();

        let (analysis, method, model) = match kind {
            ContentKind::Image => {
                let Some(ai) = self.available_ai() else {
                    return Err(AnalysisError::AiNotConfigured {
                        message: "Image analysis requires AI, which is not configured".to_string(),
                        hint: Some(
                            "Upload the document as text or as a text-based PDF, or set GEMINI_API_KEY"
                                .to_string(),
                        ),
                    });
                };
                let input = AiInput::Inline {
                    bytes: request.file_bytes.clone(),
                    mime_type: mime.clone(),
                };
                match self.attempt_ai(ai, input, params, cancelled.as_mut()).await? {
                    Some(done) => (done.analysis, AnalysisMethod::AiVision, done.model),
                    None => {
                        return Err(AnalysisError::AiAnalysisFailed {
                            message: "AI analysis of the image failed".to_string(),
                            hint: Some(
                                "Try again in a moment, or upload a sharper scan".to_string(),
                            ),
                            retryable: true,
                        })
                    }
                }
            }
            ContentKind::Pdf => {
                let text = extract_pdf_text(&request.file_bytes);
                let readable = !text.is_empty();
                debug!(
                    "{}: PDF text extraction {} ({} chars)",
                    name,
                    if readable { "usable" } else { "unusable" },
                    text.len()
                );

                let ai_result = match self.available_ai() {
                    Some(ai) => {
                        let input = if readable {
                            AiInput::Text(text.clone())
                        } else {
                            AiInput::Inline {
                                bytes: request.file_bytes.clone(),
                                mime_type: "application/pdf".to_string(),
                            }
                        };
                        self.attempt_ai(ai, input, params, cancelled.as_mut()).await?
                    }
                    None => None,
                };

                match ai_result {
                    Some(done) => (done.analysis, AnalysisMethod::AiPdf, done.model),
                    None if readable => {
                        regex_stage(ai_configured, &name);
                        (
                            compose_regex(&text, &compose, &name),
                            AnalysisMethod::RegexPdf,
                            REGEX_MODEL_ID.to_string(),
                        )
                    }
                    None if ai_configured => {
                        return Err(AnalysisError::AiAnalysisFailed {
                            message: "AI analysis of the PDF failed and no readable text could be extracted"
                                .to_string(),
                            hint: Some(
                                "Convert the PDF to an image (PNG or JPEG) and upload it again"
                                    .to_string(),
                            ),
                            retryable: true,
                        })
                    }
                    None => {
                        return Err(AnalysisError::AiNotConfigured {
                            message: "No readable text could be extracted from the PDF and AI analysis is not configured"
                                .to_string(),
                            hint: Some(
                                "Upload a text-based PDF or plain text, or set GEMINI_API_KEY to enable AI vision analysis"
                                    .to_string(),
                            ),
                        })
                    }
                }
            }
            ContentKind::Text => {
                let text = decode_text(&request.file_bytes);
                let ai_result = match self.available_ai() {
                    Some(ai) => {
                        self.attempt_ai(ai, AiInput::Text(text.clone()), params, cancelled.as_mut())
                            .await?
                    }
                    None => None,
                };
                match ai_result {
                    Some(done) => (done.analysis, AnalysisMethod::AiText, done.model),
                    None => {
                        regex_stage(ai_configured, &name);
                        (
                            compose_regex(&text, &compose, &name),
                            AnalysisMethod::RegexText,
                            REGEX_MODEL_ID.to_string(),
                        )
                    }
                }
            }
        };

        let record = AnalysisRecord::new(
            analysis,
            Diagnostics {
                analysis_method: method,
                model_used: model,
                has_ai_configured: ai_configured,
                file_type,
                timestamp: now,
            },
        );

        let letter_id = self.persist(&request, &record).await;

        stage(Stage::Responded, &name);
        info!(
            "Analyzed {} via {} ({}), urgency {}",
            name, method, record.diagnostics.model_used, record.analysis.urgency_level
        );
        Ok(AnalysisOutcome { letter_id, record })
    }

    async fn attempt_ai<C>(
        &self,
        ai: &AiExtractor,
        input: AiInput,
        params: ExtractionParams<'_>,
        cancelled: Pin<&mut C>,
    ) -> Result<Option<AiExtraction>, AnalysisError>
    where
        C: Future<Output = ()>,
    {
        stage(Stage::AiAttempt, params.file_name);
        debug!("{}: AI {} mode", params.file_name, input.mode());
        tokio::select! {
            biased;
            _ = cancelled => {
                debug!("{}: cancelled during AI analysis", params.file_name);
                Err(AnalysisError::Cancelled)
            }
            result = ai.extract(input, params) => Ok(result),
        }
    }

    /// Insert the record; failures are logged and reported as no id.
    async fn persist(&self, request: &AnalysisRequest, record: &AnalysisRecord) -> Option<String> {
        let store = self.store.as_ref()?;
        stage(Stage::Persisting, &request.file_name);

        let letter = NewAnalyzedLetter::new(
            record.clone(),
            &request.file_bytes,
            &request.file_name,
            request.business_id.clone(),
            request.requester_id.clone(),
        );

        match tokio::time::timeout(self.store_timeout, store.insert(&letter)).await {
            Ok(Ok(id)) => Some(id),
            Ok(Err(e)) => {
                warn!(
                    "Failed to persist analysis of {} to {}: {}",
                    request.file_name,
                    store.name(),
                    e
                );
                None
            }
            Err(_) => {
                warn!(
                    "Persisting analysis of {} to {} timed out after {:?}",
                    request.file_name,
                    store.name(),
                    self.store_timeout
                );
                None
            }
        }
    }
}

fn stage(stage: Stage, file_name: &str) {
    debug!("{}: -> {}", file_name, stage.as_str());
}

fn regex_stage(ai_configured: bool, file_name: &str) {
    if ai_configured {
        warn!("{}: AI unavailable, falling back to regex analysis", file_name);
    }
    stage(Stage::RegexOnly, file_name);
}

fn compose_regex(text: &str, options: &ComposeOptions, file_name: &str) -> DocumentAnalysis {
    stage(Stage::Composing, file_name);
    compose_analysis(text, options)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_taxonomy() {
        let err = AnalysisError::Validation("fileName is required".into());
        assert_eq!((err.error_type(), err.status_code()), ("VALIDATION_ERROR", 400));

        let err = AnalysisError::AiNotConfigured {
            message: "m".into(),
            hint: Some("h".into()),
        };
        assert_eq!((err.error_type(), err.status_code()), ("AI_NOT_CONFIGURED", 503));
        assert!(!err.retryable());
        assert_eq!(err.hint(), Some("h"));

        let err = AnalysisError::AiAnalysisFailed {
            message: "m".into(),
            hint: None,
            retryable: true,
        };
        assert_eq!((err.error_type(), err.status_code()), ("AI_ANALYSIS_FAILED", 500));
        assert!(err.retryable());

        let err = AnalysisError::Internal("boom".into());
        assert_eq!((err.error_type(), err.status_code()), ("INTERNAL_ERROR", 500));
    }

    #[tokio::test]
    async fn test_validation_runs_first() {
        let orchestrator = Orchestrator::new(None, None);
        let err = orchestrator
            .analyze(AnalysisRequest::new(Vec::new(), "a.txt", "text/plain"))
            .await
            .unwrap_err();
        assert!(matches!(err, AnalysisError::Validation(_)));
    }

    #[tokio::test]
    async fn test_text_without_ai_uses_regex() {
        let orchestrator = Orchestrator::new(None, None);
        let outcome = orchestrator
            .analyze(AnalysisRequest::new(
                b"Plaintiff: John Smith demands $5,000.".to_vec(),
                "letter.txt",
                "text/plain",
            ))
            .await
            .unwrap();

        assert_eq!(outcome.letter_id, None);
        let diagnostics = &outcome.record.diagnostics;
        assert_eq!(diagnostics.analysis_method, AnalysisMethod::RegexText);
        assert_eq!(diagnostics.model_used, REGEX_MODEL_ID);
        assert!(!diagnostics.has_ai_configured);
        assert_eq!(diagnostics.file_type, "text/plain");
    }
}
