//! Google Gemini backend.
//!
//! Documents go out either as inline base64 data (vision) or as a text part
//! following the prompt. Rate limiting (429) is retried with exponential
//! backoff, respecting the Retry-After header.

use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::backend::{AiBackend, AiError, AiInput, AiResponse};
use super::config::AiConfig;
use super::retry::{parse_retry_after, retry_on_rate_limit};

/// Gemini backend using Google's Generative Language API.
pub struct GeminiBackend {
    config: AiConfig,
    client: Client,
}

#[derive(Debug, Serialize)]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(rename = "generationConfig")]
    generation_config: GeminiGenerationConfig,
}

#[derive(Debug, Serialize)]
struct GeminiContent {
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum GeminiPart {
    Text { text: String },
    InlineData { inline_data: GeminiInlineData },
}

#[derive(Debug, Serialize)]
struct GeminiInlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
struct GeminiGenerationConfig {
    temperature: f32,
    #[serde(rename = "maxOutputTokens")]
    max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    candidates: Option<Vec<GeminiCandidate>>,
    error: Option<GeminiError>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiResponseContent>,
}

#[derive(Debug, Deserialize)]
struct GeminiResponseContent {
    #[serde(default)]
    parts: Vec<GeminiResponsePart>,
}

#[derive(Debug, Deserialize)]
struct GeminiResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiError {
    message: String,
}

impl GeminiBackend {
    pub fn new(config: AiConfig) -> Result<Self, AiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs.max(1)))
            .build()
            .map_err(|e| AiError::Http(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self { config, client })
    }

    fn build_request(&self, input: &AiInput, prompt: &str) -> GeminiRequest {
        let mut parts = vec![GeminiPart::Text {
            text: prompt.to_string(),
        }];
        match input {
            AiInput::Inline { bytes, mime_type } => parts.push(GeminiPart::InlineData {
                inline_data: GeminiInlineData {
                    mime_type: mime_type.clone(),
                    data: base64::engine::general_purpose::STANDARD.encode(bytes),
                },
            }),
            AiInput::Text(text) => parts.push(GeminiPart::Text {
                text: format!("Document content:\n\n{}", text),
            }),
        }

        GeminiRequest {
            contents: vec![GeminiContent { parts }],
            generation_config: GeminiGenerationConfig {
                temperature: self.config.temperature,
                max_output_tokens: self.config.max_output_tokens,
            },
        }
    }

    async fn send_once(
        &self,
        url: &str,
        request: &GeminiRequest,
        model: &str,
    ) -> Result<AiResponse, AiError> {
        let response = self
            .client
            .post(url)
            .json(request)
            .send()
            .await
            .map_err(|e| AiError::Http(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok());
            return Err(AiError::RateLimited {
                retry_after_secs: parse_retry_after(retry_after).map(|d| d.as_secs()),
            });
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AiError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let gemini_response: GeminiResponse = response
            .json()
            .await
            .map_err(|e| AiError::Parse(e.to_string()))?;

        if let Some(error) = gemini_response.error {
            return Err(AiError::Api {
                status: status.as_u16(),
                message: error.message,
            });
        }

        let text: String = gemini_response
            .candidates
            .and_then(|c| c.into_iter().next())
            .and_then(|c| c.content)
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(AiError::EmptyResponse);
        }

        Ok(AiResponse {
            text,
            model: model.to_string(),
        })
    }
}

#[async_trait]
impl AiBackend for GeminiBackend {
    fn name(&self) -> &str {
        "gemini"
    }

    fn is_configured(&self) -> bool {
        self.config.is_configured()
    }

    async fn generate(
        &self,
        input: &AiInput,
        prompt: &str,
        model: &str,
    ) -> Result<AiResponse, AiError> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| {
                AiError::NotConfigured(
                    "GEMINI_API_KEY not set. Get an API key from https://ai.google.dev/"
                        .to_string(),
                )
            })?;

        let url = format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.config.endpoint.trim_end_matches('/'),
            model,
            api_key
        );
        let request = self.build_request(input, prompt);
        debug!("Gemini: {} request to {}", input.mode(), model);

        retry_on_rate_limit(
            self.config.max_retries,
            self.config.retry_delay_ms,
            |_| self.send_once(&url, &request, model),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use axum::extract::State;
    use axum::http::StatusCode as HttpStatus;
    use axum::response::{IntoResponse, Response};
    use axum::{Json, Router};
    use serde_json::{json, Value};

    use super::*;

    #[derive(Clone)]
    struct Stub {
        calls: Arc<AtomicUsize>,
        rate_limit_first: usize,
        reply: Value,
    }

    async fn stub_handler(State(stub): State<Stub>, Json(body): Json<Value>) -> Response {
        let n = stub.calls.fetch_add(1, Ordering::SeqCst);
        if n < stub.rate_limit_first {
            return (HttpStatus::TOO_MANY_REQUESTS, [("retry-after", "0")], "slow down")
                .into_response();
        }
        // The prompt always travels as the first part.
        assert!(body["contents"][0]["parts"][0]["text"].is_string());
        Json(stub.reply.clone()).into_response()
    }

    async fn start_stub(rate_limit_first: usize, reply: Value) -> (String, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let stub = Stub {
            calls: calls.clone(),
            rate_limit_first,
            reply,
        };
        let app = Router::new().fallback(stub_handler).with_state(stub);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (format!("http://{}", addr), calls)
    }

    fn config(endpoint: &str) -> AiConfig {
        let mut config = AiConfig::default()
            .with_api_key("test-key")
            .with_endpoint(endpoint);
        config.retry_delay_ms = 1;
        config.timeout_secs = 5;
        config
    }

    fn text_reply(text: &str) -> Value {
        json!({"candidates": [{"content": {"parts": [{"text": text}]}}]})
    }

    #[tokio::test]
    async fn test_generate_returns_candidate_text() {
        let (endpoint, calls) = start_stub(0, text_reply("{\"documentType\":\"x\"}")).await;
        let backend = GeminiBackend::new(config(&endpoint)).unwrap();

        let response = backend
            .generate(&AiInput::Text("hello".into()), "prompt", "gemini-1.5-flash")
            .await
            .unwrap();

        assert_eq!(response.text, "{\"documentType\":\"x\"}");
        assert_eq!(response.model, "gemini-1.5-flash");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_rate_limit_is_retried() {
        let (endpoint, calls) = start_stub(2, text_reply("ok")).await;
        let backend = GeminiBackend::new(config(&endpoint)).unwrap();

        let input = AiInput::Inline {
            bytes: vec![0x89, b'P', b'N', b'G'],
            mime_type: "image/png".into(),
        };
        let response = backend.generate(&input, "prompt", "m").await.unwrap();

        assert_eq!(response.text, "ok");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_api_error_body_is_reported() {
        let (endpoint, _) =
            start_stub(0, json!({"error": {"message": "API key not valid"}})).await;
        let backend = GeminiBackend::new(config(&endpoint)).unwrap();

        let err = backend
            .generate(&AiInput::Text("x".into()), "prompt", "m")
            .await
            .unwrap_err();
        assert!(matches!(err, AiError::Api { ref message, .. } if message == "API key not valid"));
    }

    #[tokio::test]
    async fn test_missing_key_is_not_configured() {
        let backend = GeminiBackend::new(AiConfig::default()).unwrap();
        assert!(!backend.is_configured());
        let err = backend
            .generate(&AiInput::Text("x".into()), "prompt", "m")
            .await
            .unwrap_err();
        assert!(matches!(err, AiError::NotConfigured(_)));
    }
}
