//! AI extraction configuration.

use serde::{Deserialize, Serialize};

use crate::models::ModelPreference;

/// Configuration for the generative-AI extraction backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiConfig {
    /// Whether AI extraction is enabled at all
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// API key; AI counts as configured only when this is non-empty
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// API base URL
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// Model used for the "flash" preference
    #[serde(default = "default_fast_model")]
    pub fast_model: String,
    /// Model used for the "pro" preference
    #[serde(default = "default_thorough_model")]
    pub thorough_model: String,
    /// Temperature for generation (0.0 - 1.0)
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Maximum tokens in response
    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,
    /// Maximum bytes of decoded text sent in text mode
    #[serde(default = "default_max_content_chars")]
    pub max_content_chars: usize,
    /// Upper bound on one AI call, retries included
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Retries on HTTP 429
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Base delay for exponential backoff
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
}

fn default_enabled() -> bool {
    true
}

fn default_endpoint() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

fn default_fast_model() -> String {
    "gemini-1.5-flash".to_string()
}

fn default_thorough_model() -> String {
    "gemini-1.5-pro".to_string()
}

fn default_temperature() -> f32 {
    0.1
}

fn default_max_output_tokens() -> u32 {
    8192
}

fn default_max_content_chars() -> usize {
    30_000
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_delay_ms() -> u64 {
    1000
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            api_key: None,
            endpoint: default_endpoint(),
            fast_model: default_fast_model(),
            thorough_model: default_thorough_model(),
            temperature: default_temperature(),
            max_output_tokens: default_max_output_tokens(),
            max_content_chars: default_max_content_chars(),
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
            retry_delay_ms: default_retry_delay_ms(),
        }
    }
}

impl AiConfig {
    /// Apply environment variable overrides.
    ///
    /// Supported env vars:
    /// - `AI_ENABLED`: "true" or "false"
    /// - `AI_API_KEY`: API key (wins over `GEMINI_API_KEY`)
    /// - `GEMINI_API_KEY`: API key when no explicit one is set
    /// - `AI_ENDPOINT`: API base URL
    /// - `AI_FAST_MODEL` / `AI_THOROUGH_MODEL`: model names per preference
    /// - `AI_TIMEOUT_SECS`: per-call timeout
    /// - `AI_MAX_RETRIES`: retries on rate limiting
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(val) = std::env::var("AI_ENABLED") {
            self.enabled = val.eq_ignore_ascii_case("true") || val == "1";
        }

        if let Ok(val) = std::env::var("AI_API_KEY") {
            self.api_key = Some(val);
        } else if self.api_key.is_none() {
            self.api_key = std::env::var("GEMINI_API_KEY").ok();
        }

        if let Ok(val) = std::env::var("AI_ENDPOINT") {
            self.endpoint = val;
        }
        if let Ok(val) = std::env::var("AI_FAST_MODEL") {
            self.fast_model = val;
        }
        if let Ok(val) = std::env::var("AI_THOROUGH_MODEL") {
            self.thorough_model = val;
        }
        if let Ok(val) = std::env::var("AI_TIMEOUT_SECS") {
            if let Ok(n) = val.parse() {
                self.timeout_secs = n;
            }
        }
        if let Ok(val) = std::env::var("AI_MAX_RETRIES") {
            if let Ok(n) = val.parse() {
                self.max_retries = n;
            }
        }
        self
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_endpoint(mut self, endpoint: &str) -> Self {
        self.endpoint = endpoint.to_string();
        self
    }

    /// Whether AI extraction may be attempted.
    pub fn is_configured(&self) -> bool {
        self.enabled
            && self
                .api_key
                .as_deref()
                .is_some_and(|k| !k.trim().is_empty())
    }

    /// Concrete model name for a caller preference.
    pub fn model_for(&self, preference: ModelPreference) -> &str {
        match preference {
            ModelPreference::Fast => &self.fast_model,
            ModelPreference::Thorough => &self.thorough_model,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configured_requires_enabled_and_key() {
        let config = AiConfig::default();
        assert!(!config.is_configured());

        let config = AiConfig::default().with_api_key("key");
        assert!(config.is_configured());

        let config = AiConfig::default().with_api_key("   ");
        assert!(!config.is_configured());

        let mut config = AiConfig::default().with_api_key("key");
        config.enabled = false;
        assert!(!config.is_configured());
    }

    #[test]
    fn test_model_for_preference() {
        let config = AiConfig::default();
        assert_eq!(config.model_for(ModelPreference::Fast), "gemini-1.5-flash");
        assert_eq!(config.model_for(ModelPreference::Thorough), "gemini-1.5-pro");
    }

    #[test]
    fn test_toml_defaults_fill_missing_keys() {
        let config: AiConfig = toml::from_str("fast_model = \"gemini-2.0-flash\"").unwrap();
        assert_eq!(config.fast_model, "gemini-2.0-flash");
        assert_eq!(config.timeout_secs, 60);
        assert!(config.enabled);
    }
}
