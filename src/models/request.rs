//! Per-call analysis request models.

use serde::{Deserialize, Serialize};

/// Which model tier the caller asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelPreference {
    /// Cheap, low-latency tier ("flash" on the wire).
    #[default]
    Fast,
    /// Slower, higher-quality tier ("pro" on the wire).
    Thorough,
}

impl ModelPreference {
    /// Wire name used by the upload widgets.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fast => "flash",
            Self::Thorough => "pro",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "flash" | "fast" => Some(Self::Fast),
            "pro" | "thorough" => Some(Self::Thorough),
            _ => None,
        }
    }
}

/// How much analysis the caller asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisDepth {
    #[default]
    Standard,
    Detailed,
}

impl AnalysisDepth {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::Detailed => "detailed",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "standard" => Some(Self::Standard),
            "detailed" => Some(Self::Detailed),
            _ => None,
        }
    }
}

/// A single uploaded document to analyze.
///
/// The bytes are already base64-decoded; transport encoding is the HTTP
/// layer's concern.
#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    pub file_bytes: Vec<u8>,
    pub file_name: String,
    pub declared_mime_type: String,
    pub model_preference: ModelPreference,
    pub analysis_depth: AnalysisDepth,
    pub requester_id: Option<String>,
    pub business_id: Option<String>,
}

impl AnalysisRequest {
    pub fn new(
        file_bytes: Vec<u8>,
        file_name: impl Into<String>,
        declared_mime_type: impl Into<String>,
    ) -> Self {
        Self {
            file_bytes,
            file_name: file_name.into(),
            declared_mime_type: declared_mime_type.into(),
            model_preference: ModelPreference::default(),
            analysis_depth: AnalysisDepth::default(),
            requester_id: None,
            business_id: None,
        }
    }

    pub fn with_model(mut self, preference: ModelPreference) -> Self {
        self.model_preference = preference;
        self
    }

    pub fn with_depth(mut self, depth: AnalysisDepth) -> Self {
        self.analysis_depth = depth;
        self
    }

    pub fn with_requester(mut self, requester_id: Option<String>) -> Self {
        self.requester_id = requester_id;
        self
    }

    pub fn with_business(mut self, business_id: Option<String>) -> Self {
        self.business_id = business_id;
        self
    }

    /// Check the request invariants: bytes and file name must be non-empty.
    pub fn validate(&self) -> Result<(), String> {
        if self.file_bytes.is_empty() {
            return Err("fileContent is required and must not be empty".to_string());
        }
        if self.file_name.trim().is_empty() {
            return Err("fileName is required".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_preference_wire_names() {
        assert_eq!(ModelPreference::from_str("flash"), Some(ModelPreference::Fast));
        assert_eq!(ModelPreference::from_str("PRO"), Some(ModelPreference::Thorough));
        assert_eq!(ModelPreference::from_str("ultra"), None);
        assert_eq!(ModelPreference::Thorough.as_str(), "pro");
    }

    #[test]
    fn test_validate_rejects_empty_parts() {
        let empty = AnalysisRequest::new(Vec::new(), "a.txt", "text/plain");
        assert!(empty.validate().is_err());

        let unnamed = AnalysisRequest::new(b"hello".to_vec(), "  ", "text/plain");
        assert!(unnamed.validate().is_err());

        let ok = AnalysisRequest::new(b"hello".to_vec(), "a.txt", "text/plain");
        assert!(ok.validate().is_ok());
    }
}
