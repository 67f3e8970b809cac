//! Request and response bodies.

use serde::{Deserialize, Serialize};

use crate::models::{AnalysisRecord, Diagnostics};

/// JSON body posted by the upload widgets.
///
/// Everything is optional at the serde level so missing fields surface as
/// a `VALIDATION_ERROR` instead of a generic JSON rejection.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeBody {
    /// Base64 file bytes, optionally as a `data:` URL.
    pub file_content: Option<String>,
    pub file_name: Option<String>,
    pub file_type: Option<String>,
    /// `flash` (default) or `pro`.
    pub model_preference: Option<String>,
    /// `standard` (default) or `detailed`.
    pub analysis_depth: Option<String>,
    #[serde(rename = "business_id", alias = "businessId")]
    pub business_id: Option<String>,
    #[serde(rename = "user_id", alias = "userId")]
    pub user_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub success: bool,
    pub letter_id: Option<String>,
    pub analysis: AnalysisRecord,
    pub debug: Diagnostics,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
    pub error_type: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retryable: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: &'static str,
    pub ai_configured: bool,
}
