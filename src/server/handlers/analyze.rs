//! Document analysis endpoint.

use std::any::Any;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use base64::Engine;
use tracing::{debug, error, warn};

use super::super::AppState;
use super::types::{AnalyzeBody, AnalyzeResponse, ErrorResponse};
use crate::models::{AnalysisDepth, AnalysisRequest, ModelPreference};
use crate::services::AnalysisError;

/// Analyze one uploaded document.
///
/// If the connection task drops this future, the in-flight AI call is
/// abandoned and nothing is persisted.
pub async fn analyze_document(
    State(state): State<AppState>,
    body: Result<Json<AnalyzeBody>, JsonRejection>,
) -> Response {
    let Json(body) = match body {
        Ok(body) => body,
        Err(rejection) => {
            debug!("Rejected analyze body: {}", rejection.body_text());
            return error_response(
                rejection.status(),
                &AnalysisError::Validation(format!("Invalid request body: {}", rejection.body_text())),
            );
        }
    };

    let request = match to_request(body) {
        Ok(request) => request,
        Err(e) => return render_error(&e),
    };

    match state.orchestrator.analyze(request).await {
        Ok(outcome) => Json(AnalyzeResponse {
            success: true,
            letter_id: outcome.letter_id,
            debug: outcome.record.diagnostics.clone(),
            analysis: outcome.record,
        })
        .into_response(),
        Err(e) => render_error(&e),
    }
}

/// Validate the wire body and decode the upload.
fn to_request(body: AnalyzeBody) -> Result<AnalysisRequest, AnalysisError> {
    let content = body
        .file_content
        .filter(|c| !c.trim().is_empty())
        .ok_or_else(|| AnalysisError::Validation("fileContent is required".to_string()))?;
    let file_name = body
        .file_name
        .filter(|n| !n.trim().is_empty())
        .ok_or_else(|| AnalysisError::Validation("fileName is required".to_string()))?;

    let bytes = decode_file_content(&content)
        .map_err(|e| AnalysisError::Validation(format!("fileContent is not valid base64: {}", e)))?;

    let model = match body.model_preference.as_deref() {
        None => ModelPreference::default(),
        Some(raw) => ModelPreference::from_str(raw).unwrap_or_else(|| {
            warn!("Unknown modelPreference {:?}, using flash", raw);
            ModelPreference::Fast
        }),
    };
    let depth = match body.analysis_depth.as_deref() {
        None => AnalysisDepth::default(),
        Some(raw) => AnalysisDepth::from_str(raw).unwrap_or_else(|| {
            warn!("Unknown analysisDepth {:?}, using standard", raw);
            AnalysisDepth::Standard
        }),
    };

    Ok(
        AnalysisRequest::new(bytes, file_name, body.file_type.unwrap_or_default())
            .with_model(model)
            .with_depth(depth)
            .with_business(body.business_id)
            .with_requester(body.user_id),
    )
}

/// Decode base64 content, accepting `data:<mime>;base64,` URLs and
/// embedded line breaks.
fn decode_file_content(content: &str) -> Result<Vec<u8>, base64::DecodeError> {
    let payload = match content.strip_prefix("data:") {
        Some(rest) => rest.split_once(',').map(|(_, data)| data).unwrap_or(rest),
        None => content,
    };
    let cleaned: String = payload.chars().filter(|c| !c.is_whitespace()).collect();
    base64::engine::general_purpose::STANDARD.decode(cleaned)
}

/// Turn a panic anywhere below the router into a 500 `INTERNAL_ERROR`.
pub fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let details = if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic payload".to_string()
    };
    error!("Request handler panicked: {}", details);

    render_error(&AnalysisError::Internal(
        "unexpected fault while analyzing the document".to_string(),
    ))
}

fn render_error(err: &AnalysisError) -> Response {
    let status =
        StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    error_response(status, err)
}

fn error_response(status: StatusCode, err: &AnalysisError) -> Response {
    match err {
        AnalysisError::Internal(_) => error!("Analysis failed: {}", err),
        AnalysisError::Cancelled => debug!("Analysis cancelled"),
        _ => debug!("Analysis rejected ({}): {}", err.error_type(), err),
    }

    let body = ErrorResponse {
        success: false,
        error: err.to_string(),
        error_type: err.error_type(),
        retryable: err.retryable().then_some(true),
        hint: err.hint().map(str::to_string),
    };
    (status, Json(body)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_plain_and_data_url() {
        assert_eq!(decode_file_content("aGVsbG8=").unwrap(), b"hello");
        assert_eq!(
            decode_file_content("data:text/plain;base64,aGVs\nbG8=").unwrap(),
            b"hello"
        );
        assert!(decode_file_content("not base64!").is_err());
    }

    #[test]
    fn test_unknown_preferences_fall_back() {
        let body = AnalyzeBody {
            file_content: Some("aGVsbG8=".into()),
            file_name: Some("a.txt".into()),
            model_preference: Some("ultra".into()),
            analysis_depth: Some("DETAILED".into()),
            ..Default::default()
        };
        let request = to_request(body).unwrap();
        assert_eq!(request.model_preference, ModelPreference::Fast);
        assert_eq!(request.analysis_depth, AnalysisDepth::Detailed);
        assert_eq!(request.declared_mime_type, "");
    }

    #[test]
    fn test_missing_name_is_validation_error() {
        let body = AnalyzeBody {
            file_content: Some("aGVsbG8=".into()),
            ..Default::default()
        };
        let err = to_request(body).unwrap_err();
        assert_eq!(err.error_type(), "VALIDATION_ERROR");
        assert_eq!(err.status_code(), 400);
    }
}
