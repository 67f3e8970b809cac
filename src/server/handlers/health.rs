//! Health check endpoint.

use axum::{extract::State, Json};

use super::super::AppState;
use super::types::HealthResponse;

/// Health check endpoint for container orchestration.
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        ai_configured: state.orchestrator.ai_configured(),
    })
}
