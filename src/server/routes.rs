//! Router configuration for the web server.

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;

use super::handlers;
use super::AppState;

/// Create the main router with all routes.
pub fn create_router(state: AppState) -> Router {
    let body_limit = state.max_body_bytes;

    Router::new()
        .route("/health", get(handlers::health))
        .route("/api/analyze", post(handlers::analyze_document))
        // Alias used by the upload widgets
        .route("/api/analyze-document", post(handlers::analyze_document))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CatchPanicLayer::custom(handlers::panic_response))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
