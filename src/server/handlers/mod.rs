//! HTTP request handlers for the web server.

mod analyze;
mod health;
mod types;

pub use analyze::{analyze_document, panic_response};
pub use health::health;
pub use types::{AnalyzeBody, AnalyzeResponse, ErrorResponse, HealthResponse};
