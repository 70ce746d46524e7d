//! API route handlers
//!
//! - `health`: liveness and Prometheus metrics
//! - `medication`: prescription image and text extraction

pub mod health;
pub mod medication;

use crate::error::ServerError;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

/// API version and base info (GET /)
///
/// # Response
///
/// ```json
/// {
///   "message": "SehatYaad Backend API",
///   "version": "0.1.0",
///   "endpoints": {"health": "/health", "...": "..."}
/// }
/// ```
pub async fn api_info() -> impl IntoResponse {
    Json(json!({
        "message": "SehatYaad Backend API",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "health": "/health",
            "metrics": "/metrics",
            "process_image": "/api/process-medication-image (POST)",
            "process_text": "/api/process-medication-text (POST)"
        }
    }))
}

/// 405 handler for known `/api` paths hit with the wrong method
pub async fn method_not_allowed() -> ServerError {
    ServerError::MethodNotAllowed
}

/// 404 Not Found handler
pub async fn not_found() -> ServerError {
    ServerError::NotFound
}
