//! API route handlers
//!
//! - `health`: liveness and readiness probes
//! - `locations`: create, list, update and delete location records

pub mod health;
pub mod locations;

use crate::error::{ServerError, ServerResult};
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

/// Service name, version and endpoint list (GET /).
pub async fn api_info() -> ServerResult<impl IntoResponse> {
    Ok(Json(json!({
        "name": "geoloc-server",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": [
            "POST /locations",
            "GET /locations",
            "PUT /locations/{id}",
            "DELETE /locations/{id}",
            "GET /health",
            "GET /ready"
        ]
    })))
}

/// 404 Not Found handler
///
/// Returns a standardized error response for undefined routes.
pub async fn not_found() -> ServerError {
    ServerError::NotFound("Route not found".to_string())
}
