//! Service identity and liveness handlers.

use axum::Json;
use serde::Serialize;

use strata_core::GoldTable;

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Service status ("ok").
    pub status: String,
    /// Service name.
    pub service: String,
    /// Service version.
    pub version: String,
}

/// Health check endpoint.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        service: "strata".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Root banner response.
#[derive(Debug, Serialize)]
pub struct RootResponse {
    /// Human-readable service description.
    pub message: String,
    /// Service version.
    pub version: String,
    /// Readable endpoints.
    pub endpoints: Vec<String>,
}

/// Root endpoint listing every readable table.
pub async fn root() -> Json<RootResponse> {
    let mut endpoints: Vec<String> = GoldTable::ALL
        .iter()
        .map(|table| format!("/{}", table.basename()))
        .collect();
    endpoints.push("/refresh_time/{collection}".to_string());

    Json(RootResponse {
        message: "strata analytics API".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        endpoints,
    })
}
