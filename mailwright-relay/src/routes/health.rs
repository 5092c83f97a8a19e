//! Liveness endpoint

use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// `GET /health` response body
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HealthResponse {
    /// Always `"healthy"` while the process serves requests
    pub status: String,

    /// Time the check was answered
    pub timestamp: DateTime<Utc>,

    /// Relay version
    pub version: String,
}

/// Report that the relay is up
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp: Utc::now(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
