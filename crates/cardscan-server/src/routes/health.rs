//! Health check endpoint.

use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub storage: String,
    pub version: String,
    pub timestamp: DateTime<Utc>,
}

/// Health check endpoint.
/// GET /health
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let storage = match state.storage {
        cardscan_core::StorageProvider::Memory => "memory",
        cardscan_core::StorageProvider::Sqlite => "sqlite",
    };

    Json(HealthResponse {
        status: "ok".to_string(),
        storage: storage.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: Utc::now(),
    })
}
