//! Health check endpoint for service monitoring.

use crate::{error::AppError, state::AppState};
use axum::{Json, extract::State};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Health check response.
///
/// Returns service status, database connectivity and cache state.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Overall service status
    pub status: String,

    /// Database connection status
    pub database: String,

    /// `connected`, `unreachable` or `disabled`
    pub cache: String,

    /// Current server timestamp
    pub timestamp: DateTime<Utc>,
}

/// Health check handler.
///
/// # Checks
///
/// - Database connectivity (executes simple query)
/// - Cache reachability (`PING`), informational only
///
/// # Response (200 OK)
///
/// ```json
/// {
///   "status": "healthy",
///   "database": "connected",
///   "cache": "disabled",
///   "timestamp": "2025-12-21T19:00:00Z"
/// }
/// ```
///
/// If database is unreachable, returns standard error response. An
/// unreachable cache does not make the service unhealthy.
pub async fn health_check(State(state): State<AppState>) -> Result<Json<HealthResponse>, AppError> {
    // Verify database connectivity with simple query
    sqlx::query("SELECT 1").execute(&state.pool).await?;

    let cache = if !state.cache.is_enabled() {
        "disabled"
    } else if state.cache.ping().await {
        "connected"
    } else {
        "unreachable"
    };

    Ok(Json(HealthResponse {
        status: "healthy".to_string(),
        database: "connected".to_string(),
        cache: cache.to_string(),
        timestamp: Utc::now(),
    }))
}
