//! Health check handler

use std::sync::Arc;

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use super::super::state::AppState;
use super::super::types::{ApiResponse, HealthResponse};

/// Health check endpoint
///
/// Pings PostgreSQL when configured. Failure details go to the log only.
///
/// - Healthy: 200 OK + `{success: true, data: {timestamp_ms, build}}`
/// - Unhealthy: 503 Service Unavailable + `{success: false, error: "Service unavailable"}`
#[utoipa::path(
    get,
    path = "/api/v1/health",
    responses(
        (status = 200, description = "Service healthy", body = HealthResponse, content_type = "application/json"),
        (status = 503, description = "Service unavailable")
    ),
    tag = "System"
)]
pub async fn health_check(State(state): State<Arc<AppState>>) -> Response {
    if let Some(db) = &state.db
        && let Err(e) = db.health_check().await
    {
        tracing::error!("[HEALTH] PostgreSQL ping failed: {}", e);
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ApiResponse::<()>::error("Service unavailable", None)),
        )
            .into_response();
    }

    let timestamp_ms = chrono::Utc::now().timestamp_millis().max(0) as u64;
    Json(ApiResponse::success(HealthResponse {
        timestamp_ms,
        build: env!("BUILD_REVISION").to_string(),
    }))
    .into_response()
}
