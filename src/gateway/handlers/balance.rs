//! Admin balance endpoints

use std::sync::Arc;

use axum::{
    Json,
    body::Bytes,
    extract::{Path, Query, State, rejection::QueryRejection},
    http::{HeaderMap, header::AUTHORIZATION},
};

use super::super::state::AppState;
use super::super::types::{ApiResponse, AuditHistoryQuery};
use crate::audit::AuditRecord;
use crate::balance::{AdjustmentRequest, BalanceUpdateError, PortfolioBalance};

fn authorization(headers: &HeaderMap) -> Option<&str> {
    headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok())
}

/// Adjust a user's balance
///
/// The body is read raw so that every validation rule can be reported,
/// including type mismatches a typed extractor would reject wholesale.
#[utoipa::path(
    post,
    path = "/api/v1/admin/balance",
    request_body = AdjustmentRequest,
    responses(
        (status = 200, description = "Balance updated; `data` holds the new row", body = PortfolioBalance),
        (status = 400, description = "Validation failed"),
        (status = 401, description = "Missing or invalid bearer token"),
        (status = 403, description = "Caller is not an administrator"),
        (status = 405, description = "Method not allowed"),
        (status = 500, description = "Storage or computation failure")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn adjust_balance(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<ApiResponse<PortfolioBalance>>, BalanceUpdateError> {
    let balance = state.service.handle(authorization(&headers), &body).await?;
    Ok(Json(ApiResponse::success(balance)))
}

/// Fallback for unsupported verbs on admin routes
pub async fn method_not_allowed() -> BalanceUpdateError {
    BalanceUpdateError::MethodNotAllowed
}

/// Current balance of a user
#[utoipa::path(
    get,
    path = "/api/v1/admin/balance/{user_id}",
    params(("user_id" = String, Path, description = "Target user id")),
    responses(
        (status = 200, description = "Current balance; zeros when the user has no row", body = PortfolioBalance),
        (status = 401, description = "Missing or invalid bearer token"),
        (status = 403, description = "Caller is not an administrator"),
        (status = 500, description = "Storage failure")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn get_balance(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(user_id): Path<String>,
) -> Result<Json<ApiResponse<PortfolioBalance>>, BalanceUpdateError> {
    let balance = state
        .service
        .balance(authorization(&headers), &user_id)
        .await?;
    Ok(Json(ApiResponse::success(balance)))
}

/// Recent balance adjustments of a user, newest first
#[utoipa::path(
    get,
    path = "/api/v1/admin/balance/{user_id}/audit",
    params(
        ("user_id" = String, Path, description = "Target user id"),
        AuditHistoryQuery
    ),
    responses(
        (status = 200, description = "Audit records", body = [AuditRecord]),
        (status = 400, description = "Invalid query"),
        (status = 401, description = "Missing or invalid bearer token"),
        (status = 403, description = "Caller is not an administrator"),
        (status = 500, description = "Audit log unavailable")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn get_audit_history(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(user_id): Path<String>,
    query: Result<Query<AuditHistoryQuery>, QueryRejection>,
) -> Result<Json<ApiResponse<Vec<AuditRecord>>>, BalanceUpdateError> {
    let limit = match query {
        Ok(Query(query)) => query.limit,
        Err(_) => {
            // Credentials are still checked first
            state
                .service
                .authenticate_admin(authorization(&headers))
                .await?;
            return Err(BalanceUpdateError::Validation(vec![
                "limit must be a non-negative integer".to_string(),
            ]));
        }
    };

    let records = state
        .service
        .audit_history(authorization(&headers), &user_id, limit)
        .await?;
    Ok(Json(ApiResponse::success(records)))
}
