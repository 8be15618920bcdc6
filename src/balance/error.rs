//! Balance adjustment error types.
//!
//! Every terminal failure of the adjustment pipeline is one of these and is
//! rendered as the `{ success: false, error, details? }` envelope.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use super::compute::ComputationError;
use crate::gateway::types::{ApiResponse, ErrorDetails};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BalanceUpdateError {
    // === Authentication / Authorization ===
    #[error("Missing authorization header")]
    MissingAuthorization,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Access denied — admin privileges required")]
    AdminRequired,

    #[error("Failed to verify admin privileges")]
    AdminLookup(String),

    // === Input ===
    #[error("Validation failed")]
    Validation(Vec<String>),

    #[error("Method not allowed")]
    MethodNotAllowed,

    // === Storage / Computation ===
    #[error("Failed to fetch current balance")]
    StorageRead(String),

    #[error("Failed to update balance")]
    StorageWrite(String),

    #[error("Failed to fetch audit history")]
    AuditRead(String),

    #[error("Invalid numeric values in balance calculation")]
    Computation,
}

impl BalanceUpdateError {
    pub fn code(&self) -> &'static str {
        match self {
            BalanceUpdateError::MissingAuthorization => "MISSING_AUTH",
            BalanceUpdateError::InvalidToken => "INVALID_TOKEN",
            BalanceUpdateError::AdminRequired => "ADMIN_REQUIRED",
            BalanceUpdateError::AdminLookup(_) => "ADMIN_LOOKUP_FAILED",
            BalanceUpdateError::Validation(_) => "VALIDATION_FAILED",
            BalanceUpdateError::MethodNotAllowed => "METHOD_NOT_ALLOWED",
            BalanceUpdateError::StorageRead(_) => "STORAGE_READ_FAILED",
            BalanceUpdateError::StorageWrite(_) => "STORAGE_WRITE_FAILED",
            BalanceUpdateError::AuditRead(_) => "AUDIT_READ_FAILED",
            BalanceUpdateError::Computation => "COMPUTATION_FAILED",
        }
    }

    pub fn http_status(&self) -> u16 {
        match self {
            BalanceUpdateError::MissingAuthorization | BalanceUpdateError::InvalidToken => 401,
            BalanceUpdateError::AdminRequired => 403,
            BalanceUpdateError::Validation(_) => 400,
            BalanceUpdateError::MethodNotAllowed => 405,
            BalanceUpdateError::AdminLookup(_)
            | BalanceUpdateError::StorageRead(_)
            | BalanceUpdateError::StorageWrite(_)
            | BalanceUpdateError::AuditRead(_)
            | BalanceUpdateError::Computation => 500,
        }
    }

    /// Per-rule violations or the underlying storage message.
    pub fn details(&self) -> Option<Vec<String>> {
        match self {
            BalanceUpdateError::Validation(violations) => Some(violations.clone()),
            BalanceUpdateError::AdminLookup(msg)
            | BalanceUpdateError::StorageRead(msg)
            | BalanceUpdateError::StorageWrite(msg)
            | BalanceUpdateError::AuditRead(msg) => Some(vec![msg.clone()]),
            _ => None,
        }
    }
}

impl From<ComputationError> for BalanceUpdateError {
    fn from(_: ComputationError) -> Self {
        BalanceUpdateError::Computation
    }
}

impl IntoResponse for BalanceUpdateError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let body = ApiResponse::<()>::error(self.to_string(), self.details().map(ErrorDetails::List));
        (status, Json(body)).into_response()
    }
}
