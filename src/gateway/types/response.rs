//! API response envelope and response DTOs

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

// ============================================================================
// Unified API Response Format
// ============================================================================

/// Unified API response wrapper
///
/// - success: `{ "success": true, "data": ... }`
/// - failure: `{ "success": false, "error": "...", "details": [...] }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    // No `default` here: it would add a `T: Default` bound to Deserialize
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    /// Human-readable failure summary
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<ErrorDetails>,
}

impl<T> ApiResponse<T> {
    /// Create success response
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            details: None,
        }
    }

    /// Create error response
    pub fn error(error: impl Into<String>, details: Option<ErrorDetails>) -> ApiResponse<()> {
        ApiResponse {
            success: false,
            data: None,
            error: Some(error.into()),
            details,
        }
    }
}

/// Failure details: normally a list of messages, a bare string is accepted
/// when reading responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ErrorDetails {
    List(Vec<String>),
    Text(String),
}

impl ErrorDetails {
    /// Single-line form, list entries joined with `", "`.
    pub fn joined(&self) -> String {
        match self {
            ErrorDetails::List(items) => items.join(", "),
            ErrorDetails::Text(text) => text.clone(),
        }
    }
}

// ============================================================================
// Response DTOs
// ============================================================================

/// Health check response data
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// Server timestamp in milliseconds
    #[schema(example = 1703494800000_u64)]
    pub timestamp_ms: u64,
    /// Build revision
    #[schema(example = "3f2a9c1")]
    pub build: String,
}

/// Query parameters of the audit history endpoint
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AuditHistoryQuery {
    /// Maximum number of records (default 50, capped at 200)
    pub limit: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_envelope() {
        let json = serde_json::to_value(ApiResponse::success(7)).unwrap();
        assert_eq!(json, serde_json::json!({ "success": true, "data": 7 }));
    }

    #[test]
    fn test_error_envelope() {
        let resp = ApiResponse::<()>::error(
            "Validation failed",
            Some(ErrorDetails::List(vec!["a".into(), "b".into()])),
        );
        let json = serde_json::to_value(resp).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "success": false, "error": "Validation failed", "details": ["a", "b"] })
        );
    }

    #[derive(Debug, PartialEq, Deserialize)]
    struct Payload {
        id: u32,
    }

    #[test]
    fn test_envelope_deserializes_without_default_payload() {
        let ok: ApiResponse<Payload> =
            serde_json::from_str(r#"{"success":true,"data":{"id":7}}"#).unwrap();
        assert_eq!(ok.data, Some(Payload { id: 7 }));

        let failed: ApiResponse<Payload> =
            serde_json::from_str(r#"{"success":false,"error":"Invalid token"}"#).unwrap();
        assert!(!failed.success);
        assert_eq!(failed.data, None);
        assert_eq!(failed.error.as_deref(), Some("Invalid token"));
    }

    #[test]
    fn test_details_joined() {
        let list = ErrorDetails::List(vec!["a".into(), "b".into()]);
        assert_eq!(list.joined(), "a, b");
        let parsed: ApiResponse<()> =
            serde_json::from_str(r#"{"success":false,"error":"x","details":"y"}"#).unwrap();
        assert_eq!(parsed.details, Some(ErrorDetails::Text("y".into())));
    }
}
