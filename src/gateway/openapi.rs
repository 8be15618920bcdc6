//! OpenAPI / Swagger UI Documentation
//!
//! - Swagger UI: `http://localhost:8090/docs`
//! - OpenAPI JSON: `http://localhost:8090/api-docs/openapi.json`

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::audit::{AuditMeta, AuditRecord};
use crate::balance::{AdjustmentRequest, BalanceUpdates, Balances, PortfolioBalance, UpdateMode};
use crate::gateway::types::HealthResponse;

/// Bearer JWT issued by the identity provider
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some(
                            "Session token. The subject must be a registered administrator.",
                        ))
                        .build(),
                ),
            );
        }
    }
}

/// Main API Documentation struct
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Balance Admin API",
        version = "1.0.0",
        description = "Administrative adjustment of user portfolio balances with audit trail."
    ),
    servers(
        (url = "http://localhost:8090", description = "Development"),
    ),
    paths(
        crate::gateway::handlers::health::health_check,
        crate::gateway::handlers::balance::adjust_balance,
        crate::gateway::handlers::balance::get_balance,
        crate::gateway::handlers::balance::get_audit_history,
    ),
    components(
        schemas(
            HealthResponse,
            AdjustmentRequest,
            BalanceUpdates,
            UpdateMode,
            Balances,
            PortfolioBalance,
            AuditMeta,
            AuditRecord,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Admin", description = "Balance adjustment and inspection (admin bearer token required)"),
        (name = "System", description = "Health checks and system info")
    )
)]
pub struct ApiDoc;
