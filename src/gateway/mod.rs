//! HTTP gateway
//!
//! ```text
//! /api/v1/health                              GET   liveness
//! /api/v1/admin/balance                       POST  adjust (other verbs: 405)
//! /api/v1/admin/balance/{user_id}             GET   current balance
//! /api/v1/admin/balance/{user_id}/audit       GET   adjustment history
//! /docs, /api-docs/openapi.json                     Swagger UI
//! ```

pub mod handlers;
pub mod openapi;
pub mod state;
pub mod types;

use anyhow::{Context, Result};
use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

// OpenAPI / Swagger UI
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use state::AppState;

/// Build the complete router. Authentication happens inside the service,
/// so no auth middleware is layered here.
pub fn router(state: Arc<AppState>) -> Router {
    let admin_routes = Router::new()
        .route(
            "/balance",
            post(handlers::adjust_balance).fallback(handlers::method_not_allowed),
        )
        .route(
            "/balance/{user_id}",
            get(handlers::get_balance).fallback(handlers::method_not_allowed),
        )
        .route(
            "/balance/{user_id}/audit",
            get(handlers::get_audit_history).fallback(handlers::method_not_allowed),
        );

    Router::new()
        .route("/api/v1/health", get(handlers::health_check))
        .nest("/api/v1/admin", admin_routes)
        .with_state(state)
        // Stateless, added after with_state
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", openapi::ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        // The admin console is served from another origin
        .layer(CorsLayer::permissive())
}

/// Serve until Ctrl-C.
pub async fn run_server(host: &str, port: u16, state: Arc<AppState>) -> Result<()> {
    let app = router(state);

    let addr = format!("{}:{}", host, port);
    let listener = TcpListener::bind(&addr).await.with_context(|| {
        format!(
            "Failed to bind to {} (port {} may already be in use; check with: lsof -i :{})",
            addr, port, port
        )
    })?;

    tracing::info!("Gateway listening on http://{}", addr);
    tracing::info!("API Docs: http://{}/docs", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("Gateway stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
}
