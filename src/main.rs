//! Balance Admin gateway
//!
//! ```text
//! ┌──────────┐    ┌──────────┐    ┌──────────────┐    ┌──────────────┐
//! │  Config  │───▶│ Storage  │───▶│   Service    │───▶│   Gateway    │
//! │  (YAML)  │    │ (PG/mem) │    │ (auth+apply) │    │    (axum)    │
//! └──────────┘    └──────────┘    └──────┬───────┘    └──────────────┘
//!                                        │ outbox
//!                                        ▼
//!                                 ┌──────────────┐
//!                                 │ Audit worker │
//!                                 └──────────────┘
//! ```
//!
//! Usage: `balance_admin [--env dev] [--port 8090]`

use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;

use balance_admin::admin::{AdminDirectory, AdminGate, MemoryAdminDirectory, PgAdminDirectory};
use balance_admin::audit::{AuditSink, MemoryAuditSink, PgAuditSink, audit_outbox};
use balance_admin::balance::{BalanceStore, BalanceUpdateService, MemoryBalanceStore, PgBalanceStore};
use balance_admin::config::AppConfig;
use balance_admin::db::Database;
use balance_admin::gateway::{self, state::AppState};
use balance_admin::logging::init_logging;
use balance_admin::user_auth::JwtIdentityResolver;

/// How long shutdown waits for queued audit records.
const AUDIT_DRAIN_TIMEOUT: Duration = Duration::from_secs(10);

fn get_env() -> String {
    let args: Vec<String> = std::env::args().collect();
    for i in 0..args.len() {
        if (args[i] == "--env" || args[i] == "-e") && i + 1 < args.len() {
            return args[i + 1].clone();
        }
    }
    "dev".to_string()
}

/// Get port override from command line (--port argument)
fn get_port_override() -> Option<u16> {
    let args: Vec<String> = std::env::args().collect();
    for i in 0..args.len() {
        if args[i] == "--port" && i + 1 < args.len() {
            return args[i + 1].parse().ok();
        }
    }
    None
}

struct Backends {
    db: Option<Arc<Database>>,
    admins: Arc<dyn AdminDirectory>,
    store: Arc<dyn BalanceStore>,
    audit: Arc<dyn AuditSink>,
}

async fn connect_backends(config: &AppConfig) -> Result<Backends> {
    match config.postgres_url.as_deref() {
        Some(url) => {
            let db = Database::connect(url)
                .await
                .context("Failed to connect to PostgreSQL")?;
            db.ensure_schema()
                .await
                .context("Failed to apply database schema")?;
            let pool = db.pool().clone();

            Ok(Backends {
                db: Some(Arc::new(db)),
                admins: Arc::new(PgAdminDirectory::new(pool.clone())),
                store: Arc::new(PgBalanceStore::new(pool.clone())),
                audit: Arc::new(PgAuditSink::new(pool)),
            })
        }
        None => {
            let admins = config.seed_admins();
            tracing::warn!(
                seeded_admins = admins.len(),
                "postgres_url not set: balances and audit records are kept in memory only"
            );

            Ok(Backends {
                db: None,
                admins: Arc::new(MemoryAdminDirectory::new(admins)),
                store: Arc::new(MemoryBalanceStore::new()),
                audit: Arc::new(MemoryAuditSink::new()),
            })
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let env = get_env();
    let mut config = AppConfig::load(&env)?;
    if let Some(port) = get_port_override() {
        config.gateway.port = port;
    }
    let _log_guard = init_logging(&config);

    tracing::info!("Starting Balance Admin gateway in {} mode", env);

    let backends = connect_backends(&config).await?;
    tracing::info!(store = backends.store.name(), "Storage ready");

    let (outbox, worker) = audit_outbox(config.audit.queue_size, backends.audit.clone());
    let audit_task = tokio::spawn(worker.run());

    let service = BalanceUpdateService::new(
        Arc::new(JwtIdentityResolver::new(config.auth.jwt_secret.clone())),
        AdminGate::new(backends.admins, config.admin.email_fallback),
        backends.store,
        outbox,
        backends.audit,
    );
    let state = Arc::new(AppState::new(Arc::new(service), backends.db));

    gateway::run_server(&config.gateway.host, config.gateway.port, state).await?;

    // The router held the last outbox sender; the worker drains and exits.
    match tokio::time::timeout(AUDIT_DRAIN_TIMEOUT, audit_task).await {
        Ok(Ok(written)) => tracing::info!(written, "Audit worker drained"),
        Ok(Err(e)) => tracing::error!("Audit worker panicked: {}", e),
        Err(_) => tracing::warn!("Audit worker did not drain within {:?}", AUDIT_DRAIN_TIMEOUT),
    }

    Ok(())
}
