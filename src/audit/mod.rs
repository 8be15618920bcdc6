//! Admin audit trail
//!
//! Append-only records of administrative balance changes. Records are
//! written off the request path through [`outbox::AuditOutbox`]; a failed
//! append is logged and never affects the committed balance change.

pub mod db;
pub mod outbox;

pub use db::PgAuditSink;
pub use outbox::{AuditOutbox, AuditWorker, audit_outbox};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tokio::sync::Mutex;
use utoipa::ToSchema;

use crate::admin::AdminRecord;
use crate::balance::store::BalanceChange;
use crate::balance::types::{Balances, PortfolioBalance, UpdateMode};
use crate::balance::validation::ValidatedAdjustment;

pub const ACTION_BALANCE_UPDATE: &str = "balance_update";
pub const TARGET_TABLE_BALANCES: &str = "portfolio_balances";

/// What changed, from what, to what, and why.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AuditMeta {
    pub before: Balances,
    pub after: PortfolioBalance,
    pub reason: String,
    pub mode: UpdateMode,
    /// Numeric fields exactly as submitted
    #[schema(value_type = Object)]
    pub updates: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuditRecord {
    pub admin_user_id: String,
    pub action: String,
    pub target_table: String,
    pub target_id: String,
    pub meta: AuditMeta,
    pub created_at: DateTime<Utc>,
}

impl AuditRecord {
    pub fn balance_update(
        admin: &AdminRecord,
        adjustment: &ValidatedAdjustment,
        change: &BalanceChange,
    ) -> Self {
        Self {
            admin_user_id: admin.user_id.clone(),
            action: ACTION_BALANCE_UPDATE.to_string(),
            target_table: TARGET_TABLE_BALANCES.to_string(),
            target_id: adjustment.user_id.clone(),
            meta: AuditMeta {
                before: change.before,
                after: change.after.clone(),
                reason: adjustment.reason.clone(),
                mode: adjustment.mode,
                updates: adjustment.submitted.clone(),
            },
            created_at: Utc::now(),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuditWriteError {
    #[error("Audit queue is full")]
    QueueFull,

    #[error("Audit queue is closed")]
    QueueClosed,

    #[error("Audit database error: {0}")]
    Database(String),
}

impl From<sqlx::Error> for AuditWriteError {
    fn from(e: sqlx::Error) -> Self {
        AuditWriteError::Database(e.to_string())
    }
}

#[async_trait]
pub trait AuditSink: Send + Sync {
    async fn append(&self, record: &AuditRecord) -> Result<(), AuditWriteError>;

    /// Most recent records targeting `target_id`, newest first.
    async fn recent(
        &self,
        target_id: &str,
        limit: u32,
    ) -> Result<Vec<AuditRecord>, AuditWriteError>;
}

/// In-process audit log, used when no database is configured and in tests.
#[derive(Default)]
pub struct MemoryAuditSink {
    records: Mutex<Vec<AuditRecord>>,
}

impl MemoryAuditSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.records.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.lock().await.is_empty()
    }
}

#[async_trait]
impl AuditSink for MemoryAuditSink {
    async fn append(&self, record: &AuditRecord) -> Result<(), AuditWriteError> {
        self.records.lock().await.push(record.clone());
        Ok(())
    }

    async fn recent(
        &self,
        target_id: &str,
        limit: u32,
    ) -> Result<Vec<AuditRecord>, AuditWriteError> {
        Ok(self
            .records
            .lock()
            .await
            .iter()
            .rev()
            .filter(|r| r.target_id == target_id)
            .take(limit as usize)
            .cloned()
            .collect())
    }
}
