//! PostgreSQL audit log (`admin_audit_logs`)

use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::{PgPool, Row};

use super::{AuditMeta, AuditRecord, AuditSink, AuditWriteError};

pub struct PgAuditSink {
    pool: PgPool,
}

impl PgAuditSink {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AuditSink for PgAuditSink {
    async fn append(&self, record: &AuditRecord) -> Result<(), AuditWriteError> {
        sqlx::query(
            r#"
            INSERT INTO admin_audit_logs
                (admin_user_id, action, target_table, target_id, meta, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(&record.admin_user_id)
        .bind(&record.action)
        .bind(&record.target_table)
        .bind(&record.target_id)
        .bind(Json(&record.meta))
        .bind(record.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn recent(
        &self,
        target_id: &str,
        limit: u32,
    ) -> Result<Vec<AuditRecord>, AuditWriteError> {
        let rows = sqlx::query(
            r#"
            SELECT admin_user_id, action, target_table, target_id, meta, created_at
            FROM admin_audit_logs
            WHERE target_id = $1
            ORDER BY created_at DESC, id DESC
            LIMIT $2
            "#,
        )
        .bind(target_id)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| {
                let Json(meta): Json<AuditMeta> = row.try_get("meta")?;
                Ok(AuditRecord {
                    admin_user_id: row.try_get("admin_user_id")?,
                    action: row.try_get("action")?,
                    target_table: row.try_get("target_table")?,
                    target_id: row.try_get("target_id")?,
                    meta,
                    created_at: row.try_get("created_at")?,
                })
            })
            .collect()
    }
}
