//! PostgreSQL admin directory (`admin_users`)

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

use super::{AdminDirectory, AdminRecord};

pub struct PgAdminDirectory {
    pool: PgPool,
}

impl PgAdminDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn row_to_admin(row: &PgRow) -> Result<AdminRecord, sqlx::Error> {
        Ok(AdminRecord {
            user_id: row.try_get("user_id")?,
            email: row.try_get("email")?,
        })
    }
}

#[async_trait]
impl AdminDirectory for PgAdminDirectory {
    async fn find_by_user_id(&self, user_id: &str) -> Result<Option<AdminRecord>, sqlx::Error> {
        let row = sqlx::query(r#"SELECT user_id, email FROM admin_users WHERE user_id = $1"#)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(Self::row_to_admin).transpose()
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<AdminRecord>, sqlx::Error> {
        let row = sqlx::query(
            r#"SELECT COALESCE(user_id, '') AS user_id, email
               FROM admin_users WHERE LOWER(email) = LOWER($1)
               LIMIT 1"#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(Self::row_to_admin).transpose()
    }
}
