//! PostgreSQL balance storage.
//!
//! `adjust` runs in one transaction: seed a zero row if missing, lock it with
//! `SELECT ... FOR UPDATE`, compute, write, commit.

use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

use super::error::BalanceUpdateError;
use super::store::{ApplyFn, BalanceChange, BalanceStore};
use super::types::{Balances, PortfolioBalance};

pub struct PgBalanceStore {
    pool: PgPool,
}

impl PgBalanceStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn row_to_balance(row: &PgRow) -> Result<PortfolioBalance, sqlx::Error> {
        Ok(PortfolioBalance {
            user_id: row.try_get("user_id")?,
            cash_balance: row.try_get("cash_balance")?,
            invested_amount: row.try_get("invested_amount")?,
            free_margin: row.try_get("free_margin")?,
            total_value: row.try_get("total_value")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

fn read_err(e: sqlx::Error) -> BalanceUpdateError {
    BalanceUpdateError::StorageRead(e.to_string())
}

fn write_err(e: sqlx::Error) -> BalanceUpdateError {
    BalanceUpdateError::StorageWrite(e.to_string())
}

#[async_trait]
impl BalanceStore for PgBalanceStore {
    fn name(&self) -> &'static str {
        "postgres"
    }

    async fn get_balance(
        &self,
        user_id: &str,
    ) -> Result<Option<PortfolioBalance>, BalanceUpdateError> {
        let row = sqlx::query(
            r#"
            SELECT user_id, cash_balance, invested_amount, free_margin, total_value, updated_at
            FROM portfolio_balances
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(read_err)?;

        row.as_ref()
            .map(Self::row_to_balance)
            .transpose()
            .map_err(read_err)
    }

    async fn adjust(
        &self,
        user_id: &str,
        apply: ApplyFn<'_>,
    ) -> Result<BalanceChange, BalanceUpdateError> {
        let mut tx = self.pool.begin().await.map_err(read_err)?;

        // Seed a zero row so FOR UPDATE has something to lock for new users.
        // Rolled back with the transaction if anything below fails.
        let seeded = sqlx::query(
            r#"
            INSERT INTO portfolio_balances (user_id, cash_balance, invested_amount, free_margin, total_value)
            VALUES ($1, 0, 0, 0, 0)
            ON CONFLICT (user_id) DO NOTHING
            "#,
        )
        .bind(user_id)
        .execute(&mut *tx)
        .await
        .map_err(read_err)?;
        let created = seeded.rows_affected() == 1;

        let row = sqlx::query(
            r#"
            SELECT cash_balance, invested_amount, free_margin
            FROM portfolio_balances
            WHERE user_id = $1
            FOR UPDATE
            "#,
        )
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(read_err)?;

        let before = Balances::new(
            row.try_get::<Decimal, _>("cash_balance").map_err(read_err)?,
            row.try_get::<Decimal, _>("invested_amount").map_err(read_err)?,
            row.try_get::<Decimal, _>("free_margin").map_err(read_err)?,
        );

        let computed = apply(&before)?;

        let row = sqlx::query(
            r#"
            UPDATE portfolio_balances
            SET cash_balance = $2, invested_amount = $3, free_margin = $4,
                total_value = $5, updated_at = NOW()
            WHERE user_id = $1
            RETURNING user_id, cash_balance, invested_amount, free_margin, total_value, updated_at
            "#,
        )
        .bind(user_id)
        .bind(computed.balances.cash_balance)
        .bind(computed.balances.invested_amount)
        .bind(computed.balances.free_margin)
        .bind(computed.total_value)
        .fetch_one(&mut *tx)
        .await
        .map_err(write_err)?;
        let after = Self::row_to_balance(&row).map_err(write_err)?;

        tx.commit().await.map_err(write_err)?;

        Ok(BalanceChange {
            before,
            after,
            created,
        })
    }
}
