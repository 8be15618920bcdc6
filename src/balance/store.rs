//! Balance storage seam.
//!
//! `adjust` runs the locked read, the computation and the write as one unit,
//! so two adjustments of the same user never interleave.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::Mutex;

use super::compute::{ComputationError, Computed};
use super::error::BalanceUpdateError;
use super::types::{Balances, PortfolioBalance};

/// Computation applied by [`BalanceStore::adjust`] to the locked row.
pub type ApplyFn<'a> = &'a (dyn Fn(&Balances) -> Result<Computed, ComputationError> + Send + Sync);

/// Outcome of a committed adjustment.
#[derive(Debug, Clone, PartialEq)]
pub struct BalanceChange {
    pub before: Balances,
    pub after: PortfolioBalance,
    /// The row did not exist before this adjustment.
    pub created: bool,
}

#[async_trait]
pub trait BalanceStore: Send + Sync {
    /// Store name for logging
    fn name(&self) -> &'static str;

    /// Current row, `None` when the user has never been written.
    async fn get_balance(&self, user_id: &str)
    -> Result<Option<PortfolioBalance>, BalanceUpdateError>;

    /// Read the row (zeros when absent) under lock, run `apply`, upsert the
    /// result with a fresh `updated_at`.
    ///
    /// Errors: `StorageRead` before `apply` runs, `Computation` from `apply`
    /// (nothing written), `StorageWrite` when the write or commit fails.
    async fn adjust(
        &self,
        user_id: &str,
        apply: ApplyFn<'_>,
    ) -> Result<BalanceChange, BalanceUpdateError>;
}

/// In-process store, used when no database is configured and in tests.
#[derive(Default)]
pub struct MemoryBalanceStore {
    rows: Mutex<HashMap<String, PortfolioBalance>>,
}

impl MemoryBalanceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a row directly, bypassing the adjustment path.
    pub async fn insert(&self, user_id: &str, balances: Balances) {
        let row = PortfolioBalance {
            user_id: user_id.to_string(),
            cash_balance: balances.cash_balance,
            invested_amount: balances.invested_amount,
            free_margin: balances.free_margin,
            total_value: balances.total_value().unwrap_or_default(),
            updated_at: Some(Utc::now()),
        };
        self.rows.lock().await.insert(user_id.to_string(), row);
    }
}

#[async_trait]
impl BalanceStore for MemoryBalanceStore {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn get_balance(
        &self,
        user_id: &str,
    ) -> Result<Option<PortfolioBalance>, BalanceUpdateError> {
        Ok(self.rows.lock().await.get(user_id).cloned())
    }

    async fn adjust(
        &self,
        user_id: &str,
        apply: ApplyFn<'_>,
    ) -> Result<BalanceChange, BalanceUpdateError> {
        let mut rows = self.rows.lock().await;

        let existing = rows.get(user_id);
        let created = existing.is_none();
        let before = existing.map(PortfolioBalance::balances).unwrap_or(Balances::ZERO);

        let computed = apply(&before)?;
        let after = PortfolioBalance {
            user_id: user_id.to_string(),
            cash_balance: computed.balances.cash_balance,
            invested_amount: computed.balances.invested_amount,
            free_margin: computed.balances.free_margin,
            total_value: computed.total_value,
            updated_at: Some(Utc::now()),
        };
        rows.insert(user_id.to_string(), after.clone());

        Ok(BalanceChange {
            before,
            after,
            created,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::balance::compute;
    use crate::balance::types::UpdateMode;
    use crate::balance::validation::{AmountInput, RequestedAmounts};
    use rust_decimal_macros::dec;
    use std::sync::Arc;

    fn cash_delta(amount: rust_decimal::Decimal) -> RequestedAmounts {
        RequestedAmounts {
            cash_balance: Some(AmountInput::Value(amount)),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_adjust_creates_row() {
        let store = MemoryBalanceStore::new();
        assert_eq!(store.get_balance("u1").await.unwrap(), None);

        let req = cash_delta(dec!(25));
        let change = store
            .adjust("u1", &|b| compute::apply(b, UpdateMode::Delta, &req))
            .await
            .unwrap();

        assert!(change.created);
        assert_eq!(change.before, Balances::ZERO);
        assert_eq!(change.after.cash_balance, dec!(25));
        assert_eq!(change.after.total_value, dec!(25));
        assert!(change.after.updated_at.is_some());
        assert_eq!(store.get_balance("u1").await.unwrap(), Some(change.after));
    }

    #[tokio::test]
    async fn test_failed_computation_writes_nothing() {
        let store = MemoryBalanceStore::new();
        store.insert("u1", Balances::new(dec!(1), dec!(2), dec!(3))).await;
        let before = store.get_balance("u1").await.unwrap();

        let err = store
            .adjust("u1", &|_| Err(ComputationError))
            .await
            .unwrap_err();

        assert_eq!(err, BalanceUpdateError::Computation);
        assert_eq!(store.get_balance("u1").await.unwrap(), before);
    }

    #[tokio::test]
    async fn test_concurrent_deltas_are_not_lost() {
        let store = Arc::new(MemoryBalanceStore::new());
        let mut handles = Vec::new();
        for _ in 0..50 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                let req = cash_delta(dec!(2));
                store
                    .adjust("u1", &|b| compute::apply(b, UpdateMode::Delta, &req))
                    .await
                    .unwrap();
            }));
        }
        for h in handles {
            h.await.unwrap();
        }

        let row = store.get_balance("u1").await.unwrap().unwrap();
        assert_eq!(row.cash_balance, dec!(100));
        assert_eq!(row.total_value, dec!(100));
    }
}
