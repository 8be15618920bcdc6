//! Pure balance arithmetic for both update modes.

use rust_decimal::Decimal;
use thiserror::Error;

use super::types::{Balances, UpdateMode};
use super::validation::{AmountInput, RequestedAmounts};

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("Invalid numeric values in balance calculation")]
pub struct ComputationError;

/// New balances plus the derived total.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Computed {
    pub balances: Balances,
    pub total_value: Decimal,
}

/// Apply requested amounts to `current`.
///
/// Omitted fields keep their current value in both modes. A non-numeric
/// amount or an arithmetic overflow yields [`ComputationError`].
pub fn apply(
    current: &Balances,
    mode: UpdateMode,
    requested: &RequestedAmounts,
) -> Result<Computed, ComputationError> {
    let field = |current: Decimal, requested: Option<&AmountInput>| match requested {
        None => Ok(current),
        Some(AmountInput::NotANumber(_)) => Err(ComputationError),
        Some(AmountInput::Value(amount)) => match mode {
            UpdateMode::Delta => current.checked_add(*amount).ok_or(ComputationError),
            UpdateMode::Absolute => Ok(*amount),
        },
    };

    let balances = Balances {
        cash_balance: field(current.cash_balance, requested.cash_balance.as_ref())?,
        invested_amount: field(current.invested_amount, requested.invested_amount.as_ref())?,
        free_margin: field(current.free_margin, requested.free_margin.as_ref())?,
    };
    let total_value = balances.total_value().ok_or(ComputationError)?;

    Ok(Computed {
        balances,
        total_value,
    })
}
