//! Balance types shared by the adjustment service and its client.
//!
//! Monetary values are `Decimal` in memory and JSON numbers on the wire.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

// ============================================================================
// Update Mode
// ============================================================================

/// How requested amounts are combined with the stored balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum UpdateMode {
    /// Requested amounts are added to the stored values (negative subtracts).
    Delta,
    /// Requested amounts replace the stored values; omitted fields are kept.
    Absolute,
}

impl UpdateMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            UpdateMode::Delta => "delta",
            UpdateMode::Absolute => "absolute",
        }
    }
}

impl FromStr for UpdateMode {
    type Err = String;

    /// Exact, case-sensitive match.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "delta" => Ok(UpdateMode::Delta),
            "absolute" => Ok(UpdateMode::Absolute),
            other => Err(format!(
                "Mode must be either 'delta' or 'absolute', got '{}'",
                other
            )),
        }
    }
}

impl fmt::Display for UpdateMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Balances
// ============================================================================

/// The three independently adjustable balance fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Balances {
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64, example = 100.0)]
    pub cash_balance: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64, example = 0.0)]
    pub invested_amount: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64, example = 0.0)]
    pub free_margin: Decimal,
}

impl Balances {
    /// Balances of a user without a stored row.
    pub const ZERO: Balances = Balances {
        cash_balance: Decimal::ZERO,
        invested_amount: Decimal::ZERO,
        free_margin: Decimal::ZERO,
    };

    pub fn new(cash_balance: Decimal, invested_amount: Decimal, free_margin: Decimal) -> Self {
        Self {
            cash_balance,
            invested_amount,
            free_margin,
        }
    }

    /// `cash_balance + invested_amount`, `None` on overflow.
    pub fn total_value(&self) -> Option<Decimal> {
        self.cash_balance.checked_add(self.invested_amount)
    }
}

/// Stored balance row of one user.
///
/// Amounts are exact decimals server-side and JSON numbers on the wire.
/// `totalValue` is computed in decimal before conversion, so it can differ in
/// the last digits from a client summing the float fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioBalance {
    #[schema(example = "8b0e6c1e-3f55-4d2f-9d7e-2a3c5b7f9e01")]
    pub user_id: String,
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64, example = 150.0)]
    pub cash_balance: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64, example = 0.0)]
    pub invested_amount: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64, example = 0.0)]
    pub free_margin: Decimal,
    /// Always `cash_balance + invested_amount`, computed in decimal before
    /// conversion to a JSON number.
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64, example = 150.0)]
    pub total_value: Decimal,
    /// `None` until the first write creates the row.
    pub updated_at: Option<DateTime<Utc>>,
}

impl PortfolioBalance {
    /// All-zero balance for a user that has no row yet.
    pub fn empty(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            cash_balance: Decimal::ZERO,
            invested_amount: Decimal::ZERO,
            free_margin: Decimal::ZERO,
            total_value: Decimal::ZERO,
            updated_at: None,
        }
    }

    pub fn balances(&self) -> Balances {
        Balances::new(self.cash_balance, self.invested_amount, self.free_margin)
    }
}

// ============================================================================
// Adjustment Request (client → service)
// ============================================================================

/// Requested balance values. `None` means "not provided", which is distinct
/// from an explicit zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BalanceUpdates {
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "rust_decimal::serde::float_option"
    )]
    #[schema(value_type = Option<f64>, example = 50.0)]
    pub cash_balance: Option<Decimal>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "rust_decimal::serde::float_option"
    )]
    #[schema(value_type = Option<f64>)]
    pub invested_amount: Option<Decimal>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "rust_decimal::serde::float_option"
    )]
    #[schema(value_type = Option<f64>)]
    pub free_margin: Option<Decimal>,
}

impl BalanceUpdates {
    pub fn cash(amount: Decimal) -> Self {
        Self {
            cash_balance: Some(amount),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.cash_balance.is_none() && self.invested_amount.is_none() && self.free_margin.is_none()
    }
}

/// Wire body of `POST /api/v1/admin/balance`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdjustmentRequest {
    pub user_id: String,
    pub mode: UpdateMode,
    #[serde(flatten)]
    pub updates: BalanceUpdates,
    #[schema(example = "bonus")]
    pub reason: String,
}
