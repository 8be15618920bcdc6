//! HTTP handlers
//!
//! Thin adapters from axum extractors to [`crate::balance::BalanceUpdateService`].

pub mod balance;
pub mod health;

pub use balance::{adjust_balance, get_audit_history, get_balance, method_not_allowed};
pub use health::health_check;
