//! Administrative balance adjustment
//!
//! - [`types`] - Balances, portfolio rows and the adjustment request
//! - [`validation`] - Server-side payload rules
//! - [`compute`] - Delta / absolute arithmetic
//! - [`store`] - Storage seam with an in-memory implementation
//! - [`db`] - PostgreSQL storage
//! - [`service`] - The authoritative adjustment pipeline
//! - [`error`] - Error taxonomy and HTTP mapping

pub mod compute;
pub mod db;
pub mod error;
pub mod service;
pub mod store;
pub mod types;
pub mod validation;

pub use db::PgBalanceStore;
pub use error::BalanceUpdateError;
pub use service::BalanceUpdateService;
pub use store::{BalanceChange, BalanceStore, MemoryBalanceStore};
pub use types::{AdjustmentRequest, BalanceUpdates, Balances, PortfolioBalance, UpdateMode};
