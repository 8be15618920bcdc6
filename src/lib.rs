//! Balance Admin - administrative balance adjustment
//!
//! Server side: an authenticated HTTP service through which an administrator
//! changes a user's portfolio balance, with an audit trail. Client side: the
//! library UI and tooling code use to request such a change.
//!
//! # Modules
//!
//! - [`balance`] - Balance types, validation, arithmetic, storage and the service
//! - [`user_auth`] - Bearer token to caller identity
//! - [`admin`] - Administrator directory and authorization gate
//! - [`audit`] - Audit records, sinks and the background outbox
//! - [`client`] - Balance update client (validation, transport, notifications)
//! - [`gateway`] - axum router, handlers and OpenAPI docs
//! - [`db`] - PostgreSQL pool
//! - [`config`] - YAML configuration
//! - [`logging`] - tracing subscriber setup

pub mod admin;
pub mod audit;
pub mod balance;
pub mod client;
pub mod config;
pub mod db;
pub mod gateway;
pub mod logging;
pub mod user_auth;

// Convenient re-exports at crate root
pub use balance::{
    AdjustmentRequest, BalanceUpdateError, BalanceUpdateService, BalanceUpdates, Balances,
    PortfolioBalance, UpdateMode,
};
pub use client::{BalanceUpdateClient, ClientError};
