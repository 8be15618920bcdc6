//! Gateway types module
//!
//! - [`ApiResponse<T>`]: `{ success, data | error, details }` envelope
//! - [`ErrorDetails`]: rule violations or storage messages attached to failures

pub mod response;

pub use response::{ApiResponse, AuditHistoryQuery, ErrorDetails, HealthResponse};
