//! Caller authentication
//!
//! Resolves the bearer credential of a request to an [`Identity`].

pub mod service;

pub use service::{Claims, JwtIdentityResolver};

use async_trait::async_trait;

use crate::balance::error::BalanceUpdateError;

/// Authenticated caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: String,
    pub email: Option<String>,
}

#[async_trait]
pub trait IdentityResolver: Send + Sync {
    /// Resolve a bearer token. Unknown, malformed or expired tokens are
    /// `BalanceUpdateError::InvalidToken`.
    async fn resolve(&self, token: &str) -> Result<Identity, BalanceUpdateError>;
}

/// Extract the token from an `Authorization: Bearer <token>` header value.
pub fn bearer_token(header: Option<&str>) -> Result<&str, BalanceUpdateError> {
    let header = header
        .map(str::trim)
        .filter(|h| !h.is_empty())
        .ok_or(BalanceUpdateError::MissingAuthorization)?;

    let rest = header
        .strip_prefix("Bearer")
        .ok_or(BalanceUpdateError::InvalidToken)?;
    if !rest.is_empty() && !rest.starts_with(' ') {
        return Err(BalanceUpdateError::InvalidToken);
    }

    let token = rest.trim();
    if token.is_empty() {
        return Err(BalanceUpdateError::MissingAuthorization);
    }
    Ok(token)
}
