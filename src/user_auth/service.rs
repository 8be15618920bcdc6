use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use super::{Identity, IdentityResolver};
use crate::balance::error::BalanceUpdateError;

/// JWT Claims structure
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String, // Subject (user_id)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub exp: usize, // Expiration time (as UTC timestamp)
    pub iat: usize, // Issued at
}

/// HS256 session tokens signed with a shared secret.
pub struct JwtIdentityResolver {
    jwt_secret: String,
}

impl JwtIdentityResolver {
    pub fn new(jwt_secret: String) -> Self {
        Self { jwt_secret }
    }

    /// Issue a token for `user_id`, valid for `ttl`.
    ///
    /// Session issuance belongs to the identity provider; this exists for
    /// local runs and tests.
    pub fn issue_token(&self, user_id: &str, email: Option<&str>, ttl: Duration) -> Result<String> {
        let now = Utc::now();
        let expiration = now
            .checked_add_signed(ttl)
            .context("Token expiry out of range")?
            .timestamp();

        let claims = Claims {
            sub: user_id.to_string(),
            email: email.map(str::to_string),
            exp: expiration.max(0) as usize,
            iat: now.timestamp() as usize,
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_bytes()),
        )
        .context("Failed to generate token")
    }

    /// Verify JWT token
    pub fn verify_token(&self, token: &str) -> Result<Claims> {
        let decoding_key = DecodingKey::from_secret(self.jwt_secret.as_bytes());
        let validation = Validation::new(Algorithm::HS256);
        let token_data = decode::<Claims>(token, &decoding_key, &validation)?;
        Ok(token_data.claims)
    }
}

#[async_trait]
impl IdentityResolver for JwtIdentityResolver {
    async fn resolve(&self, token: &str) -> Result<Identity, BalanceUpdateError> {
        let claims = self.verify_token(token).map_err(|e| {
            tracing::debug!(error = %e, "Token rejected");
            BalanceUpdateError::InvalidToken
        })?;

        if claims.sub.trim().is_empty() {
            return Err(BalanceUpdateError::InvalidToken);
        }

        Ok(Identity {
            user_id: claims.sub,
            email: claims.email,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver() -> JwtIdentityResolver {
        JwtIdentityResolver::new("test-secret".to_string())
    }

    #[tokio::test]
    async fn test_issue_and_resolve() {
        let r = resolver();
        let token = r
            .issue_token("admin-1", Some("ops@example.com"), Duration::hours(1))
            .unwrap();
        let identity = r.resolve(&token).await.unwrap();
        assert_eq!(identity.user_id, "admin-1");
        assert_eq!(identity.email.as_deref(), Some("ops@example.com"));
    }

    #[tokio::test]
    async fn test_expired_token_rejected() {
        let r = resolver();
        let token = r.issue_token("admin-1", None, Duration::hours(-2)).unwrap();
        assert_eq!(r.resolve(&token).await, Err(BalanceUpdateError::InvalidToken));
    }

    #[tokio::test]
    async fn test_wrong_secret_rejected() {
        let token = JwtIdentityResolver::new("other".to_string())
            .issue_token("admin-1", None, Duration::hours(1))
            .unwrap();
        assert_eq!(
            resolver().resolve(&token).await,
            Err(BalanceUpdateError::InvalidToken)
        );
    }

    #[tokio::test]
    async fn test_garbage_rejected() {
        assert_eq!(
            resolver().resolve("not-a-jwt").await,
            Err(BalanceUpdateError::InvalidToken)
        );
    }
}
