//! Administrator directory
//!
//! Decides whether an authenticated identity may adjust balances. Matching
//! is by stable user id; matching by email is a migration aid for admin rows
//! created before user ids were recorded and can be switched off.

pub mod db;

pub use db::PgAdminDirectory;

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::warn;

use crate::balance::error::BalanceUpdateError;
use crate::user_auth::Identity;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminRecord {
    pub user_id: String,
    pub email: Option<String>,
}

#[async_trait]
pub trait AdminDirectory: Send + Sync {
    async fn find_by_user_id(&self, user_id: &str) -> Result<Option<AdminRecord>, sqlx::Error>;

    async fn find_by_email(&self, email: &str) -> Result<Option<AdminRecord>, sqlx::Error>;
}

/// Authorization gate in front of every admin operation.
#[derive(Clone)]
pub struct AdminGate {
    directory: Arc<dyn AdminDirectory>,
    email_fallback: bool,
}

impl AdminGate {
    pub fn new(directory: Arc<dyn AdminDirectory>, email_fallback: bool) -> Self {
        Self {
            directory,
            email_fallback,
        }
    }

    /// The admin record of `identity`, or `AdminRequired`.
    pub async fn authorize(&self, identity: &Identity) -> Result<AdminRecord, BalanceUpdateError> {
        let lookup_err = |e: sqlx::Error| BalanceUpdateError::AdminLookup(e.to_string());

        if let Some(admin) = self
            .directory
            .find_by_user_id(&identity.user_id)
            .await
            .map_err(lookup_err)?
        {
            return Ok(admin);
        }

        if self.email_fallback
            && let Some(email) = identity.email.as_deref().filter(|e| !e.is_empty())
            && let Some(admin) = self
                .directory
                .find_by_email(email)
                .await
                .map_err(lookup_err)?
        {
            warn!(
                user_id = %identity.user_id,
                email = %email,
                "Admin matched by email only; record its user_id to retire the email fallback"
            );
            return Ok(AdminRecord {
                user_id: identity.user_id.clone(),
                email: admin.email,
            });
        }

        Err(BalanceUpdateError::AdminRequired)
    }
}

/// In-process directory, seeded from configuration when no database is used.
#[derive(Default)]
pub struct MemoryAdminDirectory {
    by_user_id: HashMap<String, AdminRecord>,
    by_email: HashMap<String, AdminRecord>,
}

impl MemoryAdminDirectory {
    pub fn new(admins: impl IntoIterator<Item = AdminRecord>) -> Self {
        let mut dir = Self::default();
        for admin in admins {
            if let Some(email) = &admin.email {
                dir.by_email.insert(email.to_lowercase(), admin.clone());
            }
            if !admin.user_id.is_empty() {
                dir.by_user_id.insert(admin.user_id.clone(), admin);
            }
        }
        dir
    }
}

#[async_trait]
impl AdminDirectory for MemoryAdminDirectory {
    async fn find_by_user_id(&self, user_id: &str) -> Result<Option<AdminRecord>, sqlx::Error> {
        Ok(self.by_user_id.get(user_id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<AdminRecord>, sqlx::Error> {
        Ok(self.by_email.get(&email.to_lowercase()).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity(user_id: &str, email: Option<&str>) -> Identity {
        Identity {
            user_id: user_id.to_string(),
            email: email.map(str::to_string),
        }
    }

    fn directory() -> Arc<dyn AdminDirectory> {
        Arc::new(MemoryAdminDirectory::new([
            AdminRecord {
                user_id: "admin-1".to_string(),
                email: Some("ops@example.com".to_string()),
            },
            AdminRecord {
                user_id: String::new(),
                email: Some("Legacy@Example.com".to_string()),
            },
        ]))
    }

    #[tokio::test]
    async fn test_match_by_user_id() {
        let gate = AdminGate::new(directory(), false);
        let admin = gate.authorize(&identity("admin-1", None)).await.unwrap();
        assert_eq!(admin.user_id, "admin-1");
    }

    #[tokio::test]
    async fn test_email_fallback() {
        let who = identity("user-9", Some("legacy@example.com"));

        let gate = AdminGate::new(directory(), true);
        let admin = gate.authorize(&who).await.unwrap();
        assert_eq!(admin.user_id, "user-9");

        let gate = AdminGate::new(directory(), false);
        assert_eq!(
            gate.authorize(&who).await,
            Err(BalanceUpdateError::AdminRequired)
        );
    }

    #[tokio::test]
    async fn test_non_admin_rejected() {
        let gate = AdminGate::new(directory(), true);
        assert_eq!(
            gate.authorize(&identity("user-2", Some("someone@example.com")))
                .await,
            Err(BalanceUpdateError::AdminRequired)
        );
        assert_eq!(
            gate.authorize(&identity("user-2", None)).await,
            Err(BalanceUpdateError::AdminRequired)
        );
    }
}
