//! Balance Update Service
//!
//! Authoritative handler for administrative balance adjustments:
//!
//! ```text
//! credential ─▶ identity ─▶ admin gate ─▶ validate ─▶ lock+compute+write ─▶ audit outbox
//! ```
//!
//! Every step either passes or aborts the request with a
//! [`BalanceUpdateError`]; the audit step never aborts.

use std::sync::Arc;
use tracing::{info, warn};

use super::compute;
use super::error::BalanceUpdateError;
use super::store::BalanceStore;
use super::types::PortfolioBalance;
use super::validation;
use crate::admin::{AdminGate, AdminRecord};
use crate::audit::{AuditOutbox, AuditRecord, AuditSink};
use crate::user_auth::{IdentityResolver, bearer_token};

pub const DEFAULT_AUDIT_HISTORY_LIMIT: u32 = 50;
pub const MAX_AUDIT_HISTORY_LIMIT: u32 = 200;

pub struct BalanceUpdateService {
    identities: Arc<dyn IdentityResolver>,
    admins: AdminGate,
    store: Arc<dyn BalanceStore>,
    audit: AuditOutbox,
    audit_log: Arc<dyn AuditSink>,
}

impl BalanceUpdateService {
    pub fn new(
        identities: Arc<dyn IdentityResolver>,
        admins: AdminGate,
        store: Arc<dyn BalanceStore>,
        audit: AuditOutbox,
        audit_log: Arc<dyn AuditSink>,
    ) -> Self {
        Self {
            identities,
            admins,
            store,
            audit,
            audit_log,
        }
    }

    /// Authenticate the `Authorization` header value and require an admin.
    pub async fn authenticate_admin(
        &self,
        authorization: Option<&str>,
    ) -> Result<AdminRecord, BalanceUpdateError> {
        let token = bearer_token(authorization)?;
        let identity = self.identities.resolve(token).await?;

        self.admins.authorize(&identity).await.inspect_err(|e| {
            if *e == BalanceUpdateError::AdminRequired {
                warn!(user_id = %identity.user_id, "Balance adjustment denied: not an admin");
            }
        })
    }

    /// Apply one adjustment request.
    ///
    /// `payload` is the raw JSON body; empty means `{}`.
    pub async fn handle(
        &self,
        authorization: Option<&str>,
        payload: &[u8],
    ) -> Result<PortfolioBalance, BalanceUpdateError> {
        let admin = self.authenticate_admin(authorization).await?;

        let adjustment =
            validation::validate_payload(payload).map_err(BalanceUpdateError::Validation)?;

        let change = self
            .store
            .adjust(&adjustment.user_id, &|current| {
                compute::apply(current, adjustment.mode, &adjustment.amounts)
            })
            .await
            .inspect_err(|e| {
                warn!(
                    admin_user_id = %admin.user_id,
                    user_id = %adjustment.user_id,
                    mode = %adjustment.mode,
                    store = self.store.name(),
                    error = %e,
                    details = ?e.details(),
                    "Balance adjustment aborted"
                );
            })?;

        info!(
            admin_user_id = %admin.user_id,
            user_id = %adjustment.user_id,
            mode = %adjustment.mode,
            created = change.created,
            cash_balance = %change.after.cash_balance,
            invested_amount = %change.after.invested_amount,
            free_margin = %change.after.free_margin,
            total_value = %change.after.total_value,
            "Balance adjusted"
        );

        // Committed already; a dropped audit record is logged by the outbox.
        let _ = self
            .audit
            .enqueue(AuditRecord::balance_update(&admin, &adjustment, &change));

        Ok(change.after)
    }

    /// Current balance of `user_id`; zeros when the user has no row.
    pub async fn balance(
        &self,
        authorization: Option<&str>,
        user_id: &str,
    ) -> Result<PortfolioBalance, BalanceUpdateError> {
        self.authenticate_admin(authorization).await?;
        if user_id.trim().is_empty() {
            return Err(BalanceUpdateError::Validation(vec![
                validation::MSG_USER_ID.to_string(),
            ]));
        }

        Ok(self
            .store
            .get_balance(user_id)
            .await?
            .unwrap_or_else(|| PortfolioBalance::empty(user_id)))
    }

    /// Most recent audit records for `user_id`, newest first.
    pub async fn audit_history(
        &self,
        authorization: Option<&str>,
        user_id: &str,
        limit: Option<u32>,
    ) -> Result<Vec<AuditRecord>, BalanceUpdateError> {
        self.authenticate_admin(authorization).await?;
        let limit = limit
            .unwrap_or(DEFAULT_AUDIT_HISTORY_LIMIT)
            .clamp(1, MAX_AUDIT_HISTORY_LIMIT);

        self.audit_log
            .recent(user_id, limit)
            .await
            .map_err(|e| BalanceUpdateError::AuditRead(e.to_string()))
    }
}
