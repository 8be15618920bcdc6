//! Remote invocation of the adjustment endpoint

use async_trait::async_trait;
use std::time::Duration;

use super::error::TransportError;
use crate::balance::AdjustmentRequest;

pub const ADJUST_BALANCE_PATH: &str = "/api/v1/admin/balance";

#[async_trait]
pub trait BalanceTransport: Send + Sync {
    /// Send `request` once and return the raw response payload, which may be
    /// empty. Non-2xx statuses still carry the service's envelope and are not
    /// transport failures.
    async fn invoke(&self, request: &AdjustmentRequest) -> Result<Vec<u8>, TransportError>;
}

/// `reqwest` transport with a bearer session token.
pub struct HttpTransport {
    client: reqwest::Client,
    endpoint: String,
    token: String,
}

impl HttpTransport {
    pub fn new(base_url: &str, token: impl Into<String>, timeout: Duration) -> reqwest::Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: format!("{}{}", base_url.trim_end_matches('/'), ADJUST_BALANCE_PATH),
            token: token.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl BalanceTransport for HttpTransport {
    async fn invoke(&self, request: &AdjustmentRequest) -> Result<Vec<u8>, TransportError> {
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.token)
            .json(request)
            .send()
            .await
            .map_err(|e| TransportError(e.to_string()))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| TransportError(e.to_string()))?;

        tracing::debug!(status = %status, bytes = body.len(), "Balance update response");
        Ok(body.to_vec())
    }
}
