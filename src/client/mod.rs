//! Balance Update Client
//!
//! Entry point for UI and tooling code that requests an administrative
//! balance change. Validates locally, sends the request exactly once, turns
//! the service envelope into a typed result and emits one notification.

pub mod error;
pub mod notify;
pub mod transport;

pub use error::{ClientError, TransportError};
pub use notify::{NotificationKind, Notifier, TracingNotifier};
pub use transport::{BalanceTransport, HttpTransport};

use std::sync::Arc;

use crate::balance::{AdjustmentRequest, BalanceUpdates, PortfolioBalance, UpdateMode};
use crate::gateway::types::ApiResponse;
use notify::{MSG_UPDATE_FAILED, MSG_UPDATE_SUCCESS};

pub const MSG_USER_ID_REQUIRED: &str = "User ID is required";
pub const MSG_REASON_REQUIRED: &str = "Reason is required and cannot be empty";
pub const MSG_FIELD_REQUIRED: &str = "At least one balance field must be provided";
pub const MSG_NO_RESPONSE: &str = "No response received";

pub struct BalanceUpdateClient {
    transport: Arc<dyn BalanceTransport>,
    notifier: Arc<dyn Notifier>,
}

impl BalanceUpdateClient {
    pub fn new(transport: Arc<dyn BalanceTransport>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            transport,
            notifier,
        }
    }

    /// Request a balance adjustment for `user_id`.
    ///
    /// `mode` must be exactly `"delta"` or `"absolute"`. Omitted fields in
    /// `updates` are left out of the request, never sent as zero.
    pub async fn update_balance(
        &self,
        user_id: &str,
        updates: BalanceUpdates,
        mode: &str,
        reason: &str,
    ) -> Result<PortfolioBalance, ClientError> {
        let result = self.submit(user_id, updates, mode, reason).await;

        match &result {
            Ok(balance) => {
                tracing::info!(user_id = %balance.user_id, mode, "Balance update accepted");
                self.notifier
                    .notify(NotificationKind::Success, MSG_UPDATE_SUCCESS);
            }
            Err(e) => {
                tracing::warn!(user_id, mode, code = e.code(), error = %e, "Balance update failed");
                let message = e.to_string();
                let message = if message.is_empty() {
                    MSG_UPDATE_FAILED
                } else {
                    message.as_str()
                };
                self.notifier.notify(NotificationKind::Failure, message);
            }
        }

        result
    }

    async fn submit(
        &self,
        user_id: &str,
        updates: BalanceUpdates,
        mode: &str,
        reason: &str,
    ) -> Result<PortfolioBalance, ClientError> {
        let request = build_request(user_id, updates, mode, reason)?;
        let payload = self.transport.invoke(&request).await?;
        interpret_response(&payload)
    }
}

/// Validate arguments and shape the wire request. Rules are checked in
/// order and the first violation is returned.
pub fn build_request(
    user_id: &str,
    updates: BalanceUpdates,
    mode: &str,
    reason: &str,
) -> Result<AdjustmentRequest, ClientError> {
    if user_id.trim().is_empty() {
        return Err(ClientError::Validation(MSG_USER_ID_REQUIRED.to_string()));
    }

    let reason = reason.trim();
    if reason.is_empty() {
        return Err(ClientError::Validation(MSG_REASON_REQUIRED.to_string()));
    }

    let mode: UpdateMode = mode.parse().map_err(ClientError::Validation)?;

    if updates.is_empty() {
        return Err(ClientError::Validation(MSG_FIELD_REQUIRED.to_string()));
    }

    Ok(AdjustmentRequest {
        user_id: user_id.to_string(),
        mode,
        updates,
        reason: reason.to_string(),
    })
}

/// Map a raw response payload to the updated balance.
pub fn interpret_response(payload: &[u8]) -> Result<PortfolioBalance, ClientError> {
    if payload.iter().all(u8::is_ascii_whitespace) {
        return Err(ClientError::Protocol(MSG_NO_RESPONSE.to_string()));
    }

    let envelope: ApiResponse<PortfolioBalance> = serde_json::from_slice(payload)
        .map_err(|e| ClientError::Protocol(format!("Malformed response: {}", e)))?;

    if envelope.success {
        return envelope
            .data
            .ok_or_else(|| ClientError::Protocol(MSG_NO_RESPONSE.to_string()));
    }

    let mut message = envelope.error.unwrap_or_default();
    if let Some(details) = envelope.details.map(|d| d.joined())
        && !details.is_empty()
    {
        message = if message.is_empty() {
            details
        } else {
            format!("{}: {}", message, details)
        };
    }
    if message.is_empty() {
        message = MSG_UPDATE_FAILED.to_string();
    }

    Err(ClientError::Application(message))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use rust_decimal_macros::dec;
    use serde_json::json;
    use std::sync::Mutex;

    /// Replays one canned outcome and records every request.
    struct MockTransport {
        outcome: Result<Vec<u8>, TransportError>,
        sent: Mutex<Vec<AdjustmentRequest>>,
    }

    impl MockTransport {
        fn replying(body: serde_json::Value) -> Arc<Self> {
            Self::with(Ok(serde_json::to_vec(&body).unwrap()))
        }

        fn with(outcome: Result<Vec<u8>, TransportError>) -> Arc<Self> {
            Arc::new(Self {
                outcome,
                sent: Mutex::new(Vec::new()),
            })
        }

        fn sent(&self) -> Vec<AdjustmentRequest> {
            self.sent.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl BalanceTransport for MockTransport {
        async fn invoke(&self, request: &AdjustmentRequest) -> Result<Vec<u8>, TransportError> {
            self.sent.lock().unwrap().push(request.clone());
            self.outcome.clone()
        }
    }

    #[derive(Default)]
    struct RecordingNotifier {
        seen: Mutex<Vec<(NotificationKind, String)>>,
    }

    impl Notifier for RecordingNotifier {
        fn notify(&self, kind: NotificationKind, message: &str) {
            self.seen.lock().unwrap().push((kind, message.to_string()));
        }
    }

    impl RecordingNotifier {
        fn seen(&self) -> Vec<(NotificationKind, String)> {
            self.seen.lock().unwrap().clone()
        }
    }

    fn client(transport: Arc<MockTransport>) -> (BalanceUpdateClient, Arc<RecordingNotifier>) {
        let notifier = Arc::new(RecordingNotifier::default());
        (BalanceUpdateClient::new(transport, notifier.clone()), notifier)
    }

    fn success_body() -> serde_json::Value {
        json!({
            "success": true,
            "data": {
                "userId": "u1",
                "cashBalance": 150.0,
                "investedAmount": 0.0,
                "freeMargin": 0.0,
                "totalValue": 150.0,
                "updatedAt": "2026-01-05T10:00:00Z"
            }
        })
    }

    #[tokio::test]
    async fn test_success_resolves_and_notifies_once() {
        let transport = MockTransport::replying(success_body());
        let (client, notifier) = client(transport.clone());

        let balance = client
            .update_balance("u1", BalanceUpdates::cash(dec!(50)), "delta", "  bonus  ")
            .await
            .unwrap();
        assert_eq!(balance.cash_balance, dec!(150));
        assert_eq!(balance.total_value, dec!(150));

        let sent = transport.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].reason, "bonus");
        assert_eq!(sent[0].mode, UpdateMode::Delta);
        assert_eq!(sent[0].updates.invested_amount, None);

        assert_eq!(
            notifier.seen(),
            vec![(NotificationKind::Success, MSG_UPDATE_SUCCESS.to_string())]
        );
    }

    #[tokio::test]
    async fn test_validation_never_reaches_transport() {
        let cases = [
            ("", BalanceUpdates::cash(dec!(1)), "delta", "r", MSG_USER_ID_REQUIRED),
            ("u1", BalanceUpdates::cash(dec!(1)), "delta", "   ", MSG_REASON_REQUIRED),
            ("u1", BalanceUpdates::default(), "absolute", "r", MSG_FIELD_REQUIRED),
        ];

        for (user_id, updates, mode, reason, expected) in cases {
            let transport = MockTransport::replying(success_body());
            let (client, notifier) = client(transport.clone());
            let err = client
                .update_balance(user_id, updates, mode, reason)
                .await
                .unwrap_err();
            assert_eq!(err, ClientError::Validation(expected.to_string()));
            assert!(transport.sent().is_empty());
            assert_eq!(
                notifier.seen(),
                vec![(NotificationKind::Failure, expected.to_string())]
            );
        }
    }

    #[tokio::test]
    async fn test_mode_must_match_exactly() {
        for mode in ["bogus", "Delta", "ABSOLUTE", ""] {
            let transport = MockTransport::replying(success_body());
            let (client, _) = client(transport.clone());
            let err = client
                .update_balance("u1", BalanceUpdates::cash(dec!(1)), mode, "r")
                .await
                .unwrap_err();
            assert!(matches!(err, ClientError::Validation(_)), "mode {mode:?}");
            assert!(transport.sent().is_empty());
        }
    }

    #[tokio::test]
    async fn test_zero_is_sent_not_dropped() {
        let transport = MockTransport::replying(success_body());
        let (client, _) = client(transport.clone());
        let updates = BalanceUpdates {
            cash_balance: Some(dec!(1000)),
            invested_amount: Some(dec!(0)),
            free_margin: Some(dec!(0)),
        };
        client
            .update_balance("u1", updates, "absolute", "seed")
            .await
            .unwrap();

        let wire = serde_json::to_value(&transport.sent()[0]).unwrap();
        assert_eq!(wire["investedAmount"], 0.0);
        assert_eq!(wire["freeMargin"], 0.0);
    }

    #[tokio::test]
    async fn test_application_error_joins_details() {
        let transport = MockTransport::replying(json!({
            "success": false,
            "error": "Validation failed",
            "details": ["a", "b"]
        }));
        let (client, notifier) = client(transport);

        let err = client
            .update_balance("u1", BalanceUpdates::cash(dec!(1)), "delta", "r")
            .await
            .unwrap_err();
        assert_eq!(err, ClientError::Application("Validation failed: a, b".to_string()));
        assert_eq!(
            notifier.seen(),
            vec![(NotificationKind::Failure, "Validation failed: a, b".to_string())]
        );
    }

    #[tokio::test]
    async fn test_application_error_without_details() {
        let transport = MockTransport::replying(json!({
            "success": false,
            "error": "Access denied — admin privileges required"
        }));
        let (client, _) = client(transport);
        let err = client
            .update_balance("u1", BalanceUpdates::cash(dec!(1)), "delta", "r")
            .await
            .unwrap_err();
        assert_eq!(
            err,
            ClientError::Application("Access denied — admin privileges required".to_string())
        );
    }

    #[tokio::test]
    async fn test_empty_failure_uses_fallback_message() {
        let transport = MockTransport::replying(json!({ "success": false }));
        let (client, notifier) = client(transport);
        let err = client
            .update_balance("u1", BalanceUpdates::cash(dec!(1)), "delta", "r")
            .await
            .unwrap_err();
        assert_eq!(err, ClientError::Application(MSG_UPDATE_FAILED.to_string()));
        assert_eq!(notifier.seen()[0].1, MSG_UPDATE_FAILED);
    }

    #[tokio::test]
    async fn test_empty_payload_is_protocol_error() {
        let transport = MockTransport::with(Ok(Vec::new()));
        let (client, _) = client(transport.clone());
        let err = client
            .update_balance("u1", BalanceUpdates::cash(dec!(1)), "delta", "r")
            .await
            .unwrap_err();
        assert_eq!(err, ClientError::Protocol(MSG_NO_RESPONSE.to_string()));
        assert_eq!(transport.sent().len(), 1);
    }

    #[tokio::test]
    async fn test_garbage_payload_is_protocol_error() {
        let transport = MockTransport::with(Ok(b"<html>bad gateway</html>".to_vec()));
        let (client, _) = client(transport);
        let err = client
            .update_balance("u1", BalanceUpdates::cash(dec!(1)), "delta", "r")
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Protocol(_)));
    }

    #[tokio::test]
    async fn test_transport_failure_wraps_message() {
        let transport = MockTransport::with(Err(TransportError("connection refused".to_string())));
        let (client, notifier) = client(transport.clone());
        let err = client
            .update_balance("u1", BalanceUpdates::cash(dec!(1)), "delta", "r")
            .await
            .unwrap_err();
        assert_eq!(err, ClientError::Transport("connection refused".to_string()));
        assert_eq!(transport.sent().len(), 1);
        assert_eq!(notifier.seen().len(), 1);
    }
}
