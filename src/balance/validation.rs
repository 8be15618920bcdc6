//! Server-side validation of adjustment payloads.
//!
//! The client validates too, but its requests are untrusted here. Every
//! violated rule is reported, not just the first one.

use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::str::FromStr;

use super::types::UpdateMode;

pub const MSG_USER_ID: &str = "userId is required and must be a non-empty string";
pub const MSG_REASON: &str = "reason is required and cannot be empty";
pub const MSG_MODE: &str = "mode must be either 'delta' or 'absolute'";
pub const MSG_NO_FIELDS: &str =
    "At least one balance field (cashBalance, investedAmount, freeMargin) must be provided";

/// Payload as submitted. Every field is kept loosely typed so that a
/// wrongly-typed value becomes a rule violation instead of a parse failure.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawAdjustment {
    #[serde(default)]
    user_id: Option<Value>,
    #[serde(default)]
    mode: Option<Value>,
    #[serde(default)]
    reason: Option<Value>,
    #[serde(default)]
    cash_balance: Option<Value>,
    #[serde(default)]
    invested_amount: Option<Value>,
    #[serde(default)]
    free_margin: Option<Value>,
}

/// A submitted amount after numeric coercion.
#[derive(Debug, Clone, PartialEq)]
pub enum AmountInput {
    Value(Decimal),
    /// Present but not coercible to a number; fails the compute step.
    NotANumber(String),
}

impl AmountInput {
    fn coerce(raw: &Value) -> Self {
        let parsed = match raw {
            Value::Number(n) => parse_decimal(&n.to_string()),
            Value::String(s) => parse_decimal(s.trim()),
            _ => None,
        };
        match parsed {
            Some(d) => AmountInput::Value(d),
            None => AmountInput::NotANumber(raw.to_string()),
        }
    }
}

fn parse_decimal(s: &str) -> Option<Decimal> {
    if s.is_empty() {
        return None;
    }
    Decimal::from_str(s)
        .or_else(|_| Decimal::from_scientific(s))
        .ok()
}

/// Requested amounts per field, `None` when the field was omitted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestedAmounts {
    pub cash_balance: Option<AmountInput>,
    pub invested_amount: Option<AmountInput>,
    pub free_margin: Option<AmountInput>,
}

impl RequestedAmounts {
    pub fn is_empty(&self) -> bool {
        self.cash_balance.is_none() && self.invested_amount.is_none() && self.free_margin.is_none()
    }
}

/// A payload that passed every rule.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedAdjustment {
    pub user_id: String,
    pub mode: UpdateMode,
    /// Trimmed.
    pub reason: String,
    pub amounts: RequestedAmounts,
    /// The numeric fields exactly as submitted, for the audit trail.
    pub submitted: Value,
}

/// Parse and validate a request body. An empty body is treated as `{}`.
pub fn validate_payload(body: &[u8]) -> Result<ValidatedAdjustment, Vec<String>> {
    let raw = parse_body(body)?;
    validate(raw)
}

fn parse_body(body: &[u8]) -> Result<RawAdjustment, Vec<String>> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(RawAdjustment::default());
    }
    match serde_json::from_slice::<Value>(body) {
        Ok(value @ Value::Object(_)) => serde_json::from_value(value)
            .map_err(|e| vec![format!("Request body is not a valid adjustment: {}", e)]),
        Ok(_) => Err(vec!["Request body must be a JSON object".to_string()]),
        Err(e) => Err(vec![format!("Request body is not valid JSON: {}", e)]),
    }
}

fn validate(raw: RawAdjustment) -> Result<ValidatedAdjustment, Vec<String>> {
    let mut violations = Vec::new();

    let user_id = match &raw.user_id {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s.clone()),
        _ => {
            violations.push(MSG_USER_ID.to_string());
            None
        }
    };

    let reason = match &raw.reason {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s.trim().to_string()),
        _ => {
            violations.push(MSG_REASON.to_string());
            None
        }
    };

    let mode = match &raw.mode {
        Some(Value::String(s)) => s.parse::<UpdateMode>().ok(),
        _ => None,
    };
    if mode.is_none() {
        violations.push(MSG_MODE.to_string());
    }

    let mut submitted = Map::new();
    let mut take = |name: &str, value: &Option<Value>| {
        value.as_ref().map(|v| {
            submitted.insert(name.to_string(), v.clone());
            AmountInput::coerce(v)
        })
    };
    let amounts = RequestedAmounts {
        cash_balance: take("cashBalance", &raw.cash_balance),
        invested_amount: take("investedAmount", &raw.invested_amount),
        free_margin: take("freeMargin", &raw.free_margin),
    };
    if amounts.is_empty() {
        violations.push(MSG_NO_FIELDS.to_string());
    }

    match (user_id, reason, mode) {
        (Some(user_id), Some(reason), Some(mode)) if violations.is_empty() => {
            Ok(ValidatedAdjustment {
                user_id,
                mode,
                reason,
                amounts,
                submitted: Value::Object(submitted),
            })
        }
        _ => Err(violations),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    fn check(body: Value) -> Result<ValidatedAdjustment, Vec<String>> {
        validate_payload(body.to_string().as_bytes())
    }

    #[test]
    fn test_valid_delta_request() {
        let adj = check(json!({
            "userId": "u1",
            "mode": "delta",
            "cashBalance": 50,
            "reason": "  bonus  "
        }))
        .unwrap();
        assert_eq!(adj.user_id, "u1");
        assert_eq!(adj.mode, UpdateMode::Delta);
        assert_eq!(adj.reason, "bonus");
        assert_eq!(adj.amounts.cash_balance, Some(AmountInput::Value(dec!(50))));
        assert_eq!(adj.amounts.invested_amount, None);
        assert_eq!(adj.submitted, json!({ "cashBalance": 50 }));
    }

    #[test]
    fn test_empty_body_is_empty_object() {
        let violations = validate_payload(b"").unwrap_err();
        assert_eq!(violations.len(), 4);
        assert_eq!(validate_payload(b"  \n").unwrap_err(), violations);
        assert_eq!(check(json!({})).unwrap_err(), violations);
    }

    #[test]
    fn test_collects_every_violation() {
        let violations = check(json!({
            "userId": 42,
            "mode": "bogus",
            "reason": "   "
        }))
        .unwrap_err();
        assert_eq!(
            violations,
            vec![
                MSG_USER_ID.to_string(),
                MSG_REASON.to_string(),
                MSG_MODE.to_string(),
                MSG_NO_FIELDS.to_string(),
            ]
        );
    }

    #[test]
    fn test_bogus_mode_only() {
        let violations = check(json!({
            "userId": "u1",
            "mode": "bogus",
            "cashBalance": 1,
            "reason": "x"
        }))
        .unwrap_err();
        assert_eq!(violations, vec![MSG_MODE.to_string()]);
    }

    #[test]
    fn test_no_fields_rejected() {
        let violations = check(json!({
            "userId": "u1",
            "mode": "absolute",
            "reason": "seed"
        }))
        .unwrap_err();
        assert_eq!(violations, vec![MSG_NO_FIELDS.to_string()]);
    }

    #[test]
    fn test_null_fields_are_absent() {
        let violations = check(json!({
            "userId": "u1",
            "mode": "absolute",
            "cashBalance": null,
            "reason": "seed"
        }))
        .unwrap_err();
        assert_eq!(violations, vec![MSG_NO_FIELDS.to_string()]);
    }

    #[test]
    fn test_non_numeric_amount_passes_validation() {
        let adj = check(json!({
            "userId": "u1",
            "mode": "delta",
            "cashBalance": "abc",
            "freeMargin": "12.5",
            "reason": "x"
        }))
        .unwrap();
        assert!(matches!(
            adj.amounts.cash_balance,
            Some(AmountInput::NotANumber(_))
        ));
        assert_eq!(adj.amounts.free_margin, Some(AmountInput::Value(dec!(12.5))));
    }

    #[test]
    fn test_exponent_numbers_coerce() {
        let adj = check(json!({
            "userId": "u1",
            "mode": "absolute",
            "investedAmount": 1e20,
            "reason": "x"
        }))
        .unwrap();
        assert_eq!(
            adj.amounts.invested_amount,
            Some(AmountInput::Value(dec!(100000000000000000000)))
        );
    }

    #[test]
    fn test_non_object_body_rejected() {
        assert_eq!(validate_payload(b"[1,2]").unwrap_err().len(), 1);
        assert_eq!(validate_payload(b"{not json").unwrap_err().len(), 1);
    }
}
