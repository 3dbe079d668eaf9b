//! Discrete cash flows (dividends, storage costs, other carry) and their
//! validation from decoded JSON.
//!
//! Parsing is strict: every failure surfaces as a typed
//! [`ForwardLabError`]. Callers that prefer to degrade to an empty set do so
//! themselves.

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::compounding::mul;
use crate::error::ForwardLabError;
use crate::types::{Money, Years};
use crate::ForwardLabResult;

/// A single income or cost event, dated relative to contract inception.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "serde_json::Value")]
pub struct CashFlow {
    pub amount: Money,
    pub time_from_t0: Years,
}

impl CashFlow {
    pub fn new(amount: Money, time_from_t0: Years) -> ForwardLabResult<Self> {
        if time_from_t0 < Decimal::ZERO {
            return Err(ForwardLabError::domain(
                "time_from_t0",
                format!("Cash flow time {time_from_t0} cannot be negative"),
            ));
        }
        Ok(CashFlow {
            amount,
            time_from_t0,
        })
    }
}

impl TryFrom<Value> for CashFlow {
    type Error = ForwardLabError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        cash_flow_from_value(&value)
    }
}

/// Parse cash flows from JSON text.
///
/// Blank input is an empty set. Anything else must decode to a list of
/// `{"amount": <number>, "time_from_t0": <number>}` records.
pub fn parse_cash_flows(text: &str) -> ForwardLabResult<Vec<CashFlow>> {
    if text.trim().is_empty() {
        return Ok(Vec::new());
    }
    let value: Value = serde_json::from_str(text)
        .map_err(|e| ForwardLabError::Format(format!("Invalid JSON for cash flows: {e}")))?;
    cash_flows_from_value(&value)
}

/// Validate an already-decoded value as a list of cash flows. Order is preserved.
pub fn cash_flows_from_value(value: &Value) -> ForwardLabResult<Vec<CashFlow>> {
    let items = value.as_array().ok_or_else(|| {
        ForwardLabError::structure(
            "cash_flows",
            "Cash flow input must be a list of objects, not a single value",
        )
    })?;
    items.iter().map(cash_flow_from_value).collect()
}

fn cash_flow_from_value(item: &Value) -> ForwardLabResult<CashFlow> {
    let record = item.as_object().ok_or_else(|| {
        ForwardLabError::structure("cash_flow", "Each cash flow must be an object")
    })?;
    let amount = record.get("amount").ok_or_else(|| {
        ForwardLabError::structure("amount", "Cash flow is missing the 'amount' key")
    })?;
    let time = record.get("time_from_t0").ok_or_else(|| {
        ForwardLabError::structure(
            "time_from_t0",
            "Cash flow is missing the 'time_from_t0' key",
        )
    })?;
    CashFlow::new(
        numeric_field("amount", amount)?,
        numeric_field("time_from_t0", time)?,
    )
}

/// Read a JSON number as Decimal. Booleans, strings and null are rejected.
pub(crate) fn numeric_field(field: &str, value: &Value) -> ForwardLabResult<Decimal> {
    let number = match value {
        Value::Number(n) => n,
        other => {
            return Err(ForwardLabError::type_kind(
                field,
                format!("must be a number, got {}", json_kind(other)),
            ))
        }
    };
    if let Some(i) = number.as_i64() {
        return Ok(Decimal::from(i));
    }
    if let Some(u) = number.as_u64() {
        return Ok(Decimal::from(u));
    }
    number
        .as_f64()
        .and_then(Decimal::from_f64)
        .ok_or_else(|| {
            ForwardLabError::type_kind(field, format!("{number} is not representable as a decimal"))
        })
}

pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "object",
    }
}

/// A copy of `flows` with every amount multiplied by `multiplier`.
pub fn scale_cash_flows(flows: &[CashFlow], multiplier: Decimal) -> ForwardLabResult<Vec<CashFlow>> {
    flows
        .iter()
        .map(|cf| -> ForwardLabResult<CashFlow> {
            Ok(CashFlow {
                amount: mul(cf.amount, multiplier)?,
                time_from_t0: cf.time_from_t0,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_parse_valid_list_preserves_order() {
        let flows = parse_cash_flows(
            r#"[{"amount": 2.5, "time_from_t0": 0.75}, {"amount": 2, "time_from_t0": 0.25}]"#,
        )
        .unwrap();
        assert_eq!(flows.len(), 2);
        assert_eq!(flows[0].amount, dec!(2.5));
        assert_eq!(flows[0].time_from_t0, dec!(0.75));
        assert_eq!(flows[1].amount, dec!(2));
        assert_eq!(flows[1].time_from_t0, dec!(0.25));
    }

    #[test]
    fn test_parse_blank_and_empty_list() {
        assert!(parse_cash_flows("").unwrap().is_empty());
        assert!(parse_cash_flows("   \n").unwrap().is_empty());
        assert!(parse_cash_flows("[]").unwrap().is_empty());
    }

    #[test]
    fn test_malformed_text_is_format_error() {
        let err = parse_cash_flows(r#"[{"amount": 1.0, "time_from_t0": }]"#).unwrap_err();
        assert!(matches!(err, ForwardLabError::Format(_)), "got {err:?}");
    }

    #[test]
    fn test_single_record_is_structure_error() {
        let err = parse_cash_flows(r#"{"amount": 1.0, "time_from_t0": 0.5}"#).unwrap_err();
        match err {
            ForwardLabError::Structure { field, .. } => assert_eq!(field, "cash_flows"),
            e => panic!("Expected Structure error, got {e:?}"),
        }
    }

    #[test]
    fn test_missing_field_is_structure_error() {
        let err = parse_cash_flows(r#"[{"amount": 1.0}]"#).unwrap_err();
        match err {
            ForwardLabError::Structure { field, .. } => assert_eq!(field, "time_from_t0"),
            e => panic!("Expected Structure error, got {e:?}"),
        }
        let err = parse_cash_flows(r#"[3.0]"#).unwrap_err();
        assert!(matches!(err, ForwardLabError::Structure { .. }));
    }

    #[test]
    fn test_boolean_is_not_numeric() {
        let err = parse_cash_flows(r#"[{"amount": true, "time_from_t0": 0.5}]"#).unwrap_err();
        match err {
            ForwardLabError::TypeKind { field, reason } => {
                assert_eq!(field, "amount");
                assert!(reason.contains("boolean"));
            }
            e => panic!("Expected TypeKind error, got {e:?}"),
        }
    }

    #[test]
    fn test_string_amount_is_type_error() {
        let err = parse_cash_flows(r#"[{"amount": "10", "time_from_t0": 0.5}]"#).unwrap_err();
        assert!(matches!(err, ForwardLabError::TypeKind { .. }));
    }

    #[test]
    fn test_negative_time_is_domain_error() {
        let err = parse_cash_flows(r#"[{"amount": 1, "time_from_t0": -0.1}]"#).unwrap_err();
        match err {
            ForwardLabError::Domain { field, .. } => assert_eq!(field, "time_from_t0"),
            e => panic!("Expected Domain error, got {e:?}"),
        }
    }

    #[test]
    fn test_extra_keys_ignored() {
        let flows =
            parse_cash_flows(r#"[{"amount": 1, "time_from_t0": 0.5, "label": "Q2 dividend"}]"#)
                .unwrap();
        assert_eq!(flows.len(), 1);
    }

    #[test]
    fn test_deserialize_goes_through_validation() {
        let ok: Vec<CashFlow> =
            serde_json::from_str(r#"[{"amount": 10, "time_from_t0": 0.5}]"#).unwrap();
        assert_eq!(ok[0].amount, dec!(10));
        let bad: Result<Vec<CashFlow>, _> =
            serde_json::from_str(r#"[{"amount": 10, "time_from_t0": -1}]"#);
        assert!(bad.is_err());
    }

    #[test]
    fn test_scale_cash_flows() {
        let flows = vec![CashFlow::new(dec!(2), dec!(0.25)).unwrap()];
        let doubled = scale_cash_flows(&flows, dec!(2)).unwrap();
        assert_eq!(doubled[0].amount, dec!(4));
        assert_eq!(doubled[0].time_from_t0, dec!(0.25));
        assert_eq!(flows[0].amount, dec!(2));
    }

    #[test]
    fn test_scale_overflow_is_error() {
        let flows = vec![CashFlow::new(Decimal::MAX, Decimal::ONE).unwrap()];
        assert!(matches!(
            scale_cash_flows(&flows, dec!(2)),
            Err(ForwardLabError::ArithmeticOverflow { .. })
        ));
    }
}
