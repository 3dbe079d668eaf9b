use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Instant;

use crate::cash_flows::{json_kind, numeric_field};
use crate::compounding::{add, div, mul, sub};
use crate::error::ForwardLabError;
use crate::types::{with_metadata, ComputationOutput, Money, Rate};
use crate::ForwardLabResult;

const MONTHS_PER_YEAR: Decimal = dec!(12);

// ---------------------------------------------------------------------------
// Core formulas
// ---------------------------------------------------------------------------

/// Raw settlement figures of an FRA.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FraSettlement {
    /// (end - start) / 12.
    pub period_fraction: Decimal,
    pub fixed_interest: Money,
    pub floating_interest: Money,
    /// floating - fixed, paid at the end of the interest period.
    pub net_payment: Money,
    /// net / (1 + MRR * period_fraction), at the start of the interest period.
    pub cash_settlement_pv: Money,
}

/// Year fraction of the interest period between two month offsets.
///
/// The day-count basis is checked here but does not enter the fraction.
pub fn period_fraction(start_period: i64, end_period: i64, days_in_year_basis: i64) -> ForwardLabResult<Decimal> {
    for (field, months) in [("start_period", start_period), ("end_period", end_period)] {
        if months < 0 {
            return Err(ForwardLabError::domain(
                field,
                format!("{field} cannot be negative (got {months})"),
            ));
        }
    }
    if end_period <= start_period {
        return Err(ForwardLabError::domain(
            "end_period",
            format!("end_period ({end_period}) must be greater than start_period ({start_period})"),
        ));
    }
    if days_in_year_basis <= 0 {
        return Err(ForwardLabError::domain(
            "days_in_year_basis",
            format!("Day-count basis must be positive (got {days_in_year_basis})"),
        ));
    }
    Ok(Decimal::from(end_period - start_period) / MONTHS_PER_YEAR)
}

pub fn fra_settlement(
    notional: Money,
    fixed_rate: Rate,
    start_period: i64,
    end_period: i64,
    days_in_year_basis: i64,
    market_reference_rate: Rate,
) -> ForwardLabResult<FraSettlement> {
    ensure_positive_notional(notional)?;
    let pf = period_fraction(start_period, end_period, days_in_year_basis)?;

    let fixed_interest = period_interest(notional, fixed_rate, pf)?;
    let floating_interest = period_interest(notional, market_reference_rate, pf)?;
    let net_payment = sub(floating_interest, fixed_interest)?;

    let denominator = add(Decimal::ONE, mul(market_reference_rate, pf)?)?;
    if denominator <= Decimal::ZERO {
        return Err(ForwardLabError::domain(
            "market_reference_rate",
            format!("Discount denominator 1 + MRR * period_fraction = {denominator} must be > 0"),
        ));
    }

    Ok(FraSettlement {
        period_fraction: pf,
        fixed_interest,
        floating_interest,
        net_payment,
        cash_settlement_pv: div(net_payment, denominator)?,
    })
}

pub(crate) fn ensure_positive_notional(notional: Money) -> ForwardLabResult<()> {
    if notional <= Decimal::ZERO {
        return Err(ForwardLabError::domain(
            "notional",
            format!("Notional must be positive (got {notional})"),
        ));
    }
    Ok(())
}

/// notional * rate * period_fraction.
pub(crate) fn period_interest(notional: Money, rate: Rate, pf: Decimal) -> ForwardLabResult<Money> {
    mul(mul(notional, rate)?, pf)
}

// ---------------------------------------------------------------------------
// Term sheet
// ---------------------------------------------------------------------------

/// FRA term sheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FraInput {
    pub notional: Money,
    /// Implied forward (fixed) rate agreed at inception.
    pub fixed_rate: Rate,
    /// Months from today to the start of the interest period.
    pub start_period: i64,
    /// Months from today to the end of the interest period.
    pub end_period: i64,
    pub days_in_year_basis: i64,
    /// Floating reference rate fixed for the period.
    pub market_reference_rate: Rate,
}

/// Build a term sheet from decoded JSON, keeping the error taxonomy.
///
/// Period and basis fields must be JSON integers: `3.0`, strings, null,
/// lists and booleans are type errors, not coerced.
pub fn parse_fra_term_sheet(value: &Value) -> ForwardLabResult<FraInput> {
    let record = value.as_object().ok_or_else(|| {
        ForwardLabError::structure("fra", "FRA term sheet must be an object")
    })?;
    let get = |field: &str| {
        record.get(field).ok_or_else(|| {
            ForwardLabError::structure(field, format!("FRA term sheet is missing '{field}'"))
        })
    };

    Ok(FraInput {
        notional: numeric_field("notional", get("notional")?)?,
        fixed_rate: numeric_field("fixed_rate", get("fixed_rate")?)?,
        start_period: integer_field("start_period", get("start_period")?)?,
        end_period: integer_field("end_period", get("end_period")?)?,
        days_in_year_basis: integer_field("days_in_year_basis", get("days_in_year_basis")?)?,
        market_reference_rate: numeric_field(
            "market_reference_rate",
            get("market_reference_rate")?,
        )?,
    })
}

fn integer_field(field: &str, value: &Value) -> ForwardLabResult<i64> {
    match value {
        Value::Number(n) => n.as_i64().ok_or_else(|| {
            ForwardLabError::type_kind(field, format!("must be an integer, got {n}"))
        }),
        other => Err(ForwardLabError::type_kind(
            field,
            format!("must be an integer, got {}", json_kind(other)),
        )),
    }
}

// ---------------------------------------------------------------------------
// calculate_fra_settlement
// ---------------------------------------------------------------------------

/// Who pays whom at settlement, seen from the fixed-rate payer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SettlementDirection {
    FixedPayerReceives,
    FixedPayerPays,
    ZeroSettlement,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FraOutput {
    pub period_fraction: Decimal,
    pub fixed_interest: Money,
    pub floating_interest: Money,
    pub net_payment: Money,
    pub cash_settlement_pv: Money,
    pub direction: SettlementDirection,
    pub explanation: String,
}

pub fn calculate_fra_settlement(input: &FraInput) -> ForwardLabResult<ComputationOutput<FraOutput>> {
    let start = Instant::now();
    let warnings: Vec<String> = Vec::new();

    let s = fra_settlement(
        input.notional,
        input.fixed_rate,
        input.start_period,
        input.end_period,
        input.days_in_year_basis,
        input.market_reference_rate,
    )?;

    let mrr = input.market_reference_rate;
    let fixed = input.fixed_rate;
    let (direction, explanation) = if mrr > fixed {
        (
            SettlementDirection::FixedPayerReceives,
            format!(
                "MRR {mrr} is above the fixed rate {fixed}: the fixed-rate payer receives {} \
                 at the end of the period ({} in present value)",
                s.net_payment.round_dp(2),
                s.cash_settlement_pv.round_dp(2)
            ),
        )
    } else if mrr < fixed {
        (
            SettlementDirection::FixedPayerPays,
            format!(
                "MRR {mrr} is below the fixed rate {fixed}: the fixed-rate payer pays {} \
                 at the end of the period ({} in present value)",
                s.net_payment.abs().round_dp(2),
                s.cash_settlement_pv.abs().round_dp(2)
            ),
        )
    } else {
        (
            SettlementDirection::ZeroSettlement,
            format!("MRR equals the fixed rate {fixed}: no cash settlement"),
        )
    };

    tracing::debug!(net_payment = %s.net_payment, pv = %s.cash_settlement_pv, "FRA settled");

    let output = FraOutput {
        period_fraction: s.period_fraction,
        fixed_interest: s.fixed_interest,
        floating_interest: s.floating_interest,
        net_payment: s.net_payment,
        cash_settlement_pv: s.cash_settlement_pv,
        direction,
        explanation,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "FRA Cash Settlement: (MRR - IFR) * N * pf / (1 + MRR * pf)",
        &serde_json::json!({
            "notional": input.notional.to_string(),
            "fixed_rate": fixed.to_string(),
            "market_reference_rate": mrr.to_string(),
            "start_period": input.start_period,
            "end_period": input.end_period,
            "days_in_year_basis": input.days_in_year_basis,
            "period_fraction": "(end_period - start_period) / 12",
        }),
        warnings,
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn assert_approx(actual: Decimal, expected: Decimal, tolerance: Decimal, label: &str) {
        let diff = (actual - expected).abs();
        assert!(
            diff <= tolerance,
            "{label}: expected ~{expected}, got {actual} (diff={diff}, tol={tolerance})"
        );
    }

    fn term_sheet() -> Value {
        json!({
            "notional": 10_000_000,
            "fixed_rate": 0.0525,
            "start_period": 3,
            "end_period": 6,
            "days_in_year_basis": 360,
            "market_reference_rate": 0.055
        })
    }

    #[test]
    fn test_settlement_3x6() {
        let s = fra_settlement(dec!(10000000), dec!(0.0525), 3, 6, 360, dec!(0.055)).unwrap();
        assert_eq!(s.period_fraction, dec!(0.25));
        assert_eq!(s.fixed_interest, dec!(131250));
        assert_eq!(s.floating_interest, dec!(137500));
        assert_eq!(s.net_payment, dec!(6250));
        // 6250 / 1.01375 = 6165.2281134
        assert_approx(s.cash_settlement_pv, dec!(6165.2281134), dec!(0.0001), "cash settlement");
    }

    #[test]
    fn test_equal_periods_rejected() {
        let err = fra_settlement(dec!(1000000), dec!(0.05), 3, 3, 360, dec!(0.05)).unwrap_err();
        assert!(matches!(err, ForwardLabError::Domain { .. }));
    }

    #[test]
    fn test_period_bounds() {
        assert!(period_fraction(-1, 6, 360).is_err());
        assert!(period_fraction(6, 3, 360).is_err());
        assert!(period_fraction(0, 12, 0).is_err());
        assert!(period_fraction(0, 12, -365).is_err());
        assert_eq!(period_fraction(0, 12, 365).unwrap(), Decimal::ONE);
    }

    #[test]
    fn test_negative_period_names_its_field() {
        for (start, end, expected) in [(-1, 6, "start_period"), (3, -6, "end_period")] {
            match period_fraction(start, end, 360).unwrap_err() {
                ForwardLabError::Domain { field, .. } => assert_eq!(field, expected),
                e => panic!("Expected Domain error, got {e:?}"),
            }
        }
    }

    #[test]
    fn test_interest_overflow_is_error() {
        // 5e28 * 2 exceeds the Decimal range
        let notional = dec!(50000000000000000000000000000);
        let err = fra_settlement(notional, dec!(2), 0, 12, 360, dec!(0.05)).unwrap_err();
        assert!(matches!(err, ForwardLabError::ArithmeticOverflow { .. }), "got {err:?}");

        let input = FraInput {
            notional,
            fixed_rate: dec!(2),
            start_period: 0,
            end_period: 12,
            days_in_year_basis: 360,
            market_reference_rate: dec!(0.05),
        };
        assert!(matches!(
            calculate_fra_settlement(&input),
            Err(ForwardLabError::ArithmeticOverflow { .. })
        ));
    }

    #[test]
    fn test_basis_does_not_change_fraction() {
        assert_eq!(
            period_fraction(3, 9, 360).unwrap(),
            period_fraction(3, 9, 365).unwrap()
        );
    }

    #[test]
    fn test_notional_must_be_positive() {
        assert!(fra_settlement(Decimal::ZERO, dec!(0.05), 1, 4, 360, dec!(0.05)).is_err());
        assert!(fra_settlement(dec!(-5), dec!(0.05), 1, 4, 360, dec!(0.05)).is_err());
    }

    #[test]
    fn test_non_positive_denominator_rejected() {
        // 1 + (-4) * 0.25 = 0
        let err = fra_settlement(dec!(1000), dec!(0.05), 0, 3, 360, dec!(-4)).unwrap_err();
        match err {
            ForwardLabError::Domain { field, .. } => assert_eq!(field, "market_reference_rate"),
            e => panic!("Expected Domain error, got {e:?}"),
        }
    }

    #[test]
    fn test_parse_term_sheet() {
        let input = parse_fra_term_sheet(&term_sheet()).unwrap();
        assert_eq!(input.start_period, 3);
        assert_eq!(input.end_period, 6);
        assert_eq!(input.days_in_year_basis, 360);
        assert_eq!(input.notional, dec!(10000000));
    }

    #[test]
    fn test_parse_rejects_non_integer_kinds() {
        for bad in [json!(3.0), json!("3"), json!(null), json!([3]), json!(true)] {
            let mut sheet = term_sheet();
            sheet["start_period"] = bad.clone();
            let err = parse_fra_term_sheet(&sheet).unwrap_err();
            assert!(
                matches!(err, ForwardLabError::TypeKind { .. }),
                "{bad} should be a type error, got {err:?}"
            );
        }
        let mut sheet = term_sheet();
        sheet["days_in_year_basis"] = json!(360.5);
        assert!(matches!(
            parse_fra_term_sheet(&sheet),
            Err(ForwardLabError::TypeKind { .. })
        ));
    }

    #[test]
    fn test_parse_missing_field() {
        let mut sheet = term_sheet();
        sheet.as_object_mut().unwrap().remove("market_reference_rate");
        match parse_fra_term_sheet(&sheet).unwrap_err() {
            ForwardLabError::Structure { field, .. } => assert_eq!(field, "market_reference_rate"),
            e => panic!("Expected Structure error, got {e:?}"),
        }
    }

    #[test]
    fn test_direction_narrative() {
        let mut input = parse_fra_term_sheet(&term_sheet()).unwrap();
        let out = calculate_fra_settlement(&input).unwrap();
        assert_eq!(out.result.direction, SettlementDirection::FixedPayerReceives);
        assert!(out.result.explanation.contains("receives"));

        input.market_reference_rate = dec!(0.05);
        let out = calculate_fra_settlement(&input).unwrap();
        assert_eq!(out.result.direction, SettlementDirection::FixedPayerPays);
        assert!(out.result.net_payment < Decimal::ZERO);

        input.market_reference_rate = input.fixed_rate;
        let out = calculate_fra_settlement(&input).unwrap();
        assert_eq!(out.result.direction, SettlementDirection::ZeroSettlement);
        assert_eq!(out.result.cash_settlement_pv, Decimal::ZERO);
    }
}
