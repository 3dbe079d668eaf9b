use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use super::{ensure_non_negative, remaining_time};
use crate::cash_flows::CashFlow;
use crate::compounding::{add, discrete_discount, discrete_growth, mul, sub};
use crate::time_value::present_value;
use crate::types::{with_metadata, ComputationOutput, MarketCondition, Money, Position, Rate, Years};
use crate::ForwardLabResult;

// ---------------------------------------------------------------------------
// Core formulas
// ---------------------------------------------------------------------------

/// No-arbitrage forward price with discrete income and costs:
///
///   F0(T) = (S0 - PV0(I) + PV0(C)) * (1 + r)^T
///
/// Only flows dated within `[0, T]` enter the present values.
pub fn forward_price_discrete(
    spot: Money,
    rate: Rate,
    maturity: Years,
    dividends: &[CashFlow],
    costs: &[CashFlow],
) -> ForwardLabResult<Money> {
    ensure_non_negative("spot_price", spot)?;
    ensure_non_negative("maturity", maturity)?;
    let growth = discrete_growth(rate, maturity)?;

    let pv_income = present_value(dividends, rate, Decimal::ZERO, maturity)?;
    let pv_costs = present_value(costs, rate, Decimal::ZERO, maturity)?;

    mul(add(sub(spot, pv_income)?, pv_costs)?, growth)
}

/// Pieces of a discrete-convention MTM valuation at time t.
#[derive(Debug, Clone, Copy)]
struct MtmComponents {
    pv_remaining_income: Money,
    pv_remaining_costs: Money,
    remaining_time: Years,
    discount_factor: Decimal,
    long_value: Money,
}

fn mtm_components(
    spot: Money,
    forward_price: Money,
    rate: Rate,
    maturity: Years,
    t: Years,
    dividends: &[CashFlow],
    costs: &[CashFlow],
) -> ForwardLabResult<MtmComponents> {
    ensure_non_negative("current_spot", spot)?;
    let remaining = remaining_time(maturity, t)?;
    let discount_factor = discrete_discount(rate, remaining)?;

    let pv_remaining_income = present_value(dividends, rate, t, maturity)?;
    let pv_remaining_costs = present_value(costs, rate, t, maturity)?;

    let long_value = sub(
        add(sub(spot, pv_remaining_income)?, pv_remaining_costs)?,
        mul(forward_price, discount_factor)?,
    )?;

    Ok(MtmComponents {
        pv_remaining_income,
        pv_remaining_costs,
        remaining_time: remaining,
        discount_factor,
        long_value,
    })
}

/// Mark-to-market of a long forward at time t under discrete compounding:
///
///   Vt(T) = (St - PVt(I) + PVt(C)) - F0(T) * (1 + r)^-(T - t)
///
/// Only flows still to come (dated in `[t, T]`) count. At t == T this reduces
/// to St - F0(T). Negate for the short side.
pub fn mtm_discrete(
    spot: Money,
    forward_price: Money,
    rate: Rate,
    maturity: Years,
    t: Years,
    dividends: &[CashFlow],
    costs: &[CashFlow],
) -> ForwardLabResult<Money> {
    mtm_components(spot, forward_price, rate, maturity, t, dividends, costs)
        .map(|c| c.long_value)
}

// ---------------------------------------------------------------------------
// Function 1: price_carry_forward
// ---------------------------------------------------------------------------

/// Contract terms for a forward on an asset with discrete income and costs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CarryForwardInput {
    /// Spot price at inception (S0).
    pub spot_price: Money,
    /// Flat annual rate, discretely compounded.
    pub risk_free_rate: Rate,
    /// Original maturity in years (T).
    pub maturity: Years,
    /// Income paid to the holder of the asset (dividends, coupons).
    #[serde(default)]
    pub dividends: Vec<CashFlow>,
    /// Costs of holding the asset (storage, insurance).
    #[serde(default)]
    pub costs: Vec<CashFlow>,
}

/// Output from carry forward pricing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CarryForwardOutput {
    /// F0(T) including costs and benefits.
    pub forward_price: Money,
    /// S0 * (1 + r)^T, ignoring costs and benefits.
    pub forward_price_without_carry: Money,
    /// PV0(I).
    pub pv_income: Money,
    /// PV0(C).
    pub pv_costs: Money,
    /// PV0(C) - PV0(I), the adjustment applied to spot before compounding.
    pub net_carry_adjustment: Money,
    /// F0(T) - S0.
    pub basis: Money,
    pub market_condition: MarketCondition,
}

pub fn price_carry_forward(
    input: &CarryForwardInput,
) -> ForwardLabResult<ComputationOutput<CarryForwardOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let forward_price = forward_price_discrete(
        input.spot_price,
        input.risk_free_rate,
        input.maturity,
        &input.dividends,
        &input.costs,
    )?;
    let forward_price_without_carry = forward_price_discrete(
        input.spot_price,
        input.risk_free_rate,
        input.maturity,
        &[],
        &[],
    )?;
    let pv_income = present_value(
        &input.dividends,
        input.risk_free_rate,
        Decimal::ZERO,
        input.maturity,
    )?;
    let pv_costs = present_value(
        &input.costs,
        input.risk_free_rate,
        Decimal::ZERO,
        input.maturity,
    )?;

    let beyond_maturity = input
        .dividends
        .iter()
        .chain(input.costs.iter())
        .filter(|cf| cf.time_from_t0 > input.maturity)
        .count();
    if beyond_maturity > 0 {
        warnings.push(format!(
            "{beyond_maturity} cash flow(s) dated after maturity {} are excluded",
            input.maturity
        ));
    }
    if forward_price < Decimal::ZERO {
        tracing::warn!(%forward_price, "negative forward price");
        warnings.push(format!(
            "Forward price {forward_price} is negative: income outweighs spot plus costs"
        ));
    }

    let basis = sub(forward_price, input.spot_price)?;
    let output = CarryForwardOutput {
        forward_price,
        forward_price_without_carry,
        pv_income,
        pv_costs,
        net_carry_adjustment: sub(pv_costs, pv_income)?,
        basis,
        market_condition: MarketCondition::from_basis(basis),
    };

    tracing::debug!(%forward_price, %pv_income, %pv_costs, "carry forward priced");

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Forward Pricing with Discrete Costs and Benefits: F0(T) = (S0 - PV0(I) + PV0(C)) * (1 + r)^T",
        &serde_json::json!({
            "spot_price": input.spot_price.to_string(),
            "risk_free_rate": input.risk_free_rate.to_string(),
            "maturity": input.maturity.to_string(),
            "num_dividends": input.dividends.len(),
            "num_costs": input.costs.len(),
        }),
        warnings,
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Function 2: value_carry_forward
// ---------------------------------------------------------------------------

/// Input for valuing an existing carry forward at time t.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CarryForwardValuationInput {
    /// Terms agreed at inception. The same rate and cash flows are used for valuation.
    pub contract: CarryForwardInput,
    /// Spot price now (St).
    pub current_spot: Money,
    /// Years elapsed since inception (t).
    pub current_time: Years,
    #[serde(default)]
    pub position: Position,
    /// Locked-in forward price. Derived from `contract` when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub forward_price: Option<Money>,
}

/// Output from carry forward valuation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CarryForwardValuationOutput {
    /// F0(T) used for valuation.
    pub forward_price: Money,
    pub mtm_long: Money,
    pub mtm_short: Money,
    pub position: Position,
    /// MTM for the requested side.
    pub position_value: Money,
    /// PVt(I) of income still to come.
    pub pv_remaining_income: Money,
    /// PVt(C) of costs still to come.
    pub pv_remaining_costs: Money,
    /// T - t.
    pub remaining_time: Years,
    /// (1 + r)^-(T - t).
    pub discount_factor: Decimal,
}

pub fn value_carry_forward(
    input: &CarryForwardValuationInput,
) -> ForwardLabResult<ComputationOutput<CarryForwardValuationOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();
    let contract = &input.contract;

    let forward_price = match input.forward_price {
        Some(f) => f,
        None => forward_price_discrete(
            contract.spot_price,
            contract.risk_free_rate,
            contract.maturity,
            &contract.dividends,
            &contract.costs,
        )?,
    };

    let c = mtm_components(
        input.current_spot,
        forward_price,
        contract.risk_free_rate,
        contract.maturity,
        input.current_time,
        &contract.dividends,
        &contract.costs,
    )?;

    if c.remaining_time.is_zero() {
        warnings.push("Valued at maturity: MTM equals St - F0(T)".into());
    }

    let output = CarryForwardValuationOutput {
        forward_price,
        mtm_long: c.long_value,
        mtm_short: Position::Short.apply(c.long_value),
        position: input.position,
        position_value: input.position.apply(c.long_value),
        pv_remaining_income: c.pv_remaining_income,
        pv_remaining_costs: c.pv_remaining_costs,
        remaining_time: c.remaining_time,
        discount_factor: c.discount_factor,
    };

    tracing::debug!(mtm_long = %c.long_value, t = %input.current_time, "carry forward valued");

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Forward Mark-to-Market with Discrete Costs and Benefits: Vt(T) = (St - PVt(I) + PVt(C)) - F0(T) * (1 + r)^-(T - t)",
        &serde_json::json!({
            "current_spot": input.current_spot.to_string(),
            "current_time": input.current_time.to_string(),
            "risk_free_rate": contract.risk_free_rate.to_string(),
            "maturity": contract.maturity.to_string(),
            "position": input.position,
            "forward_price_supplied": input.forward_price.is_some(),
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
    use crate::error::ForwardLabError;
    use rust_decimal_macros::dec;

    fn tol() -> Decimal {
        dec!(0.0001)
    }

    fn assert_approx(actual: Decimal, expected: Decimal, tolerance: Decimal, label: &str) {
        let diff = (actual - expected).abs();
        assert!(
            diff <= tolerance,
            "{label}: expected ~{expected}, got {actual} (diff={diff}, tol={tolerance})"
        );
    }

    fn cf(amount: Decimal, t: Decimal) -> CashFlow {
        CashFlow::new(amount, t).unwrap()
    }

    fn sample_contract() -> CarryForwardInput {
        CarryForwardInput {
            spot_price: dec!(100),
            risk_free_rate: dec!(0.05),
            maturity: Decimal::ONE,
            dividends: vec![cf(dec!(2), dec!(0.25)), cf(dec!(2.5), dec!(0.75))],
            costs: vec![cf(dec!(1), dec!(0.5))],
        }
    }

    #[test]
    fn test_no_carry_one_year() {
        let f = forward_price_discrete(dec!(100), dec!(0.05), Decimal::ONE, &[], &[]).unwrap();
        assert_eq!(f, dec!(105));
    }

    #[test]
    fn test_zero_maturity_returns_spot() {
        let f = forward_price_discrete(dec!(87.3), dec!(0.07), Decimal::ZERO, &[], &[]).unwrap();
        assert_eq!(f, dec!(87.3));
    }

    #[test]
    fn test_mid_year_dividend() {
        // (100 - 10 / 1.05^0.5) * 1.05 = 94.7530492341
        let divs = [cf(dec!(10), dec!(0.5))];
        let f = forward_price_discrete(dec!(100), dec!(0.05), Decimal::ONE, &divs, &[]).unwrap();
        assert_approx(f, dec!(94.7530492341), tol(), "F0 with dividend");
    }

    #[test]
    fn test_cost_raises_forward() {
        let costs = [cf(dec!(5), Decimal::ZERO)];
        let f = forward_price_discrete(dec!(100), dec!(0.05), Decimal::ONE, &[], &costs).unwrap();
        assert_eq!(f, dec!(110.25));
    }

    #[test]
    fn test_rate_minus_one_rejected_for_integer_maturity() {
        for t in [Decimal::ONE, dec!(2), dec!(0.5)] {
            let err = forward_price_discrete(dec!(100), dec!(-1), t, &[], &[]).unwrap_err();
            assert!(matches!(err, ForwardLabError::Domain { .. }), "got {err:?}");
        }
        let err =
            forward_price_discrete(dec!(100), dec!(-1.2), dec!(2), &[], &[]).unwrap_err();
        assert!(matches!(err, ForwardLabError::Domain { .. }));
    }

    #[test]
    fn test_negative_spot_and_maturity_rejected() {
        let err = forward_price_discrete(dec!(-1), dec!(0.05), Decimal::ONE, &[], &[]).unwrap_err();
        match err {
            ForwardLabError::Domain { field, .. } => assert_eq!(field, "spot_price"),
            e => panic!("Expected Domain error, got {e:?}"),
        }
        let err = forward_price_discrete(dec!(100), dec!(0.05), dec!(-0.5), &[], &[]).unwrap_err();
        match err {
            ForwardLabError::Domain { field, .. } => assert_eq!(field, "maturity"),
            e => panic!("Expected Domain error, got {e:?}"),
        }
    }

    #[test]
    fn test_negative_forward_is_valid() {
        let divs = [cf(dec!(50), dec!(0.1))];
        let f = forward_price_discrete(dec!(10), dec!(0.02), Decimal::ONE, &divs, &[]).unwrap();
        assert!(f < Decimal::ZERO);
    }

    #[test]
    fn test_forward_price_overflow_is_error() {
        // 1.05^1000 ~ 1.5e21, times 1e8 exceeds the Decimal range
        let err = forward_price_discrete(dec!(100000000), dec!(0.05), dec!(1000), &[], &[])
            .unwrap_err();
        assert!(matches!(err, ForwardLabError::ArithmeticOverflow { .. }), "got {err:?}");
    }

    #[test]
    fn test_mtm_overflow_is_error() {
        let c = sample_contract();
        let err = mtm_discrete(
            Decimal::MAX,
            -Decimal::MAX,
            c.risk_free_rate,
            c.maturity,
            c.maturity,
            &[],
            &[],
        )
        .unwrap_err();
        assert!(matches!(err, ForwardLabError::ArithmeticOverflow { .. }), "got {err:?}");
    }

    #[test]
    fn test_price_carry_forward_overflow_is_error() {
        let input = CarryForwardInput {
            spot_price: dec!(100000000),
            risk_free_rate: dec!(0.05),
            maturity: dec!(1000),
            dividends: vec![],
            costs: vec![],
        };
        assert!(matches!(
            price_carry_forward(&input),
            Err(ForwardLabError::ArithmeticOverflow { .. })
        ));
    }

    #[test]
    fn test_mtm_zero_at_inception() {
        // At t = 0 with St = S0 the contract is worth nothing.
        let c = sample_contract();
        let f0 = forward_price_discrete(
            c.spot_price,
            c.risk_free_rate,
            c.maturity,
            &c.dividends,
            &c.costs,
        )
        .unwrap();
        let v = mtm_discrete(
            c.spot_price,
            f0,
            c.risk_free_rate,
            c.maturity,
            Decimal::ZERO,
            &c.dividends,
            &c.costs,
        )
        .unwrap();
        assert_approx(v, Decimal::ZERO, tol(), "MTM at inception");
    }

    #[test]
    fn test_mtm_at_maturity_is_spot_minus_forward() {
        let c = sample_contract();
        let v = mtm_discrete(
            dec!(108),
            dec!(103),
            c.risk_free_rate,
            c.maturity,
            c.maturity,
            &c.dividends,
            &c.costs,
        )
        .unwrap();
        assert_eq!(v, dec!(5));
    }

    #[test]
    fn test_mtm_only_counts_remaining_flows() {
        // At t = 0.5 the 0.25 dividend is gone; the 0.5 cost and 0.75 dividend remain.
        let c = sample_contract();
        let v = mtm_discrete(
            dec!(102),
            dec!(100),
            dec!(0.05),
            Decimal::ONE,
            dec!(0.5),
            &c.dividends,
            &c.costs,
        )
        .unwrap();
        // PVt(I) = 2.5 / 1.05^0.25 = 2.4696914; PVt(C) = 1
        // F discount = 100 / 1.05^0.5 = 97.5900073
        let expected = dec!(102) - dec!(2.4696914) + dec!(1) - dec!(97.5900073);
        assert_approx(v, expected, tol(), "MTM mid-life");
    }

    #[test]
    fn test_mtm_rejects_time_after_maturity() {
        let err = mtm_discrete(dec!(100), dec!(105), dec!(0.05), Decimal::ONE, dec!(1.5), &[], &[])
            .unwrap_err();
        match err {
            ForwardLabError::Domain { field, .. } => assert_eq!(field, "current_time"),
            e => panic!("Expected Domain error, got {e:?}"),
        }
        assert!(
            mtm_discrete(dec!(100), dec!(105), dec!(0.05), Decimal::ONE, dec!(-0.1), &[], &[])
                .is_err()
        );
    }

    #[test]
    fn test_price_carry_forward_output() {
        let out = price_carry_forward(&sample_contract()).unwrap();
        let r = &out.result;
        assert_eq!(r.forward_price_without_carry, dec!(105));
        assert!(r.forward_price < r.forward_price_without_carry);
        assert_approx(
            r.net_carry_adjustment,
            r.pv_costs - r.pv_income,
            Decimal::ZERO,
            "net carry",
        );
        assert_eq!(r.market_condition, MarketCondition::Contango);
        assert!(out.warnings.is_empty());
        assert!(out.methodology.contains("Forward"));
    }

    #[test]
    fn test_price_carry_forward_warns_on_late_flows() {
        let mut c = sample_contract();
        c.costs.push(cf(dec!(3), dec!(2)));
        let out = price_carry_forward(&c).unwrap();
        assert!(out.warnings.iter().any(|w| w.contains("after maturity")));
    }

    #[test]
    fn test_value_carry_forward_short_is_negated_long() {
        let input = CarryForwardValuationInput {
            contract: sample_contract(),
            current_spot: dec!(102),
            current_time: dec!(0.5),
            position: Position::Short,
            forward_price: None,
        };
        let out = value_carry_forward(&input).unwrap().result;
        assert_eq!(out.mtm_short, -out.mtm_long);
        assert_eq!(out.position_value, out.mtm_short);
        assert_eq!(out.remaining_time, dec!(0.5));
    }

    #[test]
    fn test_value_carry_forward_uses_supplied_forward() {
        let input = CarryForwardValuationInput {
            contract: CarryForwardInput {
                dividends: vec![],
                costs: vec![],
                ..sample_contract()
            },
            current_spot: dec!(110),
            current_time: Decimal::ONE,
            position: Position::Long,
            forward_price: Some(dec!(104)),
        };
        let out = value_carry_forward(&input).unwrap();
        assert_eq!(out.result.forward_price, dec!(104));
        assert_eq!(out.result.mtm_long, dec!(6));
        assert_eq!(out.result.discount_factor, Decimal::ONE);
        assert!(!out.warnings.is_empty());
    }
}
