use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use super::{ensure_non_negative, remaining_time};
use crate::compounding::{continuous_growth, mul, sub};
use crate::types::{with_metadata, ComputationOutput, Money, Position, Rate, Years};
use crate::ForwardLabResult;

/// Premium or discount of the forward FX rate relative to spot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ForwardPoints {
    Premium,
    Discount,
    Par,
}

// ---------------------------------------------------------------------------
// Core formulas
// ---------------------------------------------------------------------------

/// FX forward rate at inception under continuously compounded interest-rate parity:
///
///   F0(T) = S0 * exp((rf - rd) * T)
pub fn forward_price_continuous_fx(
    spot: Money,
    foreign_rate: Rate,
    domestic_rate: Rate,
    maturity: Years,
) -> ForwardLabResult<Money> {
    ensure_non_negative("spot_rate", spot)?;
    ensure_non_negative("maturity", maturity)?;
    mul(spot, continuous_growth(sub(foreign_rate, domestic_rate)?, maturity)?)
}

/// Canonical MTM of a long FX forward at time t:
///
///   Vt(T) = St - F0(T) * exp(-(rf - rd) * (T - t))
///
/// using current rates. Negate for the short side.
pub fn mtm_continuous_fx(
    spot: Money,
    forward_price: Money,
    foreign_rate: Rate,
    domestic_rate: Rate,
    maturity: Years,
    t: Years,
) -> ForwardLabResult<Money> {
    ensure_non_negative("current_spot", spot)?;
    let remaining = remaining_time(maturity, t)?;
    let carry_discount = continuous_growth(sub(domestic_rate, foreign_rate)?, remaining)?;
    sub(spot, mul(forward_price, carry_discount)?)
}

/// Alternate two-step MTM of a long FX forward.
///
/// First rolls spot to a current forward Ft(T) = St * exp((rf - rd)(T - t)),
/// then discounts the difference at the domestic rate:
///
///   Vt(T) = (Ft(T) - F0(T)) * exp(-rd * (T - t))
///
/// This does not agree numerically with [`mtm_continuous_fx`] for the same
/// inputs; it is kept for side-by-side comparison only.
pub fn mtm_continuous_fx_two_step(
    spot: Money,
    forward_price: Money,
    foreign_rate: Rate,
    domestic_rate: Rate,
    maturity: Years,
    t: Years,
) -> ForwardLabResult<Money> {
    ensure_non_negative("current_spot", spot)?;
    let remaining = remaining_time(maturity, t)?;
    let current_forward = mul(
        spot,
        continuous_growth(sub(foreign_rate, domestic_rate)?, remaining)?,
    )?;
    let discount = continuous_growth(-domestic_rate, remaining)?;
    mul(sub(current_forward, forward_price)?, discount)
}

/// Spot rate at which the canonical long MTM is zero:
/// F0(T) * exp(-(rf - rd) * (T - t)).
pub fn implied_zero_mtm_spot(
    forward_price: Money,
    foreign_rate: Rate,
    domestic_rate: Rate,
    maturity: Years,
    t: Years,
) -> ForwardLabResult<Money> {
    let remaining = remaining_time(maturity, t)?;
    mul(
        forward_price,
        continuous_growth(sub(domestic_rate, foreign_rate)?, remaining)?,
    )
}

// ---------------------------------------------------------------------------
// Function 1: price_fx_forward
// ---------------------------------------------------------------------------

/// Input for pricing an FX forward at inception.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FxForwardInput {
    /// Spot FX rate at inception (S0, f/d).
    pub spot_rate: Decimal,
    /// Foreign risk-free rate, continuously compounded.
    pub foreign_rate: Rate,
    /// Domestic risk-free rate, continuously compounded.
    pub domestic_rate: Rate,
    /// Original maturity in years.
    pub maturity: Years,
}

/// Output from FX forward pricing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FxForwardOutput {
    /// F0(T) = S0 * exp((rf - rd) * T).
    pub forward_rate: Decimal,
    /// F0(T) - S0.
    pub forward_points: Decimal,
    /// Forward points in pips: (F - S) * 10000.
    pub forward_points_pips: Decimal,
    /// rf - rd.
    pub rate_differential: Rate,
    pub forward_points_sign: ForwardPoints,
}

pub fn price_fx_forward(
    input: &FxForwardInput,
) -> ForwardLabResult<ComputationOutput<FxForwardOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let forward_rate = forward_price_continuous_fx(
        input.spot_rate,
        input.foreign_rate,
        input.domestic_rate,
        input.maturity,
    )?;
    let forward_points = sub(forward_rate, input.spot_rate)?;
    let rate_differential = sub(input.foreign_rate, input.domestic_rate)?;

    let forward_points_sign = if forward_points > Decimal::ZERO {
        ForwardPoints::Premium
    } else if forward_points < Decimal::ZERO {
        ForwardPoints::Discount
    } else {
        ForwardPoints::Par
    };

    let rate_diff_bps = mul(rate_differential.abs(), dec!(10000))?;
    if rate_diff_bps > dec!(500) {
        tracing::warn!(%rate_diff_bps, "large interest-rate differential");
        warnings.push(format!(
            "Rate differential of {:.0} bps exceeds 500 bps",
            rate_diff_bps
        ));
    }

    let output = FxForwardOutput {
        forward_rate,
        forward_points,
        forward_points_pips: mul(forward_points, dec!(10000))?,
        rate_differential,
        forward_points_sign,
    };

    tracing::debug!(%forward_rate, %rate_differential, "FX forward priced");

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "FX Forward Pricing via Interest Rate Parity (Continuous): F0(T) = S0 * exp((rf - rd) * T)",
        &serde_json::json!({
            "spot_rate": input.spot_rate.to_string(),
            "foreign_rate": input.foreign_rate.to_string(),
            "domestic_rate": input.domestic_rate.to_string(),
            "maturity": input.maturity.to_string(),
        }),
        warnings,
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Function 2: value_fx_forward
// ---------------------------------------------------------------------------

/// Input for valuing an existing FX forward at time t.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FxForwardValuationInput {
    /// Terms agreed at inception, with the rates prevailing then.
    pub contract: FxForwardInput,
    /// Spot FX rate now (St).
    pub current_spot: Decimal,
    /// Foreign rate now.
    pub current_foreign_rate: Rate,
    /// Domestic rate now.
    pub current_domestic_rate: Rate,
    /// Years elapsed since inception (t).
    pub current_time: Years,
    #[serde(default)]
    pub position: Position,
    /// Locked-in forward rate. Derived from `contract` when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub forward_rate: Option<Decimal>,
}

impl FxForwardValuationInput {
    /// The supplied forward rate, or F0(T) from the inception terms.
    pub fn locked_forward_rate(&self) -> ForwardLabResult<Decimal> {
        match self.forward_rate {
            Some(f) => Ok(f),
            None => forward_price_continuous_fx(
                self.contract.spot_rate,
                self.contract.foreign_rate,
                self.contract.domestic_rate,
                self.contract.maturity,
            ),
        }
    }
}

/// Output from FX forward valuation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FxForwardValuationOutput {
    /// F0(T) used for valuation.
    pub forward_rate: Decimal,
    /// Canonical long MTM: St - F0(T) * exp(-(rf - rd)(T - t)).
    pub mtm_long: Money,
    pub mtm_short: Money,
    pub position: Position,
    pub position_value: Money,
    /// Ft(T) = St * exp((rf - rd)(T - t)) at current rates.
    pub current_forward_rate: Decimal,
    /// Long MTM under the two-step formulation (Ft - F0) * exp(-rd (T - t)).
    pub two_step_mtm_long: Money,
    /// two_step_mtm_long - mtm_long.
    pub formulation_gap: Money,
    /// Spot at which the canonical long MTM is zero.
    pub zero_mtm_spot: Decimal,
    pub remaining_time: Years,
}

pub fn value_fx_forward(
    input: &FxForwardValuationInput,
) -> ForwardLabResult<ComputationOutput<FxForwardValuationOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();
    let contract = &input.contract;
    let forward_rate = input.locked_forward_rate()?;

    let rf = input.current_foreign_rate;
    let rd = input.current_domestic_rate;
    let maturity = contract.maturity;
    let t = input.current_time;

    let mtm_long = mtm_continuous_fx(input.current_spot, forward_rate, rf, rd, maturity, t)?;
    let two_step_mtm_long =
        mtm_continuous_fx_two_step(input.current_spot, forward_rate, rf, rd, maturity, t)?;
    let remaining = remaining_time(maturity, t)?;
    let current_forward_rate = mul(input.current_spot, continuous_growth(sub(rf, rd)?, remaining)?)?;
    let zero_mtm_spot = implied_zero_mtm_spot(forward_rate, rf, rd, maturity, t)?;

    let formulation_gap = sub(two_step_mtm_long, mtm_long)?;
    if !formulation_gap.is_zero() {
        warnings.push(format!(
            "Two-step formulation differs from the canonical MTM by {formulation_gap}; \
             the canonical value is reported as mtm_long"
        ));
    }

    let output = FxForwardValuationOutput {
        forward_rate,
        mtm_long,
        mtm_short: Position::Short.apply(mtm_long),
        position: input.position,
        position_value: input.position.apply(mtm_long),
        current_forward_rate,
        two_step_mtm_long,
        formulation_gap,
        zero_mtm_spot,
        remaining_time: remaining,
    };

    tracing::debug!(%mtm_long, %two_step_mtm_long, "FX forward valued");

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "FX Forward Mark-to-Market: Vt(T) = St - F0(T) * exp(-(rf - rd)(T - t))",
        &serde_json::json!({
            "current_spot": input.current_spot.to_string(),
            "current_foreign_rate": rf.to_string(),
            "current_domestic_rate": rd.to_string(),
            "current_time": t.to_string(),
            "maturity": maturity.to_string(),
            "position": input.position,
        }),
        warnings,
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
