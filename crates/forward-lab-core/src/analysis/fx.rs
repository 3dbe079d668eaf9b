use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use super::{default_steps, ensure_grid, linspace};
use crate::compounding::{mul, sub};
use crate::forwards::fx::{implied_zero_mtm_spot, mtm_continuous_fx, FxForwardValuationInput};
use crate::types::{with_metadata, ComputationOutput, Money, Position, Rate};
use crate::ForwardLabResult;

fn default_min_foreign_rate() -> Rate {
    dec!(-0.05)
}

fn default_max_foreign_rate() -> Rate {
    dec!(0.20)
}

fn default_min_spot_factor() -> Decimal {
    dec!(0.8)
}

fn default_max_spot_factor() -> Decimal {
    dec!(1.2)
}

// ---------------------------------------------------------------------------
// MTM vs rate differential
// ---------------------------------------------------------------------------

/// Sweep of the current foreign rate with the current domestic rate held fixed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FxRateSweepInput {
    pub valuation: FxForwardValuationInput,
    #[serde(default = "default_min_foreign_rate")]
    pub min_foreign_rate: Rate,
    #[serde(default = "default_max_foreign_rate")]
    pub max_foreign_rate: Rate,
    #[serde(default = "default_steps")]
    pub steps: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FxRatePoint {
    pub foreign_rate: Rate,
    /// rf - rd at this point.
    pub rate_differential: Rate,
    pub mtm_long: Money,
    pub mtm_short: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FxRateSweepOutput {
    pub forward_rate: Decimal,
    pub domestic_rate: Rate,
    pub points: Vec<FxRatePoint>,
}

pub fn fx_rate_differential_sweep(
    input: &FxRateSweepInput,
) -> ForwardLabResult<ComputationOutput<FxRateSweepOutput>> {
    let start = Instant::now();
    let v = &input.valuation;
    ensure_grid("steps", input.steps, input.min_foreign_rate, input.max_foreign_rate)?;

    let forward_rate = v.locked_forward_rate()?;
    let rd = v.current_domestic_rate;

    let mut points = Vec::with_capacity(input.steps);
    for rf in linspace(input.min_foreign_rate, input.max_foreign_rate, input.steps)? {
        let mtm_long = mtm_continuous_fx(
            v.current_spot,
            forward_rate,
            rf,
            rd,
            v.contract.maturity,
            v.current_time,
        )?;
        points.push(FxRatePoint {
            foreign_rate: rf,
            rate_differential: sub(rf, rd)?,
            mtm_long,
            mtm_short: Position::Short.apply(mtm_long),
        });
    }

    let output = FxRateSweepOutput {
        forward_rate,
        domestic_rate: rd,
        points,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "FX Forward MTM vs Interest Rate Differential (varying rf)",
        &serde_json::json!({
            "current_spot": v.current_spot.to_string(),
            "current_domestic_rate": rd.to_string(),
            "current_time": v.current_time.to_string(),
            "steps": input.steps,
        }),
        Vec::new(),
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// MTM vs current spot
// ---------------------------------------------------------------------------

/// Sweep of the current spot over a band around the inception spot S0.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FxSpotSweepInput {
    pub valuation: FxForwardValuationInput,
    #[serde(default = "default_min_spot_factor")]
    pub min_spot_factor: Decimal,
    #[serde(default = "default_max_spot_factor")]
    pub max_spot_factor: Decimal,
    #[serde(default = "default_steps")]
    pub steps: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FxSpotPoint {
    pub spot: Decimal,
    pub mtm_long: Money,
    pub mtm_short: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FxSpotSweepOutput {
    pub forward_rate: Decimal,
    /// Spot at which the long MTM crosses zero.
    pub zero_mtm_spot: Decimal,
    pub points: Vec<FxSpotPoint>,
}

pub fn fx_spot_sweep(
    input: &FxSpotSweepInput,
) -> ForwardLabResult<ComputationOutput<FxSpotSweepOutput>> {
    let start = Instant::now();
    let v = &input.valuation;
    ensure_grid("steps", input.steps, input.min_spot_factor, input.max_spot_factor)?;

    let forward_rate = v.locked_forward_rate()?;
    let (rf, rd) = (v.current_foreign_rate, v.current_domestic_rate);
    let (maturity, t) = (v.contract.maturity, v.current_time);
    let s0 = v.contract.spot_rate;

    let mut warnings: Vec<String> = Vec::new();
    if input.min_spot_factor < Decimal::ZERO {
        warnings.push("Negative spot factors are floored at zero".into());
    }

    let low = mul(s0, input.min_spot_factor)?.max(Decimal::ZERO);
    let high = mul(s0, input.max_spot_factor)?.max(Decimal::ZERO);
    let mut points = Vec::with_capacity(input.steps);
    for spot in linspace(low, high, input.steps)? {
        let mtm_long = mtm_continuous_fx(spot, forward_rate, rf, rd, maturity, t)?;
        points.push(FxSpotPoint {
            spot,
            mtm_long,
            mtm_short: Position::Short.apply(mtm_long),
        });
    }

    let output = FxSpotSweepOutput {
        forward_rate,
        zero_mtm_spot: implied_zero_mtm_spot(forward_rate, rf, rd, maturity, t)?,
        points,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "FX Forward MTM vs Current Spot Rate",
        &serde_json::json!({
            "initial_spot": s0.to_string(),
            "min_spot_factor": input.min_spot_factor.to_string(),
            "max_spot_factor": input.max_spot_factor.to_string(),
            "steps": input.steps,
        }),
        warnings,
        elapsed,
        output,
    ))
}
