use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use super::{default_steps, ensure_grid, linspace};
use crate::cash_flows::{scale_cash_flows, CashFlow};
use crate::forwards::carry::{
    forward_price_discrete, mtm_discrete, CarryForwardInput, CarryForwardValuationInput,
};
use crate::time_value::present_value;
use crate::types::{with_metadata, ComputationOutput, Money, Position, Years};
use crate::ForwardLabResult;

// ---------------------------------------------------------------------------
// MTM path
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MtmPathInput {
    pub contract: CarryForwardInput,
    #[serde(default = "default_steps")]
    pub num_points: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MtmPathPoint {
    pub time: Years,
    /// Illustrative spot on the straight line from S0 to F0(T).
    pub spot: Money,
    pub mtm_with_carry: Money,
    pub mtm_without_carry: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MtmPathOutput {
    pub forward_price_with_carry: Money,
    pub forward_price_without_carry: Money,
    pub points: Vec<MtmPathPoint>,
}

/// Long MTM over `[0, T]` along a linear spot path from S0 to F0(T), both
/// with the contract's cash flows and without any.
pub fn mtm_path(input: &MtmPathInput) -> ForwardLabResult<ComputationOutput<MtmPathOutput>> {
    let start = Instant::now();
    let c = &input.contract;

    let f_with = forward_price_discrete(
        c.spot_price,
        c.risk_free_rate,
        c.maturity,
        &c.dividends,
        &c.costs,
    )?;
    let f_without = forward_price_discrete(c.spot_price, c.risk_free_rate, c.maturity, &[], &[])?;
    ensure_grid("num_points", input.num_points, Decimal::ZERO, c.maturity)?;

    let times = linspace(Decimal::ZERO, c.maturity, input.num_points)?;
    let spots = linspace(c.spot_price, f_with, input.num_points)?;

    let mut points = Vec::with_capacity(input.num_points);
    for (&time, &spot) in times.iter().zip(spots.iter()) {
        let spot = spot.max(Decimal::ZERO);
        points.push(MtmPathPoint {
            time,
            spot,
            mtm_with_carry: mtm_discrete(
                spot,
                f_with,
                c.risk_free_rate,
                c.maturity,
                time,
                &c.dividends,
                &c.costs,
            )?,
            mtm_without_carry: mtm_discrete(spot, f_without, c.risk_free_rate, c.maturity, time, &[], &[])?,
        });
    }

    let mut warnings: Vec<String> = Vec::new();
    if f_with < Decimal::ZERO {
        warnings.push("Forward price is negative; spot path is floored at zero".to_string());
    }

    let output = MtmPathOutput {
        forward_price_with_carry: f_with,
        forward_price_without_carry: f_without,
        points,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "MTM Evolution along a Linear Spot Path from S0 to F0(T)",
        &serde_json::json!({
            "spot_path": "linear interpolation, not a simulation",
            "num_points": input.num_points,
        }),
        warnings,
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Cash-flow multiplier sensitivity
// ---------------------------------------------------------------------------

fn default_min_multiplier() -> Decimal {
    Decimal::ZERO
}

fn default_max_multiplier() -> Decimal {
    dec!(2)
}

fn default_multiplier_steps() -> usize {
    21
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CashFlowSensitivityInput {
    pub contract: CarryForwardInput,
    #[serde(default = "default_min_multiplier")]
    pub min_multiplier: Decimal,
    #[serde(default = "default_max_multiplier")]
    pub max_multiplier: Decimal,
    #[serde(default = "default_multiplier_steps")]
    pub steps: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensitivityPoint {
    pub multiplier: Decimal,
    /// F0(T) with every cost amount scaled, dividends unchanged.
    pub forward_price_costs_scaled: Money,
    /// F0(T) with every dividend amount scaled, costs unchanged.
    pub forward_price_dividends_scaled: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CashFlowSensitivityOutput {
    pub base_forward_price: Money,
    pub base_pv_income: Money,
    pub base_pv_costs: Money,
    pub points: Vec<SensitivityPoint>,
}

pub fn cash_flow_sensitivity(
    input: &CashFlowSensitivityInput,
) -> ForwardLabResult<ComputationOutput<CashFlowSensitivityOutput>> {
    let start = Instant::now();
    let c = &input.contract;
    ensure_grid("steps", input.steps, input.min_multiplier, input.max_multiplier)?;

    let price = |dividends: &[CashFlow], costs: &[CashFlow]| {
        forward_price_discrete(c.spot_price, c.risk_free_rate, c.maturity, dividends, costs)
    };

    let base_forward_price = price(&c.dividends, &c.costs)?;
    let base_pv_income = present_value(&c.dividends, c.risk_free_rate, Decimal::ZERO, c.maturity)?;
    let base_pv_costs = present_value(&c.costs, c.risk_free_rate, Decimal::ZERO, c.maturity)?;

    let points = linspace(input.min_multiplier, input.max_multiplier, input.steps)?
        .into_iter()
        .map(|m| -> ForwardLabResult<SensitivityPoint> {
            Ok(SensitivityPoint {
                multiplier: m,
                forward_price_costs_scaled: price(&c.dividends, &scale_cash_flows(&c.costs, m)?)?,
                forward_price_dividends_scaled: price(&scale_cash_flows(&c.dividends, m)?, &c.costs)?,
            })
        })
        .collect::<ForwardLabResult<Vec<_>>>()?;

    let mut warnings: Vec<String> = Vec::new();
    if c.dividends.is_empty() && c.costs.is_empty() {
        warnings.push("Contract has no cash flows; every point equals the base forward price".into());
    }

    let output = CashFlowSensitivityOutput {
        base_forward_price,
        base_pv_income,
        base_pv_costs,
        points,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Forward Price Sensitivity to Scaled Costs and Benefits",
        &serde_json::json!({
            "min_multiplier": input.min_multiplier.to_string(),
            "max_multiplier": input.max_multiplier.to_string(),
            "steps": input.steps,
        }),
        warnings,
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Scenario comparison
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CarryScenario {
    pub scenario: String,
    /// F0(T) recomputed from the scenario's own cash flows.
    pub forward_price: Money,
    /// MTM for the requested side.
    pub mtm: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CarryScenariosOutput {
    pub position: Position,
    pub points: Vec<CarryScenario>,
}

/// MTM at `current_time` under four cash-flow scenarios: base case, no
/// costs or benefits, double dividends, double costs.
pub fn carry_scenarios(
    input: &CarryForwardValuationInput,
) -> ForwardLabResult<ComputationOutput<CarryScenariosOutput>> {
    let start = Instant::now();
    let c = &input.contract;
    let mut warnings: Vec<String> = Vec::new();
    if input.forward_price.is_some() {
        warnings.push(
            "Supplied forward_price is ignored: each scenario prices its own forward".to_string(),
        );
    }

    let doubled_dividends = scale_cash_flows(&c.dividends, dec!(2))?;
    let doubled_costs = scale_cash_flows(&c.costs, dec!(2))?;
    let cases: [(&str, &[CashFlow], &[CashFlow]); 4] = [
        ("Base Case", &c.dividends, &c.costs),
        ("No Costs/Benefits", &[], &[]),
        ("Double Dividends", &doubled_dividends, &c.costs),
        ("Double Costs", &c.dividends, &doubled_costs),
    ];

    let mut points = Vec::with_capacity(cases.len());
    for (name, dividends, costs) in cases {
        let forward_price =
            forward_price_discrete(c.spot_price, c.risk_free_rate, c.maturity, dividends, costs)?;
        let mtm_long = mtm_discrete(
            input.current_spot,
            forward_price,
            c.risk_free_rate,
            c.maturity,
            input.current_time,
            dividends,
            costs,
        )?;
        points.push(CarryScenario {
            scenario: name.to_string(),
            forward_price,
            mtm: input.position.apply(mtm_long),
        });
    }

    let output = CarryScenariosOutput {
        position: input.position,
        points,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "MTM Comparison across Cash-Flow Scenarios",
        &serde_json::json!({
            "current_spot": input.current_spot.to_string(),
            "current_time": input.current_time.to_string(),
            "position": input.position,
        }),
        warnings,
        elapsed,
        output,
    ))
}
