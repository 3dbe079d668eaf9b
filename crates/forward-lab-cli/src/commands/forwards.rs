use clap::Args;
use rust_decimal::Decimal;

use forward_lab_core::forwards::carry::{
    self, CarryForwardInput, CarryForwardValuationInput,
};

use super::{cash_flows_flag, finish, load_with_cash_flows, CommandResult, PositionArg};

/// Contract terms of a carry forward given as flags
#[derive(Args)]
pub struct CarryContractFlags {
    /// Spot price at inception (S0)
    #[arg(long)]
    pub spot_price: Option<Decimal>,

    /// Annual risk-free rate, discretely compounded (e.g. 0.05 for 5%)
    #[arg(long, alias = "rate")]
    pub risk_free_rate: Option<Decimal>,

    /// Original maturity in years (T)
    #[arg(long)]
    pub maturity: Option<Decimal>,

    /// Income as JSON, e.g. '[{"amount": 2, "time_from_t0": 0.5}]'
    #[arg(long)]
    pub dividends: Option<String>,

    /// Holding costs as JSON, same shape as --dividends
    #[arg(long)]
    pub costs: Option<String>,

    /// Treat invalid cash-flow input as no cash flows instead of failing
    #[arg(long)]
    pub lenient_cash_flows: bool,
}

impl CarryContractFlags {
    pub fn to_input(&self, warnings: &mut Vec<String>) -> Result<CarryForwardInput, Box<dyn std::error::Error>> {
        let lenient = self.lenient_cash_flows;
        Ok(CarryForwardInput {
            spot_price: self
                .spot_price
                .ok_or("--spot-price is required (or provide --input)")?,
            risk_free_rate: self
                .risk_free_rate
                .ok_or("--risk-free-rate is required (or provide --input)")?,
            maturity: self
                .maturity
                .ok_or("--maturity is required (or provide --input)")?,
            dividends: cash_flows_flag("dividends", self.dividends.as_deref(), lenient, warnings)?,
            costs: cash_flows_flag("costs", self.costs.as_deref(), lenient, warnings)?,
        })
    }
}

/// Valuation state of an existing carry forward given as flags
#[derive(Args)]
pub struct CarryValuationFlags {
    #[command(flatten)]
    pub contract: CarryContractFlags,

    /// Spot price now (St)
    #[arg(long)]
    pub current_spot: Option<Decimal>,

    /// Years elapsed since inception (t)
    #[arg(long)]
    pub current_time: Option<Decimal>,

    /// Side of the contract
    #[arg(long, value_enum, default_value = "long")]
    pub position: PositionArg,

    /// Locked-in forward price (derived from the contract if omitted)
    #[arg(long)]
    pub forward_price: Option<Decimal>,
}

impl CarryValuationFlags {
    pub fn to_input(
        &self,
        warnings: &mut Vec<String>,
    ) -> Result<CarryForwardValuationInput, Box<dyn std::error::Error>> {
        Ok(CarryForwardValuationInput {
            contract: self.contract.to_input(warnings)?,
            current_spot: self
                .current_spot
                .ok_or("--current-spot is required (or provide --input)")?,
            current_time: self
                .current_time
                .ok_or("--current-time is required (or provide --input)")?,
            position: self.position.into(),
            forward_price: self.forward_price,
        })
    }
}

/// Load a valuation input from --input/stdin or flags.
pub fn valuation_input(
    path: Option<&str>,
    flags: &CarryValuationFlags,
    warnings: &mut Vec<String>,
) -> Result<CarryForwardValuationInput, Box<dyn std::error::Error>> {
    let loaded = load_with_cash_flows(
        path,
        &["/contract/dividends", "/contract/costs"],
        flags.contract.lenient_cash_flows,
        warnings,
    )?;
    match loaded {
        Some(v) => Ok(v),
        None => flags.to_input(warnings),
    }
}

/// Arguments for carry forward pricing
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct ForwardPriceArgs {
    #[command(flatten)]
    pub contract: CarryContractFlags,

    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,
}

/// Arguments for carry forward mark-to-market
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct ForwardMtmArgs {
    #[command(flatten)]
    pub valuation: CarryValuationFlags,

    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_forward_price(args: ForwardPriceArgs) -> CommandResult {
    let mut warnings = Vec::new();
    let loaded: Option<CarryForwardInput> = load_with_cash_flows(
        args.input.as_deref(),
        &["/dividends", "/costs"],
        args.contract.lenient_cash_flows,
        &mut warnings,
    )?;
    let fwd_input = match loaded {
        Some(v) => v,
        None => args.contract.to_input(&mut warnings)?,
    };
    let result = carry::price_carry_forward(&fwd_input)?;
    finish(result, warnings)
}

pub fn run_forward_mtm(args: ForwardMtmArgs) -> CommandResult {
    let mut warnings = Vec::new();
    let val_input = valuation_input(args.input.as_deref(), &args.valuation, &mut warnings)?;
    let result = carry::value_carry_forward(&val_input)?;
    finish(result, warnings)
}
