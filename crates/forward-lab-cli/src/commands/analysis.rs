use clap::{Args, ValueEnum};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use forward_lab_core::analysis::carry::{
    carry_scenarios, cash_flow_sensitivity, mtm_path, CashFlowSensitivityInput, MtmPathInput,
};
use forward_lab_core::analysis::fra::{fra_sweep, FraSweepInput};
use forward_lab_core::analysis::fx::{
    fx_rate_differential_sweep, fx_spot_sweep, FxRateSweepInput, FxSpotSweepInput,
};
use forward_lab_core::fra::parse_fra_term_sheet;

use super::forwards::{valuation_input, CarryContractFlags, CarryValuationFlags};
use super::fra::FraFlags;
use super::fx::FxValuationFlags;
use super::{finish, load_with_cash_flows, CommandResult};
use crate::input;

const CONTRACT_FLOWS: [&str; 2] = ["/contract/dividends", "/contract/costs"];

/// Arguments for the MTM path of a carry forward
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct MtmPathArgs {
    #[command(flatten)]
    pub contract: CarryContractFlags,

    /// Number of points on [0, T]
    #[arg(long, default_value = "100")]
    pub num_points: usize,

    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,
}

/// Arguments for forward-price sensitivity to scaled cash flows
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct CashFlowSensitivityArgs {
    #[command(flatten)]
    pub contract: CarryContractFlags,

    #[arg(long, default_value = "0")]
    pub min_multiplier: Decimal,

    #[arg(long, default_value = "2")]
    pub max_multiplier: Decimal,

    #[arg(long, default_value = "21")]
    pub steps: usize,

    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,
}

/// Arguments for the carry forward scenario comparison
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct CarryScenariosArgs {
    #[command(flatten)]
    pub valuation: CarryValuationFlags,

    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum FxSweepAxis {
    /// Vary the current foreign rate; report against rf - rd
    Rate,
    /// Vary the current spot around the inception spot
    Spot,
}

/// Arguments for FX forward MTM sweeps
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct FxSweepArgs {
    /// Quantity to sweep
    #[arg(long, value_enum, default_value = "rate")]
    pub axis: FxSweepAxis,

    #[command(flatten)]
    pub valuation: FxValuationFlags,

    /// Lower bound: foreign rate for `rate`, spot factor for `spot`
    #[arg(long)]
    pub min: Option<Decimal>,

    /// Upper bound: foreign rate for `rate`, spot factor for `spot`
    #[arg(long)]
    pub max: Option<Decimal>,

    #[arg(long, default_value = "100")]
    pub steps: usize,

    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,
}

/// Arguments for the FRA settlement sweep over MRR
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct FraSweepArgs {
    #[command(flatten)]
    pub term_sheet: FraFlags,

    /// Lowest market reference rate in the sweep
    #[arg(long, default_value = "0.01")]
    pub min_mrr: Decimal,

    /// Highest market reference rate in the sweep
    #[arg(long, default_value = "0.10")]
    pub max_mrr: Decimal,

    #[arg(long, default_value = "100")]
    pub steps: usize,

    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_mtm_path(args: MtmPathArgs) -> CommandResult {
    let mut warnings = Vec::new();
    let loaded: Option<MtmPathInput> = load_with_cash_flows(
        args.input.as_deref(),
        &CONTRACT_FLOWS,
        args.contract.lenient_cash_flows,
        &mut warnings,
    )?;
    let path_input = match loaded {
        Some(v) => v,
        None => MtmPathInput {
            contract: args.contract.to_input(&mut warnings)?,
            num_points: args.num_points,
        },
    };
    finish(mtm_path(&path_input)?, warnings)
}

pub fn run_cash_flow_sensitivity(args: CashFlowSensitivityArgs) -> CommandResult {
    let mut warnings = Vec::new();
    let loaded: Option<CashFlowSensitivityInput> = load_with_cash_flows(
        args.input.as_deref(),
        &CONTRACT_FLOWS,
        args.contract.lenient_cash_flows,
        &mut warnings,
    )?;
    let sens_input = match loaded {
        Some(v) => v,
        None => CashFlowSensitivityInput {
            contract: args.contract.to_input(&mut warnings)?,
            min_multiplier: args.min_multiplier,
            max_multiplier: args.max_multiplier,
            steps: args.steps,
        },
    };
    finish(cash_flow_sensitivity(&sens_input)?, warnings)
}

pub fn run_carry_scenarios(args: CarryScenariosArgs) -> CommandResult {
    let mut warnings = Vec::new();
    let val_input = valuation_input(args.input.as_deref(), &args.valuation, &mut warnings)?;
    finish(carry_scenarios(&val_input)?, warnings)
}

pub fn run_fx_sweep(args: FxSweepArgs) -> CommandResult {
    let data = input::json_source(args.input.as_deref())?;
    match args.axis {
        FxSweepAxis::Rate => {
            let sweep: FxRateSweepInput = match data {
                Some(value) => serde_json::from_value(value)?,
                None => FxRateSweepInput {
                    valuation: args.valuation.to_input()?,
                    min_foreign_rate: args.min.unwrap_or(dec!(-0.05)),
                    max_foreign_rate: args.max.unwrap_or(dec!(0.20)),
                    steps: args.steps,
                },
            };
            finish(fx_rate_differential_sweep(&sweep)?, Vec::new())
        }
        FxSweepAxis::Spot => {
            let sweep: FxSpotSweepInput = match data {
                Some(value) => serde_json::from_value(value)?,
                None => FxSpotSweepInput {
                    valuation: args.valuation.to_input()?,
                    min_spot_factor: args.min.unwrap_or(dec!(0.8)),
                    max_spot_factor: args.max.unwrap_or(dec!(1.2)),
                    steps: args.steps,
                },
            };
            finish(fx_spot_sweep(&sweep)?, Vec::new())
        }
    }
}

pub fn run_fra_sweep(args: FraSweepArgs) -> CommandResult {
    let sweep_input: FraSweepInput = match input::json_source(args.input.as_deref())? {
        Some(value) => {
            let sheet = value
                .get("term_sheet")
                .ok_or("FRA sweep input needs a 'term_sheet' object")?;
            parse_fra_term_sheet(sheet)?;
            serde_json::from_value(value)?
        }
        None => FraSweepInput {
            term_sheet: args.term_sheet.to_input(args.term_sheet.fixed_rate)?,
            min_mrr: args.min_mrr,
            max_mrr: args.max_mrr,
            steps: args.steps,
        },
    };
    finish(fra_sweep(&sweep_input)?, Vec::new())
}
