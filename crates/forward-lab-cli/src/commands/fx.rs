use clap::Args;
use rust_decimal::Decimal;

use forward_lab_core::forwards::fx::{self, FxForwardInput, FxForwardValuationInput};

use super::{finish, CommandResult, PositionArg};
use crate::input;

/// FX forward terms at inception given as flags
#[derive(Args)]
pub struct FxContractFlags {
    /// Spot FX rate at inception (S0, foreign per domestic)
    #[arg(long)]
    pub spot_rate: Option<Decimal>,

    /// Foreign risk-free rate, continuously compounded
    #[arg(long)]
    pub foreign_rate: Option<Decimal>,

    /// Domestic risk-free rate, continuously compounded
    #[arg(long)]
    pub domestic_rate: Option<Decimal>,

    /// Original maturity in years (T)
    #[arg(long)]
    pub maturity: Option<Decimal>,
}

impl FxContractFlags {
    fn to_input(&self) -> Result<FxForwardInput, Box<dyn std::error::Error>> {
        Ok(FxForwardInput {
            spot_rate: self
                .spot_rate
                .ok_or("--spot-rate is required (or provide --input)")?,
            foreign_rate: self
                .foreign_rate
                .ok_or("--foreign-rate is required (or provide --input)")?,
            domestic_rate: self
                .domestic_rate
                .ok_or("--domestic-rate is required (or provide --input)")?,
            maturity: self
                .maturity
                .ok_or("--maturity is required (or provide --input)")?,
        })
    }
}

/// Valuation state of an existing FX forward given as flags
#[derive(Args)]
pub struct FxValuationFlags {
    #[command(flatten)]
    pub contract: FxContractFlags,

    /// Spot FX rate now (St)
    #[arg(long)]
    pub current_spot: Option<Decimal>,

    /// Foreign rate now (defaults to the inception foreign rate)
    #[arg(long)]
    pub current_foreign_rate: Option<Decimal>,

    /// Domestic rate now (defaults to the inception domestic rate)
    #[arg(long)]
    pub current_domestic_rate: Option<Decimal>,

    /// Years elapsed since inception (t)
    #[arg(long)]
    pub current_time: Option<Decimal>,

    /// Side of the contract
    #[arg(long, value_enum, default_value = "long")]
    pub position: PositionArg,

    /// Locked-in forward rate (derived from the contract if omitted)
    #[arg(long)]
    pub forward_rate: Option<Decimal>,
}

impl FxValuationFlags {
    pub fn to_input(&self) -> Result<FxForwardValuationInput, Box<dyn std::error::Error>> {
        let contract = self.contract.to_input()?;
        Ok(FxForwardValuationInput {
            current_spot: self
                .current_spot
                .ok_or("--current-spot is required (or provide --input)")?,
            current_foreign_rate: self.current_foreign_rate.unwrap_or(contract.foreign_rate),
            current_domestic_rate: self.current_domestic_rate.unwrap_or(contract.domestic_rate),
            current_time: self
                .current_time
                .ok_or("--current-time is required (or provide --input)")?,
            position: self.position.into(),
            forward_rate: self.forward_rate,
            contract,
        })
    }
}

/// Arguments for FX forward pricing
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct FxForwardPriceArgs {
    #[command(flatten)]
    pub contract: FxContractFlags,

    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,
}

/// Arguments for FX forward mark-to-market
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct FxForwardMtmArgs {
    #[command(flatten)]
    pub valuation: FxValuationFlags,

    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_fx_forward_price(args: FxForwardPriceArgs) -> CommandResult {
    let fx_input: FxForwardInput = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        args.contract.to_input()?
    };
    let result = fx::price_fx_forward(&fx_input)?;
    finish(result, Vec::new())
}

pub fn run_fx_forward_mtm(args: FxForwardMtmArgs) -> CommandResult {
    let val_input: FxForwardValuationInput = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        args.valuation.to_input()?
    };
    let result = fx::value_fx_forward(&val_input)?;
    finish(result, Vec::new())
}
