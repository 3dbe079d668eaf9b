use clap::Args;
use rust_decimal::Decimal;

use forward_lab_core::fra::{self, parse_fra_term_sheet, FraInput};

use super::{finish, CommandResult};
use crate::input;

/// FRA term sheet given as flags
#[derive(Args)]
pub struct FraFlags {
    /// Notional principal
    #[arg(long)]
    pub notional: Option<Decimal>,

    /// Fixed (implied forward) rate agreed at inception
    #[arg(long, alias = "ifr")]
    pub fixed_rate: Option<Decimal>,

    /// Months until the interest period starts
    #[arg(long)]
    pub start_period: Option<i64>,

    /// Months until the interest period ends
    #[arg(long)]
    pub end_period: Option<i64>,

    /// Day-count basis (days per year)
    #[arg(long, default_value = "360")]
    pub days_in_year_basis: i64,

    /// Market reference rate fixed for the period
    #[arg(long, alias = "mrr")]
    pub market_reference_rate: Option<Decimal>,
}

impl FraFlags {
    /// `mrr_fallback` stands in for the reference rate when it is not given.
    pub fn to_input(&self, mrr_fallback: Option<Decimal>) -> Result<FraInput, Box<dyn std::error::Error>> {
        let fixed_rate = self
            .fixed_rate
            .ok_or("--fixed-rate is required (or provide --input)")?;
        Ok(FraInput {
            notional: self
                .notional
                .ok_or("--notional is required (or provide --input)")?,
            fixed_rate,
            start_period: self
                .start_period
                .ok_or("--start-period is required (or provide --input)")?,
            end_period: self
                .end_period
                .ok_or("--end-period is required (or provide --input)")?,
            days_in_year_basis: self.days_in_year_basis,
            market_reference_rate: match self.market_reference_rate.or(mrr_fallback) {
                Some(r) => r,
                None => return Err("--market-reference-rate is required (or provide --input)".into()),
            },
        })
    }
}

/// Arguments for FRA settlement
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct FraSettlementArgs {
    #[command(flatten)]
    pub term_sheet: FraFlags,

    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_fra_settlement(args: FraSettlementArgs) -> CommandResult {
    let fra_input = match input::json_source(args.input.as_deref())? {
        Some(value) => parse_fra_term_sheet(&value)?,
        None => args.term_sheet.to_input(None)?,
    };
    let result = fra::calculate_fra_settlement(&fra_input)?;
    finish(result, Vec::new())
}
