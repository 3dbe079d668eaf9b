use clap::Args;
use rust_decimal::Decimal;

use forward_lab_core::compounding::{convert_apr_rate, AprConversionInput};

use super::{finish, CommandResult};
use crate::input;

/// Arguments for APR conversion between compounding frequencies
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct AprConvertArgs {
    /// Quoted APR (e.g. 0.06 for 6%)
    #[arg(long)]
    pub apr: Option<Decimal>,

    /// Compounding periods per year of the quoted APR (m)
    #[arg(long)]
    pub from_frequency: Option<u32>,

    /// Compounding periods per year of the target APR (n)
    #[arg(long)]
    pub to_frequency: Option<u32>,

    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_apr_convert(args: AprConvertArgs) -> CommandResult {
    let apr_input: AprConversionInput = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        AprConversionInput {
            apr: args.apr.ok_or("--apr is required (or provide --input)")?,
            from_frequency: args
                .from_frequency
                .ok_or("--from-frequency is required (or provide --input)")?,
            to_frequency: args
                .to_frequency
                .ok_or("--to-frequency is required (or provide --input)")?,
        }
    };
    let result = convert_apr_rate(&apr_input)?;
    finish(result, Vec::new())
}
