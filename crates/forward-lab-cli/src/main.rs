mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use commands::analysis::{
    CarryScenariosArgs, CashFlowSensitivityArgs, FraSweepArgs, FxSweepArgs, MtmPathArgs,
};
use commands::forwards::{ForwardMtmArgs, ForwardPriceArgs};
use commands::fra::FraSettlementArgs;
use commands::fx::{FxForwardMtmArgs, FxForwardPriceArgs};
use commands::rates::AprConvertArgs;

/// Forward, FX forward and FRA valuation with decimal precision
#[derive(Parser)]
#[command(
    name = "fwdlab",
    version,
    about = "Forward, FX forward and FRA valuation with decimal precision",
    long_about = "Prices and marks to market forwards with discrete costs and benefits, \
                  FX forwards under interest-rate parity and FRAs. Also converts APRs \
                  between compounding frequencies and produces sensitivity series."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Log filter written to stderr (e.g. "debug", "forward_lab_core=trace").
    /// Overrides RUST_LOG.
    #[arg(long, global = true)]
    log_level: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Forward price at inception with discrete dividends and costs
    ForwardPrice(ForwardPriceArgs),
    /// Mark-to-market of an existing carry forward
    ForwardMtm(ForwardMtmArgs),
    /// FX forward rate via interest-rate parity (continuous compounding)
    FxForwardPrice(FxForwardPriceArgs),
    /// Mark-to-market of an existing FX forward
    FxForwardMtm(FxForwardMtmArgs),
    /// FRA fixed/floating interest, net payment and cash settlement
    FraSettlement(FraSettlementArgs),
    /// Convert an APR between compounding frequencies
    AprConvert(AprConvertArgs),
    /// MTM evolution of a carry forward along a linear spot path
    MtmPath(MtmPathArgs),
    /// Forward price vs a multiplier on dividends and costs
    CashFlowSensitivity(CashFlowSensitivityArgs),
    /// MTM across base, no-carry, double-dividend and double-cost scenarios
    CarryScenarios(CarryScenariosArgs),
    /// FX forward MTM vs rate differential or current spot
    FxSweep(FxSweepArgs),
    /// FRA cash settlement vs market reference rate
    FraSweep(FraSweepArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

/// Logs go to stderr so stdout stays machine-readable.
fn init_tracing(level: Option<&str>) {
    let filter = match level {
        Some(directives) => EnvFilter::new(directives),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.log_level.as_deref());

    let result: commands::CommandResult = match cli.command {
        Commands::ForwardPrice(args) => commands::forwards::run_forward_price(args),
        Commands::ForwardMtm(args) => commands::forwards::run_forward_mtm(args),
        Commands::FxForwardPrice(args) => commands::fx::run_fx_forward_price(args),
        Commands::FxForwardMtm(args) => commands::fx::run_fx_forward_mtm(args),
        Commands::FraSettlement(args) => commands::fra::run_fra_settlement(args),
        Commands::AprConvert(args) => commands::rates::run_apr_convert(args),
        Commands::MtmPath(args) => commands::analysis::run_mtm_path(args),
        Commands::CashFlowSensitivity(args) => commands::analysis::run_cash_flow_sensitivity(args),
        Commands::CarryScenarios(args) => commands::analysis::run_carry_scenarios(args),
        Commands::FxSweep(args) => commands::analysis::run_fx_sweep(args),
        Commands::FraSweep(args) => commands::analysis::run_fra_sweep(args),
        Commands::Version => {
            println!("fwdlab {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            tracing::debug!(error = %e, "command failed");
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
