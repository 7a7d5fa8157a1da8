mod commands;
mod input;
mod logging;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;

use commands::lbo::{DealArgs, SensitivityArgs};

/// Leveraged buyout debt schedules and sponsor returns
#[derive(Parser)]
#[command(
    name = "lbo",
    version,
    about = "Leveraged buyout debt schedules and sponsor returns",
    long_about = "Project a leveraged buyout over five years with decimal precision: \
                  operating projection, tranche-by-tranche debt schedule with a \
                  Term Loan B cash sweep, exit returns (IRR, MOIC) across multiples, \
                  and EBITDA sensitivity. Deals are read from JSON/YAML files, \
                  piped stdin, or flags."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Enable debug logging on stderr (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full model: projection, debt schedule, exit returns, sensitivity
    Analyze(DealArgs),
    /// Print the per-year, per-tranche debt schedule
    Schedule(DealArgs),
    /// Run the exit EBITDA sensitivity at the 10.0x base case
    Sensitivity(SensitivityArgs),
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

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Analyze(args) => commands::lbo::run_analyze(args),
        Commands::Schedule(args) => commands::lbo::run_schedule(args),
        Commands::Sensitivity(args) => commands::lbo::run_sensitivity(args),
        Commands::Version => {
            println!("lbo {}", env!("CARGO_PKG_VERSION"));
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
