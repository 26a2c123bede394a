mod commands;
mod config;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::path::PathBuf;
use std::process;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use commands::ledger::{CheckArgs, ExtraCommand, ResetArgs};
use commands::progress::{ScheduleArgs, StatsArgs, UtilizationArgs};
use commands::setup::SetupArgs;
use config::CliConfig;
use credit_quest_core::ledger::JsonFileStore;

/// Track an installment loan, month by month
#[derive(Parser)]
#[command(
    name = "cq",
    version,
    about = "Track an installment loan, month by month",
    long_about = "A CLI for tracking a fixed-rate installment loan with decimal precision. \
                  Generates the amortization schedule, records special repayments, \
                  tracks acknowledged installments and the yearly special-repayment limit."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Ledger file (overrides CREDIT_QUEST_DATA_FILE)
    #[arg(long, global = true)]
    data_file: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Configure the loan (keeps recorded progress)
    Setup(SetupArgs),
    /// Print the amortization schedule
    Schedule(ScheduleArgs),
    /// Progress statistics and this year's special-repayment usage
    Stats(StatsArgs),
    /// Special-repayment allowance for a calendar year
    Utilization(UtilizationArgs),
    /// Mark an installment as paid
    Check(CheckArgs),
    /// Withdraw the paid mark from an installment
    Uncheck(CheckArgs),
    /// Record or list special repayments
    #[command(subcommand)]
    Extra(ExtraCommand),
    /// Delete the profile and all progress
    Reset(ResetArgs),
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

fn init_tracing(default_filter: &str) {
    let filter = EnvFilter::try_new(default_filter).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() {
    let cli = Cli::parse();
    let config = CliConfig::from_env().with_data_file(cli.data_file);
    init_tracing(&config.log_filter);
    tracing::debug!(data_file = %config.data_file.display(), "using ledger");

    let store = JsonFileStore::new(config.data_file);

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Setup(args) => commands::setup::run_setup(args, &store),
        Commands::Schedule(args) => commands::progress::run_schedule(args, &store),
        Commands::Stats(args) => commands::progress::run_stats(args, &store),
        Commands::Utilization(args) => commands::progress::run_utilization(args, &store),
        Commands::Check(args) => commands::ledger::run_check(args, &store),
        Commands::Uncheck(args) => commands::ledger::run_uncheck(args, &store),
        Commands::Extra(command) => commands::ledger::run_extra(command, &store),
        Commands::Reset(args) => commands::ledger::run_reset(args, &store),
        Commands::Version => {
            println!("cq {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
