mod commands;
mod input;
mod logging;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;

use commands::debt::{DebtArgs, WhatIfArgs};
use commands::portfolio::PortfolioArgs;
use commands::projection::ProjectArgs;

/// Loan amortization schedules, debt summaries and what-if simulations
#[derive(Parser)]
#[command(
    name = "debt-engine",
    version,
    about = "Loan amortization schedules, debt summaries and what-if simulations",
    long_about = "A CLI for equal-installment (French system) loan amortization with \
                  decimal precision. Builds schedules with extra payments, summarizes \
                  debt health, simulates hypothetical extra payments and projects \
                  outstanding installments into monthly cash-flow buckets."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Log recalculation details to stderr
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the amortization schedule of a debt
    Schedule(DebtArgs),
    /// Summarize balance, payments and interest saved
    Summary(DebtArgs),
    /// Compare the schedule with one hypothetical extra payment
    WhatIf(WhatIfArgs),
    /// Project outstanding installments into monthly buckets
    Project(ProjectArgs),
    /// Aggregate summaries across several debts
    Portfolio(PortfolioArgs),
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
    logging::init_tracing(cli.verbose);

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Schedule(args) => commands::debt::run_schedule(args),
        Commands::Summary(args) => commands::debt::run_summary(args),
        Commands::WhatIf(args) => commands::debt::run_what_if(args),
        Commands::Project(args) => commands::projection::run_project(args),
        Commands::Portfolio(args) => commands::portfolio::run_portfolio(args),
        Commands::Version => {
            println!("debt-engine {}", env!("CARGO_PKG_VERSION"));
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
