use clap::Args;
use serde_json::Value;

use debt_engine_core::debt::Debt;
use debt_engine_core::portfolio;

use crate::input;

/// Arguments for a portfolio overview
#[derive(Args)]
pub struct PortfolioArgs {
    /// Path to a JSON or YAML file holding an array of debts
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_portfolio(args: PortfolioArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let debts: Vec<Debt> = if let Some(ref path) = args.input {
        input::file::read_input(path)?
    } else if let Some(debts) = input::stdin::read_piped()? {
        debts
    } else {
        return Err("--input file (or piped JSON array) is required for portfolio analysis".into());
    };

    let result = portfolio::analyze_portfolio(&debts)?;
    Ok(serde_json::to_value(result)?)
}
