use chrono::{Datelike, NaiveDate};
use clap::Args;
use serde_json::Value;

use debt_engine_core::debt::calendar::date_for_index;
use debt_engine_core::debt::Debt;
use debt_engine_core::projection::{self, month_buckets, ProjectionInput};

use super::debt::{load_debt, DebtArgs};

/// Arguments for a cash-flow projection
#[derive(Args)]
pub struct ProjectArgs {
    #[command(flatten)]
    pub debt: DebtArgs,

    /// First bucket as YYYY-MM (defaults to the month of the next installment due)
    #[arg(long)]
    pub from: Option<String>,

    /// Number of monthly buckets
    #[arg(long, default_value_t = 12)]
    pub months: u32,
}

pub fn run_project(args: ProjectArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let debt = load_debt(&args.debt)?;
    debt.validate()?;

    let first = first_bucket(&debt, args.from.as_deref())?;

    let input = ProjectionInput {
        buckets: month_buckets(first.month(), first.year(), args.months),
        debt,
    };
    let result = projection::project_debt_expenses(&input)?;
    Ok(serde_json::to_value(result)?)
}

/// `--from` when given, else the month of the next installment due.
fn first_bucket(debt: &Debt, from: Option<&str>) -> Result<NaiveDate, Box<dyn std::error::Error>> {
    match from {
        Some(raw) => parse_year_month(raw),
        None => date_for_index(
            debt.start_date,
            debt.current_installment.saturating_add(1),
            debt.period,
        )
        .ok_or_else(|| "Next installment date is out of range".into()),
    }
}

fn parse_year_month(raw: &str) -> Result<NaiveDate, Box<dyn std::error::Error>> {
    NaiveDate::parse_from_str(&format!("{}-01", raw.trim()), "%Y-%m-%d")
        .map_err(|e| format!("Invalid --from '{}' (expected YYYY-MM): {}", raw, e).into())
}
