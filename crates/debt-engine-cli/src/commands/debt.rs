use chrono::NaiveDate;
use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use debt_engine_core::debt::{self, Debt, ExtraPayment, ExtraPaymentMode};
use debt_engine_core::InstallmentPeriod;

use crate::input;

/// Debt terms, from a file, piped JSON or individual flags
#[derive(Args)]
pub struct DebtArgs {
    /// Path to a JSON or YAML debt file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Display name
    #[arg(long, default_value = "Debt")]
    pub name: String,

    /// Original principal
    #[arg(long)]
    pub principal: Option<Decimal>,

    /// Annual nominal rate in percent (12 = 12% a year)
    #[arg(long)]
    pub annual_rate: Option<Decimal>,

    /// Total number of installments
    #[arg(long)]
    pub installments: Option<u32>,

    /// Installment period: monthly, quarterly, semiannual, annual
    #[arg(long, default_value = "monthly")]
    pub period: String,

    /// Date of the first installment (YYYY-MM-DD)
    #[arg(long)]
    pub start_date: Option<NaiveDate>,

    /// Installments already paid
    #[arg(long, default_value_t = 0)]
    pub current_installment: u32,

    /// Extra payment as <installment>:<amount> (repeatable)
    #[arg(long = "extra", value_name = "INSTALLMENT:AMOUNT")]
    pub extras: Vec<String>,

    /// Recalculation after extra payments: reduce-term, reduce-installment
    #[arg(long, default_value = "reduce-term")]
    pub mode: String,
}

/// Arguments for a what-if simulation
#[derive(Args)]
pub struct WhatIfArgs {
    #[command(flatten)]
    pub debt: DebtArgs,

    /// Installment the hypothetical payment is made after
    #[arg(long)]
    pub after: u32,

    /// Hypothetical extra amount
    #[arg(long)]
    pub amount: Decimal,
}

pub fn run_schedule(args: DebtArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let debt = load_debt(&args)?;
    let result = debt::build_schedule(&debt)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_summary(args: DebtArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let debt = load_debt(&args)?;
    let result = debt::analyze_debt(&debt)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_what_if(args: WhatIfArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let debt = load_debt(&args.debt)?;
    let hypothetical = ExtraPayment::new(args.after, args.amount);
    let result = debt::run_what_if(&debt, &hypothetical)?;
    Ok(serde_json::to_value(result)?)
}

/// Debt from `--input`, then piped stdin, then flags.
pub fn load_debt(args: &DebtArgs) -> Result<Debt, Box<dyn std::error::Error>> {
    if let Some(ref path) = args.input {
        return input::file::read_input(path);
    }
    if let Some(debt) = input::stdin::read_piped::<Debt>()? {
        return Ok(debt);
    }

    let period: InstallmentPeriod = args.period.parse()?;
    let mut debt = Debt::new(
        args.name.clone(),
        args.principal
            .ok_or("--principal is required (or provide --input)")?,
        args.annual_rate
            .ok_or("--annual-rate is required (or provide --input)")?,
        args.installments
            .ok_or("--installments is required (or provide --input)")?,
        period,
        args.start_date
            .ok_or("--start-date is required (or provide --input)")?,
    )
    .with_current_installment(args.current_installment)
    .with_mode(parse_mode(&args.mode)?);

    for raw in &args.extras {
        debt.extra_payments.push(parse_extra(raw)?);
    }
    Ok(debt)
}

fn parse_mode(mode: &str) -> Result<ExtraPaymentMode, Box<dyn std::error::Error>> {
    match mode.to_lowercase().replace('_', "-").as_str() {
        "reduce-term" | "term" => Ok(ExtraPaymentMode::ReduceTerm),
        "reduce-installment" | "installment" => Ok(ExtraPaymentMode::ReduceInstallment),
        _ => Err(format!(
            "Unknown mode '{}'. Use: reduce-term, reduce-installment",
            mode
        ).into()),
    }
}

fn parse_extra(raw: &str) -> Result<ExtraPayment, Box<dyn std::error::Error>> {
    let (index, amount) = raw
        .split_once(':')
        .ok_or_else(|| format!("Invalid --extra '{}'. Expected <installment>:<amount>", raw))?;
    let installment: u32 = index
        .trim()
        .parse()
        .map_err(|e| format!("Invalid installment in --extra '{}': {}", raw, e))?;
    let amount: Decimal = amount
        .trim()
        .parse()
        .map_err(|e| format!("Invalid amount in --extra '{}': {}", raw, e))?;
    Ok(ExtraPayment::new(installment, amount))
}
