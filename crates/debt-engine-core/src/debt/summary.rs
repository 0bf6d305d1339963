use std::time::Instant;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::model::Debt;
use super::schedule::{schedule_for, total_interest, AmortizationEntry, EntryStatus};
use crate::types::{with_metadata, ComputationOutput, Money};
use crate::DebtEngineResult;

const PERCENT: Decimal = dec!(100);

/// Derived view of a debt's health. Always recomputed, never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DebtSummary {
    pub current_balance: Money,
    /// Installments plus extra payments over paid entries.
    pub total_paid: Money,
    pub total_interest_paid: Money,
    /// Principal plus extra payments over paid entries.
    pub total_principal_paid: Money,
    /// Baseline interest minus actual interest, over complete schedules.
    pub interest_saved: Money,
    pub remaining_installments: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub projected_end_date: Option<NaiveDate>,
    /// Current installment normalized to one calendar month.
    pub monthly_equivalent_payment: Money,
    /// Interest over the whole actual schedule.
    pub total_interest: Money,
    /// Interest over the whole schedule without extra payments.
    pub baseline_total_interest: Money,
    pub installments_saved: u32,
    /// Share of the original principal repaid so far, in percent (0 to 100).
    pub progress_pct: Decimal,
    /// The paid count points past the end of a schedule that extra payments
    /// shortened; `current_balance` then falls back to the original amount.
    pub settled_early: bool,
}

/// Summary of a debt against its no-extra-payment baseline.
pub fn summarize(debt: &Debt) -> DebtSummary {
    let schedule = schedule_for(debt);
    let baseline = schedule_for(&debt.without_extra_payments());
    summarize_schedules(debt, &schedule, &baseline)
}

/// Summary from schedules the caller already generated.
pub fn summarize_schedules(
    debt: &Debt,
    schedule: &[AmortizationEntry],
    baseline: &[AmortizationEntry],
) -> DebtSummary {
    let paid: Vec<&AmortizationEntry> = schedule
        .iter()
        .filter(|e| e.status == EntryStatus::Paid)
        .collect();

    let (current_balance, settled_early) = if debt.current_installment == 0 {
        (debt.original_amount, false)
    } else {
        match schedule
            .iter()
            .find(|e| e.installment == debt.current_installment)
        {
            Some(entry) => (entry.remaining_balance, false),
            None => (debt.original_amount, !schedule.is_empty()),
        }
    };

    let total_paid: Money = paid.iter().map(|e| e.payment + e.extra_payment).sum();
    let total_interest_paid: Money = paid.iter().map(|e| e.interest).sum();
    let total_principal_paid: Money = paid.iter().map(|e| e.principal + e.extra_payment).sum();

    let actual_interest = total_interest(schedule);
    let baseline_interest = total_interest(baseline);

    let reference_payment = schedule
        .iter()
        .find(|e| e.status == EntryStatus::Current)
        .or_else(|| schedule.first())
        .map(|e| e.payment)
        .unwrap_or(Decimal::ZERO);
    let monthly_equivalent_payment =
        (reference_payment / Decimal::from(debt.period.months())).round_dp(2);

    let progress_pct = if debt.original_amount > Decimal::ZERO {
        (total_principal_paid / debt.original_amount * PERCENT)
            .min(PERCENT)
            .round_dp(2)
    } else {
        Decimal::ZERO
    };

    DebtSummary {
        current_balance,
        total_paid,
        total_interest_paid,
        total_principal_paid,
        interest_saved: baseline_interest - actual_interest,
        remaining_installments: (schedule.len() - paid.len()) as u32,
        projected_end_date: schedule.last().map(|e| e.date),
        monthly_equivalent_payment,
        total_interest: actual_interest,
        baseline_total_interest: baseline_interest,
        installments_saved: baseline.len().saturating_sub(schedule.len()) as u32,
        progress_pct,
        settled_early,
    }
}

/// Validate a debt and summarize it.
pub fn analyze_debt(debt: &Debt) -> DebtEngineResult<ComputationOutput<DebtSummary>> {
    let start = Instant::now();
    debt.validate()?;

    let summary = summarize(debt);
    let mut warnings = Vec::new();
    if summary.settled_early {
        warnings.push(format!(
            "Debt was paid off before installment {}; current balance falls back to the original amount",
            debt.current_installment
        ));
    }

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Debt summary against a no-extra-payment baseline schedule",
        &serde_json::json!({
            "name": debt.name,
            "original_amount": debt.original_amount.to_string(),
            "annual_rate_pct": debt.annual_rate.to_string(),
            "current_installment": debt.current_installment,
            "extra_payments": debt.extra_payments.len(),
            "recorded_extra_payments": debt.total_extra_payments().to_string(),
        }),
        warnings,
        elapsed,
        summary,
    ))
}
