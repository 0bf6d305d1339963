//! What-if simulation of a single hypothetical extra payment.

use std::time::Instant;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::model::{Debt, ExtraPayment};
use super::schedule::{schedule_for, total_interest, unapplied_extra_warnings, AmortizationEntry};
use crate::error::DebtEngineError;
use crate::types::{with_metadata, ComputationOutput, Money};
use crate::DebtEngineResult;

/// Actual schedule compared with the one including a hypothetical payment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WhatIfComparison {
    pub hypothetical: ExtraPayment,
    pub actual_total_interest: Money,
    pub simulated_total_interest: Money,
    pub interest_saved: Money,
    pub actual_installments: u32,
    pub simulated_installments: u32,
    pub installments_saved: u32,
    /// Installments saved expressed in calendar months.
    pub months_saved: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual_payoff_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub simulated_payoff_date: Option<NaiveDate>,
    /// Installment due right after the hypothetical payment.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recalculated_installment: Option<Money>,
    pub simulated_schedule: Vec<AmortizationEntry>,
}

/// Schedule for `debt` with `hypothetical` appended to its extra payments.
///
/// Works on a copy; the caller's debt is untouched.
pub fn simulate(debt: &Debt, hypothetical: &ExtraPayment) -> Vec<AmortizationEntry> {
    let mut scenario = debt.clone();
    scenario.extra_payments.push(hypothetical.clone());
    schedule_for(&scenario)
}

/// Compare the actual schedule with the simulated one.
pub fn compare_what_if(debt: &Debt, hypothetical: &ExtraPayment) -> WhatIfComparison {
    let actual = schedule_for(debt);
    let simulated = simulate(debt, hypothetical);

    let actual_total_interest = total_interest(&actual);
    let simulated_total_interest = total_interest(&simulated);
    let installments_saved = actual.len().saturating_sub(simulated.len()) as u32;

    let recalculated_installment = simulated
        .iter()
        .find(|e| e.installment > hypothetical.installment)
        .map(|e| e.payment);

    WhatIfComparison {
        hypothetical: hypothetical.clone(),
        actual_total_interest,
        simulated_total_interest,
        interest_saved: actual_total_interest - simulated_total_interest,
        actual_installments: actual.len() as u32,
        simulated_installments: simulated.len() as u32,
        installments_saved,
        months_saved: installments_saved * debt.period.months(),
        actual_payoff_date: actual.last().map(|e| e.date),
        simulated_payoff_date: simulated.last().map(|e| e.date),
        recalculated_installment,
        simulated_schedule: simulated,
    }
}

/// Validate inputs and run a what-if comparison.
///
/// A zero amount is accepted (an empty simulation field) and reproduces the
/// actual schedule.
pub fn run_what_if(
    debt: &Debt,
    hypothetical: &ExtraPayment,
) -> DebtEngineResult<ComputationOutput<WhatIfComparison>> {
    let start = Instant::now();
    debt.validate()?;
    validate_hypothetical(debt, hypothetical)?;

    let comparison = compare_what_if(debt, hypothetical);

    let mut warnings = Vec::new();
    if hypothetical.installment <= debt.current_installment {
        warnings.push(format!(
            "Installment {} is already paid; the simulation applies the payment retroactively",
            hypothetical.installment
        ));
    }
    if hypothetical.amount > Decimal::ZERO {
        // Recorded extras on the same installment share the balance left after it
        let same_installment: Vec<ExtraPayment> = debt
            .extra_payments
            .iter()
            .filter(|e| e.installment == hypothetical.installment)
            .cloned()
            .chain(std::iter::once(hypothetical.clone()))
            .collect();
        warnings.extend(unapplied_extra_warnings(
            &same_installment,
            &comparison.simulated_schedule,
        ));
    }

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "What-if: actual schedule vs schedule with one hypothetical extra payment",
        &serde_json::json!({
            "name": debt.name,
            "hypothetical_installment": hypothetical.installment,
            "hypothetical_amount": hypothetical.amount.to_string(),
            "extra_payment_mode": debt.extra_payment_mode,
        }),
        warnings,
        elapsed,
        comparison,
    ))
}

fn validate_hypothetical(debt: &Debt, hypothetical: &ExtraPayment) -> DebtEngineResult<()> {
    if hypothetical.installment == 0 {
        return Err(DebtEngineError::invalid(
            "hypothetical.installment",
            "Installment index must be at least 1",
        ));
    }
    if hypothetical.installment > debt.total_installments {
        return Err(DebtEngineError::invalid(
            "hypothetical.installment",
            format!(
                "Installment {} is beyond the {} scheduled installments",
                hypothetical.installment, debt.total_installments
            ),
        ));
    }
    if hypothetical.amount < Decimal::ZERO {
        return Err(DebtEngineError::invalid(
            "hypothetical.amount",
            "Amount cannot be negative",
        ));
    }
    Ok(())
}
